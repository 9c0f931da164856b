//! Inbound Ports (Driving Ports / API)
//!
//! The three entry operations. Each is an independent, stateless
//! invocation driven by one change-notification event.

use crate::application::{ConfirmOutcome, DivisionReport, InvocationContext, RequestOutcome};
use crate::domain::LedgerError;
use crate::ipc::ChangeEvent;
use async_trait::async_trait;

/// Primary ledger trigger API
#[async_trait]
pub trait LedgerTriggerApi: Send + Sync {
    /// A monetary request was created by its creditor.
    ///
    /// Mirrors the record into the debtor's partition and notifies the
    /// debtor.
    async fn on_request(
        &self,
        ctx: &InvocationContext,
        event: &ChangeEvent,
    ) -> Result<RequestOutcome, LedgerError>;

    /// A group request was created.
    ///
    /// Divides the amount, fans the shares out to every recipient and files
    /// the full batch under the creditor. Per-recipient failures are
    /// reported in the [`DivisionReport`], not raised.
    async fn on_division(
        &self,
        ctx: &InvocationContext,
        event: &ChangeEvent,
    ) -> Result<DivisionReport, LedgerError>;

    /// A monetary request was updated.
    ///
    /// Applies a confirmation marker to the counterpart copy.
    async fn on_confirm(
        &self,
        ctx: &InvocationContext,
        event: &ChangeEvent,
    ) -> Result<ConfirmOutcome, LedgerError>;
}
