//! # Ledger Split: peer-to-peer debt ledger workflow
//!
//! Reacts to document-change events of a shared debt ledger: mirrors new
//! requests to the debtor, splits group debts into per-recipient requests
//! and propagates two-sided settlement confirmations.
//!
//! ## Architecture
//!
//! - **Domain**: Core entities (MonetaryRequest, GroupRequest, Profile) and addresses
//! - **Algorithms**: Path codec, division engine, confirmation state machine
//! - **Ports**: Inbound (LedgerTriggerApi) and Outbound (LedgerStore, Notifier)
//! - **Application**: Service orchestration and per-recipient fan-out
//! - **IPC**: Change-event payloads and the trigger handler
//! - **Adapters**: In-memory store and recording notifier
//!
//! ## Amounts
//!
//! Money is carried as `amountUnits` + `amountCents` and divided in integer
//! cents. Leftover cents go to the first recipients, one each.

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod notifications;
pub mod ports;

pub use adapters::{InMemoryLedgerStore, RecordingNotifier};
pub use application::{
    CancelHandle, ConfirmOutcome, DispatchReport, DivisionReport, FanOutDispatcher,
    InvocationContext, LedgerService, RequestOutcome,
};
pub use config::{DispatchMode, LedgerConfig};
pub use domain::entities::*;
pub use domain::errors::*;
pub use domain::value_objects::*;
pub use ipc::{ChangeEvent, Trigger, TriggerEnvelope, TriggerHandler, TriggerResponse};
pub use notifications::{NotificationKind, PushMessage};
pub use ports::inbound::LedgerTriggerApi;
pub use ports::outbound::{LedgerStore, Notifier};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
