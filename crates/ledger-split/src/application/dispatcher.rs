//! Fan-Out Dispatcher
//!
//! Delivers the per-recipient records of a division. For every recipient:
//!
//! 1. Resolve the profile by phone number
//! 2. Write the record into the recipient's bucket
//! 3. Notify the recipient
//!
//! A failure at any step is recorded against that recipient only. Steps run
//! one recipient after another or all at once, per [`DispatchMode`].

use super::context::InvocationContext;
use super::outcomes::DispatchReport;
use crate::algorithms::extract_storage_address;
use crate::config::{DispatchMode, TemplateConfig};
use crate::domain::{
    DispatchError, DispatchFailure, LedgerError, MonetaryRequest, NotifyError, RecordId,
    StorageAddress,
};
use crate::notifications::{NotificationKind, PushMessage};
use crate::ports::outbound::{LedgerStore, Notifier};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one recipient.
#[derive(Debug)]
struct RecipientOutcome {
    written: Option<RecordId>,
    error: Option<DispatchError>,
    /// The invocation was aborted while this recipient was in flight.
    aborted: bool,
}

impl RecipientOutcome {
    fn failed(recipient: &str, cause: DispatchFailure) -> Self {
        Self {
            written: None,
            error: Some(DispatchError::new(recipient, cause)),
            aborted: false,
        }
    }

    fn cancelled(recipient: &str) -> Self {
        Self {
            aborted: true,
            ..Self::failed(recipient, DispatchFailure::Cancelled)
        }
    }
}

/// Per-recipient fan-out of division results.
pub struct FanOutDispatcher {
    store: Arc<dyn LedgerStore>,
    notifier: Arc<dyn Notifier>,
    mode: DispatchMode,
    templates: TemplateConfig,
}

impl FanOutDispatcher {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        notifier: Arc<dyn Notifier>,
        mode: DispatchMode,
        templates: TemplateConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            mode,
            templates,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Deliver `records` to their debtors.
    ///
    /// `group_network_path` locates the creditor's bucket; each record is
    /// written to the same collection and period under the debtor's owner
    /// id. Only a malformed path fails the whole call.
    pub async fn dispatch(
        &self,
        ctx: &InvocationContext,
        records: &[(RecordId, MonetaryRequest)],
        group_network_path: &str,
    ) -> Result<DispatchReport, LedgerError> {
        let bucket = extract_storage_address(group_network_path)?;

        info!(
            recipients = records.len(),
            mode = ?self.mode,
            "[dispatch] Fanning out to {}",
            bucket
        );

        let outcomes = match self.mode {
            DispatchMode::Sequential => self.dispatch_sequential(ctx, records, &bucket).await,
            DispatchMode::Concurrent => {
                join_all(
                    records
                        .iter()
                        .map(|(record_id, record)| self.dispatch_one(ctx, &bucket, record_id, record)),
                )
                .await
            }
        };

        let mut report = DispatchReport {
            attempted: records.len(),
            ..DispatchReport::default()
        };
        for outcome in outcomes {
            report.cancelled |= outcome.aborted;
            if let Some(record_id) = outcome.written {
                report.written.push(record_id);
            }
            if let Some(error) = outcome.error {
                report.errors.push(error);
            }
        }

        if report.errors.is_empty() {
            info!(written = report.written_count(), "[dispatch] Fan-out complete");
        } else {
            warn!(
                written = report.written_count(),
                failed_writes = report.failed_writes(),
                errors = report.errors.len(),
                cancelled = report.cancelled,
                "[dispatch] Fan-out completed with failures"
            );
        }
        Ok(report)
    }

    async fn dispatch_sequential(
        &self,
        ctx: &InvocationContext,
        records: &[(RecordId, MonetaryRequest)],
        bucket: &StorageAddress,
    ) -> Vec<RecipientOutcome> {
        let mut outcomes = Vec::with_capacity(records.len());
        let mut aborted = false;

        for (record_id, record) in records {
            if aborted || ctx.check().is_err() {
                aborted = true;
                outcomes.push(RecipientOutcome::cancelled(&record.to));
                continue;
            }
            let outcome = self.dispatch_one(ctx, bucket, record_id, record).await;
            aborted = outcome.aborted;
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn dispatch_one(
        &self,
        ctx: &InvocationContext,
        bucket: &StorageAddress,
        record_id: &RecordId,
        record: &MonetaryRequest,
    ) -> RecipientOutcome {
        let recipient = record.to.as_str();

        let profile = match ctx
            .run(self.store.get_profile_by_phone_number(ctx, recipient))
            .await
        {
            Err(_) => return RecipientOutcome::cancelled(recipient),
            Ok(Err(e)) => {
                warn!("[dispatch] Profile lookup for {} failed: {}", recipient, e);
                return RecipientOutcome::failed(recipient, DispatchFailure::ProfileLookupFailed(e));
            }
            Ok(Ok(profile)) => profile,
        };

        let target = bucket.with_owner(&profile.id);
        match ctx
            .run(self.store.set_record(ctx, &target, record_id, record))
            .await
        {
            Err(_) => return RecipientOutcome::cancelled(recipient),
            Ok(Err(e)) => {
                warn!(
                    "[dispatch] Write of {} failed: {}",
                    target.document_path(record_id),
                    e
                );
                return RecipientOutcome::failed(recipient, DispatchFailure::StoreWriteFailed(e));
            }
            Ok(Ok(_)) => {
                debug!("[dispatch] Wrote {}", target.document_path(record_id));
            }
        }

        let message = PushMessage::for_request(
            NotificationKind::Request,
            &profile.push_token,
            record,
            &self.templates,
        );
        let (error, aborted) = match ctx.run(self.notifier.send(ctx, &message)).await {
            Ok(Ok(_)) => (None, false),
            Ok(Err(e)) => (Some(e), false),
            Err(abort) => (Some(NotifyError::Unavailable(abort.to_string())), true),
        };
        if let Some(e) = &error {
            warn!("[dispatch] Notification to {} failed: {}", recipient, e);
        }

        RecipientOutcome {
            written: Some(record_id.clone()),
            error: error
                .map(|e| DispatchError::new(recipient, DispatchFailure::NotificationFailed(e))),
            aborted,
        }
    }
}
