//! Ledger Service
//!
//! Main service implementing `LedgerTriggerApi`.
//!
//! Each entry operation decodes its event, consults the store, runs the
//! relevant algorithm, writes the result back and asks for a notification.
//! Notification failures are logged and never change the outcome.

use super::context::InvocationContext;
use super::dispatcher::FanOutDispatcher;
use super::outcomes::{ConfirmOutcome, DivisionReport, RequestOutcome};
use crate::algorithms::{
    confirmation, divide, extract_storage_address, extract_storage_address_with_record_id,
    plan_division, retarget_collection, rewrite_owner_with_record_id,
};
use crate::config::LedgerConfig;
use crate::domain::{GroupRequest, LedgerError, MonetaryRequest, Profile, RecordId};
use crate::ipc::ChangeEvent;
use crate::notifications::{NotificationKind, PushMessage};
use crate::ports::inbound::LedgerTriggerApi;
use crate::ports::outbound::{LedgerStore, Notifier};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ledger Service
///
/// Orchestrates the three entry operations over the injected ports:
/// - Request: mirror a new request to the debtor
/// - Division: split a group request and fan it out
/// - Confirm: propagate a confirmation marker to the counterpart copy
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    notifier: Arc<dyn Notifier>,
    dispatcher: FanOutDispatcher,
    config: LedgerConfig,
}

impl LedgerService {
    /// Create a new service with default config
    pub fn new(store: Arc<dyn LedgerStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, LedgerConfig::default())
    }

    /// Create a new service with custom config
    pub fn with_config(
        store: Arc<dyn LedgerStore>,
        notifier: Arc<dyn Notifier>,
        config: LedgerConfig,
    ) -> Self {
        let dispatcher = FanOutDispatcher::new(
            store.clone(),
            notifier.clone(),
            config.dispatch_mode,
            config.templates.clone(),
        );
        Self {
            store,
            notifier,
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    async fn lookup_profile(
        &self,
        ctx: &InvocationContext,
        phone: &str,
    ) -> Result<Profile, LedgerError> {
        ctx.run(self.store.get_profile_by_phone_number(ctx, phone))
            .await?
            .map_err(|source| LedgerError::ProfileLookupFailed {
                phone: phone.to_string(),
                source,
            })
    }

    /// Send `message`, logging instead of failing. Returns whether it was
    /// delivered.
    async fn notify(&self, ctx: &InvocationContext, recipient: &str, message: &PushMessage) -> bool {
        match ctx.run(self.notifier.send(ctx, message)).await {
            Ok(Ok(message_id)) => {
                debug!(recipient, message_id = %message_id, "{:?} notification sent", message.kind);
                true
            }
            Ok(Err(source)) => {
                let err = LedgerError::NotificationFailed {
                    recipient: recipient.to_string(),
                    source,
                };
                warn!("{}", err);
                false
            }
            Err(abort) => {
                warn!(recipient, "Notification skipped: {}", abort);
                false
            }
        }
    }
}

#[async_trait]
impl LedgerTriggerApi for LedgerService {
    async fn on_request(
        &self,
        ctx: &InvocationContext,
        event: &ChangeEvent,
    ) -> Result<RequestOutcome, LedgerError> {
        ctx.check()?;

        // 1. Decode and validate
        let path = event.network_path();
        let source = extract_storage_address(path)?;
        let mut record: MonetaryRequest = event.decode_fields()?;
        record.total_cents()?;

        // 2. Resolve the debtor
        let debtor = self.lookup_profile(ctx, &record.to).await?;
        let (record_id, address) = rewrite_owner_with_record_id(&debtor.id, path)?;

        // 3. The debtor's copy fires this trigger too
        if source.owner_id == debtor.id {
            debug!(
                "[request] {} is already the debtor's copy",
                address.document_path(&record_id)
            );
            return Ok(RequestOutcome::AlreadyMirrored { address, record_id });
        }

        // 4. Mirror under the debtor, keeping the creditor's record id
        record.record_id = Some(record_id.clone());
        ctx.run(self.store.set_record(ctx, &address, &record_id, &record))
            .await?
            .map_err(|source| LedgerError::StoreWriteFailed {
                address: address.document_path(&record_id),
                source,
            })?;

        info!(
            record_id = %record_id,
            debtor = %record.to,
            "[request] Mirrored request into {}",
            address
        );

        // 5. Tell the debtor
        let message = PushMessage::for_request(
            NotificationKind::Request,
            &debtor.push_token,
            &record,
            &self.config.templates,
        );
        let notified = self.notify(ctx, &record.to, &message).await;

        Ok(RequestOutcome::Mirrored {
            address,
            record_id,
            notified,
        })
    }

    async fn on_division(
        &self,
        ctx: &InvocationContext,
        event: &ChangeEvent,
    ) -> Result<DivisionReport, LedgerError> {
        ctx.check()?;

        // 1. Decode and locate
        let path = event.network_path();
        let (group_record_id, _) = extract_storage_address_with_record_id(path)?;
        let group: GroupRequest = event.decode_fields()?;

        // 2. Divide
        let plan = plan_division(&group)?;
        let records: Vec<(RecordId, MonetaryRequest)> = divide(&group)?
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let record_id = RecordId::derived(&group_record_id, index);
                (record_id.clone(), record.with_record_id(record_id))
            })
            .collect();

        info!(
            group = %group_record_id,
            recipients = records.len(),
            total_cents = plan.total_cents,
            divisor = plan.divisor,
            "[division] Dividing group request"
        );

        // 3. Fan out to every recipient
        let monetary_path = retarget_collection(
            path,
            &self.config.group_collection,
            &self.config.monetary_collection,
        );
        let creditor_address = extract_storage_address(&monetary_path)?;
        let dispatch = self.dispatcher.dispatch(ctx, &records, &monetary_path).await?;

        if dispatch.cancelled {
            warn!(
                written = dispatch.written_count(),
                "[division] Aborted during fan-out"
            );
            return Err(ctx.check().err().unwrap_or(LedgerError::Cancelled));
        }

        // 4. File the whole batch under the creditor
        ctx.run(self.store.set_records(ctx, &creditor_address, &records))
            .await?
            .map_err(|source| LedgerError::StoreWriteFailed {
                address: creditor_address.to_string(),
                source,
            })?;

        let report = DivisionReport {
            group_record_id,
            creditor_address,
            shares: plan.shares,
            dispatch,
        };

        if report.should_redeliver(self.config.max_failed_writes) {
            warn!(
                failed = report.failed_writes(),
                tolerated = self.config.max_failed_writes,
                "[division] Lost recipient writes exceed tolerance"
            );
        } else {
            info!(
                written = report.dispatch.written_count(),
                failed = report.failed_writes(),
                "[division] Group request divided"
            );
        }
        Ok(report)
    }

    async fn on_confirm(
        &self,
        ctx: &InvocationContext,
        event: &ChangeEvent,
    ) -> Result<ConfirmOutcome, LedgerError> {
        ctx.check()?;

        // 1. Decode
        let path = event.network_path();
        extract_storage_address_with_record_id(path)?;
        let record: MonetaryRequest = event.decode_fields()?;

        // 2. Interpret the changed fields
        let Some(transition) = confirmation::transition(
            record.confirmation_state(),
            event.changed_fields(),
            &self.config.confirmation,
        ) else {
            debug!(
                fields = ?event.changed_fields(),
                "[confirm] No confirmation marker in update"
            );
            return Ok(ConfirmOutcome::Unchanged);
        };

        // 3. Locate the debtor's copy
        let debtor = self.lookup_profile(ctx, &record.to).await?;
        let (record_id, address) = rewrite_owner_with_record_id(&debtor.id, path)?;

        // 4. Commit the new state (idempotent)
        ctx.run(
            self.store
                .update_confirmation(ctx, &address, &record_id, transition.next),
        )
        .await?
        .map_err(|source| LedgerError::StoreWriteFailed {
            address: address.document_path(&record_id),
            source,
        })?;

        info!(
            record_id = %record_id,
            marker = ?transition.marker,
            state = ?transition.next,
            reapplied = transition.is_noop(),
            "[confirm] Confirmation applied to {}",
            address
        );

        // 5. Tell the debtor
        let message = PushMessage::for_request(
            NotificationKind::for_marker(transition.marker),
            &debtor.push_token,
            &record,
            &self.config.templates,
        );
        let notified = self.notify(ctx, &record.to, &message).await;

        Ok(ConfirmOutcome::Applied {
            transition,
            address,
            record_id,
            notified,
        })
    }
}
