//! IPC Handler for the ledger triggers
//!
//! Routes a change event to the matching entry operation and turns its
//! outcome into a [`TriggerResponse`] for the host. The redelivery hint
//! honours `max_failed_writes`.

use crate::application::{
    ConfirmOutcome, DivisionReport, InvocationContext, LedgerService, RequestOutcome,
};
use crate::domain::LedgerError;
use crate::ipc::payloads::{
    ChangeEvent, RecipientFailure, Trigger, TriggerEnvelope, TriggerResponse,
};
use crate::ports::inbound::LedgerTriggerApi;
use std::time::Instant;
use tracing::{error, info};

/// IPC Handler for the ledger triggers.
pub struct TriggerHandler {
    service: LedgerService,
    max_failed_writes: usize,
}

impl TriggerHandler {
    pub fn new(service: LedgerService) -> Self {
        let max_failed_writes = service.config().max_failed_writes;
        Self {
            service,
            max_failed_writes,
        }
    }

    pub fn service(&self) -> &LedgerService {
        &self.service
    }

    /// Handle one raw `{"trigger": ..., "event": ...}` envelope.
    pub async fn handle_raw(&self, ctx: &InvocationContext, raw: &[u8]) -> TriggerResponse {
        match serde_json::from_slice::<TriggerEnvelope>(raw) {
            Ok(envelope) => self.handle(ctx, envelope.trigger, &envelope.event).await,
            Err(e) => {
                let err = LedgerError::from(e);
                error!("Rejected envelope: {}", err);
                TriggerResponse::failure(None, &err)
            }
        }
    }

    /// Handle one event for `trigger`.
    pub async fn handle(
        &self,
        ctx: &InvocationContext,
        trigger: Trigger,
        event: &ChangeEvent,
    ) -> TriggerResponse {
        let start_time = Instant::now();

        let response = match trigger {
            Trigger::Request => self
                .service
                .on_request(ctx, event)
                .await
                .map(|outcome| Self::request_response(&outcome)),
            Trigger::Division => self
                .service
                .on_division(ctx, event)
                .await
                .map(|report| self.division_response(&report)),
            Trigger::Confirm => self
                .service
                .on_confirm(ctx, event)
                .await
                .map(|outcome| Self::confirm_response(&outcome)),
        };

        match response {
            Ok(mut response) => {
                response.trigger = Some(trigger);
                info!(
                    trigger = ?trigger,
                    written = response.written,
                    failed_writes = response.failed_writes,
                    redeliver = response.redeliver,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Handled {}",
                    event.network_path()
                );
                response
            }
            Err(e) => {
                error!(
                    trigger = ?trigger,
                    path = %event.network_path(),
                    "Trigger failed: {}",
                    e
                );
                TriggerResponse::failure(Some(trigger), &e)
            }
        }
    }

    fn request_response(outcome: &RequestOutcome) -> TriggerResponse {
        let written = match outcome {
            RequestOutcome::Mirrored { .. } => 1,
            RequestOutcome::AlreadyMirrored { .. } => 0,
        };
        TriggerResponse {
            success: true,
            written,
            ..TriggerResponse::default()
        }
    }

    fn division_response(&self, report: &DivisionReport) -> TriggerResponse {
        TriggerResponse {
            success: true,
            written: report.dispatch.written_count(),
            failed_writes: report.failed_writes(),
            errors: report
                .dispatch
                .errors
                .iter()
                .map(RecipientFailure::from)
                .collect(),
            redeliver: report.should_redeliver(self.max_failed_writes),
            ..TriggerResponse::default()
        }
    }

    fn confirm_response(outcome: &ConfirmOutcome) -> TriggerResponse {
        let written = match outcome {
            ConfirmOutcome::Applied { .. } => 1,
            ConfirmOutcome::Unchanged => 0,
        };
        TriggerResponse {
            success: true,
            written,
            ..TriggerResponse::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryLedgerStore, RecordingNotifier};
    use crate::config::LedgerConfig;
    use crate::domain::Profile;
    use serde_json::json;
    use std::sync::Arc;

    fn handler(max_failed_writes: usize) -> (TriggerHandler, Arc<InMemoryLedgerStore>) {
        let store = Arc::new(InMemoryLedgerStore::with_profiles([
            Profile::new("uid-b", "+351910000002", "tok-b"),
            Profile::new("uid-c", "+351910000003", "tok-c"),
        ]));
        let config = LedgerConfig {
            max_failed_writes,
            ..LedgerConfig::default()
        };
        let service = LedgerService::with_config(
            store.clone(),
            Arc::new(RecordingNotifier::new()),
            config,
        );
        (TriggerHandler::new(service), store)
    }

    fn division_envelope() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "trigger": "division",
            "event": {
                "value": {
                    "name": "projects/p/databases/(default)/documents/GroupRequests/uid-a/2019-02/grp1",
                    "fields": {
                        "from": "+351910000001",
                        "tos": ["+351910000002", "+351910000003"],
                        "desc": "cinema",
                        "date": "2019-02-10T19:30:00",
                        "included": false,
                        "amountUnit": 7,
                        "amountCents": 0
                    }
                }
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_division_envelope() {
        let (handler, _) = handler(0);
        let response = handler
            .handle_raw(&InvocationContext::background(), &division_envelope())
            .await;

        assert!(response.success);
        assert_eq!(response.trigger, Some(Trigger::Division));
        assert_eq!(response.written, 2);
        assert!(!response.redeliver);
    }

    #[tokio::test]
    async fn test_redelivery_hint_respects_tolerance() {
        for (tolerance, expect_redeliver) in [(0, true), (1, false)] {
            let (handler, store) = handler(tolerance);
            store.fail_lookup("+351910000003");

            let response = handler
                .handle_raw(&InvocationContext::background(), &division_envelope())
                .await;

            assert!(response.success);
            assert_eq!(response.failed_writes, 1);
            assert_eq!(response.errors.len(), 1);
            assert!(response.errors[0].lost_write);
            assert_eq!(response.redeliver, expect_redeliver);
        }
    }

    #[tokio::test]
    async fn test_garbage_envelope() {
        let (handler, _) = handler(0);
        let response = handler
            .handle_raw(&InvocationContext::background(), b"not json")
            .await;

        assert!(!response.success);
        assert!(response.trigger.is_none());
        assert!(response.error.unwrap().starts_with("Invalid event payload"));
    }

    #[tokio::test]
    async fn test_malformed_path_not_redelivered() {
        let (handler, _) = handler(0);
        let event = ChangeEvent::created("GroupRequests/uid-a/2019-02/grp1", json!({}));

        let response = handler
            .handle(&InvocationContext::background(), Trigger::Division, &event)
            .await;

        assert!(!response.success);
        assert!(!response.redeliver);
    }
}
