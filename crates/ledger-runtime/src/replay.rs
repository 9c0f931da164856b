//! Event replay loop.
//!
//! Every input line is one `{"trigger": ..., "event": ...}` envelope. Every
//! output line is the matching `TriggerResponse`. Blank lines are skipped.

use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use ledger_split::{
    InMemoryLedgerStore, InvocationContext, LedgerService, LedgerStore, Profile,
    RecordingNotifier, TriggerHandler, TriggerResponse,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

/// Counters over one replay session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Envelopes handled.
    pub events: usize,
    /// Envelopes that failed as a whole.
    pub failed: usize,
    /// Envelopes the host would redeliver.
    pub redeliver: usize,
    /// Input stopped early on cancellation.
    pub interrupted: bool,
}

impl ReplaySummary {
    fn record(&mut self, response: &TriggerResponse) {
        self.events += 1;
        if !response.success {
            self.failed += 1;
        }
        if response.redeliver {
            self.redeliver += 1;
        }
    }
}

/// Ledger service wired to the in-memory adapters.
pub struct LedgerRuntime {
    handler: TriggerHandler,
    store: Arc<InMemoryLedgerStore>,
    notifier: Arc<RecordingNotifier>,
    deadline: Option<Duration>,
}

impl LedgerRuntime {
    /// Build the runtime with the store seeded from `profiles`.
    pub fn new(config: RuntimeConfig, profiles: Vec<Profile>) -> Self {
        let store = Arc::new(InMemoryLedgerStore::with_profiles(profiles));
        let notifier = Arc::new(RecordingNotifier::echoing());
        let service = LedgerService::with_config(store.clone(), notifier.clone(), config.ledger);

        Self {
            handler: TriggerHandler::new(service),
            store,
            notifier,
            deadline: config.deadline,
        }
    }

    pub fn store(&self) -> &InMemoryLedgerStore {
        &self.store
    }

    pub fn notifier(&self) -> &RecordingNotifier {
        &self.notifier
    }

    /// Handle envelopes from `input` until EOF or cancellation of `ctx`.
    pub async fn replay<R, W>(
        &self,
        ctx: &InvocationContext,
        input: R,
        output: &mut W,
    ) -> Result<ReplaySummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = ReplaySummary::default();
        let mut lines = input.lines();

        loop {
            let line = match ctx.run(lines.next_line()).await {
                Ok(line) => line.context("reading trigger envelope")?,
                Err(e) => {
                    warn!("Replay interrupted: {}", e);
                    summary.interrupted = true;
                    break;
                }
            };
            let Some(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            let event_ctx = match self.deadline {
                Some(deadline) => ctx.clone().with_timeout(deadline),
                None => ctx.clone(),
            };
            let response = self.handler.handle_raw(&event_ctx, line.as_bytes()).await;
            summary.record(&response);

            let mut encoded = serde_json::to_vec(&response).context("encoding response")?;
            encoded.push(b'\n');
            output
                .write_all(&encoded)
                .await
                .context("writing response")?;
        }

        output.flush().await.context("flushing responses")?;
        Ok(summary)
    }

    /// Release the store.
    pub async fn shutdown(&self) -> Result<()> {
        self.store.close().await.context("closing ledger store")?;
        info!(
            notifications = self.notifier.sent_count(),
            records = self.store.record_count(),
            "Ledger runtime stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_split::{RecordId, StorageAddress};

    fn runtime() -> LedgerRuntime {
        LedgerRuntime::new(
            RuntimeConfig::default(),
            vec![
                Profile::new("uid-a", "+351910000001", "tok-a"),
                Profile::new("uid-b", "+351910000002", "tok-b"),
            ],
        )
    }

    const REQUEST: &str = r#"{"trigger":"request","event":{"value":{"name":"projects/p/databases/(default)/documents/MonetaryRequests/uid-a/2019-02/r1","fields":{"from":"+351910000001","to":"+351910000002","desc":"coffee","date":"2019-02-01T08:00:00Z","amountUnit":1,"amountCents":20,"currency":"€"}}}}"#;

    #[tokio::test]
    async fn test_replay_writes_one_response_per_event() {
        let runtime = runtime();
        let input = format!("{}\n\n{}\nnot-json\n", REQUEST, REQUEST);
        let mut output = Vec::new();

        let summary = runtime
            .replay(&InvocationContext::background(), input.as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(summary.events, 3);
        assert_eq!(summary.failed, 1);
        assert!(!summary.interrupted);

        let responses: Vec<TriggerResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert!(responses[0].success);
        assert_eq!(responses[0].written, 1);
        assert!(!responses[2].success);

        let mirrored = StorageAddress::new("MonetaryRequests", "uid-b", "2019-02");
        assert!(runtime.store().record(&mirrored, &RecordId::new("r1")).is_some());
        assert_eq!(runtime.notifier().sent_count(), 2);
    }

    #[tokio::test]
    async fn test_replay_stops_on_cancel() {
        let runtime = runtime();
        let (handle, ctx) = InvocationContext::cancellable();
        handle.cancel();
        let mut output = Vec::new();

        let summary = runtime
            .replay(&ctx, REQUEST.as_bytes(), &mut output)
            .await
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.events, 0);
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_closes_store() {
        let runtime = runtime();
        runtime.shutdown().await.unwrap();
        assert!(runtime.store().is_closed());
    }
}
