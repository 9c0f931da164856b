//! Recording Notifier Adapter
//!
//! Implements the `Notifier` port by keeping every delivered message in
//! memory. The replay runtime logs them; tests assert on them.

use crate::application::InvocationContext;
use crate::domain::NotifyError;
use crate::notifications::PushMessage;
use crate::ports::outbound::Notifier;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Notifier that records messages instead of delivering them.
pub struct RecordingNotifier {
    sent: RwLock<Vec<PushMessage>>,
    /// Tokens whose delivery fails.
    failing_tokens: RwLock<HashSet<String>>,
    /// Log each message at info level.
    echo: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            failing_tokens: RwLock::new(HashSet::new()),
            echo: false,
        }
    }

    /// Notifier that also logs every delivered message.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::new()
        }
    }

    /// Make delivery to `token` fail as unavailable.
    pub fn fail_token(&self, token: impl Into<String>) {
        self.failing_tokens.write().insert(token.into());
    }

    /// Messages delivered so far, in order.
    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.read().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().len()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        _ctx: &InvocationContext,
        message: &PushMessage,
    ) -> Result<String, NotifyError> {
        if message.token.is_empty() {
            return Err(NotifyError::InvalidToken);
        }
        if self.failing_tokens.read().contains(&message.token) {
            return Err(NotifyError::Unavailable(format!(
                "token {} unreachable",
                message.token
            )));
        }

        let message_id = Uuid::new_v4().to_string();
        if self.echo {
            info!(
                kind = ?message.kind,
                token = %message.token,
                "[notify] {}: {}",
                message.title,
                message.body
            );
        } else {
            debug!("[notify] {:?} to {}", message.kind, message.token);
        }
        self.sent.write().push(message.clone());
        Ok(message_id)
    }
}
