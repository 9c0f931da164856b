//! IPC Payloads for the ledger triggers
//!
//! ## Incoming
//!
//! A change-notification event describing a document creation or update:
//!
//! ```json
//! {
//!   "oldValue": { ... },
//!   "value": { "createTime": "...", "fields": { ... }, "name": "...", "updateTime": "..." },
//!   "updateMask": { "fieldPaths": ["confirmedFrom"] }
//! }
//! ```
//!
//! `value.fields` holds the document body as plain JSON and `value.name`
//! its fully-qualified network path.

use crate::domain::{DispatchError, LedgerError, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================
// INCOMING EVENTS
// ============================================================

/// One document version inside a change event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// Document body.
    #[serde(default)]
    pub fields: serde_json::Value,
    /// Fully-qualified network path of the document.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Fields changed by an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMask {
    #[serde(default)]
    pub field_paths: Vec<String>,
}

/// Change-notification event delivered to an entry operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Previous document version, absent on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<DocumentValue>,
    pub value: DocumentValue,
    #[serde(default)]
    pub update_mask: UpdateMask,
}

impl ChangeEvent {
    /// Event for a freshly created document.
    pub fn created(network_path: impl Into<String>, fields: serde_json::Value) -> Self {
        Self {
            old_value: None,
            value: DocumentValue {
                fields,
                name: network_path.into(),
                ..DocumentValue::default()
            },
            update_mask: UpdateMask::default(),
        }
    }

    /// Event for an update that changed `field_paths`.
    pub fn updated(
        network_path: impl Into<String>,
        fields: serde_json::Value,
        field_paths: &[&str],
    ) -> Self {
        Self {
            update_mask: UpdateMask {
                field_paths: field_paths.iter().map(|p| p.to_string()).collect(),
            },
            ..Self::created(network_path, fields)
        }
    }

    /// Parse an event from raw JSON bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, LedgerError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Network path of the changed document.
    pub fn network_path(&self) -> &str {
        &self.value.name
    }

    pub fn changed_fields(&self) -> &[String] {
        &self.update_mask.field_paths
    }

    /// Decode the document body of the new version.
    pub fn decode_fields<T: DeserializeOwned>(&self) -> Result<T, LedgerError> {
        if self.value.fields.is_null() {
            return Err(LedgerError::InvalidPayload(
                "event carries no document fields".to_string(),
            ));
        }
        Ok(T::deserialize(&self.value.fields)?)
    }
}

/// Which entry operation an event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// A monetary request was created.
    Request,
    /// A group request was created.
    Division,
    /// A monetary request was updated.
    Confirm,
}

/// Trigger kind plus event, as read by the replay runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEnvelope {
    pub trigger: Trigger,
    pub event: ChangeEvent,
}

// ============================================================
// OUTGOING RESPONSES
// ============================================================

/// Result of one trigger invocation, as reported to the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerResponse {
    /// Whether the invocation completed without a fatal error
    pub success: bool,
    /// Trigger that handled the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    /// Records durably written
    pub written: usize,
    /// Division recipients whose record was not written
    pub failed_writes: usize,
    /// Per-recipient failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RecipientFailure>,
    /// Fatal error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the host should redeliver the event
    pub redeliver: bool,
}

impl TriggerResponse {
    /// Response for an invocation that failed as a whole.
    pub fn failure(trigger: Option<Trigger>, error: &LedgerError) -> Self {
        Self {
            success: false,
            trigger,
            error: Some(error.to_string()),
            // A bad payload or a missing document stays so on redelivery.
            redeliver: !matches!(
                error,
                LedgerError::MalformedPath { .. }
                    | LedgerError::EmptyGroup
                    | LedgerError::InvalidAmount { .. }
                    | LedgerError::InvalidPayload(_)
                    | LedgerError::ProfileLookupFailed {
                        source: StoreError::NotFound(_),
                        ..
                    }
                    | LedgerError::StoreWriteFailed {
                        source: StoreError::NotFound(_),
                        ..
                    }
            ),
            ..Self::default()
        }
    }
}

/// Serializable form of a [`DispatchError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFailure {
    pub recipient: String,
    pub cause: String,
    /// Whether the recipient's record was lost
    pub lost_write: bool,
}

impl From<&DispatchError> for RecipientFailure {
    fn from(err: &DispatchError) -> Self {
        Self {
            recipient: err.recipient.clone(),
            cause: err.cause.to_string(),
            lost_write: err.cause.lost_write(),
        }
    }
}
