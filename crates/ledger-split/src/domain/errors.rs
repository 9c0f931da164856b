//! # Domain Errors
//!
//! Error types for the debt-split ledger workflow.
//!
//! Invocation-level failures are [`LedgerError`]. Port failures are
//! [`StoreError`] and [`NotifyError`]. Per-recipient failures collected by
//! the fan-out dispatcher are [`DispatchError`].

use thiserror::Error;

/// Errors surfaced by an entry operation to the hosting infrastructure.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The network path could not be decoded into a storage address.
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath {
        /// Offending path
        path: String,
        /// Why decoding failed
        reason: String,
    },

    /// A group division was requested with no recipients.
    #[error("Group request has no recipients")]
    EmptyGroup,

    /// A monetary amount is out of range.
    #[error("Invalid amount {units}.{cents}: {reason}")]
    InvalidAmount {
        /// Major units
        units: u64,
        /// Minor units
        cents: u32,
        /// Why the amount was rejected
        reason: String,
    },

    /// The event payload could not be decoded.
    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    /// Counterparty profile could not be resolved.
    #[error("Profile lookup failed for {phone}: {source}")]
    ProfileLookupFailed {
        /// Phone number used for the lookup
        phone: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// A ledger write did not commit.
    #[error("Store write failed at {address}: {source}")]
    StoreWriteFailed {
        /// Address the write targeted
        address: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// A push notification could not be delivered.
    #[error("Notification to {recipient} failed: {source}")]
    NotificationFailed {
        /// Recipient identifier
        recipient: String,
        /// Underlying notification failure
        #[source]
        source: NotifyError,
    },

    /// The caller cancelled the invocation.
    #[error("Invocation cancelled")]
    Cancelled,

    /// The caller's deadline elapsed.
    #[error("Invocation deadline exceeded")]
    DeadlineExceeded,
}

impl LedgerError {
    /// Build a `MalformedPath` error.
    pub fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the caller aborted the invocation.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// Failures reported by the ledger store port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No document matches the key.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transient I/O or backend failure.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the write.
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// The store has been closed.
    #[error("Store closed")]
    Closed,
}

/// Failures reported by the notification port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    /// Recipient has no usable push token.
    #[error("Invalid push token")]
    InvalidToken,

    /// Messaging backend failure.
    #[error("Messaging unavailable: {0}")]
    Unavailable(String),
}

/// Why a single recipient's fan-out step failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchFailure {
    /// Recipient profile could not be resolved; nothing was written.
    #[error("profile lookup failed: {0}")]
    ProfileLookupFailed(StoreError),

    /// Profile resolved but the write did not commit.
    #[error("store write failed: {0}")]
    StoreWriteFailed(StoreError),

    /// Record written but the push notification failed.
    #[error("notification failed: {0}")]
    NotificationFailed(NotifyError),

    /// Invocation aborted before this recipient was processed.
    #[error("cancelled before processing")]
    Cancelled,
}

impl DispatchFailure {
    /// True when the recipient's record was not durably written.
    pub fn lost_write(&self) -> bool {
        !matches!(self, Self::NotificationFailed(_))
    }
}

/// A per-recipient failure recorded by the fan-out dispatcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("recipient {recipient}: {cause}")]
pub struct DispatchError {
    /// Recipient identifier (phone number).
    pub recipient: String,
    /// What went wrong.
    pub cause: DispatchFailure,
}

impl DispatchError {
    /// Create a new dispatch error.
    pub fn new(recipient: impl Into<String>, cause: DispatchFailure) -> Self {
        Self {
            recipient: recipient.into(),
            cause,
        }
    }
}
