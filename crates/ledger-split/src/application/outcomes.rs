//! Results returned by the entry operations.

use crate::algorithms::ConfirmationTransition;
use crate::domain::{DispatchError, DispatchFailure, RecordId, StorageAddress};

/// Aggregate result of a fan-out over N recipients.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Records handed to the dispatcher.
    pub attempted: usize,
    /// Ids of records durably written, in recipient order.
    pub written: Vec<RecordId>,
    /// Per-recipient failures, lookup and notification class alike.
    pub errors: Vec<DispatchError>,
    /// The invocation was aborted before every recipient was processed.
    pub cancelled: bool,
}

impl DispatchReport {
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// Records that were not durably written.
    pub fn failed_writes(&self) -> usize {
        self.attempted - self.written.len()
    }

    pub fn notification_failures(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| matches!(e.cause, DispatchFailure::NotificationFailed(_)))
            .count()
    }

    pub fn lookup_failures(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| matches!(e.cause, DispatchFailure::ProfileLookupFailed(_)))
            .count()
    }
}

/// Result of a division invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivisionReport {
    /// Id of the group record that was divided.
    pub group_record_id: RecordId,
    /// Creditor bucket that received the full batch.
    pub creditor_address: StorageAddress,
    /// Share of every recipient in cents, in `tos` order.
    pub shares: Vec<u64>,
    /// Per-recipient fan-out result.
    pub dispatch: DispatchReport,
}

impl DivisionReport {
    pub fn failed_writes(&self) -> usize {
        self.dispatch.failed_writes()
    }

    /// Whether the host should redeliver the event given a tolerance of
    /// `max_failed_writes` lost recipient writes.
    pub fn should_redeliver(&self, max_failed_writes: usize) -> bool {
        self.failed_writes() > max_failed_writes
    }
}

/// Result of a request invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request was mirrored into the debtor's partition.
    Mirrored {
        address: StorageAddress,
        record_id: RecordId,
        notified: bool,
    },
    /// The event already came from the debtor's copy; nothing written.
    AlreadyMirrored {
        address: StorageAddress,
        record_id: RecordId,
    },
}

/// Result of a confirm invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Confirmation flags were written.
    Applied {
        transition: ConfirmationTransition,
        address: StorageAddress,
        record_id: RecordId,
        notified: bool,
    },
    /// No confirmation marker among the changed fields.
    Unchanged,
}
