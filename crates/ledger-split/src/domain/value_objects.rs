//! Value objects for the ledger workflow

use super::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cents in one major currency unit.
pub const CENTS_PER_UNIT: u64 = 100;

/// Largest valid `amountCents` value.
pub const MAX_CENTS: u32 = 99;

/// Stable, store-assigned identifier of a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Key of the `index`-th individual request produced from a group record.
    ///
    /// Both the recipient copy and the creditor copy share this key, so a
    /// redelivered division overwrites instead of duplicating.
    pub fn derived(group: &RecordId, index: usize) -> Self {
        Self(format!("{}-{}", group.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical `{collection}/{ownerId}/{period}` bucket of a record.
///
/// The record itself lives at `{collection}/{ownerId}/{period}/{recordId}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageAddress {
    /// Top-level collection, e.g. `MonetaryRequests`.
    pub collection: String,
    /// Party under whose partition the record is filed.
    pub owner_id: String,
    /// Calendar-month bucket (`YYYY-MM`).
    pub period: String,
}

impl StorageAddress {
    pub fn new(
        collection: impl Into<String>,
        owner_id: impl Into<String>,
        period: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            owner_id: owner_id.into(),
            period: period.into(),
        }
    }

    /// Same bucket filed under another owner.
    pub fn with_owner(&self, owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..self.clone()
        }
    }

    /// Full document path for a record in this bucket.
    pub fn document_path(&self, record_id: &RecordId) -> String {
        format!("{}/{}", self, record_id)
    }
}

impl fmt::Display for StorageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.collection, self.owner_id, self.period)
    }
}

/// Two-sided settlement state of a monetary request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationState {
    /// Neither side confirmed.
    Pending,
    /// Debtor side confirmed.
    ToConfirmed,
    /// Creditor side confirmed (implies the debtor side).
    FromConfirmed,
}

impl ConfirmationState {
    /// Interpret stored flags.
    ///
    /// `confirmedFrom` without `confirmedTo` never results from a modelled
    /// transition; it is read as `FromConfirmed`.
    pub fn from_flags(confirmed_from: bool, confirmed_to: bool) -> Self {
        match (confirmed_from, confirmed_to) {
            (false, false) => Self::Pending,
            (false, true) => Self::ToConfirmed,
            (true, _) => Self::FromConfirmed,
        }
    }

    /// `(confirmedFrom, confirmedTo)` flags written to the store.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Self::Pending => (false, false),
            Self::ToConfirmed => (false, true),
            Self::FromConfirmed => (true, true),
        }
    }
}

/// Which side's confirmation an update event carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationMarker {
    /// The creditor (`from`) confirmed settlement.
    Creditor,
    /// The debtor (`to`) confirmed settlement.
    Debtor,
}

/// Convert a `units.cents` amount to integer cents.
pub fn total_cents(units: u64, cents: u32) -> Result<u64, LedgerError> {
    if cents > MAX_CENTS {
        return Err(LedgerError::InvalidAmount {
            units,
            cents,
            reason: format!("cents must be within 0..={}", MAX_CENTS),
        });
    }
    units
        .checked_mul(CENTS_PER_UNIT)
        .and_then(|total| total.checked_add(u64::from(cents)))
        .ok_or_else(|| LedgerError::InvalidAmount {
            units,
            cents,
            reason: "amount overflows integer cents".to_string(),
        })
}

/// Split integer cents back into `(units, cents)`.
pub fn split_cents(total: u64) -> (u64, u32) {
    // Remainder is always below 100.
    (total / CENTS_PER_UNIT, (total % CENTS_PER_UNIT) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_address_display() {
        let address = StorageAddress::new("MonetaryRequests", "A", "2019-02");
        assert_eq!(address.to_string(), "MonetaryRequests/A/2019-02");
        assert_eq!(
            address.document_path(&RecordId::new("rec1")),
            "MonetaryRequests/A/2019-02/rec1"
        );
    }

    #[test]
    fn test_with_owner_keeps_collection_and_period() {
        let address = StorageAddress::new("MonetaryRequests", "A", "2019-02");
        let moved = address.with_owner("B");
        assert_eq!(moved.collection, "MonetaryRequests");
        assert_eq!(moved.owner_id, "B");
        assert_eq!(moved.period, "2019-02");
    }

    #[test]
    fn test_derived_record_id() {
        let group = RecordId::new("g3aRogfhNIKwcwTxkGwF");
        assert_eq!(
            RecordId::derived(&group, 2).as_str(),
            "g3aRogfhNIKwcwTxkGwF-2"
        );
    }

    #[test]
    fn test_confirmation_flags() {
        assert_eq!(ConfirmationState::Pending.flags(), (false, false));
        assert_eq!(ConfirmationState::ToConfirmed.flags(), (false, true));
        assert_eq!(ConfirmationState::FromConfirmed.flags(), (true, true));
        assert_eq!(
            ConfirmationState::from_flags(true, false),
            ConfirmationState::FromConfirmed
        );
    }

    #[test]
    fn test_total_cents() {
        assert_eq!(total_cents(10, 52).unwrap(), 1052);
        assert_eq!(total_cents(0, 0).unwrap(), 0);
        assert!(matches!(
            total_cents(1, 100),
            Err(LedgerError::InvalidAmount { cents: 100, .. })
        ));
        assert!(total_cents(u64::MAX, 0).is_err());
    }

    #[test]
    fn test_split_cents() {
        assert_eq!(split_cents(1052), (10, 52));
        assert_eq!(split_cents(7), (0, 7));
    }
}
