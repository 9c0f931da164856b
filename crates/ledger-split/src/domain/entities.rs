//! Core entities for the ledger workflow
//!
//! Field names on the wire follow the stored documents (`desc`,
//! `amountUnit`, `snowflake`, ...). The descriptive names are accepted as
//! aliases when decoding.

use super::errors::LedgerError;
use super::value_objects::{self, ConfirmationState, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `groupId` of a request that is not part of a group split.
pub const NO_GROUP: i64 = -1;

/// `recurrentId` of a request that is not recurring.
pub const NOT_RECURRING: i64 = -1;

/// Currency assumed when a group request does not carry one.
pub const DEFAULT_CURRENCY: &str = "€";

fn no_link() -> i64 {
    NO_GROUP
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// A single debt obligation from one party to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryRequest {
    /// Creditor identifier (phone number).
    pub from: String,
    /// Debtor identifier (phone number).
    pub to: String,
    #[serde(rename = "desc", alias = "description", default)]
    pub description: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    /// Major currency units.
    #[serde(rename = "amountUnit", alias = "amountUnits")]
    pub amount_units: u64,
    /// Minor currency units, `0..=99`.
    pub amount_cents: u32,
    pub currency: String,
    #[serde(default)]
    pub confirmed_from: bool,
    #[serde(default)]
    pub confirmed_to: bool,
    /// Assigned once by the store at creation.
    #[serde(
        rename = "snowflake",
        alias = "recordId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub record_id: Option<RecordId>,
    #[serde(default = "no_link")]
    pub group_id: i64,
    #[serde(default = "no_link")]
    pub recurrent_id: i64,
}

impl MonetaryRequest {
    /// Amount in integer cents.
    pub fn total_cents(&self) -> Result<u64, LedgerError> {
        value_objects::total_cents(self.amount_units, self.amount_cents)
    }

    pub fn confirmation_state(&self) -> ConfirmationState {
        ConfirmationState::from_flags(self.confirmed_from, self.confirmed_to)
    }

    /// Copy of this request keyed by `record_id`.
    ///
    /// An already assigned id is kept.
    pub fn with_record_id(mut self, record_id: RecordId) -> Self {
        if self.record_id.is_none() {
            self.record_id = Some(record_id);
        }
        self
    }

    pub fn is_group_share(&self) -> bool {
        self.group_id != NO_GROUP
    }
}

/// A not-yet-materialized group debt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    /// Creditor identifier.
    pub from: String,
    /// Debtors in split order. Duplicates each produce a request.
    pub tos: Vec<String>,
    #[serde(rename = "desc", alias = "description", default)]
    pub description: String,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    /// Whether the creditor also carries a share.
    #[serde(default)]
    pub included: bool,
    #[serde(rename = "amountUnit", alias = "amountUnits")]
    pub amount_units: u64,
    pub amount_cents: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "no_link")]
    pub group_id: i64,
}

impl GroupRequest {
    /// Amount in integer cents.
    pub fn total_cents(&self) -> Result<u64, LedgerError> {
        value_objects::total_cents(self.amount_units, self.amount_cents)
    }

    /// Number of parties the total is divided among.
    pub fn divisor(&self) -> Result<u64, LedgerError> {
        if self.tos.is_empty() {
            return Err(LedgerError::EmptyGroup);
        }
        let parties = self.tos.len() as u64;
        Ok(if self.included { parties + 1 } else { parties })
    }
}

/// User profile, read-only to this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Storage owner key.
    pub id: String,
    #[serde(rename = "phone", alias = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "token", alias = "pushToken", default)]
    pub push_token: String,
    #[serde(default)]
    pub name: String,
}

impl Profile {
    pub fn new(
        id: impl Into<String>,
        phone_number: impl Into<String>,
        push_token: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            phone_number: phone_number.into(),
            push_token: push_token.into(),
            name: String::new(),
        }
    }
}

/// Parse a document timestamp.
///
/// Accepts RFC 3339 and the zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` form,
/// which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    use chrono::{NaiveDateTime, TimeZone};

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| format!("unrecognised timestamp '{}': {}", raw, e))
}

mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
