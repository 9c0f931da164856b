//! Outbound Ports (Driven Ports / SPI)
//!
//! The ledger store and the messaging service are owned by the host. All
//! backend-specific marshalling lives behind these traits.

use crate::application::InvocationContext;
use crate::domain::{
    ConfirmationState, MonetaryRequest, NotifyError, Profile, RecordId, StorageAddress,
    StoreError,
};
use crate::notifications::PushMessage;
use async_trait::async_trait;

/// Keyed document storage for monetary requests and profiles.
///
/// Records are addressed by a [`StorageAddress`] bucket plus a
/// [`RecordId`]. Mutual exclusion is the backend's per-document atomicity.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Resolve a profile by its phone number.
    async fn get_profile_by_phone_number(
        &self,
        ctx: &InvocationContext,
        phone: &str,
    ) -> Result<Profile, StoreError>;

    /// Fetch a single record.
    async fn get_record(
        &self,
        ctx: &InvocationContext,
        address: &StorageAddress,
        record_id: &RecordId,
    ) -> Result<MonetaryRequest, StoreError>;

    /// Create a record under a store-assigned id.
    async fn add_record(
        &self,
        ctx: &InvocationContext,
        address: &StorageAddress,
        record: &MonetaryRequest,
    ) -> Result<RecordId, StoreError>;

    /// Create or overwrite the record keyed `record_id`.
    async fn set_record(
        &self,
        ctx: &InvocationContext,
        address: &StorageAddress,
        record_id: &RecordId,
        record: &MonetaryRequest,
    ) -> Result<RecordId, StoreError>;

    /// Write several keyed records atomically.
    async fn set_records(
        &self,
        ctx: &InvocationContext,
        address: &StorageAddress,
        records: &[(RecordId, MonetaryRequest)],
    ) -> Result<(), StoreError>;

    /// Overwrite the confirmation flags of an existing record.
    async fn update_confirmation(
        &self,
        ctx: &InvocationContext,
        address: &StorageAddress,
        record_id: &RecordId,
        state: ConfirmationState,
    ) -> Result<(), StoreError>;

    /// Release backend resources.
    async fn close(&self) -> Result<(), StoreError>;
}

/// Push notification delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a message, returning the backend's message id.
    async fn send(&self, ctx: &InvocationContext, message: &PushMessage)
        -> Result<String, NotifyError>;
}
