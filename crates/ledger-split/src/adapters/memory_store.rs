//! In-Memory Ledger Store Adapter
//!
//! Implements the `LedgerStore` port over hash maps. Used by the replay
//! runtime and by tests, which can inject per-key failures.

use crate::application::InvocationContext;
use crate::domain::{
    ConfirmationState, MonetaryRequest, Profile, RecordId, StorageAddress, StoreError,
};
use crate::ports::outbound::LedgerStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use uuid::Uuid;

/// Bucket contents: record id -> record.
type Bucket = HashMap<RecordId, MonetaryRequest>;

/// In-memory ledger store.
///
/// Writes to one bucket are serialized by the map lock, which stands in for
/// the per-document atomicity of a real backend.
pub struct InMemoryLedgerStore {
    /// Profiles keyed by phone number.
    profiles: RwLock<HashMap<String, Profile>>,
    /// Records per bucket.
    records: RwLock<HashMap<StorageAddress, Bucket>>,
    /// Phone numbers whose lookup fails.
    failing_lookups: RwLock<HashSet<String>>,
    /// Owner ids whose buckets reject writes.
    failing_owners: RwLock<HashSet<String>>,
    closed: AtomicBool,
}

impl InMemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
            failing_lookups: RwLock::new(HashSet::new()),
            failing_owners: RwLock::new(HashSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a store seeded with `profiles`.
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let store = Self::new();
        for profile in profiles {
            store.insert_profile(profile);
        }
        store
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.profiles
            .write()
            .insert(profile.phone_number.clone(), profile);
    }

    /// Store a record directly, bypassing the port.
    pub fn insert_record(&self, address: StorageAddress, record_id: RecordId, record: MonetaryRequest) {
        self.records
            .write()
            .entry(address)
            .or_default()
            .insert(record_id, record);
    }

    /// Make every lookup of `phone` fail as unavailable.
    pub fn fail_lookup(&self, phone: impl Into<String>) {
        self.failing_lookups.write().insert(phone.into());
    }

    /// Make every write into a bucket owned by `owner_id` fail.
    pub fn fail_writes_for(&self, owner_id: impl Into<String>) {
        self.failing_owners.write().insert(owner_id.into());
    }

    /// Stop injecting write failures for `owner_id`.
    pub fn heal_writes_for(&self, owner_id: &str) {
        self.failing_owners.write().remove(owner_id);
    }

    /// Snapshot of one record.
    pub fn record(&self, address: &StorageAddress, record_id: &RecordId) -> Option<MonetaryRequest> {
        self.records
            .read()
            .get(address)
            .and_then(|bucket| bucket.get(record_id))
            .cloned()
    }

    /// Snapshot of one bucket, sorted by record id.
    pub fn records_in(&self, address: &StorageAddress) -> Vec<(RecordId, MonetaryRequest)> {
        let mut entries: Vec<_> = self
            .records
            .read()
            .get(address)
            .map(|bucket| {
                bucket
                    .iter()
                    .map(|(id, record)| (id.clone(), record.clone()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Total number of records across all buckets.
    pub fn record_count(&self) -> usize {
        self.records.read().values().map(HashMap::len).sum()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn ensure_writable(&self, address: &StorageAddress) -> Result<(), StoreError> {
        self.ensure_open()?;
        if self.failing_owners.read().contains(&address.owner_id) {
            return Err(StoreError::Unavailable(format!("bucket {}", address)));
        }
        Ok(())
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_profile_by_phone_number(
        &self,
        _ctx: &InvocationContext,
        phone: &str,
    ) -> Result<Profile, StoreError> {
        self.ensure_open()?;
        if self.failing_lookups.read().contains(phone) {
            return Err(StoreError::Unavailable(format!("profile {}", phone)));
        }
        self.profiles
            .read()
            .get(phone)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", phone)))
    }

    async fn get_record(
        &self,
        _ctx: &InvocationContext,
        address: &StorageAddress,
        record_id: &RecordId,
    ) -> Result<MonetaryRequest, StoreError> {
        self.ensure_open()?;
        self.record(address, record_id)
            .ok_or_else(|| StoreError::NotFound(address.document_path(record_id)))
    }

    async fn add_record(
        &self,
        _ctx: &InvocationContext,
        address: &StorageAddress,
        record: &MonetaryRequest,
    ) -> Result<RecordId, StoreError> {
        self.ensure_writable(address)?;
        let record_id = RecordId::new(Uuid::new_v4().simple().to_string());
        let stored = record.clone().with_record_id(record_id.clone());

        self.insert_record(address.clone(), record_id.clone(), stored);
        debug!("[store] Added {}", address.document_path(&record_id));
        Ok(record_id)
    }

    async fn set_record(
        &self,
        _ctx: &InvocationContext,
        address: &StorageAddress,
        record_id: &RecordId,
        record: &MonetaryRequest,
    ) -> Result<RecordId, StoreError> {
        self.ensure_writable(address)?;
        let stored = record.clone().with_record_id(record_id.clone());

        self.insert_record(address.clone(), record_id.clone(), stored);
        debug!("[store] Set {}", address.document_path(record_id));
        Ok(record_id.clone())
    }

    async fn set_records(
        &self,
        _ctx: &InvocationContext,
        address: &StorageAddress,
        records: &[(RecordId, MonetaryRequest)],
    ) -> Result<(), StoreError> {
        self.ensure_writable(address)?;

        // Single lock scope: the batch lands all at once or not at all.
        let mut buckets = self.records.write();
        let bucket = buckets.entry(address.clone()).or_default();
        for (record_id, record) in records {
            bucket.insert(
                record_id.clone(),
                record.clone().with_record_id(record_id.clone()),
            );
        }

        debug!("[store] Batch of {} set in {}", records.len(), address);
        Ok(())
    }

    async fn update_confirmation(
        &self,
        _ctx: &InvocationContext,
        address: &StorageAddress,
        record_id: &RecordId,
        state: ConfirmationState,
    ) -> Result<(), StoreError> {
        self.ensure_writable(address)?;

        let mut buckets = self.records.write();
        let record = buckets
            .get_mut(address)
            .and_then(|bucket| bucket.get_mut(record_id))
            .ok_or_else(|| StoreError::NotFound(address.document_path(record_id)))?;

        let (confirmed_from, confirmed_to) = state.flags();
        record.confirmed_from = confirmed_from;
        record.confirmed_to = confirmed_to;

        debug!(
            "[store] Confirmation of {} set to {:?}",
            address.document_path(record_id),
            state
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
