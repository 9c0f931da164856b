//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports.

mod memory_store;
mod notifier;

pub use memory_store::InMemoryLedgerStore;
pub use notifier::RecordingNotifier;
