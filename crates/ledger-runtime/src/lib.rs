//! # Ledger Runtime
//!
//! Local hosting layer for the ledger triggers.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging
//! 2. Load configuration from the environment
//! 3. Seed the in-memory store with profiles
//! 4. Replay trigger envelopes from stdin until EOF or Ctrl+C
//! 5. Close the store

pub mod config;
pub mod replay;

pub use config::RuntimeConfig;
pub use replay::{LedgerRuntime, ReplaySummary};
