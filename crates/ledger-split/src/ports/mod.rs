//! Ports module for the ledger workflow
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::LedgerTriggerApi;
pub use outbound::{LedgerStore, Notifier};
