//! IPC Module for the ledger triggers
//!
//! - Accept: change-notification events for created monetary requests,
//!   created group requests and updated monetary requests
//! - Send: one `TriggerResponse` per event back to the host

pub mod handler;
pub mod payloads;

pub use handler::TriggerHandler;
pub use payloads::*;
