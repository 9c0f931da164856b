//! # Algorithms Module
//!
//! Pure logic of the ledger workflow: path decoding, group division and
//! confirmation transitions.

pub mod confirmation;
pub mod division;
pub mod path_codec;

pub use confirmation::{apply_marker, detect_marker, transition, ConfirmationTransition};
pub use division::{divide, plan_division, DivisionPlan};
pub use path_codec::{
    extract_storage_address, extract_storage_address_with_record_id, retarget_collection,
    rewrite_owner, rewrite_owner_with_record_id, DOCUMENTS_MARKER,
};
