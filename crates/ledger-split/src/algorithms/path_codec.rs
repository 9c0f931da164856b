//! # Path Codec
//!
//! Converts change-notification network paths into canonical storage
//! addresses.
//!
//! A network path looks like
//! `projects/{p}/databases/(default)/documents/{collection}/{ownerId}/{period}/{recordId}`.
//! Everything up to and including the first `/documents/` is routing and is
//! discarded. The owner segment is the party that wrote the document, which
//! for a freshly created request is the creditor.

use crate::domain::{LedgerError, RecordId, StorageAddress};

/// Delimiter between store routing segments and the document path.
pub const DOCUMENTS_MARKER: &str = "/documents/";

/// Split the document part of a network path into segments.
///
/// Requires at least `{collection}/{ownerId}/{period}`.
fn document_segments(network_path: &str) -> Result<Vec<&str>, LedgerError> {
    let (_, document) = network_path.split_once(DOCUMENTS_MARKER).ok_or_else(|| {
        LedgerError::malformed(network_path, format!("missing '{}' marker", DOCUMENTS_MARKER))
    })?;

    let segments: Vec<&str> = document.split('/').collect();
    if segments.len() < 3 {
        return Err(LedgerError::malformed(
            network_path,
            format!("expected at least 3 segments, found {}", segments.len()),
        ));
    }
    if segments[..3].iter().any(|segment| segment.is_empty()) {
        return Err(LedgerError::malformed(network_path, "empty address segment"));
    }
    Ok(segments)
}

fn address_from(segments: &[&str]) -> StorageAddress {
    StorageAddress::new(segments[0], segments[1], segments[2])
}

fn record_id_from(network_path: &str, segments: &[&str]) -> Result<RecordId, LedgerError> {
    match segments.get(3) {
        Some(id) if !id.is_empty() => Ok(RecordId::new(*id)),
        _ => Err(LedgerError::malformed(network_path, "missing record id segment")),
    }
}

/// `{collection}/{ownerId}/{period}` of a network path.
pub fn extract_storage_address(network_path: &str) -> Result<StorageAddress, LedgerError> {
    let segments = document_segments(network_path)?;
    Ok(address_from(&segments))
}

/// Record id plus `{collection}/{ownerId}/{period}` of a network path.
pub fn extract_storage_address_with_record_id(
    network_path: &str,
) -> Result<(RecordId, StorageAddress), LedgerError> {
    let segments = document_segments(network_path)?;
    let record_id = record_id_from(network_path, &segments)?;
    Ok((record_id, address_from(&segments)))
}

/// Storage address of the same bucket filed under `new_owner_id`.
///
/// Collection and period are preserved; only the owner segment changes.
pub fn rewrite_owner(
    new_owner_id: &str,
    network_path: &str,
) -> Result<StorageAddress, LedgerError> {
    Ok(extract_storage_address(network_path)?.with_owner(new_owner_id))
}

/// [`rewrite_owner`] plus the record id of the network path.
pub fn rewrite_owner_with_record_id(
    new_owner_id: &str,
    network_path: &str,
) -> Result<(RecordId, StorageAddress), LedgerError> {
    let (record_id, address) = extract_storage_address_with_record_id(network_path)?;
    Ok((record_id, address.with_owner(new_owner_id)))
}

/// Replace the first path segment equal to `from_collection`.
///
/// Other segments are left untouched. Paths without a matching segment are
/// returned unchanged.
pub fn retarget_collection(path: &str, from_collection: &str, to_collection: &str) -> String {
    let mut replaced = false;
    path.split('/')
        .map(|segment| {
            if !replaced && segment == from_collection {
                replaced = true;
                to_collection
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
