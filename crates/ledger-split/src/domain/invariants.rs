//! Domain invariants for the ledger workflow
//!
//! Checked by tests and by debug assertions in the division engine.

use super::entities::MonetaryRequest;
use super::value_objects::MAX_CENTS;

/// INVARIANT-1: Amount Range
/// `0 <= amountCents <= 99`.
pub fn invariant_cents_in_range(request: &MonetaryRequest) -> bool {
    request.amount_cents <= MAX_CENTS
}

/// INVARIANT-2: Conservation
/// Individual shares plus the creditor's own share add up to the total.
pub fn invariant_shares_sum(shares: &[u64], creditor_share: Option<u64>, total: u64) -> bool {
    let distributed: u64 = shares.iter().sum();
    distributed + creditor_share.unwrap_or(0) == total
}

/// INVARIANT-3: Balance
/// No two shares differ by more than one cent.
pub fn invariant_shares_balanced(shares: &[u64]) -> bool {
    match (shares.iter().min(), shares.iter().max()) {
        (Some(min), Some(max)) => max - min <= 1,
        _ => true,
    }
}

/// INVARIANT-4: Remainder Placement
/// Larger shares come first, so extra cents go to the earliest recipients.
pub fn invariant_remainder_front_loaded(shares: &[u64]) -> bool {
    shares.windows(2).all(|pair| pair[0] >= pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_sum() {
        assert!(invariant_shares_sum(&[351, 351], Some(350), 1052));
        assert!(invariant_shares_sum(&[526, 526], None, 1052));
        assert!(!invariant_shares_sum(&[526, 525], None, 1052));
    }

    #[test]
    fn test_shares_balanced() {
        assert!(invariant_shares_balanced(&[4, 3, 3]));
        assert!(invariant_shares_balanced(&[]));
        assert!(!invariant_shares_balanced(&[5, 3]));
    }

    #[test]
    fn test_remainder_front_loaded() {
        assert!(invariant_remainder_front_loaded(&[4, 4, 3]));
        assert!(!invariant_remainder_front_loaded(&[3, 4, 4]));
    }
}
