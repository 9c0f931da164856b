//! # Division Engine
//!
//! Splits a group debt into one individual request per recipient.
//!
//! All arithmetic is done in integer cents. The remainder of the integer
//! division is handed out one cent at a time to the first recipients in
//! `tos` order, so the shares always add back up to the total. When the
//! creditor is included in the split, the creditor keeps the base share and
//! never receives an extra cent.

use crate::domain::{
    invariant_cents_in_range, invariant_shares_balanced, invariant_shares_sum, split_cents,
    GroupRequest, LedgerError, MonetaryRequest, NOT_RECURRING,
};

/// Result of dividing a group total among its parties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivisionPlan {
    /// Group total in cents.
    pub total_cents: u64,
    /// Number of parties sharing the total.
    pub divisor: u64,
    /// Base share per party.
    pub share: u64,
    /// Cents left over after the base shares.
    pub remainder: u64,
    /// Share of each recipient, in `tos` order.
    pub shares: Vec<u64>,
    /// Share kept by the creditor when included in the split.
    pub creditor_share: Option<u64>,
}

/// Compute per-recipient shares for a group request.
pub fn plan_division(group: &GroupRequest) -> Result<DivisionPlan, LedgerError> {
    let divisor = group.divisor()?;
    let total_cents = group.total_cents()?;

    let share = total_cents / divisor;
    let remainder = total_cents % divisor;

    // remainder < divisor <= tos.len() + 1, and the creditor never takes an
    // extra cent, so every leftover cent lands on a recipient.
    let shares: Vec<u64> = (0..group.tos.len() as u64)
        .map(|position| if position < remainder { share + 1 } else { share })
        .collect();
    let creditor_share = group.included.then_some(share);

    debug_assert!(invariant_shares_sum(&shares, creditor_share, total_cents));
    debug_assert!(invariant_shares_balanced(&shares));

    Ok(DivisionPlan {
        total_cents,
        divisor,
        share,
        remainder,
        shares,
        creditor_share,
    })
}

/// Divide a group request into individual monetary requests.
///
/// Output order matches `tos`. Nothing is produced for an empty group.
pub fn divide(group: &GroupRequest) -> Result<Vec<MonetaryRequest>, LedgerError> {
    let plan = plan_division(group)?;

    let requests: Vec<MonetaryRequest> = group
        .tos
        .iter()
        .zip(plan.shares.iter())
        .map(|(to, share)| {
            let (amount_units, amount_cents) = split_cents(*share);
            MonetaryRequest {
                from: group.from.clone(),
                to: to.clone(),
                description: group.description.clone(),
                date: group.date,
                amount_units,
                amount_cents,
                currency: group.currency.clone(),
                confirmed_from: false,
                confirmed_to: false,
                record_id: None,
                group_id: group.group_id,
                recurrent_id: NOT_RECURRING,
            }
        })
        .collect();

    debug_assert!(requests.iter().all(invariant_cents_in_range));
    Ok(requests)
}
