//! # Confirmation State Machine
//!
//! Interprets the changed-field set of an update event.
//!
//! ```text
//!   Pending ──debtor──→ ToConfirmed
//!      │                    │
//!      └──creditor──→ FromConfirmed ←──creditor──┘
//! ```
//!
//! A creditor confirmation always writes both flags. A debtor confirmation
//! always writes `confirmedFrom=false, confirmedTo=true`, whatever the
//! stored state was. Re-applying the same marker is a no-op on the flags.

use crate::config::ConfirmationFields;
use crate::domain::{ConfirmationMarker, ConfirmationState};

/// A state change requested by an update event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationTransition {
    /// Side that confirmed.
    pub marker: ConfirmationMarker,
    /// State decoded from the event's record body.
    pub previous: ConfirmationState,
    /// State to write.
    pub next: ConfirmationState,
}

impl ConfirmationTransition {
    /// True when the stored flags already match the target state.
    pub fn is_noop(&self) -> bool {
        self.previous == self.next
    }
}

/// Find the confirmation marker in an event's changed fields.
///
/// The creditor marker takes precedence when both are present.
pub fn detect_marker(
    field_paths: &[String],
    fields: &ConfirmationFields,
) -> Option<ConfirmationMarker> {
    let changed = |name: &str| field_paths.iter().any(|path| path == name);

    if changed(&fields.creditor) {
        Some(ConfirmationMarker::Creditor)
    } else if changed(&fields.debtor) {
        Some(ConfirmationMarker::Debtor)
    } else {
        None
    }
}

/// Target state for a confirmation marker.
pub fn apply_marker(marker: ConfirmationMarker) -> ConfirmationState {
    match marker {
        ConfirmationMarker::Creditor => ConfirmationState::FromConfirmed,
        ConfirmationMarker::Debtor => ConfirmationState::ToConfirmed,
    }
}

/// Decide the transition for an update event, if any.
pub fn transition(
    current: ConfirmationState,
    field_paths: &[String],
    fields: &ConfirmationFields,
) -> Option<ConfirmationTransition> {
    detect_marker(field_paths, fields).map(|marker| ConfirmationTransition {
        marker,
        previous: current,
        next: apply_marker(marker),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_creditor_marker() {
        let fields = ConfirmationFields::default();
        let t = transition(ConfirmationState::Pending, &paths(&["confirmedFrom"]), &fields).unwrap();

        assert_eq!(t.marker, ConfirmationMarker::Creditor);
        assert_eq!(t.next, ConfirmationState::FromConfirmed);
        assert_eq!(t.next.flags(), (true, true));
    }

    #[test]
    fn test_debtor_marker() {
        let fields = ConfirmationFields::default();
        let t = transition(ConfirmationState::Pending, &paths(&["confirmedTo"]), &fields).unwrap();

        assert_eq!(t.marker, ConfirmationMarker::Debtor);
        assert_eq!(t.next.flags(), (false, true));
    }

    #[test]
    fn test_creditor_takes_precedence() {
        let fields = ConfirmationFields::default();
        let marker = detect_marker(&paths(&["confirmedTo", "confirmedFrom"]), &fields);
        assert_eq!(marker, Some(ConfirmationMarker::Creditor));
    }

    #[test]
    fn test_unrelated_fields_are_noop() {
        let fields = ConfirmationFields::default();
        assert!(transition(ConfirmationState::Pending, &paths(&["desc", "date"]), &fields).is_none());
        assert!(transition(ConfirmationState::Pending, &[], &fields).is_none());
    }

    #[test]
    fn test_debtor_marker_after_creditor_confirmation() {
        let fields = ConfirmationFields::default();
        let t = transition(ConfirmationState::FromConfirmed, &paths(&["confirmedTo"]), &fields)
            .unwrap();
        assert_eq!(t.next, ConfirmationState::ToConfirmed);
        assert!(!t.is_noop());
    }

    #[test]
    fn test_reapplying_is_noop() {
        let fields = ConfirmationFields::default();
        let first = transition(ConfirmationState::Pending, &paths(&["confirmedFrom"]), &fields)
            .unwrap();
        let second = transition(first.next, &paths(&["confirmedFrom"]), &fields).unwrap();

        assert_eq!(second.next, first.next);
        assert!(second.is_noop());
    }

    #[test]
    fn test_custom_marker_names() {
        let fields = ConfirmationFields {
            creditor: "creditorOk".to_string(),
            debtor: "debtorOk".to_string(),
        };
        assert_eq!(
            detect_marker(&paths(&["debtorOk"]), &fields),
            Some(ConfirmationMarker::Debtor)
        );
        assert_eq!(detect_marker(&paths(&["confirmedTo"]), &fields), None);
    }
}
