//! # Notification Templates
//!
//! Builds push-notification payloads for ledger events. Formatting only;
//! delivery goes through the [`Notifier`](crate::ports::Notifier) port.

use crate::config::TemplateConfig;
use crate::domain::{ConfirmationMarker, MonetaryRequest};
use serde::{Deserialize, Serialize};

/// Message kind selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    /// Debtor was tagged in a new request.
    Request,
    /// Debtor refused a request.
    Refusal,
    /// Debtor accepted a request.
    Acceptance,
    /// Creditor reminds the debtor.
    Reminder,
    /// A payment was scheduled.
    Scheduled,
    /// Creditor confirmed the debt was settled.
    ConfirmedFrom,
    /// Debtor confirmed paying the debt.
    ConfirmedTo,
}

impl NotificationKind {
    /// Kind announcing a confirmation by `marker`'s side.
    pub fn for_marker(marker: ConfirmationMarker) -> Self {
        match marker {
            ConfirmationMarker::Creditor => Self::ConfirmedFrom,
            ConfirmationMarker::Debtor => Self::ConfirmedTo,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Request => "Debt Notification",
            Self::Refusal => "Debtor Refused Debt Payment Request",
            Self::Acceptance => "Debtor Accepted Debt Payment Request",
            Self::Reminder => "Debt Payment Reminder",
            Self::Scheduled => "Scheduled Debt Payment",
            Self::ConfirmedFrom => "Debt Payment Confirmed",
            Self::ConfirmedTo => "Debt Payment Sent",
        }
    }

    fn body(self, amount: &str, counterparty: &str) -> String {
        match self {
            Self::Request => format!("You were tagged to pay {} to {}", amount, counterparty),
            Self::Refusal => format!("{} refused the debt of {}", counterparty, amount),
            Self::Acceptance => format!("{} accepted the debt of {}", counterparty, amount),
            Self::Reminder => format!("{} wants to remind you to pay {}", counterparty, amount),
            Self::Scheduled => format!("A debt was scheduled of {}", amount),
            Self::ConfirmedFrom => {
                format!("{} confirmed receiving your payment of {}", counterparty, amount)
            }
            Self::ConfirmedTo => format!("{} confirmed paying the debt of {}", counterparty, amount),
        }
    }
}

/// Render `units.cents currency` with two cent digits.
pub fn format_amount(units: u64, cents: u32, currency: &str) -> String {
    format!("{}.{:02} {}", units, cents, currency)
}

/// A push notification ready for delivery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub kind: NotificationKind,
    /// Recipient device token.
    pub token: String,
    pub title: String,
    pub body: String,
    pub color: String,
    pub priority: String,
    pub restricted_package: String,
}

impl PushMessage {
    /// Build a message of `kind` for an explicit amount and counterparty.
    pub fn build(
        kind: NotificationKind,
        token: &str,
        units: u64,
        cents: u32,
        currency: &str,
        counterparty: &str,
        templates: &TemplateConfig,
    ) -> Self {
        let amount = format_amount(units, cents, currency);
        Self {
            kind,
            token: token.to_string(),
            title: kind.title().to_string(),
            body: kind.body(&amount, counterparty),
            color: templates.color.clone(),
            priority: templates.priority.clone(),
            restricted_package: templates.android_package.clone(),
        }
    }

    /// Build a message about `request`.
    ///
    /// The counterparty named in the body is the debtor for
    /// [`NotificationKind::ConfirmedTo`] and the creditor otherwise.
    pub fn for_request(
        kind: NotificationKind,
        token: &str,
        request: &MonetaryRequest,
        templates: &TemplateConfig,
    ) -> Self {
        let counterparty = match kind {
            NotificationKind::ConfirmedTo => &request.to,
            _ => &request.from,
        };
        Self::build(
            kind,
            token,
            request.amount_units,
            request.amount_cents,
            &request.currency,
            counterparty,
            templates,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn request() -> MonetaryRequest {
        MonetaryRequest {
            from: "+351910000001".to_string(),
            to: "+351910000002".to_string(),
            description: "lunch".to_string(),
            date: Utc.with_ymd_and_hms(2019, 2, 12, 12, 0, 0).unwrap(),
            amount_units: 5,
            amount_cents: 7,
            currency: "€".to_string(),
            confirmed_from: false,
            confirmed_to: false,
            record_id: None,
            group_id: -1,
            recurrent_id: -1,
        }
    }

    #[test]
    fn test_format_amount_pads_cents() {
        assert_eq!(format_amount(5, 7, "€"), "5.07 €");
        assert_eq!(format_amount(10, 52, "EUR"), "10.52 EUR");
    }

    #[test]
    fn test_request_message() {
        let msg = PushMessage::for_request(
            NotificationKind::Request,
            "token-b",
            &request(),
            &TemplateConfig::default(),
        );

        assert_eq!(msg.token, "token-b");
        assert_eq!(msg.title, "Debt Notification");
        assert_eq!(msg.body, "You were tagged to pay 5.07 € to +351910000001");
        assert_eq!(msg.color, "#161119");
        assert_eq!(msg.priority, "normal");
        assert_eq!(msg.restricted_package, "com.giveme.pei.givemeapp");
    }

    #[test]
    fn test_confirmation_messages_name_the_right_party() {
        let templates = TemplateConfig::default();
        let from = PushMessage::for_request(NotificationKind::ConfirmedFrom, "t", &request(), &templates);
        let to = PushMessage::for_request(NotificationKind::ConfirmedTo, "t", &request(), &templates);

        assert!(from.body.starts_with("+351910000001"));
        assert!(to.body.starts_with("+351910000002"));
    }

    #[test]
    fn test_every_kind_has_distinct_title() {
        let kinds = [
            NotificationKind::Request,
            NotificationKind::Refusal,
            NotificationKind::Acceptance,
            NotificationKind::Reminder,
            NotificationKind::Scheduled,
            NotificationKind::ConfirmedFrom,
            NotificationKind::ConfirmedTo,
        ];
        let titles: std::collections::HashSet<_> = kinds.iter().map(|k| k.title()).collect();
        assert_eq!(titles.len(), kinds.len());
    }

    #[test]
    fn test_scheduled_body_omits_counterparty() {
        let msg = PushMessage::build(
            NotificationKind::Scheduled,
            "t",
            3,
            50,
            "€",
            "ignored",
            &TemplateConfig::default(),
        );
        assert_eq!(msg.body, "A debt was scheduled of 3.50 €");
    }

    #[test]
    fn test_kind_for_marker() {
        assert_eq!(
            NotificationKind::for_marker(ConfirmationMarker::Creditor),
            NotificationKind::ConfirmedFrom
        );
        assert_eq!(
            NotificationKind::for_marker(ConfirmationMarker::Debtor),
            NotificationKind::ConfirmedTo
        );
    }
}
