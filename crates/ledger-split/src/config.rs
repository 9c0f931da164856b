//! Configuration for the ledger workflow

use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Collection holding individual monetary requests
    pub monetary_collection: String,
    /// Collection holding group requests awaiting division
    pub group_collection: String,
    /// Field names that mark a confirmation in an update event
    pub confirmation: ConfirmationFields,
    /// How per-recipient fan-out work is scheduled
    pub dispatch_mode: DispatchMode,
    /// Lost writes a division tolerates before asking for redelivery
    pub max_failed_writes: usize,
    /// Push notification presentation
    pub templates: TemplateConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            monetary_collection: "MonetaryRequests".to_string(),
            group_collection: "GroupRequests".to_string(),
            confirmation: ConfirmationFields::default(),
            dispatch_mode: DispatchMode::Sequential,
            max_failed_writes: 0,
            templates: TemplateConfig::default(),
        }
    }
}

/// Confirmation marker field names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationFields {
    /// Set when the creditor confirms settlement
    pub creditor: String,
    /// Set when the debtor confirms settlement
    pub debtor: String,
}

impl Default for ConfirmationFields {
    fn default() -> Self {
        Self {
            creditor: "confirmedFrom".to_string(),
            debtor: "confirmedTo".to_string(),
        }
    }
}

/// Scheduling of per-recipient fan-out work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One recipient after another, in `tos` order
    Sequential,
    /// All recipients at once, one independent task each
    Concurrent,
}

impl std::str::FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(format!("unknown dispatch mode '{}'", other)),
        }
    }
}

/// Push notification presentation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Android package allowed to receive the message
    pub android_package: String,
    /// Notification accent colour
    pub color: String,
    /// Android delivery priority
    pub priority: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            android_package: "com.giveme.pei.givemeapp".to_string(),
            color: "#161119".to_string(),
            priority: "normal".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.monetary_collection, "MonetaryRequests");
        assert_eq!(config.group_collection, "GroupRequests");
        assert_eq!(config.confirmation.creditor, "confirmedFrom");
        assert_eq!(config.dispatch_mode, DispatchMode::Sequential);
        assert_eq!(config.max_failed_writes, 0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LedgerConfig =
            serde_json::from_str(r#"{"dispatch_mode": "concurrent", "max_failed_writes": 2}"#)
                .unwrap();
        assert_eq!(config.dispatch_mode, DispatchMode::Concurrent);
        assert_eq!(config.max_failed_writes, 2);
        assert_eq!(config.templates.color, "#161119");
    }

    #[test]
    fn test_dispatch_mode_from_str() {
        assert_eq!("Concurrent".parse::<DispatchMode>(), Ok(DispatchMode::Concurrent));
        assert!("parallel".parse::<DispatchMode>().is_err());
    }
}
