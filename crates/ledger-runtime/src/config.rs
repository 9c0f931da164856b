//! Runtime configuration, loaded from the environment.
//!
//! | Variable                   | Effect                                   |
//! |----------------------------|------------------------------------------|
//! | `LEDGER_DISPATCH_MODE`     | `sequential` or `concurrent` fan-out     |
//! | `LEDGER_MAX_FAILED_WRITES` | lost division writes before redelivery   |
//! | `LEDGER_DEADLINE_MS`       | per-event deadline in milliseconds       |
//! | `LEDGER_PROFILES_FILE`     | JSON array of profiles to seed the store |
//!
//! Unparseable values are logged and ignored.

use anyhow::{Context, Result};
use ledger_split::{DispatchMode, LedgerConfig, Profile};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Configuration of the replay runtime.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    /// Configuration handed to the ledger service.
    pub ledger: LedgerConfig,
    /// Deadline applied to every event.
    pub deadline: Option<Duration>,
    /// Profiles to seed the in-memory store with.
    pub profiles_file: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(mode) = lookup("LEDGER_DISPATCH_MODE") {
            match mode.parse::<DispatchMode>() {
                Ok(mode) => config.ledger.dispatch_mode = mode,
                Err(e) => warn!("Ignoring LEDGER_DISPATCH_MODE: {}", e),
            }
        }

        if let Some(max) = lookup("LEDGER_MAX_FAILED_WRITES") {
            match max.parse() {
                Ok(max) => config.ledger.max_failed_writes = max,
                Err(e) => warn!("Ignoring LEDGER_MAX_FAILED_WRITES '{}': {}", max, e),
            }
        }

        if let Some(ms) = lookup("LEDGER_DEADLINE_MS") {
            match ms.parse::<u64>() {
                Ok(0) => warn!("Ignoring LEDGER_DEADLINE_MS: must be positive"),
                Ok(ms) => config.deadline = Some(Duration::from_millis(ms)),
                Err(e) => warn!("Ignoring LEDGER_DEADLINE_MS '{}': {}", ms, e),
            }
        }

        if let Some(path) = lookup("LEDGER_PROFILES_FILE") {
            config.profiles_file = Some(PathBuf::from(path));
        }

        config
    }

    /// Profiles listed in `profiles_file`, or none.
    pub fn load_profiles(&self) -> Result<Vec<Profile>> {
        match &self.profiles_file {
            Some(path) => load_profiles(path),
            None => Ok(Vec::new()),
        }
    }
}

/// Read a JSON array of profiles.
pub fn load_profiles(path: &Path) -> Result<Vec<Profile>> {
    let raw = std::fs::read(path)
        .with_context(|| format!("reading profiles from {}", path.display()))?;
    let profiles: Vec<Profile> = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing profiles in {}", path.display()))?;
    info!("Loaded {} profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config.ledger.dispatch_mode, DispatchMode::Sequential);
        assert_eq!(config.ledger.max_failed_writes, 0);
        assert!(config.deadline.is_none());
        assert!(config.profiles_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("LEDGER_DISPATCH_MODE", "concurrent"),
            ("LEDGER_MAX_FAILED_WRITES", "2"),
            ("LEDGER_DEADLINE_MS", "1500"),
            ("LEDGER_PROFILES_FILE", "/tmp/profiles.json"),
        ]));
        assert_eq!(config.ledger.dispatch_mode, DispatchMode::Concurrent);
        assert_eq!(config.ledger.max_failed_writes, 2);
        assert_eq!(config.deadline, Some(Duration::from_millis(1500)));
        assert_eq!(config.profiles_file, Some(PathBuf::from("/tmp/profiles.json")));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("LEDGER_DISPATCH_MODE", "parallel"),
            ("LEDGER_MAX_FAILED_WRITES", "-1"),
            ("LEDGER_DEADLINE_MS", "0"),
        ]));
        assert_eq!(config.ledger.dispatch_mode, DispatchMode::Sequential);
        assert_eq!(config.ledger.max_failed_writes, 0);
        assert!(config.deadline.is_none());
    }

    #[test]
    fn test_load_profiles_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "uid-a", "phone": "+351910000001", "token": "tok-a", "name": "Ana"}}]"#
        )
        .unwrap();

        let profiles = load_profiles(file.path()).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].push_token, "tok-a");
    }

    #[test]
    fn test_missing_profiles_file_is_an_error() {
        let config = RuntimeConfig {
            profiles_file: Some(PathBuf::from("/nonexistent/profiles.json")),
            ..RuntimeConfig::default()
        };
        let err = config.load_profiles().unwrap_err();
        assert!(err.to_string().contains("reading profiles"));
    }
}
