//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `config.toml`, then `AUTOREPLY__SECTION__KEY` environment variables.

mod admission;
mod cache;
mod sources;

use application::{AdmissionSettings, ApplicationError, KnowledgeBaseSettings, RangeSpec};
use serde::{Deserialize, Serialize};

pub use admission::{AdmissionAppConfig, PeriodConfig, SuspensionAppConfig};
pub use cache::{CacheConfig, RemoteCacheConfig};
pub use sources::{KnowledgeBaseAppConfig, SheetsConfig};

use crate::telemetry::TelemetryConfig;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "AUTOREPLY";

/// Separator between prefix, section and key in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Base name of the optional configuration file
const CONFIG_FILE: &str = "config";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Resource cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Spreadsheet tabs
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Knowledge base parsing
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseAppConfig,

    /// Admission filter
    #[serde(default)]
    pub admission: AdmissionAppConfig,

    /// Suspension calendar
    #[serde(default)]
    pub suspension: SuspensionAppConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(
            config::File::with_name(CONFIG_FILE).required(false),
            Self::environment(),
        )
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Environment source with the application prefix and separator
    #[must_use]
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }

    /// Load from an explicit file source overlaid by an environment source
    pub fn load_from<F>(
        file: F,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError>
    where
        F: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Knowledge base loader settings
    #[must_use]
    pub fn knowledge_base_settings(&self) -> KnowledgeBaseSettings {
        self.knowledge_base.settings(self.sheets.knowledge_base_range())
    }

    /// Range holding the replacement rules
    #[must_use]
    pub fn replacements_range(&self) -> RangeSpec {
        self.sheets.replacements_range()
    }

    /// Admission filter settings, validated
    pub fn admission_settings(&self) -> Result<AdmissionSettings, ApplicationError> {
        self.admission.settings(&self.suspension)
    }

    /// Validate every section that has constraints beyond its types
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.cache.ttl_secs == 0 {
            return Err(ApplicationError::Configuration(
                "cache.ttl_secs must be positive".to_string(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(ApplicationError::Configuration(
                "cache.max_entries must be positive".to_string(),
            ));
        }
        if self.cache.remote.enabled && self.cache.remote.key_prefix.is_empty() {
            return Err(ApplicationError::Configuration(
                "cache.remote.key_prefix must not be empty".to_string(),
            ));
        }
        self.admission_settings().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::environment().source(Some(source.into_iter().collect()))
    }

    fn empty_file() -> config::File<config::FileSourceString, config::FileFormat> {
        config::File::from_str("", config::FileFormat::Toml)
    }

    #[test]
    fn empty_sources_give_defaults() {
        let config = AppConfig::load_from(empty_file(), env(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [cache]
            ttl_secs = 600

            [cache.remote]
            enabled = true
            url = "redis://cache:6379"

            [sheets]
            spreadsheet_id = "abc123"

            [admission]
            monitored_account = "segreteria@parrocchia.it"
            system_paused = true
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.cache.max_entries, 10);
        assert!(config.cache.remote.enabled);
        assert_eq!(config.cache.remote.url, "redis://cache:6379");
        assert_eq!(config.sheets.spreadsheet_id, "abc123");
        assert_eq!(config.sheets.knowledge_base_sheet, "Istruzioni");
        assert!(config.admission.system_paused);
    }

    #[test]
    fn environment_overrides_file() {
        let file = config::File::from_str("[cache]\nttl_secs = 600\n", config::FileFormat::Toml);
        let config = AppConfig::load_from(
            file,
            env(&[
                ("AUTOREPLY__CACHE__TTL_SECS", "7200"),
                ("AUTOREPLY__ADMISSION__SYSTEM_PAUSED", "true"),
                ("AUTOREPLY__TELEMETRY__LOG_FILTER", "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(config.cache.ttl_secs, 7200);
        assert!(config.admission.system_paused);
        assert_eq!(config.telemetry.log_filter, "debug");
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config = AppConfig::load_from(empty_file(), env(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn conversions_use_sheet_names() {
        let config = AppConfig::from_toml_str(
            "[sheets]\nknowledge_base_sheet = \"Kb\"\nreplacements_sheet = \"Sub\"\n",
        )
        .unwrap();
        assert_eq!(config.knowledge_base_settings().range.to_string(), "Kb!A:C");
        assert_eq!(config.replacements_range().to_string(), "Sub!A:B");
    }

    #[test]
    fn suspension_windows_from_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [suspension]
            timezone = "UTC"
            holidays = []
            special_periods = [{ start = "07-01", end = "07-31" }]

            [suspension.windows]
            monday = [[9, 12], [14, 18]]
            "#,
        )
        .unwrap();

        let policy = config.admission_settings().unwrap().suspension;
        assert_eq!(policy.windows_for(chrono::Weekday::Mon).len(), 2);
        assert!(policy.windows_for(chrono::Weekday::Tue).is_empty());
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut config = AppConfig::default();
        config.cache.ttl_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ApplicationError::Configuration(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_remote_prefix() {
        let mut config = AppConfig::default();
        config.cache.remote.key_prefix = String::new();
        assert!(config.validate().is_ok());

        config.cache.remote.enabled = true;
        assert!(matches!(
            config.validate(),
            Err(ApplicationError::Configuration(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_timezone() {
        let mut config = AppConfig::default();
        config.suspension.timezone = "Nowhere/Town".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
