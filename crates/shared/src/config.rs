//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Default closing settings applied when an outlet has no override.
    #[serde(default)]
    pub closing: ClosingConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Document store connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// JWT configuration for token verification.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for verifying tokens.
    pub secret: String,
}

/// Per-outlet closing period settings.
///
/// Injected into the closing calculator, never hard-coded.
#[derive(Debug, Clone, Deserialize)]
pub struct ClosingConfig {
    /// Expand the first closing to include all historical ledger data.
    #[serde(default)]
    pub include_historical_data_in_first_closing: bool,
    /// Hour (0-23) at which a business day ends; late-night sales before
    /// this hour are posted to the prior day.
    #[serde(default)]
    pub late_night_cutoff_hour: u32,
}

impl Default for ClosingConfig {
    fn default() -> Self {
        Self {
            include_historical_data_in_first_closing: false,
            late_night_cutoff_hour: 0,
        }
    }
}

impl ClosingConfig {
    /// Validates the cutoff hour is within 0-23.
    ///
    /// # Errors
    ///
    /// Returns a message describing the invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.late_night_cutoff_hour > 23 {
            return Err(format!(
                "late_night_cutoff_hour must be 0-23, got {}",
                self.late_night_cutoff_hour
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KASBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
