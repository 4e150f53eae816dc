//! # Store Configuration
//!
//! Configuration management for the cart store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     GOCART_STORAGE_KEY=@gocart:cart-items                               │
//! │     GOCART_DB_PATH=/var/lib/gocart/cart.db                              │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/gocart/gocart.toml (Linux)                                │
//! │     ~/Library/Application Support/dev.gocart.gocart (macOS)             │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     storage key "@gocart:cart-items", platform data dir database        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # gocart.toml
//! [store]
//! storage_key = "@gocart:cart-items"
//!
//! [database]
//! path = "/var/lib/gocart/cart.db"  # optional; platform data dir when unset
//! max_connections = 5
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gocart_persist::SqliteBackend;

use crate::error::{ConfigError, ConfigResult};

/// Storage key every cart snapshot is filed under unless configured
/// otherwise.
///
/// The key is the whole identity of the snapshot slot: two stores sharing a
/// backend and a key share a cart across restarts, different keys never
/// touch each other.
pub const DEFAULT_STORAGE_KEY: &str = "@gocart:cart-items";

// =============================================================================
// Store Settings
// =============================================================================

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// Settings for the store itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Storage key the snapshot is filed under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            storage_key: default_storage_key(),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

fn default_max_connections() -> u32 {
    5
}

/// Settings for the SQLite backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the database file. Platform data directory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Main Store Configuration
// =============================================================================

/// Complete store configuration.
///
/// ## Example Config File
/// ```toml
/// [store]
/// storage_key = "@gocart:cart-items"
///
/// [database]
/// path = "/var/lib/gocart/cart.db"
/// max_connections = 5
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store behavior settings.
    #[serde(default)]
    pub store: StoreSettings,

    /// SQLite backend settings.
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl StoreConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config with a non-default storage key.
    ///
    /// ## Usage
    /// Multiple independent carts on one backend, e.g. one per account:
    /// ```rust
    /// use gocart_store::StoreConfig;
    ///
    /// let config = StoreConfig::with_storage_key("@gocart:cart-items:user-42");
    /// assert_eq!(config.storage_key(), "@gocart:cart-items:user-42");
    /// ```
    pub fn with_storage_key(key: impl Into<String>) -> Self {
        StoreConfig {
            store: StoreSettings {
                storage_key: key.into(),
            },
            ..Self::default()
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (gocart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load store config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Store config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.storage_key.is_empty() {
            return Err(ConfigError::Invalid(
                "storage_key must not be empty".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Storage key
        if let Ok(key) = std::env::var("GOCART_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.store.storage_key = key;
        }

        // Database path
        if let Ok(path) = std::env::var("GOCART_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        // Pool size
        if let Ok(max) = std::env::var("GOCART_DB_MAX_CONNECTIONS") {
            if let Ok(parsed) = max.parse::<u32>() {
                self.database.max_connections = parsed;
            } else {
                warn!(value = %max, "Ignoring non-numeric GOCART_DB_MAX_CONNECTIONS");
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "gocart", "gocart")
            .map(|dirs| dirs.config_dir().join("gocart.toml"))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The storage key snapshots are filed under.
    pub fn storage_key(&self) -> &str {
        &self.store.storage_key
    }

    /// The database path: configured, or the platform default.
    ///
    /// ## Returns
    /// `None` when no path is configured and no home directory exists.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        self.database
            .path
            .clone()
            .or_else(SqliteBackend::default_database_path)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();

        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
        assert_eq!(config.database.path, None);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_storage_key() {
        let config = StoreConfig::with_storage_key("@gocart:cart-items:guest");

        assert_eq!(config.storage_key(), "@gocart:cart-items:guest");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_parse_full_file() {
        let toml_str = r#"
            [store]
            storage_key = "@gocart:cart-items:kiosk-3"

            [database]
            path = "/tmp/kiosk3.db"
            max_connections = 2
        "#;

        let config: StoreConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.storage_key(), "@gocart:cart-items:kiosk-3");
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/kiosk3.db")));
        assert_eq!(config.database.max_connections, 2);
    }

    #[test]
    fn test_parse_partial_file_fills_defaults() {
        let toml_str = r#"
            [database]
            max_connections = 1
        "#;

        let config: StoreConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
        assert_eq!(config.database.max_connections, 1);
    }

    #[test]
    fn test_validate_rejects_empty_storage_key() {
        let config = StoreConfig::with_storage_key("");

        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        let mut config = StoreConfig::default();
        config.database.max_connections = 0;

        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");

        let config = StoreConfig::load(Some(path)).unwrap();

        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gocart.toml");
        std::fs::write(&path, "[store]\nstorage_key = \"@gocart:cart-items:a\"\n").unwrap();

        let config = StoreConfig::load(Some(path)).unwrap();

        assert_eq!(config.storage_key(), "@gocart:cart-items:a");
    }

    #[test]
    fn test_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gocart.toml");

        let config = StoreConfig::with_storage_key("@gocart:cart-items:saved");
        config.save(Some(path.clone())).unwrap();

        let reloaded = StoreConfig::load(Some(path)).unwrap();
        assert_eq!(reloaded.storage_key(), "@gocart:cart-items:saved");
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gocart.toml");
        std::fs::write(&path, "[store\nstorage_key=").unwrap();

        assert!(matches!(
            StoreConfig::load(Some(path)).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
