//! # Scanner Configuration
//!
//! Configuration management for the scanning station.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PARKSCAN_HOST=https://api.example.com                              │
//! │     PARKSCAN_PARKINGLOT=lot-001                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/station/scanner.toml (Linux)                             │
//! │     ~/Library/Application Support/com.parkscan.station/scanner.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     redeem purpose, reprocess duplicates, 500 ms shutdown join         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scanner.toml
//! [coupon]
//! host = "https://api.example.com"
//! parkinglot = "lot-001"
//! connect_timeout_secs = 5
//! request_timeout_secs = 15
//!
//! [capture]
//! purpose = "redeem"              # decode | redeem | preview
//! duplicate_policy = "reprocess"  # reprocess | debounce
//! shutdown_timeout_ms = 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use parkscan_core::{DuplicatePolicy, ScanPurpose};
use parkscan_coupon::CouponClientConfig;

use crate::error::{CaptureError, CaptureResult};

/// File name of the scanner config inside the project config dir.
pub const CONFIG_FILE_NAME: &str = "scanner.toml";

// =============================================================================
// Capture Settings
// =============================================================================

/// Capture loop behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// What a successful scan is used for.
    #[serde(default)]
    pub purpose: ScanPurpose,

    /// Whether an identical consecutive payload is handled again.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// How long shutdown waits for the decode worker (milliseconds).
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_ms: u64,
}

fn default_shutdown_timeout() -> u64 {
    500
}

impl Default for CaptureSettings {
    fn default() -> Self {
        CaptureSettings {
            purpose: ScanPurpose::default(),
            duplicate_policy: DuplicatePolicy::default(),
            shutdown_timeout_ms: default_shutdown_timeout(),
        }
    }
}

impl CaptureSettings {
    /// Shutdown join timeout as a Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

// =============================================================================
// Main Scanner Configuration
// =============================================================================

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Coupon API settings.
    #[serde(default)]
    pub coupon: CouponClientConfig,

    /// Capture loop settings.
    #[serde(default)]
    pub capture: CaptureSettings,
}

impl ScannerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scanner.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CaptureResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scanner config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CaptureResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CaptureError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CaptureError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| CaptureError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Scanner config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// The coupon section is only checked when scans are redeemed.
    pub fn validate(&self) -> CaptureResult<()> {
        if self.capture.purpose == ScanPurpose::Redeem {
            self.coupon.validate()?;
        }

        if self.capture.shutdown_timeout_ms == 0 {
            return Err(CaptureError::InvalidConfig(
                "shutdown_timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PARKSCAN_HOST") {
            debug!(host = %host, "Overriding coupon host from environment");
            self.coupon.host = host;
        }

        if let Ok(lot) = std::env::var("PARKSCAN_PARKINGLOT") {
            debug!(parkinglot = %lot, "Overriding parking lot from environment");
            self.coupon.parkinglot = lot;
        }

        if let Ok(purpose) = std::env::var("PARKSCAN_PURPOSE") {
            match purpose.parse() {
                Ok(parsed) => self.capture.purpose = parsed,
                Err(e) => warn!(error = %e, "Ignoring PARKSCAN_PURPOSE"),
            }
        }

        if let Ok(policy) = std::env::var("PARKSCAN_DUPLICATE_POLICY") {
            match policy.parse() {
                Ok(parsed) => self.capture.duplicate_policy = parsed,
                Err(e) => warn!(error = %e, "Ignoring PARKSCAN_DUPLICATE_POLICY"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "parkscan", "station")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the scan purpose.
    pub fn purpose(&self) -> ScanPurpose {
        self.capture.purpose
    }

    /// Returns the parking lot identifier.
    pub fn parkinglot(&self) -> &str {
        &self.coupon.parkinglot
    }
}
