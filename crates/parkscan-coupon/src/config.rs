//! Coupon client configuration.
//!
//! Supplied once by the composing application; the client reads it at
//! construction and never again.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CouponError, CouponResult};

/// Host and parking-lot settings for the coupon API.
///
/// ## Config File Section
/// ```toml
/// [coupon]
/// host = "https://api.example.com"
/// parkinglot = "lot-001"
/// connect_timeout_secs = 5
/// request_timeout_secs = 15
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponClientConfig {
    /// Base URL of the parking API.
    #[serde(default = "default_host")]
    pub host: String,

    /// Identifier of the parking lot this station serves.
    #[serde(default)]
    pub parkinglot: String,

    /// TCP connect timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "http://localhost:8080".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for CouponClientConfig {
    fn default() -> Self {
        CouponClientConfig {
            host: default_host(),
            parkinglot: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl CouponClientConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> CouponResult<()> {
        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            return Err(CouponError::InvalidConfig(format!(
                "Host must start with http:// or https://, got: {}",
                self.host
            )));
        }

        if self.parkinglot.trim().is_empty() {
            return Err(CouponError::InvalidConfig(
                "parkinglot must not be empty".into(),
            ));
        }

        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(CouponError::InvalidConfig(
                "timeouts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Connect timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
