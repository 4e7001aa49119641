//! # Capture Error Types
//!
//! Error types for the capture coordinator and its collaborators.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Capture Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Collaborators │  │     Runtime             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Camera         │  │  ChannelError           │ │
//! │  │  ConfigLoad     │  │  ActivityNot    │  │  ShuttingDown           │ │
//! │  │  ConfigSave     │  │    Found        │  │                         │ │
//! │  │                 │  │  InvalidUrl     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Coupon failures stay CouponError and travel inside messages.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Capture error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid scanner configuration.
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// Camera could not start or deliver a frame.
    #[error("Camera error: {0}")]
    Camera(String),

    /// No application can display the URL.
    #[error("No viewer available for {0}")]
    ActivityNotFound(String),

    /// Decoded text is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Runtime Errors
    // =========================================================================
    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Coordinator is shutting down.
    #[error("Capture coordinator is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for CaptureError {
    fn from(err: url::ParseError) -> Self {
        CaptureError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CaptureError {
    fn from(err: toml::de::Error) -> Self {
        CaptureError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CaptureError {
    fn from(err: toml::ser::Error) -> Self {
        CaptureError::ConfigSaveFailed(err.to_string())
    }
}

impl From<parkscan_coupon::CouponError> for CaptureError {
    fn from(err: parkscan_coupon::CouponError) -> Self {
        CaptureError::InvalidConfig(err.to_string())
    }
}

impl From<parkscan_core::CoreError> for CaptureError {
    fn from(err: parkscan_core::CoreError) -> Self {
        CaptureError::InvalidConfig(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CaptureError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CaptureError::InvalidConfig(_)
                | CaptureError::ConfigLoadFailed(_)
                | CaptureError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the scan loop keeps running after this error.
    ///
    /// ## Recoverable
    /// - A frame that could not be captured (next frame is requested)
    /// - A URL nobody can open (logged and ignored)
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            CaptureError::Camera(_) | CaptureError::ActivityNotFound(_) | CaptureError::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(CaptureError::InvalidConfig("x".into()).is_config_error());
        assert!(!CaptureError::Camera("x".into()).is_config_error());

        assert!(CaptureError::ActivityNotFound("https://a".into()).is_user_recoverable());
        assert!(!CaptureError::ShuttingDown.is_user_recoverable());
    }

    #[test]
    fn test_url_error_conversion() {
        let err: CaptureError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, CaptureError::InvalidUrl(_)));
    }
}
