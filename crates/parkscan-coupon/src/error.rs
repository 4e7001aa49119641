//! # Coupon Error Types
//!
//! Error types for coupon requests.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PayloadError (parkscan-core)      reqwest::Error                      │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  CouponError (this module) ← Categorized by transport outcome          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  user_message() ← Text shown by the presenter                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use parkscan_core::{text, PayloadError};
use thiserror::Error;

/// Coupon request errors.
///
/// None of these are fatal; every variant maps to a transient message and
/// the capture loop resumes.
#[derive(Debug, Clone, Error)]
pub enum CouponError {
    /// Scanned payload rejected locally.
    ///
    /// ## When This Occurs
    /// - Marker token missing
    /// - Wrong number of id/code segments
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),

    /// Server could not be reached.
    ///
    /// ## When This Occurs
    /// - DNS failure, connection refused
    /// - Connect or request timeout
    /// - Connection dropped mid-request
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// Server answered with a non-success status.
    #[error("HTTP error ({status})")]
    Http { status: u16 },

    /// Anything else (undecodable body, client build failure).
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// Client configuration is unusable.
    #[error("Invalid coupon client configuration: {0}")]
    InvalidConfig(String),
}

impl CouponError {
    /// Message shown to the operator.
    ///
    /// ## Mapping
    /// ```text
    /// MalformedPayload      → "this code cannot be used"
    /// NetworkUnreachable    → "check network connection"
    /// Http { 404 }          → "coupon not valid for this location"
    /// Http { status }       → "error: {status}"
    /// Unexpected(detail)    → "unknown error: {detail}"
    /// InvalidConfig         → "failed to fetch coupon"
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            CouponError::MalformedPayload(_) => text::MALFORMED_PAYLOAD.to_string(),
            CouponError::NetworkUnreachable(_) => text::NETWORK_UNREACHABLE.to_string(),
            CouponError::Http { status: 404 } => text::COUPON_NOT_FOR_LOCATION.to_string(),
            CouponError::Http { status } => text::http_status(*status),
            CouponError::Unexpected(detail) => text::unknown_error(detail),
            CouponError::InvalidConfig(_) => text::COUPON_FETCH_FAILED.to_string(),
        }
    }
}

/// Convert reqwest errors to CouponError.
///
/// ## Error Mapping
/// ```text
/// connect / timeout / request I/O → NetworkUnreachable
/// status (error_for_status)       → Http { status }
/// builder                         → InvalidConfig
/// decode / other                  → Unexpected
/// ```
impl From<reqwest::Error> for CouponError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            CouponError::Http {
                status: status.as_u16(),
            }
        } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            CouponError::NetworkUnreachable(err.to_string())
        } else if err.is_builder() {
            CouponError::InvalidConfig(err.to_string())
        } else {
            CouponError::Unexpected(err.to_string())
        }
    }
}

impl From<url::ParseError> for CouponError {
    fn from(err: url::ParseError) -> Self {
        CouponError::InvalidConfig(err.to_string())
    }
}

/// Result type for coupon operations.
pub type CouponResult<T> = Result<T, CouponError>;
