//! # Error Types
//!
//! Domain-specific error types for parkscan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  parkscan-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── PayloadError     - Scanned payload rejected before any request    │
//! │                                                                         │
//! │  parkscan-coupon errors (separate crate)                               │
//! │  └── CouponError      - Transport / HTTP / decoding failures           │
//! │                                                                         │
//! │  parkscan-capture errors (separate crate)                              │
//! │  └── CaptureError     - Camera, launcher, config, channel failures     │
//! │                                                                         │
//! │  Flow: PayloadError → CouponError → user message on the presenter      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Scanned payload could not be interpreted.
    #[error("Malformed payload: {0}")]
    Payload(#[from] PayloadError),

    /// A textual enum value (purpose, policy) was not recognized.
    #[error("Unknown {kind}: '{value}'. Valid options: {allowed}")]
    UnknownVariant {
        kind: &'static str,
        value: String,
        allowed: &'static str,
    },
}

// =============================================================================
// Payload Error
// =============================================================================

/// Reasons a scanned payload is rejected.
///
/// ## When This Occurs
/// ```text
/// "https://…/c?parkinglotcouponuser=42__X9KQ"   → Ok (id=42, code=X9KQ)
/// "https://example.com"                          → MissingMarker
/// "…parkinglotcouponuser=42"                     → WrongSegmentCount { found: 1 }
/// "…parkinglotcouponuser=1__2__3"                → WrongSegmentCount { found: 3 }
/// "…parkinglotcouponuser=__X9KQ"                 → EmptySegment { field: "id" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The marker token does not appear in the payload.
    #[error("payload does not contain the coupon marker")]
    MissingMarker,

    /// The parameter section did not split into exactly two segments.
    #[error("expected 2 segments after the coupon marker, found {found}")]
    WrongSegmentCount { found: usize },

    /// One of the two segments is empty.
    #[error("{field} segment is empty")]
    EmptySegment { field: &'static str },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
