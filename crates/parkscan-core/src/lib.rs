//! # parkscan-core: Pure Domain Logic for the Scanning Station
//!
//! This crate holds everything about a coupon scan that can be decided
//! without touching a camera or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        parkscan Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/station (console front end)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         parkscan-capture (coordinator + decode worker)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               parkscan-coupon (REST client)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ parkscan-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │  payload  │  │  coupon   │  │   state   │  │   text    │   │   │
//! │  │   │  marker   │  │  Coupon   │  │ ScanState │  │  user     │   │   │
//! │  │   │  id/code  │  │  used_at  │  │  Purpose  │  │  messages │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CAMERA • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`payload`] - Scanned payload parsing (marker token, id/code split)
//! - [`coupon`] - Coupon model as returned by the parking API
//! - [`state`] - Scan state machine states and scan policies
//! - [`text`] - User-facing status and failure messages
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use parkscan_core::payload::ScannedPayload;
//!
//! let payload = ScannedPayload::parse(
//!     "https://m.example.com/c?parkinglotcouponuser=42__X9KQ",
//! ).unwrap();
//!
//! assert_eq!(payload.id(), "42");
//! assert_eq!(payload.code(), "X9KQ");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coupon;
pub mod error;
pub mod payload;
pub mod state;
pub mod text;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use coupon::Coupon;
pub use error::{CoreError, PayloadError};
pub use payload::ScannedPayload;
pub use state::{DuplicatePolicy, ScanPurpose, ScanState};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Literal substring that locates redemption parameters in a scanned URL.
pub const MARKER_TOKEN: &str = "parkinglotcouponuser=";

/// Separator between the coupon-user id and the redemption code.
pub const SEGMENT_DELIMITER: &str = "__";

/// Format of the `used_at` field sent by the parking API.
///
/// The day of month is not always zero-padded; chrono's `%d` accepts both.
pub const USED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
