//! # parkscan-coupon: Coupon REST Client
//!
//! Looks up and redeems parking coupons encoded in scanned QR payloads.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Coupon Request Flow                               │
//! │                                                                         │
//! │  scanned text                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ScannedPayload::parse ──── malformed ───► CouponError::MalformedPayload│
//! │       │                                    (no network call)            │
//! │       ▼                                                                 │
//! │  POST {host}/parking/parkinglotcouponusers/{id}                         │
//! │           /parkinglot/{location}/code/{code}/check[?no_use=1]           │
//! │       │                                                                 │
//! │       ├── 2xx + JSON ──────────────────────► Coupon                     │
//! │       ├── connect / timeout ───────────────► NetworkUnreachable         │
//! │       ├── non-2xx ─────────────────────────► Http { status }            │
//! │       └── undecodable body ────────────────► Unexpected                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`client`] - `CouponClient` and the `CouponService` seam
//! - [`config`] - Host and parking-lot configuration
//! - [`error`] - Failure taxonomy and user-facing mapping
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parkscan_coupon::{CouponClient, CouponClientConfig};
//!
//! let client = CouponClient::new(CouponClientConfig {
//!     host: "https://api.example.com".into(),
//!     parkinglot: "lot-001".into(),
//!     ..Default::default()
//! })?;
//!
//! match client.inspect(scanned_text).await {
//!     Ok(coupon) => println!("{}", coupon.name()),
//!     Err(e) => println!("{}", e.user_message()),
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{CouponClient, CouponService};
pub use config::CouponClientConfig;
pub use error::{CouponError, CouponResult};
