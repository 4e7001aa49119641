//! # parkscan-capture: Capture Coordinator for the Scanning Station
//!
//! Drives the camera, the barcode decoder and the coupon flow from a single
//! task that owns all scan state.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Capture Coordinator Architecture                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 CaptureCoordinator (single task)                 │  │
//! │  │                                                                  │  │
//! │  │  Spawned as a Tokio task by the station binary                   │  │
//! │  │  Handles CaptureMessage one at a time, no locks                  │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  DecodeWorker  │  │ CouponService  │  │  ScanPresenter         │    │
//! │  │                │  │                │  │  UrlLauncher           │    │
//! │  │ Camera frame + │  │ inspect/redeem │  │                        │    │
//! │  │ FrameDecoder   │  │ in spawned     │  │ Status line, dialogs,  │    │
//! │  │ on blocking    │  │ tasks          │  │ external viewers       │    │
//! │  │ pool           │  │                │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  OBSERVERS:                                                            │
//! │  • CaptureHandle::subscribe() - watch channel of ScanState             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`coordinator`] - `CaptureCoordinator`, its builder and `CaptureHandle`
//! - [`decode`] - Decode worker task
//! - [`camera`] - `Camera` and `FrameDecoder` seams
//! - [`presenter`] - `ScanPresenter` seam
//! - [`launcher`] - `UrlLauncher` seam for external views
//! - [`protocol`] - Message types handled by the coordinator
//! - [`config`] - Scanner configuration (TOML + env)
//! - [`error`] - Capture error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parkscan_capture::{CaptureCoordinator, ScannerConfig};
//!
//! let config = ScannerConfig::load(None)?;
//! let builder = CaptureCoordinator::builder(config.capture.clone());
//! let handle = builder.handle();
//!
//! let coordinator = builder
//!     .with_camera(camera)
//!     .with_decoder(decoder)
//!     .with_coupons(coupons)
//!     .with_presenter(presenter)
//!     .build()?;
//! let task = tokio::spawn(coordinator.run());
//!
//! // Later
//! let report = handle.shutdown().await?;
//! println!("Worker stopped: {}", report.worker_stopped);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod camera;
pub mod config;
pub mod coordinator;
pub mod decode;
pub mod error;
pub mod launcher;
pub mod presenter;
pub mod protocol;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use camera::{Camera, Frame, FrameDecoder};
pub use config::{CaptureSettings, ScannerConfig};
pub use coordinator::{CaptureCoordinator, CaptureCoordinatorBuilder, CaptureHandle, ShutdownReport};
pub use error::{CaptureError, CaptureResult};
pub use launcher::{NoViewerLauncher, UrlLauncher};
pub use presenter::{NoOpPresenter, ScanPresenter};
pub use protocol::{CaptureMessage, DecodeAction, DecodedBarcode, ScanResult};
