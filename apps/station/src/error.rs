//! Station error type.

use thiserror::Error;

use parkscan_capture::CaptureError;
use parkscan_coupon::CouponError;

pub type StationResult<T> = Result<T, StationError>;

/// Errors that stop the station.
#[derive(Debug, Error)]
pub enum StationError {
    /// Configuration or coordinator failure.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Coupon client could not be built.
    #[error("Coupon client: {0}")]
    Coupon(#[from] CouponError),

    /// The coordinator task panicked or was cancelled.
    #[error("Coordinator task failed: {0}")]
    Task(String),
}
