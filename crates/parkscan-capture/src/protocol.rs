//! # Capture Messages
//!
//! Message types exchanged between the decode worker, background coupon
//! requests, the presentation layer and the capture coordinator.
//!
//! ## Message Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Capture Message Flow                              │
//! │                                                                         │
//! │  DECODE WORKER                                                         │
//! │  ─────────────                                                         │
//! │  worker      ───► DecodeSucceeded { barcode }                          │
//! │  worker      ───► DecodeFailed                                         │
//! │                                                                         │
//! │  COORDINATOR (self-posted)                                             │
//! │  ─────────────────────────                                             │
//! │  coordinator ───► ScanResultReady { result }                           │
//! │  coordinator ───► LaunchExternalView { url }                           │
//! │                                                                         │
//! │  COUPON REQUESTS (spawned tasks)                                       │
//! │  ───────────────────────────────                                       │
//! │  inspect     ───► CouponInspected { cycle, outcome }                   │
//! │  redeem      ───► CouponRedeemed { cycle, outcome }                    │
//! │                                                                         │
//! │  PRESENTATION LAYER                                                    │
//! │  ──────────────────                                                    │
//! │  ui          ───► RestartPreview                                       │
//! │  ui          ───► ConfirmRedemption                                    │
//! │  ui          ───► DialogDismissed                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every message is handled on the coordinator task, one at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parkscan_core::Coupon;
use parkscan_coupon::CouponResult;

/// Identifier of one coupon request cycle (inspect, confirm, redeem).
pub type CycleId = Uuid;

// =============================================================================
// Decode Results
// =============================================================================

/// A barcode found in a camera frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedBarcode {
    /// Decoded text content.
    pub text: String,

    /// Symbology name, e.g. `QR_CODE`.
    pub format: String,

    /// When the frame was decoded.
    pub decoded_at: DateTime<Utc>,
}

impl DecodedBarcode {
    pub fn new(text: impl Into<String>, format: impl Into<String>) -> Self {
        DecodedBarcode {
            text: text.into(),
            format: format.into(),
            decoded_at: Utc::now(),
        }
    }
}

/// The result handed back to whoever asked for the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Decoded text content.
    pub text: String,

    /// Symbology name.
    pub format: String,
}

impl ScanResult {
    pub fn new(text: impl Into<String>, format: impl Into<String>) -> Self {
        ScanResult {
            text: text.into(),
            format: format.into(),
        }
    }
}

impl From<&DecodedBarcode> for ScanResult {
    fn from(barcode: &DecodedBarcode) -> Self {
        ScanResult::new(barcode.text.clone(), barcode.format.clone())
    }
}

/// What the presentation layer wants done with a decoded barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeAction {
    /// Deliver as a scan result.
    Submit(ScanResult),

    /// Open the URL in an external viewer.
    LaunchExternal(String),

    /// Drop it and keep scanning.
    Ignore,
}

// =============================================================================
// Main Message Enum
// =============================================================================

/// All messages the capture coordinator handles.
#[derive(Debug, Clone)]
pub enum CaptureMessage {
    // =========================================================================
    // Preview Control
    // =========================================================================
    /// Re-arm the preview and request a new frame.
    RestartPreview,

    // =========================================================================
    // Decode Worker Results
    // =========================================================================
    /// A frame contained a barcode.
    DecodeSucceeded(DecodedBarcode),

    /// A frame contained nothing decodable.
    DecodeFailed,

    // =========================================================================
    // Dispatch
    // =========================================================================
    /// A scan result is ready to be routed by purpose.
    ScanResultReady(ScanResult),

    /// Open a URL outside the scanner.
    LaunchExternalView(String),

    // =========================================================================
    // Coupon Request Completions
    // =========================================================================
    /// The non-consuming lookup finished.
    CouponInspected {
        cycle: CycleId,
        /// Raw scanned text, needed again for the redeem request.
        payload: String,
        outcome: CouponResult<Coupon>,
    },

    /// The consuming check finished.
    CouponRedeemed {
        cycle: CycleId,
        outcome: CouponResult<Coupon>,
    },

    // =========================================================================
    // User Responses
    // =========================================================================
    /// The user accepted the coupon confirmation.
    ConfirmRedemption,

    /// The user dismissed the visible dialog.
    DialogDismissed,
}

impl CaptureMessage {
    /// Returns the message type name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            CaptureMessage::RestartPreview => "RestartPreview",
            CaptureMessage::DecodeSucceeded(_) => "DecodeSucceeded",
            CaptureMessage::DecodeFailed => "DecodeFailed",
            CaptureMessage::ScanResultReady(_) => "ScanResultReady",
            CaptureMessage::LaunchExternalView(_) => "LaunchExternalView",
            CaptureMessage::CouponInspected { .. } => "CouponInspected",
            CaptureMessage::CouponRedeemed { .. } => "CouponRedeemed",
            CaptureMessage::ConfirmRedemption => "ConfirmRedemption",
            CaptureMessage::DialogDismissed => "DialogDismissed",
        }
    }

    /// Returns true for messages produced by the decode worker.
    pub fn is_decode_result(&self) -> bool {
        matches!(
            self,
            CaptureMessage::DecodeSucceeded(_) | CaptureMessage::DecodeFailed
        )
    }
}
