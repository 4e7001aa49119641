//! # Presentation Seam
//!
//! Everything the coordinator shows to the operator goes through
//! [`ScanPresenter`]. Answers to dialogs come back as messages through
//! [`CaptureHandle`](crate::CaptureHandle), never as return values, so the
//! coordinator task is not blocked while a dialog is open.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  coordinator ── show_coupon(c) ──►  presenter                          │
//! │                                        │                               │
//! │                                        │ operator decides              │
//! │                                        ▼                               │
//! │  coordinator ◄── ConfirmRedemption ── handle.confirm_redemption()      │
//! │  coordinator ◄── DialogDismissed ──── handle.dismiss_dialog()          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;

use parkscan_core::Coupon;

use crate::protocol::{DecodeAction, DecodedBarcode, ScanResult};

/// Operator-facing side of the scanner.
///
/// All methods are called on the coordinator task and must return quickly.
pub trait ScanPresenter: Send + Sync {
    /// Redraws the viewfinder overlay after the preview is re-armed.
    fn draw_viewfinder(&self);

    /// Decides what happens to a decoded barcode.
    fn on_decode(&self, barcode: &DecodedBarcode) -> DecodeAction {
        DecodeAction::Submit(ScanResult::from(barcode))
    }

    /// Replaces the status line.
    fn set_status(&self, text: &str);

    /// Shows a modal message. Dismissal is reported with `dismiss_dialog`.
    fn show_dialog(&self, message: &str);

    /// Asks the operator to confirm a coupon.
    fn show_coupon(&self, coupon: &Coupon);

    /// Shows a redeemed coupon and the time it was used.
    fn coupon_redeemed(&self, coupon: &Coupon, used_at: Option<NaiveDateTime>);

    /// Shows a short transient notice.
    fn notify(&self, message: &str);

    /// Delivers the scan result to the caller. The scanner stops afterwards.
    fn finish(&self, result: &ScanResult);
}

/// Presenter that shows nothing.
pub struct NoOpPresenter;

impl ScanPresenter for NoOpPresenter {
    fn draw_viewfinder(&self) {}
    fn set_status(&self, _text: &str) {}
    fn show_dialog(&self, _message: &str) {}
    fn show_coupon(&self, _coupon: &Coupon) {}
    fn coupon_redeemed(&self, _coupon: &Coupon, _used_at: Option<NaiveDateTime>) {}
    fn notify(&self, _message: &str) {}
    fn finish(&self, _result: &ScanResult) {}
}
