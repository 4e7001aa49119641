//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use parkscan_core::{Coupon, ScannedPayload};
use parkscan_coupon::{CouponResult, CouponService};

use crate::camera::{Camera, Frame, FrameDecoder};
use crate::error::{CaptureError, CaptureResult};
use crate::presenter::ScanPresenter;
use crate::protocol::{DecodeAction, DecodedBarcode, ScanResult};

// === camera ===

/// Hands out queued frames, then reports capture errors.
pub(crate) struct FakeCamera {
    frames: Mutex<VecDeque<Frame>>,
    pub stopped: AtomicUsize,
}

impl FakeCamera {
    pub fn with_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        FakeCamera {
            frames: Mutex::new(frames.into_iter().collect()),
            stopped: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::with_frames(Vec::new())
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn start_preview(&self) -> CaptureResult<()> {
        Ok(())
    }

    async fn stop_preview(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }

    async fn capture_frame(&self) -> CaptureResult<Frame> {
        let next = self.frames.lock().unwrap().pop_front();
        match next {
            Some(frame) => Ok(frame),
            None => {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Err(CaptureError::Camera("no frame".into()))
            }
        }
    }
}

/// Never delivers a frame.
pub(crate) struct StuckCamera;

#[async_trait]
impl Camera for StuckCamera {
    async fn start_preview(&self) -> CaptureResult<()> {
        Ok(())
    }

    async fn stop_preview(&self) {}

    async fn capture_frame(&self) -> CaptureResult<Frame> {
        std::future::pending().await
    }
}

/// Treats non-empty UTF-8 frame bytes as a QR code.
pub(crate) struct Utf8Decoder;

impl FrameDecoder for Utf8Decoder {
    fn decode(&self, frame: &Frame) -> Option<DecodedBarcode> {
        let text = std::str::from_utf8(&frame.data).ok()?;
        (!text.is_empty()).then(|| DecodedBarcode::new(text, "QR_CODE"))
    }
}

// === coupon service ===

pub(crate) struct FakeCoupons {
    inspect: CouponResult<Coupon>,
    redeem: CouponResult<Coupon>,
    stall_redeem: bool,
    pub inspected: AtomicUsize,
    pub redeemed: AtomicUsize,
}

impl FakeCoupons {
    pub fn new(inspect: CouponResult<Coupon>, redeem: CouponResult<Coupon>) -> Self {
        FakeCoupons {
            inspect,
            redeem,
            stall_redeem: false,
            inspected: AtomicUsize::new(0),
            redeemed: AtomicUsize::new(0),
        }
    }

    /// Redeem requests never answer.
    pub fn stalling_redeem(mut self) -> Self {
        self.stall_redeem = true;
        self
    }
}

#[async_trait]
impl CouponService for FakeCoupons {
    async fn inspect(&self, _raw: &str) -> CouponResult<Coupon> {
        self.inspected.fetch_add(1, Ordering::SeqCst);
        self.inspect.clone()
    }

    async fn redeem(&self, _raw: &str) -> CouponResult<Coupon> {
        self.redeemed.fetch_add(1, Ordering::SeqCst);
        if self.stall_redeem {
            std::future::pending::<()>().await;
        }
        self.redeem.clone()
    }
}

pub(crate) fn sample_coupon(check: bool) -> Coupon {
    Coupon {
        parkinglot_coupon_name: "2h free parking".into(),
        check,
        used_at: Some("2015-03-7T14:05:00".into()),
        origin_price: 10.0,
        ..Default::default()
    }
}

// === presenter ===

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shown {
    Viewfinder,
    Decoded(String),
    Status(String),
    Dialog(String),
    Coupon(String),
    Redeemed(String),
    Notice(String),
    Finished(ScanResult),
}

/// Records everything it is asked to show.
pub(crate) struct RecordingPresenter {
    shown: Mutex<Vec<Shown>>,
    tx: mpsc::UnboundedSender<Shown>,
    open_links: bool,
}

impl RecordingPresenter {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Shown>) {
        Self::build(false)
    }

    /// Sends plain http(s) links to an external view instead of submitting them.
    pub fn opening_links() -> (Arc<Self>, mpsc::UnboundedReceiver<Shown>) {
        Self::build(true)
    }

    fn build(open_links: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<Shown>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let presenter = RecordingPresenter {
            shown: Mutex::new(Vec::new()),
            tx,
            open_links,
        };
        (Arc::new(presenter), rx)
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    fn record(&self, item: Shown) {
        self.shown.lock().unwrap().push(item.clone());
        let _ = self.tx.send(item);
    }
}

impl ScanPresenter for RecordingPresenter {
    fn draw_viewfinder(&self) {
        self.record(Shown::Viewfinder);
    }

    fn on_decode(&self, barcode: &DecodedBarcode) -> DecodeAction {
        self.record(Shown::Decoded(barcode.text.clone()));
        let is_link = barcode.text.starts_with("http") && !ScannedPayload::has_marker(&barcode.text);
        if self.open_links && is_link {
            DecodeAction::LaunchExternal(barcode.text.clone())
        } else {
            DecodeAction::Submit(ScanResult::from(barcode))
        }
    }

    fn set_status(&self, text: &str) {
        self.record(Shown::Status(text.to_string()));
    }

    fn show_dialog(&self, message: &str) {
        self.record(Shown::Dialog(message.to_string()));
    }

    fn show_coupon(&self, coupon: &Coupon) {
        self.record(Shown::Coupon(coupon.name().to_string()));
    }

    fn coupon_redeemed(&self, coupon: &Coupon, _used_at: Option<NaiveDateTime>) {
        self.record(Shown::Redeemed(coupon.name().to_string()));
    }

    fn notify(&self, message: &str) {
        self.record(Shown::Notice(message.to_string()));
    }

    fn finish(&self, result: &ScanResult) {
        self.record(Shown::Finished(result.clone()));
    }
}
