//! # Console Seams
//!
//! Terminal implementations of the capture collaborators.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin line ──► LineCamera ──► Frame ──► TextDecoder ──► barcode       │
//! │                                                                         │
//! │  ConsolePresenter ──► stdout (status, dialogs, coupons, results)       │
//! │                  └──► CaptureHandle (confirm / dismiss)                 │
//! │                                                                         │
//! │  CommandLauncher ──► $PARKSCAN_BROWSER <url>                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{watch, Mutex, Notify};
use tracing::{debug, info, warn};
use url::Url;

use parkscan_capture::{
    Camera, CaptureError, CaptureHandle, CaptureResult, DecodeAction, DecodedBarcode, Frame,
    FrameDecoder, ScanPresenter, ScanResult, UrlLauncher,
};
use parkscan_core::{Coupon, ScannedPayload};

/// Display format for coupon timestamps.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Camera
// =============================================================================

/// Camera whose frames are lines of text.
///
/// At end of input it signals `eof` and then blocks until the preview is
/// stopped.
pub struct LineCamera<R> {
    lines: Mutex<Lines<R>>,
    stopped: watch::Sender<bool>,
    eof: Arc<Notify>,
}

/// The station's camera: one frame per stdin line.
pub type StdinCamera = LineCamera<BufReader<Stdin>>;

impl<R: AsyncBufRead + Unpin> LineCamera<R> {
    pub fn new(reader: R, eof: Arc<Notify>) -> Self {
        let (stopped, _) = watch::channel(false);
        LineCamera {
            lines: Mutex::new(reader.lines()),
            stopped,
            eof,
        }
    }
}

impl StdinCamera {
    pub fn stdin(eof: Arc<Notify>) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), eof)
    }
}

#[async_trait]
impl<R> Camera for LineCamera<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn start_preview(&self) -> CaptureResult<()> {
        self.stopped.send_replace(false);
        info!("Reading frames from stdin, one per line");
        Ok(())
    }

    async fn stop_preview(&self) {
        self.stopped.send_replace(true);
    }

    async fn capture_frame(&self) -> CaptureResult<Frame> {
        let mut stopped = self.stopped.subscribe();
        let mut lines = self.lines.lock().await;

        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => Ok(Frame::from_bytes(line.trim_end())),
                Ok(None) => {
                    debug!("End of input");
                    self.eof.notify_one();
                    let _ = stopped.wait_for(|s| *s).await.map(|_| ());
                    Err(CaptureError::Camera("end of input".into()))
                }
                Err(e) => Err(CaptureError::Camera(e.to_string())),
            },
            // The watch guard is not Send, so drop it inside the branch
            _ = async { let _ = stopped.wait_for(|s| *s).await.map(|_| ()); } => {
                Err(CaptureError::Camera("preview stopped".into()))
            }
        }
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Reads the frame bytes as the barcode text.
pub struct TextDecoder;

impl FrameDecoder for TextDecoder {
    fn decode(&self, frame: &Frame) -> Option<DecodedBarcode> {
        let text = std::str::from_utf8(&frame.data).ok()?.trim();
        if text.is_empty() {
            return None;
        }
        Some(DecodedBarcode::new(text, "QR_CODE"))
    }
}

// =============================================================================
// Presenter
// =============================================================================

/// Prints to stdout and answers dialogs on the operator's behalf.
///
/// Coupons are confirmed when `auto_confirm` is set, otherwise declined.
pub struct ConsolePresenter {
    handle: CaptureHandle,
    auto_confirm: bool,
}

impl ConsolePresenter {
    pub fn new(handle: CaptureHandle, auto_confirm: bool) -> Self {
        ConsolePresenter {
            handle,
            auto_confirm,
        }
    }

    fn answer(&self, result: CaptureResult<()>) {
        if let Err(e) = result {
            debug!(error = %e, "Scanner no longer listening");
        }
    }
}

impl ScanPresenter for ConsolePresenter {
    fn draw_viewfinder(&self) {
        debug!("Viewfinder ready");
    }

    fn on_decode(&self, barcode: &DecodedBarcode) -> DecodeAction {
        route_decoded(barcode)
    }

    fn set_status(&self, text: &str) {
        println!("[{text}]");
    }

    fn show_dialog(&self, message: &str) {
        println!("!! {message}");
        self.answer(self.handle.dismiss_dialog());
    }

    fn show_coupon(&self, coupon: &Coupon) {
        println!("{}", describe_coupon(coupon));
        if self.auto_confirm {
            println!("   -> redeeming");
            self.answer(self.handle.confirm_redemption());
        } else {
            println!("   -> not redeemed (set PARKSCAN_AUTO_CONFIRM=1 to redeem)");
            self.answer(self.handle.dismiss_dialog());
        }
    }

    fn coupon_redeemed(&self, coupon: &Coupon, used_at: Option<NaiveDateTime>) {
        let when = used_at
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("OK {} used at {}", coupon.name(), when);
    }

    fn notify(&self, message: &str) {
        println!("** {message}");
    }

    fn finish(&self, result: &ScanResult) {
        println!("{}", result.text);
    }
}

/// Sends plain web links to the external viewer and everything else to
/// the scan result path.
pub fn route_decoded(barcode: &DecodedBarcode) -> DecodeAction {
    let is_web_link = !ScannedPayload::has_marker(&barcode.text)
        && Url::parse(&barcode.text)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);

    if is_web_link {
        DecodeAction::LaunchExternal(barcode.text.clone())
    } else {
        DecodeAction::Submit(ScanResult::from(barcode))
    }
}

/// One-line coupon summary.
pub fn describe_coupon(coupon: &Coupon) -> String {
    let mut line = format!("Coupon: {}", coupon.name());
    if !coupon.description().is_empty() {
        line.push_str(&format!(" ({})", coupon.description()));
    }
    if coupon.origin_price > 0.0 {
        line.push_str(&format!(
            ", {:.2} -> {:.2} (saves {:.2})",
            coupon.origin_price,
            coupon.price,
            coupon.discount()
        ));
    }
    if let Some(used_at) = coupon.used_at() {
        line.push_str(&format!(", last used {}", used_at.format(TIME_FORMAT)));
    }
    line
}

// =============================================================================
// Launcher
// =============================================================================

/// Opens URLs with the program named in `PARKSCAN_BROWSER`.
pub struct CommandLauncher {
    program: Option<String>,
}

impl CommandLauncher {
    pub fn new(program: Option<String>) -> Self {
        CommandLauncher { program }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("PARKSCAN_BROWSER").ok().filter(|p| !p.is_empty()))
    }
}

impl UrlLauncher for CommandLauncher {
    fn resolve(&self, _url: &Url) -> Option<String> {
        self.program.clone()
    }

    fn launch(&self, url: &Url, viewer: Option<&str>) -> CaptureResult<()> {
        let Some(program) = viewer.or(self.program.as_deref()) else {
            return Err(CaptureError::ActivityNotFound(url.to_string()));
        };

        std::process::Command::new(program)
            .arg(url.as_str())
            .spawn()
            .map(|_| info!(%url, program, "Opened external view"))
            .map_err(|e| {
                warn!(program, error = %e, "Viewer failed to start");
                CaptureError::ActivityNotFound(url.to_string())
            })
    }
}
