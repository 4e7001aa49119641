//! # parkscan Station
//!
//! Console front end for the scanning station: frames come from stdin,
//! results and dialogs go to stdout, logs go to stderr.
//!
//! ## Module Organization
//! ```text
//! parkscan_station/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── console.rs      ◄─── LineCamera, TextDecoder, ConsolePresenter,
//! │                        CommandLauncher
//! └── error.rs        ◄─── Station error type
//! ```

pub mod console;
pub mod error;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use parkscan_capture::{CaptureCoordinator, CaptureHandle, ScannerConfig, ShutdownReport};
use parkscan_core::ScanPurpose;
use parkscan_coupon::CouponClient;

use console::{CommandLauncher, ConsolePresenter, StdinCamera, TextDecoder};
pub use error::{StationError, StationResult};

/// Runs the station until Ctrl-C, end of input, or a delivered decode-only
/// scan.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                         Station Startup                                 │
/// │                                                                         │
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • scanner.toml (path argument or platform config dir)               │
/// │     • PARKSCAN_* environment overrides                                  │
/// │                                                                         │
/// │  2. Build Coupon Client (redeem purpose only) ────────────────────────► │
/// │                                                                         │
/// │  3. Build Coordinator ────────────────────────────────────────────────► │
/// │     • StdinCamera + TextDecoder                                         │
/// │     • ConsolePresenter (PARKSCAN_AUTO_CONFIRM)                          │
/// │     • CommandLauncher (PARKSCAN_BROWSER)                                │
/// │                                                                         │
/// │  4. Spawn and wait for a stop condition, then shut down ──────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> StationResult<()> {
    let config = ScannerConfig::load(config_path)?;
    info!(
        purpose = %config.purpose(),
        parkinglot = %config.parkinglot(),
        "Starting parkscan station"
    );

    let builder = CaptureCoordinator::builder(config.capture.clone());
    let handle = builder.handle();

    let auto_confirm = std::env::var("PARKSCAN_AUTO_CONFIRM").is_ok_and(|v| !v.is_empty() && v != "0");
    let eof = Arc::new(Notify::new());

    let mut builder = builder
        .with_camera(Arc::new(StdinCamera::stdin(eof.clone())))
        .with_decoder(Arc::new(TextDecoder))
        .with_presenter(Arc::new(ConsolePresenter::new(handle.clone(), auto_confirm)))
        .with_launcher(Arc::new(CommandLauncher::from_env()));

    if config.purpose() == ScanPurpose::Redeem {
        builder = builder.with_coupons(Arc::new(CouponClient::new(config.coupon.clone())?));
    }

    let coordinator = builder.build()?;
    let report = supervise(coordinator, handle, eof).await?;

    info!(
        worker_stopped = report.worker_stopped,
        discarded = report.discarded,
        request_abandoned = report.request_abandoned,
        "Station stopped"
    );
    Ok(())
}

/// Runs the coordinator until it finishes on its own, input ends, or
/// Ctrl-C arrives. The last two shut it down through `handle`.
pub async fn supervise(
    coordinator: CaptureCoordinator,
    handle: CaptureHandle,
    eof: Arc<Notify>,
) -> StationResult<ShutdownReport> {
    let mut task = tokio::spawn(coordinator.run());

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Interrupted");
        }
        _ = eof.notified() => {
            info!("Input exhausted");
        }
        finished = &mut task => {
            let report = finished.map_err(|e| StationError::Task(e.to_string()))?;
            info!(discarded = report.discarded, "Scanner finished");
            return Ok(report);
        }
    }

    let report = handle.shutdown().await?;
    if let Err(e) = task.await {
        warn!(error = %e, "Coordinator task did not exit cleanly");
    }
    Ok(report)
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `ERROR`: Unrecoverable failures
/// - `WARN`: Failed requests, abandoned workers
/// - `INFO`: Scan cycle milestones
/// - `DEBUG`: State transitions and message handling
///
/// Set `RUST_LOG=debug` for verbose output. Logs go to stderr.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,parkscan=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use parkscan_capture::CaptureSettings;
    use parkscan_core::ScanState;

    use console::LineCamera;

    fn coordinator(
        purpose: ScanPurpose,
        input: &'static [u8],
        eof: Arc<Notify>,
    ) -> (CaptureCoordinator, CaptureHandle) {
        let builder = CaptureCoordinator::builder(CaptureSettings {
            purpose,
            ..Default::default()
        });
        let handle = builder.handle();
        let coordinator = builder
            .with_camera(Arc::new(LineCamera::new(input, eof)))
            .with_decoder(Arc::new(TextDecoder))
            .with_presenter(Arc::new(ConsolePresenter::new(handle.clone(), false)))
            .with_launcher(Arc::new(CommandLauncher::new(None)))
            .build()
            .unwrap();
        (coordinator, handle)
    }

    #[tokio::test]
    async fn test_decode_purpose_stops_after_first_scan() {
        let eof = Arc::new(Notify::new());
        let (coordinator, handle) = coordinator(ScanPurpose::Decode, b"4006381333931\n", eof.clone());

        let report = tokio::time::timeout(Duration::from_secs(5), supervise(coordinator, handle.clone(), eof))
            .await
            .expect("station never stopped")
            .unwrap();

        assert!(report.worker_stopped);
        assert_eq!(handle.state(), ScanState::Done);
    }

    #[tokio::test]
    async fn test_end_of_input_shuts_down() {
        let eof = Arc::new(Notify::new());
        let (coordinator, handle) = coordinator(
            ScanPurpose::Preview,
            b"https://example.com/a\nplain text\n",
            eof.clone(),
        );

        let report = tokio::time::timeout(Duration::from_secs(5), supervise(coordinator, handle.clone(), eof))
            .await
            .expect("station never stopped")
            .unwrap();

        assert!(report.worker_stopped);
        assert!(!report.request_abandoned);
        assert_eq!(handle.state(), ScanState::Done);
    }
}
