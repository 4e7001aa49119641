//! # Capture Coordinator
//!
//! Sequences camera preview, frame decoding and result dispatch.
//!
//! ## Coordinator Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     CaptureCoordinator Architecture                     │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      CaptureCoordinator                          │  │
//! │  │                                                                  │  │
//! │  │  • Owns the scan state (PREVIEW / SUCCESS / DONE)                │  │
//! │  │  • Handles one CaptureMessage at a time                          │  │
//! │  │  • Routes scan results by purpose                                │  │
//! │  │  • Publishes state changes on a watch channel                    │  │
//! │  └───────┬──────────────────────┬──────────────────────┬────────────┘  │
//! │          ▼                      ▼                      ▼               │
//! │  ┌────────────────┐  ┌────────────────────┐  ┌─────────────────────┐   │
//! │  │  DecodeWorker  │  │  coupon requests   │  │   ScanPresenter     │   │
//! │  │                │  │  (spawned tasks)   │  │                     │   │
//! │  │ one frame per  │  │ inspect / redeem,  │  │ status, dialogs,    │   │
//! │  │ request        │  │ result posted back │  │ coupon views        │   │
//! │  └────────────────┘  └────────────────────┘  └─────────────────────┘   │
//! │                                                                         │
//! │  STATE TRANSITIONS:                                                    │
//! │  ──────────────────                                                    │
//! │  SUCCESS ── restart ──► PREVIEW ── decode ok ──► SUCCESS               │
//! │  PREVIEW ── decode failed ──► PREVIEW (next frame)                     │
//! │  any ── shutdown ──► DONE (terminal, every message ignored)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Coupon Cycle
//! ```text
//! ScanResultReady ─► "requesting..." ─► inspect ─► show_coupon
//!                                          │            │
//!                                          │ error      │ ConfirmRedemption
//!                                          ▼            ▼
//!                                     show_dialog    redeem ─► coupon_redeemed
//!                                          │                   or notify(error)
//!                                          ▼                        │
//!                                   DialogDismissed ──► restart ◄───┘
//! ```

use chrono::{Local, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use parkscan_core::{text, Coupon, DuplicatePolicy, ScanPurpose, ScanState, ScannedPayload};
use parkscan_coupon::CouponService;

use crate::camera::{Camera, FrameDecoder};
use crate::config::CaptureSettings;
use crate::decode::{DecodeWorker, DecodeWorkerHandle};
use crate::error::{CaptureError, CaptureResult};
use crate::launcher::{open_external, NoViewerLauncher, UrlLauncher};
use crate::presenter::{NoOpPresenter, ScanPresenter};
use crate::protocol::{CaptureMessage, CycleId, DecodeAction, ScanResult};

// =============================================================================
// Shutdown Report
// =============================================================================

/// Outcome of [`CaptureCoordinator::quit_synchronously`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownReport {
    /// Whether the decode worker ended within the shutdown timeout.
    pub worker_stopped: bool,

    /// Number of queued messages dropped unhandled.
    pub discarded: usize,

    /// Whether a coupon request was still in flight and got aborted.
    pub request_abandoned: bool,
}

// =============================================================================
// Coupon Cycle
// =============================================================================

/// Where the current coupon request stands.
#[derive(Debug)]
enum CouponCycle {
    /// Lookup request in flight.
    Inspecting { id: CycleId },

    /// Coupon shown, waiting for the operator.
    AwaitingConfirmation {
        id: CycleId,
        payload: String,
        coupon: Coupon,
    },

    /// Redeem request in flight.
    Redeeming { id: CycleId },

    /// A message dialog is showing.
    Dialog,
}

// =============================================================================
// Capture Coordinator
// =============================================================================

/// Owns the scan state machine. Run it with [`CaptureCoordinator::run`].
pub struct CaptureCoordinator {
    settings: CaptureSettings,

    camera: Arc<dyn Camera>,
    coupons: Option<Arc<dyn CouponService>>,
    launcher: Arc<dyn UrlLauncher>,
    presenter: Arc<dyn ScanPresenter>,

    worker: DecodeWorkerHandle,

    state: ScanState,
    state_tx: watch::Sender<ScanState>,

    /// Incoming messages, plus a sender for self-posting and spawned tasks.
    inbox: mpsc::UnboundedReceiver<CaptureMessage>,
    outbox: mpsc::UnboundedSender<CaptureMessage>,

    shutdown_rx: mpsc::Receiver<oneshot::Sender<ShutdownReport>>,

    pending: Option<CouponCycle>,
    /// Task running the current inspect or redeem request.
    request: Option<JoinHandle<()>>,
    last_handled: Option<String>,
    finished: bool,
}

impl CaptureCoordinator {
    /// Starts building a coordinator.
    pub fn builder(settings: CaptureSettings) -> CaptureCoordinatorBuilder {
        CaptureCoordinatorBuilder::new(settings)
    }

    /// Current scan state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Runs the coordinator until shutdown or until a decode-only scan
    /// finishes.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) -> ShutdownReport {
        info!(purpose = %self.settings.purpose, "Capture coordinator starting");

        if let Err(e) = self.camera.start_preview().await {
            error!(error = %e, "Failed to start camera preview");
            self.presenter.notify(&e.to_string());
            return self.quit_synchronously().await;
        }
        self.restart_preview_and_decode();

        loop {
            tokio::select! {
                biased;

                // Disabled once every handle is gone
                Some(reply) = self.shutdown_rx.recv() => {
                    let report = self.quit_synchronously().await;
                    let _ = reply.send(report);
                    return report;
                }

                Some(message) = self.inbox.recv() => {
                    self.handle_message(message);
                    if self.finished {
                        info!("Scan delivered, stopping");
                        return self.quit_synchronously().await;
                    }
                }

                else => {
                    warn!("All coordinator channels closed");
                    return self.quit_synchronously().await;
                }
            }
        }
    }

    /// Stops the scanner.
    ///
    /// Sets `Done`, stops the preview, asks the decode worker to quit and
    /// waits a bounded time for it, then drops every queued message so no
    /// late decode result is ever delivered. A coupon request still in
    /// flight is aborted.
    pub async fn quit_synchronously(&mut self) -> ShutdownReport {
        self.set_state(ScanState::Done);
        self.camera.stop_preview().await;

        let request_abandoned = match self.request.take() {
            Some(task) if !task.is_finished() => {
                if matches!(self.pending, Some(CouponCycle::Redeeming { .. })) {
                    warn!("Redemption in flight at shutdown, server may have consumed the coupon");
                } else {
                    info!(pending = ?self.pending, "Aborting coupon request");
                }
                task.abort();
                true
            }
            _ => false,
        };

        if let Err(e) = self.worker.quit() {
            debug!(error = %e, "Decode worker already gone");
        }
        let worker_stopped = self.worker.join(self.settings.shutdown_timeout()).await;

        self.inbox.close();
        let mut discarded = 0;
        while let Ok(message) = self.inbox.try_recv() {
            if message.is_decode_result() {
                debug!(message = message.type_name(), "Dropping late decode result");
            } else {
                debug!(message = message.type_name(), "Discarding queued message");
            }
            discarded += 1;
        }
        self.pending = None;

        info!(worker_stopped, discarded, request_abandoned, "Capture coordinator stopped");
        ShutdownReport {
            worker_stopped,
            discarded,
            request_abandoned,
        }
    }

    // =========================================================================
    // Message Handling
    // =========================================================================

    fn handle_message(&mut self, message: CaptureMessage) {
        if self.state.is_done() {
            debug!(message = message.type_name(), "Ignoring message after shutdown");
            return;
        }

        debug!(message = message.type_name(), state = %self.state, "Handling message");

        match message {
            CaptureMessage::RestartPreview => self.restart_preview_and_decode(),

            CaptureMessage::DecodeSucceeded(barcode) => {
                let age_ms = (Utc::now() - barcode.decoded_at).num_milliseconds();
                debug!(format = %barcode.format, age_ms, "Barcode decoded");
                self.set_state(ScanState::Success);
                match self.presenter.on_decode(&barcode) {
                    DecodeAction::Submit(result) => {
                        self.post(CaptureMessage::ScanResultReady(result))
                    }
                    DecodeAction::LaunchExternal(url) => {
                        self.post(CaptureMessage::LaunchExternalView(url))
                    }
                    DecodeAction::Ignore => self.restart_preview_and_decode(),
                }
            }

            CaptureMessage::DecodeFailed => {
                // Keep decoding until something is found
                self.set_state(ScanState::Preview);
                self.request_frame();
            }

            CaptureMessage::ScanResultReady(result) => self.handle_scan_result(result),

            CaptureMessage::LaunchExternalView(url) => {
                match open_external(self.launcher.as_ref(), &url) {
                    Ok(_) => {}
                    Err(e) if e.is_user_recoverable() => {
                        debug!(%url, error = %e, "External view not opened")
                    }
                    Err(e) => warn!(%url, error = %e, "External view failed"),
                }
                self.restart_preview_and_decode();
            }

            CaptureMessage::CouponInspected {
                cycle,
                payload,
                outcome,
            } => self.handle_coupon_inspected(cycle, payload, outcome),

            CaptureMessage::ConfirmRedemption => self.handle_confirm_redemption(),

            CaptureMessage::CouponRedeemed { cycle, outcome } => {
                self.handle_coupon_redeemed(cycle, outcome)
            }

            CaptureMessage::DialogDismissed => self.handle_dialog_dismissed(),
        }
    }

    /// Re-arms the preview after a handled scan.
    ///
    /// Only acts in `Success`, so repeated calls request one frame.
    fn restart_preview_and_decode(&mut self) {
        if self.state != ScanState::Success {
            return;
        }

        self.set_state(ScanState::Preview);
        self.request_frame();
        self.presenter.draw_viewfinder();
    }

    fn handle_scan_result(&mut self, result: ScanResult) {
        if self.pending.is_some() {
            warn!(pending = ?self.pending, "Coupon request outstanding, dropping scan");
            return;
        }

        let policy: DuplicatePolicy = self.settings.duplicate_policy;
        if policy.should_skip(self.last_handled.as_deref(), &result.text) {
            debug!(%policy, "Skipping repeated scan");
            self.restart_preview_and_decode();
            return;
        }
        self.last_handled = Some(result.text.clone());

        match self.settings.purpose {
            ScanPurpose::Decode => {
                info!(format = %result.format, "Delivering scan result");
                self.presenter.finish(&result);
                self.finished = true;
            }
            ScanPurpose::Preview => self.restart_preview_and_decode(),
            ScanPurpose::Redeem => self.begin_coupon_cycle(result.text),
        }
    }

    // =========================================================================
    // Coupon Cycle
    // =========================================================================

    fn begin_coupon_cycle(&mut self, raw: String) {
        if let Err(e) = ScannedPayload::parse(&raw) {
            info!(reason = %e, "Scanned code is not a coupon");
            self.pending = Some(CouponCycle::Dialog);
            self.presenter.show_dialog(text::MALFORMED_PAYLOAD);
            return;
        }

        let Some(coupons) = self.coupons.clone() else {
            error!("No coupon service configured");
            self.restart_preview_and_decode();
            return;
        };

        let id = Uuid::new_v4();
        info!(cycle = %id, "Looking up coupon");
        self.presenter.set_status(text::STATUS_REQUESTING);
        self.pending = Some(CouponCycle::Inspecting { id });

        let outbox = self.outbox.clone();
        self.request = Some(tokio::spawn(async move {
            let outcome = coupons.inspect(&raw).await;
            let _ = outbox.send(CaptureMessage::CouponInspected {
                cycle: id,
                payload: raw,
                outcome,
            });
        }));
    }

    fn handle_coupon_inspected(
        &mut self,
        cycle: CycleId,
        payload: String,
        outcome: parkscan_coupon::CouponResult<Coupon>,
    ) {
        match self.pending.take() {
            Some(CouponCycle::Inspecting { id }) if id == cycle => {}
            other => {
                debug!(%cycle, "Discarding stale coupon lookup");
                self.pending = other;
                return;
            }
        }

        match outcome {
            Ok(coupon) => {
                debug!(%cycle, name = %coupon.name(), "Coupon found, awaiting confirmation");
                self.presenter.show_coupon(&coupon);
                self.pending = Some(CouponCycle::AwaitingConfirmation {
                    id: cycle,
                    payload,
                    coupon,
                });
            }
            Err(e) => {
                warn!(%cycle, error = %e, "Coupon lookup failed");
                self.presenter.show_dialog(&e.user_message());
                self.pending = Some(CouponCycle::Dialog);
            }
        }
    }

    fn handle_confirm_redemption(&mut self) {
        let (id, payload) = match self.pending.take() {
            Some(CouponCycle::AwaitingConfirmation {
                id,
                payload,
                coupon,
            }) => {
                info!(cycle = %id, name = %coupon.name(), "Redeeming coupon");
                (id, payload)
            }
            other => {
                debug!("No coupon awaiting confirmation");
                self.pending = other;
                return;
            }
        };

        let Some(coupons) = self.coupons.clone() else {
            error!("No coupon service configured");
            self.restart_preview_and_decode();
            return;
        };

        self.pending = Some(CouponCycle::Redeeming { id });

        let outbox = self.outbox.clone();
        self.request = Some(tokio::spawn(async move {
            let outcome = coupons.redeem(&payload).await;
            let _ = outbox.send(CaptureMessage::CouponRedeemed { cycle: id, outcome });
        }));
    }

    fn handle_coupon_redeemed(
        &mut self,
        cycle: CycleId,
        outcome: parkscan_coupon::CouponResult<Coupon>,
    ) {
        match self.pending.take() {
            Some(CouponCycle::Redeeming { id }) if id == cycle => {}
            other => {
                debug!(%cycle, "Discarding stale redemption");
                self.pending = other;
                return;
            }
        }

        match outcome {
            Ok(coupon) => {
                let used_at = coupon.effective_used_at(Local::now().naive_local());
                info!(%cycle, name = %coupon.name(), "Coupon redeemed");
                self.presenter.coupon_redeemed(&coupon, used_at);
            }
            Err(e) => {
                let message = e.user_message();
                warn!(%cycle, error = %e, "Coupon redemption failed");
                self.presenter.notify(&message);
                self.presenter.set_status(&message);
            }
        }

        self.restart_preview_and_decode();
    }

    fn handle_dialog_dismissed(&mut self) {
        match self.pending.take() {
            Some(CouponCycle::Dialog) | Some(CouponCycle::AwaitingConfirmation { .. }) | None => {
                self.presenter.set_status(text::STATUS_INITIALIZING);
                self.restart_preview_and_decode();
            }
            other => {
                debug!(pending = ?other, "No dialog showing");
                self.pending = other;
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn set_state(&mut self, state: ScanState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "Scan state changed");
            self.state = state;
            self.state_tx.send_replace(state);
        }
    }

    fn request_frame(&self) {
        if let Err(e) = self.worker.request_decode() {
            error!(error = %e, "Failed to request a frame");
        }
    }

    fn post(&self, message: CaptureMessage) {
        if self.outbox.send(message).is_err() {
            debug!("Coordinator queue closed");
        }
    }
}

// =============================================================================
// Capture Handle (for external control)
// =============================================================================

/// Handle for talking to a running coordinator from outside its task.
#[derive(Clone)]
pub struct CaptureHandle {
    messages: mpsc::UnboundedSender<CaptureMessage>,
    shutdown_tx: mpsc::Sender<oneshot::Sender<ShutdownReport>>,
    state_rx: watch::Receiver<ScanState>,
}

impl CaptureHandle {
    /// Queues a message for the coordinator.
    pub fn post(&self, message: CaptureMessage) -> CaptureResult<()> {
        self.messages
            .send(message)
            .map_err(|_| CaptureError::ShuttingDown)
    }

    /// Asks for the preview to be re-armed.
    pub fn restart_preview(&self) -> CaptureResult<()> {
        self.post(CaptureMessage::RestartPreview)
    }

    /// Accepts the coupon currently shown.
    pub fn confirm_redemption(&self) -> CaptureResult<()> {
        self.post(CaptureMessage::ConfirmRedemption)
    }

    /// Reports that the visible dialog was closed.
    pub fn dismiss_dialog(&self) -> CaptureResult<()> {
        self.post(CaptureMessage::DialogDismissed)
    }

    /// Current scan state.
    pub fn state(&self) -> ScanState {
        *self.state_rx.borrow()
    }

    /// Receiver that sees every state change.
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state_rx.clone()
    }

    /// Stops the coordinator and waits for its report.
    pub async fn shutdown(&self) -> CaptureResult<ShutdownReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.shutdown_tx
            .send(reply_tx)
            .await
            .map_err(|_| CaptureError::ShuttingDown)?;
        reply_rx
            .await
            .map_err(|_| CaptureError::ChannelError("Shutdown reply dropped".into()))
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a CaptureCoordinator.
///
/// The handle exists before the coordinator is built, so presenters that
/// answer dialogs can hold one.
pub struct CaptureCoordinatorBuilder {
    settings: CaptureSettings,
    camera: Option<Arc<dyn Camera>>,
    decoder: Option<Arc<dyn FrameDecoder>>,
    coupons: Option<Arc<dyn CouponService>>,
    launcher: Option<Arc<dyn UrlLauncher>>,
    presenter: Option<Arc<dyn ScanPresenter>>,

    handle: CaptureHandle,
    inbox: mpsc::UnboundedReceiver<CaptureMessage>,
    shutdown_rx: mpsc::Receiver<oneshot::Sender<ShutdownReport>>,
    state_tx: watch::Sender<ScanState>,
}

impl CaptureCoordinatorBuilder {
    /// Creates a new builder with the given settings.
    pub fn new(settings: CaptureSettings) -> Self {
        let (messages, inbox) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(ScanState::default());

        CaptureCoordinatorBuilder {
            settings,
            camera: None,
            decoder: None,
            coupons: None,
            launcher: None,
            presenter: None,
            handle: CaptureHandle {
                messages,
                shutdown_tx,
                state_rx,
            },
            inbox,
            shutdown_rx,
            state_tx,
        }
    }

    /// Handle to the coordinator being built.
    pub fn handle(&self) -> CaptureHandle {
        self.handle.clone()
    }

    pub fn with_camera(mut self, camera: Arc<dyn Camera>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn FrameDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Sets the coupon service. Required for [`ScanPurpose::Redeem`].
    pub fn with_coupons(mut self, coupons: Arc<dyn CouponService>) -> Self {
        self.coupons = Some(coupons);
        self
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn UrlLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn ScanPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Builds the coordinator and spawns its decode worker.
    pub fn build(self) -> CaptureResult<CaptureCoordinator> {
        self.check()?;

        let (Some(camera), Some(decoder)) = (self.camera.clone(), self.decoder.clone()) else {
            return Err(CaptureError::InvalidConfig("Camera and decoder required".into()));
        };
        let worker = DecodeWorker::spawn(camera, decoder, self.handle.messages.clone());

        self.assemble(worker)
    }

    /// Builds the coordinator around an existing worker handle.
    #[cfg(test)]
    pub(crate) fn build_with_worker(
        self,
        worker: DecodeWorkerHandle,
    ) -> CaptureResult<CaptureCoordinator> {
        self.check()?;
        self.assemble(worker)
    }

    fn check(&self) -> CaptureResult<()> {
        if self.camera.is_none() {
            return Err(CaptureError::InvalidConfig("Camera required".into()));
        }
        if self.decoder.is_none() {
            return Err(CaptureError::InvalidConfig("Frame decoder required".into()));
        }
        if self.settings.purpose == ScanPurpose::Redeem && self.coupons.is_none() {
            return Err(CaptureError::InvalidConfig(
                "Coupon service required for redeem purpose".into(),
            ));
        }
        Ok(())
    }

    fn assemble(self, worker: DecodeWorkerHandle) -> CaptureResult<CaptureCoordinator> {
        let camera = self
            .camera
            .ok_or_else(|| CaptureError::InvalidConfig("Camera required".into()))?;

        Ok(CaptureCoordinator {
            settings: self.settings,
            camera,
            coupons: self.coupons,
            launcher: self.launcher.unwrap_or_else(|| Arc::new(NoViewerLauncher)),
            presenter: self.presenter.unwrap_or_else(|| Arc::new(NoOpPresenter)),
            worker,
            state: ScanState::default(),
            state_tx: self.state_tx,
            inbox: self.inbox,
            outbox: self.handle.messages,
            shutdown_rx: self.shutdown_rx,
            pending: None,
            request: None,
            last_handled: None,
            finished: false,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
