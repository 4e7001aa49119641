//! # Decode Worker
//!
//! Grabs one preview frame per request and runs the barcode decoder on it.
//!
//! ## Worker Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Decode Worker Flow                               │
//! │                                                                         │
//! │  coordinator ── Decode ──►  ┌──────────────────────────────────────┐    │
//! │                             │            DecodeWorker              │    │
//! │                             │                                      │    │
//! │                             │  1. camera.capture_frame()           │    │
//! │                             │  2. spawn_blocking(decoder.decode)   │    │
//! │                             │  3. post result to coordinator       │    │
//! │                             └──────────────────┬───────────────────┘    │
//! │                                                │                        │
//! │  coordinator ◄── DecodeSucceeded / DecodeFailed┘                        │
//! │                                                                         │
//! │  coordinator ── Quit ──► worker exits after the current frame           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are handled strictly in order, so a `Quit` queued behind a
//! `Decode` waits for that frame. The coordinator bounds the wait.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::camera::{Camera, FrameDecoder};
use crate::error::{CaptureError, CaptureResult};
use crate::protocol::CaptureMessage;

/// Capacity of the worker's command queue.
const COMMAND_QUEUE_CAPACITY: usize = 8;

/// Commands accepted by the decode worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeCommand {
    /// Capture and decode one frame.
    Decode,

    /// Stop after the current command.
    Quit,
}

// =============================================================================
// Decode Worker
// =============================================================================

/// Background task that turns frame requests into decode results.
pub struct DecodeWorker {
    camera: Arc<dyn Camera>,
    decoder: Arc<dyn FrameDecoder>,
    commands: mpsc::Receiver<DecodeCommand>,
    results: mpsc::UnboundedSender<CaptureMessage>,
}

/// Handle for controlling the decode worker.
pub struct DecodeWorkerHandle {
    commands: mpsc::Sender<DecodeCommand>,
    join: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    /// Spawns the worker on the current runtime.
    pub fn spawn(
        camera: Arc<dyn Camera>,
        decoder: Arc<dyn FrameDecoder>,
        results: mpsc::UnboundedSender<CaptureMessage>,
    ) -> DecodeWorkerHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);

        let worker = DecodeWorker {
            camera,
            decoder,
            commands: cmd_rx,
            results,
        };

        DecodeWorkerHandle {
            commands: cmd_tx,
            join: Some(tokio::spawn(worker.run())),
        }
    }

    async fn run(mut self) {
        info!("Decode worker starting");

        while let Some(command) = self.commands.recv().await {
            match command {
                DecodeCommand::Decode => self.decode_one().await,
                DecodeCommand::Quit => break,
            }
        }

        info!("Decode worker stopped");
    }

    async fn decode_one(&self) {
        let frame = match self.camera.capture_frame().await {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Frame capture failed");
                self.post(CaptureMessage::DecodeFailed);
                return;
            }
        };

        let decoder = Arc::clone(&self.decoder);
        let started = std::time::Instant::now();
        let outcome = tokio::task::spawn_blocking(move || decoder.decode(&frame)).await;

        let message = match outcome {
            Ok(Some(barcode)) => {
                debug!(
                    format = %barcode.format,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Found barcode"
                );
                CaptureMessage::DecodeSucceeded(barcode)
            }
            Ok(None) => CaptureMessage::DecodeFailed,
            Err(e) => {
                error!(error = %e, "Decoder task failed");
                CaptureMessage::DecodeFailed
            }
        };

        self.post(message);
    }

    fn post(&self, message: CaptureMessage) {
        if self.results.send(message).is_err() {
            debug!("Coordinator queue closed, dropping decode result");
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

impl DecodeWorkerHandle {
    /// Asks the worker for one more frame.
    pub fn request_decode(&self) -> CaptureResult<()> {
        self.send(DecodeCommand::Decode)
    }

    /// Tells the worker to exit once its current frame is done.
    pub fn quit(&self) -> CaptureResult<()> {
        self.send(DecodeCommand::Quit)
    }

    /// Waits up to `timeout` for the worker task to end.
    ///
    /// Returns false if it had to be abandoned.
    pub async fn join(&mut self, timeout: Duration) -> bool {
        let Some(mut join) = self.join.take() else {
            return true;
        };

        match tokio::time::timeout(timeout, &mut join).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(error = %e, "Decode worker ended abnormally");
                true
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Decode worker did not stop in time, abandoning it"
                );
                join.abort();
                false
            }
        }
    }

    fn send(&self, command: DecodeCommand) -> CaptureResult<()> {
        self.commands.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                CaptureError::ChannelError("Decode command queue full".into())
            }
            mpsc::error::TrySendError::Closed(_) => CaptureError::ShuttingDown,
        })
    }

    /// Builds a handle with no task behind it, exposing the command queue.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::Receiver<DecodeCommand>) {
        let (commands, cmd_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        (DecodeWorkerHandle { commands, join: None }, cmd_rx)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Frame;
    use crate::testing::{FakeCamera, StuckCamera, Utf8Decoder};

    #[tokio::test]
    async fn test_decodes_requested_frames() {
        let camera = Arc::new(FakeCamera::with_frames([
            Frame::from_bytes("hello"),
            Frame::default(),
        ]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = DecodeWorker::spawn(camera, Arc::new(Utf8Decoder), tx);

        handle.request_decode().unwrap();
        match rx.recv().await.unwrap() {
            CaptureMessage::DecodeSucceeded(barcode) => assert_eq!(barcode.text, "hello"),
            other => panic!("unexpected message: {other:?}"),
        }

        handle.request_decode().unwrap();
        assert!(matches!(rx.recv().await.unwrap(), CaptureMessage::DecodeFailed));

        handle.quit().unwrap();
        assert!(handle.join(Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn test_capture_error_reports_decode_failed() {
        let camera = Arc::new(FakeCamera::empty());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = DecodeWorker::spawn(camera, Arc::new(Utf8Decoder), tx);

        handle.request_decode().unwrap();
        assert!(matches!(rx.recv().await.unwrap(), CaptureMessage::DecodeFailed));

        handle.quit().unwrap();
        assert!(handle.join(Duration::from_millis(500)).await);
        assert!(matches!(handle.request_decode(), Err(CaptureError::ShuttingDown)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_gives_up_on_stuck_worker() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut handle = DecodeWorker::spawn(Arc::new(StuckCamera), Arc::new(Utf8Decoder), tx);

        handle.request_decode().unwrap();
        handle.quit().unwrap();

        assert!(!handle.join(Duration::from_millis(500)).await);
        // Already joined
        assert!(handle.join(Duration::from_millis(500)).await);
    }
}
