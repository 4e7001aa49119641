//! Camera and frame decoder seams.
//!
//! The coordinator never talks to hardware directly. A [`Camera`] hands out
//! one frame per request and a [`FrameDecoder`] looks for a barcode in it.

use async_trait::async_trait;

use crate::error::CaptureResult;
use crate::protocol::DecodedBarcode;

/// One captured preview frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Wraps raw bytes that carry no geometry (text fixtures, piped input).
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        Frame {
            width: u32::try_from(data.len()).unwrap_or(u32::MAX),
            height: 1,
            data,
        }
    }
}

/// Preview source.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Starts the preview. Called once before the first frame request.
    async fn start_preview(&self) -> CaptureResult<()>;

    /// Stops the preview. Must be safe to call more than once.
    async fn stop_preview(&self);

    /// Waits for the next preview frame.
    async fn capture_frame(&self) -> CaptureResult<Frame>;
}

/// Barcode decoder.
///
/// Decoding is CPU bound; the decode worker runs it on the blocking pool.
pub trait FrameDecoder: Send + Sync + 'static {
    fn decode(&self, frame: &Frame) -> Option<DecodedBarcode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_bytes_geometry() {
        let frame = Frame::from_bytes("hello");
        assert_eq!((frame.width, frame.height), (5, 1));
        assert_eq!(frame.data, b"hello");

        assert_eq!(Frame::from_bytes(Vec::new()).width, 0);
    }
}
