//! External URL viewer seam.
//!
//! Decoded URLs that are not coupons can be handed to an outside viewer.
//! Failing to find one is logged and otherwise ignored.

use tracing::{debug, warn};
use url::Url;

use crate::error::{CaptureError, CaptureResult};

/// Finds and starts an application able to show a URL.
pub trait UrlLauncher: Send + Sync {
    /// Returns the preferred viewer for the URL, if one is known.
    fn resolve(&self, url: &Url) -> Option<String>;

    /// Opens the URL, in `viewer` when given.
    ///
    /// Returns [`CaptureError::ActivityNotFound`] when nothing can show it.
    fn launch(&self, url: &Url, viewer: Option<&str>) -> CaptureResult<()>;
}

/// Launcher for hosts without any viewer.
pub struct NoViewerLauncher;

impl UrlLauncher for NoViewerLauncher {
    fn resolve(&self, _url: &Url) -> Option<String> {
        None
    }

    fn launch(&self, url: &Url, _viewer: Option<&str>) -> CaptureResult<()> {
        Err(CaptureError::ActivityNotFound(url.to_string()))
    }
}

/// Parses `raw`, resolves a viewer and launches it.
pub fn open_external(launcher: &dyn UrlLauncher, raw: &str) -> CaptureResult<Url> {
    let url = Url::parse(raw)?;

    let viewer = launcher.resolve(&url);
    match viewer.as_deref() {
        Some(name) => debug!(%url, viewer = %name, "Using viewer"),
        None => debug!(%url, "No preferred viewer, using system default"),
    }

    launcher.launch(&url, viewer.as_deref()).map_err(|e| {
        warn!(%url, error = %e, "Can't open external view");
        e
    })?;

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingLauncher {
        launched: Mutex<Vec<(String, Option<String>)>>,
    }

    impl UrlLauncher for RecordingLauncher {
        fn resolve(&self, _url: &Url) -> Option<String> {
            Some("browser".into())
        }

        fn launch(&self, url: &Url, viewer: Option<&str>) -> CaptureResult<()> {
            self.launched
                .lock()
                .unwrap()
                .push((url.to_string(), viewer.map(str::to_string)));
            Ok(())
        }
    }

    #[test]
    fn test_open_external_uses_resolved_viewer() {
        let launcher = RecordingLauncher {
            launched: Mutex::new(Vec::new()),
        };

        open_external(&launcher, "https://example.com/product/1").unwrap();

        let launched = launcher.launched.lock().unwrap();
        assert_eq!(
            launched.as_slice(),
            &[("https://example.com/product/1".to_string(), Some("browser".to_string()))]
        );
    }

    #[test]
    fn test_open_external_without_viewer() {
        let err = open_external(&NoViewerLauncher, "https://example.com").unwrap_err();
        assert!(matches!(err, CaptureError::ActivityNotFound(_)));
        assert!(err.is_user_recoverable());
    }

    #[test]
    fn test_open_external_rejects_non_url() {
        let err = open_external(&NoViewerLauncher, "not a url").unwrap_err();
        assert!(matches!(err, CaptureError::InvalidUrl(_)));
    }
}
