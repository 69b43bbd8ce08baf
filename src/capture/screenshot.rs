//! Full-screen capture using the `xcap` crate.
//!
//! This is the infrastructure layer — it talks to the OS.
//! The session only sees the `ScreenGrabber` trait, so tests swap in
//! a synthetic frame source.

use image::RgbaImage;
use xcap::Monitor;

/// Source of full-screen frames.
///
/// Implementations are called from blocking worker threads, one call per
/// accepted click, possibly concurrently.
pub trait ScreenGrabber: Send + Sync {
    fn grab(&self) -> Result<RgbaImage, CaptureError>;
}

/// The primary display as seen through xcap.
///
/// Also implements `DisplayGeometry` (see `geometry.rs`) so a single
/// value serves both collaborators.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapScreen;

impl ScreenGrabber for XcapScreen {
    fn grab(&self) -> Result<RgbaImage, CaptureError> {
        capture_primary_monitor()
    }
}

/// Finds the primary monitor, falling back to the first one reported.
pub(crate) fn primary_monitor() -> Result<Monitor, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

    let mut fallback = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            return Ok(monitor);
        }
        if fallback.is_none() {
            fallback = Some(monitor);
        }
    }

    fallback.ok_or(CaptureError::NoPrimaryMonitor)
}

/// Captures the primary monitor's screen at physical resolution.
pub fn capture_primary_monitor() -> Result<RgbaImage, CaptureError> {
    let primary = primary_monitor()?;

    let image = primary
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(CaptureError::EmptyFrame);
    }

    Ok(image)
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("No primary monitor found")]
    NoPrimaryMonitor,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),

    #[error("Screen capture returned an empty frame — check screen recording permission")]
    EmptyFrame,

    #[error("Capture worker stopped unexpectedly: {0}")]
    WorkerFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a graphical display and screen recording permission"]
    fn captures_primary_monitor() {
        let image = capture_primary_monitor().expect("capture failed");
        assert!(image.width() > 0 && image.height() > 0);
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = CaptureError::CaptureFailed("denied".into());
        assert_eq!(err.to_string(), "Screen capture failed: denied");
    }
}
