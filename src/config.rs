//! Runtime configuration.
//!
//! Defaults match the classic layout (`~/TutorialScreenshots`, 500ms
//! between captures). The entry point may override the output root from
//! the environment; the session itself never reads it.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

pub const OUTPUT_DIR_ENV: &str = "TUTORIAL_SCREENSHOTS_DIR";
pub const DEFAULT_MIN_CAPTURE_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Parent of every `session_<timestamp>` directory.
    pub output_root: PathBuf,
    pub min_capture_interval: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            min_capture_interval: DEFAULT_MIN_CAPTURE_INTERVAL,
        }
    }
}

impl CaptureConfig {
    /// Defaults, with `TUTORIAL_SCREENSHOTS_DIR` (from the process
    /// environment or a `.env` file) replacing the output root.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::with_output_override(std::env::var_os(OUTPUT_DIR_ENV))
    }

    fn with_output_override(value: Option<OsString>) -> Self {
        let mut config = Self::default();
        if let Some(root) = value.filter(|v| !v.is_empty()) {
            config.output_root = PathBuf::from(root);
        }
        config
    }
}

/// `~/TutorialScreenshots`, or `./TutorialScreenshots` without a home dir.
pub fn default_output_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("TutorialScreenshots")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_is_tutorial_screenshots() {
        let config = CaptureConfig::default();
        assert!(config.output_root.ends_with("TutorialScreenshots"));
        assert_eq!(config.min_capture_interval, Duration::from_millis(500));
    }

    #[test]
    fn override_replaces_output_root() {
        let config = CaptureConfig::with_output_override(Some("/data/shots".into()));
        assert_eq!(config.output_root, PathBuf::from("/data/shots"));
    }

    #[test]
    fn empty_override_keeps_default() {
        let config = CaptureConfig::with_output_override(Some(OsString::new()));
        assert_eq!(config.output_root, default_output_root());
    }
}
