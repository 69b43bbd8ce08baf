//! Session directory layout and file writes.
//!
//! Layout:
//!   <output_root>/session_<YYYYMMDD_HHMMSS>/
//!     screenshot_001.png ... screenshot_NNN.png
//!     tutorial.html
//!
//! Frames are encoded to a hidden staging name first and renamed into
//! their numbered slot at commit, so a half-written file never carries a
//! sequence number.

use chrono::{DateTime, Local};
use image::{ImageFormat, RgbaImage};
use std::io;
use std::path::{Path, PathBuf};

pub const TUTORIAL_FILE_NAME: &str = "tutorial.html";

pub fn session_dir_name(started_at: &DateTime<Local>) -> String {
    format!("session_{}", started_at.format("%Y%m%d_%H%M%S"))
}

pub fn screenshot_file_name(sequence: u32) -> String {
    format!("screenshot_{:03}.png", sequence)
}

/// The directory that owns every file produced by one session.
#[derive(Debug, Clone)]
pub struct SessionDir {
    path: PathBuf,
}

impl SessionDir {
    /// Creates `<root>/session_<timestamp>`, including missing parents.
    pub fn create(root: &Path, started_at: &DateTime<Local>) -> Result<Self, StorageError> {
        let path = root.join(session_dir_name(started_at));
        std::fs::create_dir_all(&path).map_err(|source| StorageError::CreateDir {
            path: path.clone(),
            source,
        })?;

        let path = std::path::absolute(&path).unwrap_or(path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encodes `image` as PNG under a staging name unique to `pending_id`.
    pub fn stage_png(&self, image: &RgbaImage, pending_id: u64) -> Result<PathBuf, StorageError> {
        let staged = self.path.join(format!(".pending_{}.png", pending_id));
        image
            .save_with_format(&staged, ImageFormat::Png)
            .map_err(|e| {
                self.discard(&staged);
                StorageError::Write {
                    path: staged.clone(),
                    reason: e.to_string(),
                }
            })?;
        Ok(staged)
    }

    /// Moves a staged frame into its numbered slot.
    ///
    /// Returns the bare file name and the final path.
    pub fn commit(&self, staged: &Path, sequence: u32) -> Result<(String, PathBuf), StorageError> {
        let file_name = screenshot_file_name(sequence);
        let path = self.path.join(&file_name);
        std::fs::rename(staged, &path).map_err(|source| StorageError::Commit {
            path: path.clone(),
            source,
        })?;
        Ok((file_name, path))
    }

    /// Best-effort removal of a staged frame that will never be committed.
    pub fn discard(&self, staged: &Path) {
        if staged.exists() {
            if let Err(e) = std::fs::remove_file(staged) {
                log::warn!("[SESSION] Could not remove {}: {}", staged.display(), e);
            }
        }
    }

    pub fn write_tutorial(&self, html: &str) -> Result<PathBuf, StorageError> {
        let path = self.path.join(TUTORIAL_FILE_NAME);
        std::fs::write(&path, html).map_err(|e| StorageError::Write {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to create session directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error("Failed to store screenshot as {}: {source}", path.display())]
    Commit { path: PathBuf, source: io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::Rgba;

    fn started_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn names_follow_layout() {
        assert_eq!(session_dir_name(&started_at()), "session_20240309_140507");
        assert_eq!(screenshot_file_name(1), "screenshot_001.png");
        assert_eq!(screenshot_file_name(42), "screenshot_042.png");
        assert_eq!(screenshot_file_name(1234), "screenshot_1234.png");
    }

    #[test]
    fn create_makes_missing_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("a").join("b");
        let dir = SessionDir::create(&root, &started_at()).unwrap();

        assert!(dir.path().is_dir());
        assert!(dir.path().is_absolute());
        assert!(dir.path().ends_with("session_20240309_140507"));
    }

    #[test]
    fn create_fails_when_root_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let result = SessionDir::create(&blocker, &started_at());
        assert!(matches!(result, Err(StorageError::CreateDir { .. })));
    }

    #[test]
    fn stage_then_commit_produces_numbered_png() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = SessionDir::create(tmp.path(), &started_at()).unwrap();
        let frame = RgbaImage::from_pixel(8, 6, Rgba([1, 2, 3, 255]));

        let staged = dir.stage_png(&frame, 7).unwrap();
        assert!(staged.exists());

        let (name, path) = dir.commit(&staged, 3).unwrap();
        assert_eq!(name, "screenshot_003.png");
        assert!(!staged.exists());

        let reloaded = image::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (8, 6));
    }

    #[test]
    fn commit_into_occupied_slot_fails_and_discard_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = SessionDir::create(tmp.path(), &started_at()).unwrap();
        let slot = dir.path().join("screenshot_001.png");
        std::fs::create_dir(&slot).unwrap();
        std::fs::write(slot.join("keep"), b"x").unwrap();

        let frame = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let staged = dir.stage_png(&frame, 0).unwrap();

        let result = dir.commit(&staged, 1);
        assert!(matches!(result, Err(StorageError::Commit { .. })));
        assert!(staged.exists());

        dir.discard(&staged);
        assert!(!staged.exists());
    }

    #[test]
    fn empty_frame_fails_to_stage_without_leftovers() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = SessionDir::create(tmp.path(), &started_at()).unwrap();

        let result = dir.stage_png(&RgbaImage::new(0, 0), 5);
        assert!(matches!(result, Err(StorageError::Write { .. })));
        assert!(!dir.path().join(".pending_5.png").exists());
    }

    #[test]
    fn tutorial_is_written_into_session_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = SessionDir::create(tmp.path(), &started_at()).unwrap();

        let path = dir.write_tutorial("<html></html>").unwrap();
        assert_eq!(path, dir.path().join("tutorial.html"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
