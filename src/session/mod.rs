//! Capture session — one recording run from start signal to stop signal.
//!
//! The session is driven from a single input-delivery context. Accepted
//! clicks are handed to the blocking pool (grab → annotate → encode →
//! commit) so the listener never waits on disk or the display server.
//!
//! Shared between the workers is only the `CaptureLog`: the sequence
//! counter and the ordered capture list, mutated together under one lock.
//! The lock is held for the rename that gives a staged frame its number,
//! never for grabbing or encoding.
//!
//! `stop()` rejects new clicks first, then waits for every in-flight
//! capture before rendering the page, so the last click always makes it
//! into the tutorial.

mod storage;
mod types;

pub use storage::{
    screenshot_file_name, session_dir_name, SessionDir, StorageError, TUTORIAL_FILE_NAME,
};
pub use types::{
    ButtonState, Capture, ClickPoint, PointerButton, PointerEvent, SessionState, SessionSummary,
};

use crate::capture::{
    annotate, resolve_scale, CaptureError, DisplayGeometry, ScreenGrabber, XcapScreen,
};
use crate::config::CaptureConfig;
use crate::tutorial;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// A button reported pressed again after this long is assumed to have
/// lost its release event and is re-armed.
pub const STUCK_BUTTON_TIMEOUT: Duration = Duration::from_secs(1);

/// What happened to a delivered pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not a press edge, or the session is not capturing.
    Ignored,
    /// Arrived within the minimum interval of the last accepted click.
    RateLimited,
    /// A capture was handed to a background worker.
    Dispatched,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

struct CaptureLog {
    next_sequence: u32,
    captures: Vec<Capture>,
}

/// State shared with capture workers for the lifetime of one run.
struct Recording {
    started_at: DateTime<Local>,
    dir: SessionDir,
    capture_log: Mutex<CaptureLog>,
    pending_ids: AtomicU64,
    grabber: Arc<dyn ScreenGrabber>,
    geometry: Arc<dyn DisplayGeometry>,
}

impl Recording {
    fn lock_log(&self) -> MutexGuard<'_, CaptureLog> {
        // The log is append-only; a panicked writer cannot leave it torn.
        self.capture_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<Capture> {
        self.lock_log().captures.clone()
    }

    /// Worker entry point. Failures lose this click and nothing else.
    fn capture(&self, click: ClickPoint) {
        match self.try_capture(click) {
            Ok(capture) => log::info!(
                "[CAPTURE] Screenshot {} captured at ({}, {})",
                capture.sequence,
                click.x,
                click.y
            ),
            Err(e) => log::error!(
                "[CAPTURE] Error capturing screenshot at ({}, {}): {}",
                click.x,
                click.y,
                e
            ),
        }
    }

    fn try_capture(&self, click: ClickPoint) -> Result<Capture, SessionError> {
        let start = Instant::now();
        let captured_at = Local::now();

        let mut frame = self.grabber.grab()?;
        let grab_ms = start.elapsed().as_millis();

        let scale = resolve_scale(self.geometry.as_ref());
        annotate(&mut frame, click.x, click.y, scale);

        let pending_id = self.pending_ids.fetch_add(1, Ordering::Relaxed);
        let staged = self.dir.stage_png(&frame, pending_id)?;
        let encode_ms = start.elapsed().as_millis() - grab_ms;

        let committed = {
            let mut entries = self.lock_log();
            let sequence = entries.next_sequence;
            match self.dir.commit(&staged, sequence) {
                Ok((file_name, path)) => {
                    entries.next_sequence += 1;
                    let capture = Capture {
                        sequence,
                        file_name,
                        path,
                        captured_at,
                        click,
                    };
                    entries.captures.push(capture.clone());
                    Ok(capture)
                }
                Err(e) => Err(e),
            }
        };

        let capture = committed.map_err(|e| {
            self.dir.discard(&staged);
            e
        })?;

        log::debug!(
            "[CAPTURE] {}x{} frame at scale {:.2}: grab {}ms, annotate+encode {}ms",
            frame.width(),
            frame.height(),
            scale.get(),
            grab_ms,
            encode_ms
        );

        Ok(capture)
    }
}

/// Owns one recording run. Constructed and torn down by the entry point.
pub struct CaptureSession {
    config: CaptureConfig,
    grabber: Arc<dyn ScreenGrabber>,
    geometry: Arc<dyn DisplayGeometry>,
    state: SessionState,
    recording: Option<Arc<Recording>>,
    last_accepted: Option<Instant>,
    /// Buttons currently down, with the instant their press was seen.
    held_buttons: HashMap<PointerButton, Instant>,
    in_flight: Vec<JoinHandle<()>>,
}

impl CaptureSession {
    pub fn new(
        config: CaptureConfig,
        grabber: Arc<dyn ScreenGrabber>,
        geometry: Arc<dyn DisplayGeometry>,
    ) -> Self {
        Self {
            config,
            grabber,
            geometry,
            state: SessionState::Idle,
            recording: None,
            last_accepted: None,
            held_buttons: HashMap::new(),
            in_flight: Vec::new(),
        }
    }

    /// A session backed by the real primary display.
    pub fn for_primary_display(config: CaptureConfig) -> Self {
        let screen = Arc::new(XcapScreen);
        Self::new(config, screen.clone(), screen)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_dir(&self) -> Option<&Path> {
        self.recording.as_ref().map(|r| r.dir.path())
    }

    /// Captures committed so far, in sequence order.
    pub fn captures(&self) -> Vec<Capture> {
        self.recording
            .as_ref()
            .map(|r| r.snapshot())
            .unwrap_or_default()
    }

    /// Creates the session directory and begins accepting clicks.
    ///
    /// Only valid from `Idle`; later calls are ignored. On a storage
    /// failure the session stays `Idle`.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            log::warn!("[SESSION] start() ignored in state {:?}", self.state);
            return Ok(());
        }

        let started_at = Local::now();
        let dir = SessionDir::create(&self.config.output_root, &started_at)?;
        log::debug!("[SESSION] Created {}", dir.path().display());

        self.recording = Some(Arc::new(Recording {
            started_at,
            dir,
            capture_log: Mutex::new(CaptureLog {
                next_sequence: 1,
                captures: Vec::new(),
            }),
            pending_ids: AtomicU64::new(0),
            grabber: Arc::clone(&self.grabber),
            geometry: Arc::clone(&self.geometry),
        }));
        self.last_accepted = None;
        self.state = SessionState::Capturing;
        Ok(())
    }

    /// Handles a pointer event delivered now.
    pub fn on_click(&mut self, event: PointerEvent) -> ClickOutcome {
        self.on_click_at(event, Instant::now())
    }

    /// Handles a pointer event delivered at `now`.
    ///
    /// Must be called from within a tokio runtime. The rate-limit clock is
    /// advanced here, before the capture runs, so a second click inside the
    /// interval is rejected even while the first is still being written.
    pub fn on_click_at(&mut self, event: PointerEvent, now: Instant) -> ClickOutcome {
        let is_press_edge = match event.state {
            ButtonState::Pressed => self.press_edge(event.button, now),
            ButtonState::Released => {
                self.held_buttons.remove(&event.button);
                false
            }
        };

        if !is_press_edge || self.state != SessionState::Capturing {
            return ClickOutcome::Ignored;
        }
        let Some(recording) = self.recording.as_ref().map(Arc::clone) else {
            return ClickOutcome::Ignored;
        };

        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < self.config.min_capture_interval {
                log::debug!("[SESSION] Click too fast, skipping");
                return ClickOutcome::RateLimited;
            }
        }
        self.last_accepted = Some(now);

        self.in_flight.retain(|handle| !handle.is_finished());
        let click = event.position;
        self.in_flight
            .push(tokio::task::spawn_blocking(move || recording.capture(click)));

        ClickOutcome::Dispatched
    }

    /// Records a press and reports whether it is a new edge.
    ///
    /// A repeated press for a held button is swallowed, unless the button
    /// has been held past `STUCK_BUTTON_TIMEOUT`, in which case its release
    /// was missed and the press counts again.
    fn press_edge(&mut self, button: PointerButton, now: Instant) -> bool {
        match self.held_buttons.insert(button, now) {
            None => true,
            Some(pressed_at)
                if now.saturating_duration_since(pressed_at) >= STUCK_BUTTON_TIMEOUT =>
            {
                log::debug!("[SESSION] {:?} release was missed, re-arming", button);
                true
            }
            Some(pressed_at) => {
                // Keep the original press time so a stuck button still times out.
                self.held_buttons.insert(button, pressed_at);
                log::debug!("[SESSION] {:?} press ignored, button still held", button);
                false
            }
        }
    }

    /// Stops accepting clicks, waits for in-flight captures and writes the
    /// tutorial page if anything was captured.
    ///
    /// Returns `None` unless the session was `Capturing`, so repeated calls
    /// never rewrite the page.
    pub async fn stop(&mut self) -> Result<Option<SessionSummary>, SessionError> {
        if self.state != SessionState::Capturing {
            return Ok(None);
        }
        self.state = SessionState::Finalized;

        self.wait_for_captures().await;

        let Some(recording) = self.recording.as_ref() else {
            return Ok(None);
        };
        let captures = recording.snapshot();

        let tutorial = if captures.is_empty() {
            log::debug!("[SESSION] Finalized with no captures");
            None
        } else {
            log::debug!("[SESSION] Finalized with {} captures", captures.len());
            let html = tutorial::render(&captures, &recording.started_at, &Local::now());
            let path = recording.dir.write_tutorial(&html)?;
            log::debug!("[TUTORIAL] Wrote {}", path.display());
            Some(path)
        };

        Ok(Some(SessionSummary {
            session_dir: recording.dir.path().to_path_buf(),
            capture_count: captures.len(),
            tutorial,
        }))
    }

    /// Waits for every dispatched capture to finish, without changing state.
    pub async fn wait_for_captures(&mut self) {
        let pending = std::mem::take(&mut self.in_flight);
        let unfinished = pending.iter().filter(|h| !h.is_finished()).count();
        if unfinished > 0 {
            log::info!("[SESSION] Waiting for {} in-flight capture(s)", unfinished);
        }

        for handle in pending {
            if let Err(e) = handle.await {
                log::error!("[CAPTURE] {}", CaptureError::WorkerFailed(e.to_string()));
            }
        }
    }
}
