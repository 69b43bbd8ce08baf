use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Lifecycle of a recording session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Finalized,
}

/// Pointer position in logical screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickPoint {
    pub x: i32,
    pub y: i32,
}

impl ClickPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds a listener's floating-point position to whole points.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// One press or release delivered by the global input listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub position: ClickPoint,
    pub button: PointerButton,
    pub state: ButtonState,
}

impl PointerEvent {
    pub fn press(x: i32, y: i32, button: PointerButton) -> Self {
        Self {
            position: ClickPoint::new(x, y),
            button,
            state: ButtonState::Pressed,
        }
    }

    pub fn release(x: i32, y: i32, button: PointerButton) -> Self {
        Self {
            position: ClickPoint::new(x, y),
            button,
            state: ButtonState::Released,
        }
    }
}

/// A committed screenshot. Immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// 1-based, contiguous within a session.
    pub sequence: u32,
    pub file_name: String,
    pub path: PathBuf,
    pub captured_at: DateTime<Local>,
    pub click: ClickPoint,
}

/// What `stop()` reports back to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_dir: PathBuf,
    pub capture_count: usize,
    /// `None` when nothing was captured and no page was written.
    pub tutorial: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_positions_round_to_nearest_point() {
        assert_eq!(ClickPoint::from_f64(10.4, 19.6), ClickPoint::new(10, 20));
        assert_eq!(ClickPoint::from_f64(-3.5, 0.0), ClickPoint::new(-4, 0));
    }
}
