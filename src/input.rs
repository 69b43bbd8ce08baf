//! Global pointer listener using the `rdev` crate.
//!
//! rdev reports button presses without a position, so the listener keeps
//! the last cursor location from move events and stamps it onto each
//! press/release. Events are forwarded over a channel; the receiving side
//! owns the session.
//!
//! On macOS the terminal needs Accessibility permission, otherwise the
//! listener starts but never sees a click.

use crate::session::{ButtonState, ClickPoint, PointerButton, PointerEvent};
use rdev::{Button, EventType};
use tokio::sync::mpsc::UnboundedSender;

/// Tracks the cursor and turns raw rdev events into `PointerEvent`s.
#[derive(Debug, Default)]
pub struct PointerTracker {
    position: (f64, f64),
}

impl PointerTracker {
    pub fn translate(&mut self, event: &EventType) -> Option<PointerEvent> {
        let (button, state) = match *event {
            EventType::MouseMove { x, y } => {
                self.position = (x, y);
                return None;
            }
            EventType::ButtonPress(button) => (button, ButtonState::Pressed),
            EventType::ButtonRelease(button) => (button, ButtonState::Released),
            _ => return None,
        };

        Some(PointerEvent {
            position: ClickPoint::from_f64(self.position.0, self.position.1),
            button: map_button(button),
            state,
        })
    }
}

fn map_button(button: Button) -> PointerButton {
    match button {
        Button::Left => PointerButton::Left,
        Button::Right => PointerButton::Right,
        Button::Middle => PointerButton::Middle,
        Button::Unknown(code) => PointerButton::Other(code),
    }
}

/// Starts the OS-level listener on a dedicated thread.
///
/// `rdev::listen` blocks for the life of the process, so the thread is
/// detached. If the receiver goes away, events are dropped silently.
pub fn spawn_listener(tx: UnboundedSender<PointerEvent>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("pointer-listener".into())
        .spawn(move || {
            log::info!("[INPUT] Global pointer listener started");
            let mut tracker = PointerTracker::default();
            let result = rdev::listen(move |event| {
                if let Some(pointer) = tracker.translate(&event.event_type) {
                    let _ = tx.send(pointer);
                }
            });
            if let Err(e) = result {
                log::error!("[INPUT] Global pointer listener failed: {:?}", e);
            }
        })?;
    Ok(())
}
