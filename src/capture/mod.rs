//! Screen capture domain — public API.
//!
//! This module owns grabbing the screen, resolving the display scale and
//! drawing the click marker. External code should only use the items
//! exported here.

mod annotate;
mod geometry;
mod screenshot;

pub use annotate::{annotate, ArrowMarker, Bounds, MARKER_COLOR};
pub use geometry::{resolve_scale, DisplayGeometry, GeometryError, ScaleFactor};
pub use screenshot::{capture_primary_monitor, CaptureError, ScreenGrabber, XcapScreen};
