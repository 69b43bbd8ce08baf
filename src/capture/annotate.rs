//! Click marker drawing — functional core.
//!
//! This module has zero infrastructure dependencies.
//! It takes a frame and a logical click position, and paints a
//! downward-pointing arrow whose tip sits on the clicked pixel.

use super::geometry::ScaleFactor;
use image::{Rgba, RgbaImage};

pub const MARKER_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

const SHAFT_LENGTH: u32 = 60;
const SHAFT_WIDTH: u32 = 4;
const HEAD_HALF_WIDTH: u32 = 12;
const HEAD_HEIGHT: u32 = 16;

/// Inclusive pixel rectangle, possibly extending past the frame edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Bounds {
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Arrow geometry in physical pixel space, already scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowMarker {
    pub apex: (i64, i64),
    pub shaft_length: i64,
    pub shaft_width: i64,
    pub head_half_width: i64,
    pub head_height: i64,
}

impl ArrowMarker {
    /// Builds the marker for a logical click on a `width` x `height` frame.
    ///
    /// The scaled apex is clamped onto the frame so edge clicks still get a
    /// visible tip. Returns `None` for an empty frame.
    pub fn for_click(x: i32, y: i32, scale: ScaleFactor, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let ax = scale.apply(x as i64).clamp(0, width as i64 - 1);
        let ay = scale.apply(y as i64).clamp(0, height as i64 - 1);

        Some(Self {
            apex: (ax, ay),
            shaft_length: scale.length(SHAFT_LENGTH),
            shaft_width: scale.length(SHAFT_WIDTH),
            head_half_width: scale.length(HEAD_HALF_WIDTH),
            head_height: scale.length(HEAD_HEIGHT),
        })
    }

    /// Horizontal extent of the shaft, centred on the apex column.
    fn shaft_columns(&self) -> (i64, i64) {
        let left = self.apex.0 - self.shaft_width / 2;
        (left, left + self.shaft_width - 1)
    }

    /// Every pixel the marker may touch lies inside these bounds.
    pub fn bounds(&self) -> Bounds {
        let (ax, ay) = self.apex;
        let (shaft_left, shaft_right) = self.shaft_columns();
        Bounds {
            left: shaft_left.min(ax - self.head_half_width),
            top: ay - self.shaft_length.max(self.head_height),
            right: shaft_right.max(ax + self.head_half_width),
            bottom: ay,
        }
    }

    pub fn draw(&self, image: &mut RgbaImage) {
        let (ax, ay) = self.apex;

        let (shaft_left, shaft_right) = self.shaft_columns();
        for row in (ay - self.shaft_length)..=ay {
            fill_span(image, row, shaft_left, shaft_right);
        }

        // Head: widest at its base, narrowing to a single pixel at the apex.
        for dy in 0..=self.head_height {
            let half = (self.head_half_width * dy + self.head_height / 2) / self.head_height;
            fill_span(image, ay - dy, ax - half, ax + half);
        }
    }
}

/// Paints the inclusive span `[left, right]` of `row`, clipped to the frame.
fn fill_span(image: &mut RgbaImage, row: i64, left: i64, right: i64) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    if row < 0 || row >= height {
        return;
    }
    let left = left.max(0);
    let right = right.min(width - 1);
    for x in left..=right {
        image.put_pixel(x as u32, row as u32, MARKER_COLOR);
    }
}

/// Draws the click marker onto `image` in place.
///
/// Out-of-range clicks are clamped, never rejected. Returns the marker that
/// was drawn, or `None` if the frame is empty.
pub fn annotate(image: &mut RgbaImage, x: i32, y: i32, scale: ScaleFactor) -> Option<ArrowMarker> {
    let marker = ArrowMarker::for_click(x, y, scale, image.width(), image.height())?;
    marker.draw(image);
    Some(marker)
}
