//! Display geometry — the ratio between logical pointer coordinates and
//! the physical pixels of a captured frame.
//!
//! On high-density displays one logical point covers several physical
//! pixels, so a click at (100, 200) lands at (200, 400) in a 2x frame.

use super::screenshot::{self, XcapScreen};

/// Logical-to-physical pixel ratio. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub const IDENTITY: ScaleFactor = ScaleFactor(1.0);

    pub fn new(value: f64) -> Result<Self, GeometryError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(GeometryError::InvalidFactor(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Maps a logical coordinate into physical pixel space: `round(v * scale)`.
    pub fn apply(self, value: i64) -> i64 {
        (value as f64 * self.0).round() as i64
    }

    /// Scales a fixed marker dimension, never shrinking it below one pixel.
    pub fn length(self, base: u32) -> i64 {
        ((base as f64 * self.0).round() as i64).max(1)
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Platform query for the current display scale.
pub trait DisplayGeometry: Send + Sync {
    fn scale_factor(&self) -> Result<ScaleFactor, GeometryError>;
}

impl DisplayGeometry for XcapScreen {
    fn scale_factor(&self) -> Result<ScaleFactor, GeometryError> {
        let monitor =
            screenshot::primary_monitor().map_err(|e| GeometryError::QueryFailed(e.to_string()))?;
        let factor = monitor
            .scale_factor()
            .map_err(|e| GeometryError::QueryFailed(e.to_string()))?;
        ScaleFactor::new(factor as f64)
    }
}

/// Resolves the scale for one capture.
///
/// Annotation is cosmetic, so a failed query degrades to no scaling
/// instead of aborting the capture.
pub fn resolve_scale(geometry: &dyn DisplayGeometry) -> ScaleFactor {
    match geometry.scale_factor() {
        Ok(scale) => scale,
        Err(e) => {
            log::warn!("[CAPTURE] {} — assuming scale 1.0", e);
            ScaleFactor::IDENTITY
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Display geometry query failed: {0}")]
    QueryFailed(String),

    #[error("Display reported an invalid scale factor: {0}")]
    InvalidFactor(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl DisplayGeometry for Broken {
        fn scale_factor(&self) -> Result<ScaleFactor, GeometryError> {
            Err(GeometryError::QueryFailed("no display".into()))
        }
    }

    struct Retina;

    impl DisplayGeometry for Retina {
        fn scale_factor(&self) -> Result<ScaleFactor, GeometryError> {
            ScaleFactor::new(2.0)
        }
    }

    #[test]
    fn failed_query_falls_back_to_identity() {
        assert_eq!(resolve_scale(&Broken), ScaleFactor::IDENTITY);
    }

    #[test]
    fn successful_query_is_passed_through() {
        assert_eq!(resolve_scale(&Retina).get(), 2.0);
    }

    #[test]
    fn rejects_non_positive_and_non_finite_factors() {
        assert!(ScaleFactor::new(0.0).is_err());
        assert!(ScaleFactor::new(-1.5).is_err());
        assert!(ScaleFactor::new(f64::NAN).is_err());
        assert!(ScaleFactor::new(f64::INFINITY).is_err());
    }

    #[test]
    fn apply_rounds_to_nearest_pixel() {
        let scale = ScaleFactor::new(1.5).unwrap();
        assert_eq!(scale.apply(101), 152);
        assert_eq!(ScaleFactor::new(2.0).unwrap().apply(100), 200);
    }

    #[test]
    fn length_never_collapses_to_zero() {
        let tiny = ScaleFactor::new(0.01).unwrap();
        assert_eq!(tiny.length(4), 1);
        assert_eq!(ScaleFactor::new(2.0).unwrap().length(60), 120);
    }
}
