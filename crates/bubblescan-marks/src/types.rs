use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One circular ink blob found inside a box.
///
/// Coordinates are relative to the cropped box, not the full sheet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub center: Point2<f32>,
    /// Radius of the minimal enclosing circle.
    pub radius: f32,
    /// Polygon area of the blob's outer border.
    pub area: f32,
    /// Resolved by the fill classifier; `false` straight out of detection.
    #[serde(default)]
    pub filled: bool,
}

impl Mark {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Point2::new(x, y),
            radius,
            area: std::f32::consts::PI * radius * radius,
            filled: false,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.center.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.center.y
    }

    /// Centre truncated to whole pixels. Grid lookups use this so a centre
    /// such as `750.5` cannot fall between integer-bounded ranges.
    #[inline]
    pub fn pixel(&self) -> (f32, f32) {
        (self.center.x.trunc(), self.center.y.trunc())
    }
}

/// Thresholds for one detection pass.
///
/// Area and radius bounds are exclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkDetectorParams {
    /// Intensity cutoff; pixels at or below it are ink.
    pub threshold: u8,
    pub min_area: f32,
    pub max_area: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// A mark is filled when its ink fraction is strictly above this.
    pub fill_ratio: f32,
}

impl MarkDetectorParams {
    /// Tight bounds for the small bubbles of a roll-number grid.
    pub const BASIC: Self = Self {
        threshold: 110,
        min_area: 35.0,
        max_area: 100.0,
        min_radius: 0.5,
        max_radius: 10.0,
        fill_ratio: 0.7,
    };

    /// Looser bounds for answer-grid bubbles.
    pub const ADVANCED: Self = Self {
        threshold: 127,
        min_area: 20.0,
        max_area: 800.0,
        min_radius: 3.0,
        max_radius: 20.0,
        fill_ratio: 0.7,
    };

    #[inline]
    pub fn accepts_area(&self, area: f32) -> bool {
        self.min_area < area && area < self.max_area
    }

    #[inline]
    pub fn accepts_radius(&self, radius: f32) -> bool {
        self.min_radius < radius && radius < self.max_radius
    }
}

impl Default for MarkDetectorParams {
    fn default() -> Self {
        Self::ADVANCED
    }
}

/// Named detection profile, so templates can say `"basic"` instead of
/// spelling out every threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionProfile {
    Basic,
    #[default]
    Advanced,
    Custom(MarkDetectorParams),
}

impl DetectionProfile {
    pub fn params(&self) -> MarkDetectorParams {
        match self {
            DetectionProfile::Basic => MarkDetectorParams::BASIC,
            DetectionProfile::Advanced => MarkDetectorParams::ADVANCED,
            DetectionProfile::Custom(p) => *p,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DetectionProfile::Basic => "basic",
            DetectionProfile::Advanced => "advanced",
            DetectionProfile::Custom(_) => "custom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_exclusive() {
        let p = MarkDetectorParams::ADVANCED;
        assert!(!p.accepts_area(20.0));
        assert!(p.accepts_area(20.5));
        assert!(!p.accepts_area(800.0));
        assert!(!p.accepts_radius(3.0));
        assert!(p.accepts_radius(3.01));
        assert!(!p.accepts_radius(20.0));
    }

    #[test]
    fn pixel_truncates_the_centre() {
        assert_eq!(Mark::new(750.5, 99.9, 6.0).pixel(), (750.0, 99.0));
        assert_eq!(Mark::new(12.0, 0.4, 6.0).pixel(), (12.0, 0.0));
    }

    #[test]
    fn profiles_round_trip_through_json() {
        let custom = DetectionProfile::Custom(MarkDetectorParams {
            threshold: 90,
            ..MarkDetectorParams::BASIC
        });
        let json = serde_json::to_string(&custom).expect("serialize");
        assert!(json.contains("\"kind\":\"custom\""));
        let back: DetectionProfile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.params().threshold, 90);

        let basic: DetectionProfile = serde_json::from_str(r#"{"kind":"basic"}"#).expect("basic");
        assert_eq!(basic.params(), MarkDetectorParams::BASIC);
    }
}
