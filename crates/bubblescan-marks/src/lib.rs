//! Bubble detection for optical-mark sheets.
//!
//! Pipeline per box:
//! - binarize the cropped region with the profile's cutoff (ink = foreground),
//! - trace outer contours and keep the ones whose area and enclosing-circle
//!   radius fall inside the profile bounds,
//! - resample each kept disk and mark it filled when enough of it is ink.

pub mod detect;
pub mod detector;
pub mod fill;
mod types;

pub use detect::detect_marks;
pub use detector::{MarkDetector, MarkScan};
pub use fill::{classify_marks, fill_ratio, filled_marks, is_filled};
pub use types::{DetectionProfile, Mark, MarkDetectorParams};
