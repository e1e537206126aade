use bubblescan_core::{binarize, BinaryMask, GrayImageView};

use crate::detect::detect_marks;
use crate::fill::classify_marks;
use crate::types::{DetectionProfile, Mark, MarkDetectorParams};

/// Everything one detection pass produces for a box.
#[derive(Clone, Debug)]
pub struct MarkScan {
    pub mask: BinaryMask,
    /// All accepted marks, with `filled` resolved.
    pub marks: Vec<Mark>,
}

impl MarkScan {
    pub fn filled(&self) -> Vec<Mark> {
        self.marks.iter().copied().filter(|m| m.filled).collect()
    }

    pub fn filled_count(&self) -> usize {
        self.marks.iter().filter(|m| m.filled).count()
    }
}

/// Binarize, detect and classify with one parameter set.
#[derive(Clone, Debug)]
pub struct MarkDetector {
    params: MarkDetectorParams,
}

impl MarkDetector {
    pub fn new(params: MarkDetectorParams) -> Self {
        Self { params }
    }

    pub fn from_profile(profile: &DetectionProfile) -> Self {
        Self::new(profile.params())
    }

    pub fn params(&self) -> &MarkDetectorParams {
        &self.params
    }

    pub fn binarize(&self, region: &GrayImageView<'_>) -> BinaryMask {
        binarize(region, self.params.threshold)
    }

    /// Detect marks on an existing mask and resolve their fill state.
    pub fn scan_mask(&self, mask: BinaryMask) -> MarkScan {
        let mut marks = detect_marks(&mask, &self.params);
        classify_marks(&mask, &mut marks, self.params.fill_ratio);
        MarkScan { mask, marks }
    }

    /// Full pass over a cropped grayscale region.
    pub fn scan(&self, region: &GrayImageView<'_>) -> MarkScan {
        let mask = self.binarize(region);
        self.scan_mask(mask)
    }
}
