//! Fill classification: how much of a bubble's disk is ink.

use bubblescan_core::BinaryMask;

use crate::types::Mark;

/// Fraction of the mark's circular footprint that is foreground in `mask`.
///
/// Returns `0.0` when the footprint is empty (mark entirely outside the mask).
pub fn fill_ratio(mask: &BinaryMask, mark: &Mark) -> f32 {
    let (footprint, ink) = mask.disk_coverage(mark.center.x, mark.center.y, mark.radius);
    if footprint == 0 {
        return 0.0;
    }
    ink as f32 / footprint as f32
}

/// `true` when the ink fraction is strictly above `threshold`.
#[inline]
pub fn is_filled(mask: &BinaryMask, mark: &Mark, threshold: f32) -> bool {
    fill_ratio(mask, mark) > threshold
}

/// Resolve `filled` on every mark in place.
pub fn classify_marks(mask: &BinaryMask, marks: &mut [Mark], threshold: f32) {
    for mark in marks.iter_mut() {
        mark.filled = is_filled(mask, mark, threshold);
    }
}

/// Marks whose footprint is filled, in their original order.
pub fn filled_marks(mask: &BinaryMask, marks: &[Mark], threshold: f32) -> Vec<Mark> {
    marks
        .iter()
        .filter(|m| is_filled(mask, m, threshold))
        .map(|m| Mark {
            filled: true,
            ..*m
        })
        .collect()
}
