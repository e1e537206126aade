use bubblescan_core::{min_enclosing_circle, polygon_area, BinaryMask};
use imageproc::contours::{find_contours, BorderType, Contour};
use nalgebra::Point2;

use crate::types::{Mark, MarkDetectorParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Find circular blobs in `mask`.
///
/// Only outermost borders are considered (holes and blobs nested inside other
/// blobs are ignored). A border becomes a [`Mark`] when its polygon area and
/// the radius of its minimal enclosing circle both fall strictly inside the
/// configured bounds. Marks come back unclassified, in contour order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask, params), fields(width = mask.width, height = mask.height))
)]
pub fn detect_marks(mask: &BinaryMask, params: &MarkDetectorParams) -> Vec<Mark> {
    if mask.width == 0 || mask.height == 0 {
        return Vec::new();
    }
    let Some(bitmap) =
        image::GrayImage::from_raw(mask.width as u32, mask.height as u32, mask.data.clone())
    else {
        return Vec::new();
    };

    let contours = find_contours::<i32>(&bitmap);
    let mut out = Vec::new();
    for contour in contours.iter().filter(|c| is_external(c)) {
        let points = contour_points(contour);
        let area = polygon_area(&points);
        if !params.accepts_area(area) {
            continue;
        }
        let Some(circle) = min_enclosing_circle(&points) else {
            continue;
        };
        if !params.accepts_radius(circle.radius) {
            continue;
        }
        out.push(Mark {
            center: circle.center,
            radius: circle.radius,
            area,
            filled: false,
        });
    }

    log::debug!(
        "{} external contours, {} accepted as marks",
        contours.iter().filter(|c| is_external(c)).count(),
        out.len()
    );
    out
}

fn is_external(contour: &Contour<i32>) -> bool {
    contour.border_type == BorderType::Outer && contour.parent.is_none()
}

fn contour_points(contour: &Contour<i32>) -> Vec<Point2<f32>> {
    contour
        .points
        .iter()
        .map(|p| Point2::new(p.x as f32, p.y as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint_disk(mask: &mut BinaryMask, cx: i32, cy: i32, r: i32) {
        for y in cy - r..=cy + r {
            for x in cx - r..=cx + r {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r * r && x >= 0 && y >= 0 {
                    mask.set(x as usize, y as usize);
                }
            }
        }
    }

    fn paint_block(mask: &mut BinaryMask, x0: usize, y0: usize, side: usize) {
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.set(x, y);
            }
        }
    }

    #[test]
    fn empty_mask_has_no_marks() {
        let mask = BinaryMask::empty(32, 32);
        assert!(detect_marks(&mask, &MarkDetectorParams::ADVANCED).is_empty());
        let zero = BinaryMask::empty(0, 0);
        assert!(detect_marks(&zero, &MarkDetectorParams::ADVANCED).is_empty());
    }

    #[test]
    fn disk_is_detected_near_its_centre() {
        let mut mask = BinaryMask::empty(40, 40);
        paint_disk(&mut mask, 20, 18, 7);
        let marks = detect_marks(&mask, &MarkDetectorParams::ADVANCED);
        assert_eq!(marks.len(), 1);
        let m = marks[0];
        assert!((m.x() - 20.0).abs() < 0.5, "x = {}", m.x());
        assert!((m.y() - 18.0).abs() < 0.5, "y = {}", m.y());
        assert!((m.radius - 7.0).abs() < 0.5, "r = {}", m.radius);
        assert!(!m.filled);
    }

    #[test]
    fn specks_and_large_blobs_are_rejected() {
        let mut mask = BinaryMask::empty(120, 120);
        paint_block(&mut mask, 2, 2, 2);
        paint_block(&mut mask, 50, 50, 60);
        paint_disk(&mut mask, 20, 30, 6);
        let marks = detect_marks(&mask, &MarkDetectorParams::ADVANCED);
        assert_eq!(marks.len(), 1);
        assert!((marks[0].x() - 20.0).abs() < 0.5);
    }

    #[test]
    fn area_bounds_exclude_the_boundary_value() {
        // a 6x6 block traces a 5x5 border polygon: area exactly 25
        let mut mask = BinaryMask::empty(20, 20);
        paint_block(&mut mask, 5, 5, 6);
        let mut params = MarkDetectorParams {
            min_area: 25.0,
            max_area: 100.0,
            min_radius: 0.5,
            max_radius: 10.0,
            ..MarkDetectorParams::BASIC
        };
        assert!(detect_marks(&mask, &params).is_empty());
        params.min_area = 24.9;
        let marks = detect_marks(&mask, &params);
        assert_eq!(marks.len(), 1);
        assert!((marks[0].area - 25.0).abs() < 1e-4);
        params.max_area = 25.0;
        assert!(detect_marks(&mask, &params).is_empty());
    }

    #[test]
    fn accepted_marks_respect_every_bound() {
        let mut mask = BinaryMask::empty(400, 60);
        for (i, r) in [2, 3, 5, 8, 12, 16, 22].into_iter().enumerate() {
            paint_disk(&mut mask, 30 + i as i32 * 50, 28, r);
        }
        for params in [MarkDetectorParams::BASIC, MarkDetectorParams::ADVANCED] {
            for m in detect_marks(&mask, &params) {
                assert!(params.min_area < m.area && m.area < params.max_area);
                assert!(params.min_radius < m.radius && m.radius < params.max_radius);
            }
        }
    }

    #[test]
    fn hollow_ring_yields_one_outer_mark() {
        let mut mask = BinaryMask::empty(40, 40);
        paint_disk(&mut mask, 20, 20, 8);
        // punch the interior back out, leaving a 2px ring
        for y in 0..40 {
            for x in 0..40 {
                let (dx, dy) = (x as i32 - 20, y as i32 - 20);
                if dx * dx + dy * dy <= 36 {
                    mask.data[y * 40 + x] = 0;
                }
            }
        }
        let marks = detect_marks(&mask, &MarkDetectorParams::ADVANCED);
        assert_eq!(marks.len(), 1);
        assert!((marks[0].radius - 8.0).abs() < 0.5);
    }
}
