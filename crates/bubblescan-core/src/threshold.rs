//! Fixed-cutoff binarization.
//!
//! Sheets are printed dark-on-light, so the mask is inverted: a pixel is
//! foreground (ink) when its intensity is at or below the cutoff.

use crate::image::GrayImageView;

/// Foreground value stored in a [`BinaryMask`].
pub const FOREGROUND: u8 = 255;

/// Binary raster with the same extent as the region it was built from.
///
/// Pixels are either `0` (paper) or [`FOREGROUND`] (ink).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl BinaryMask {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.data[y * self.width + x] != 0
    }

    pub fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = FOREGROUND;
        }
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Count `(footprint, foreground)` pixels inside the disk at `(cx, cy)`.
    ///
    /// A pixel belongs to the footprint when its integer coordinate lies within
    /// `radius` of the centre; pixels outside the mask are not part of it.
    pub fn disk_coverage(&self, cx: f32, cy: f32, radius: f32) -> (usize, usize) {
        if self.width == 0 || self.height == 0 || radius.is_nan() || radius < 0.0 {
            return (0, 0);
        }
        let r2 = radius * radius;
        let x0 = (cx - radius).floor().max(0.0) as usize;
        let y0 = (cy - radius).floor().max(0.0) as usize;
        let x1 = ((cx + radius).ceil().max(0.0) as usize).min(self.width - 1);
        let y1 = ((cy + radius).ceil().max(0.0) as usize).min(self.height - 1);

        let mut footprint = 0usize;
        let mut ink = 0usize;
        for y in y0..=y1 {
            let dy = y as f32 - cy;
            for x in x0..=x1 {
                let dx = x as f32 - cx;
                if dx * dx + dy * dy <= r2 {
                    footprint += 1;
                    if self.data[y * self.width + x] != 0 {
                        ink += 1;
                    }
                }
            }
        }
        (footprint, ink)
    }
}

/// Build the inverted binary mask of `src` for the given cutoff.
pub fn binarize(src: &GrayImageView<'_>, cutoff: u8) -> BinaryMask {
    let data = src
        .data
        .iter()
        .map(|&v| if v <= cutoff { FOREGROUND } else { 0 })
        .collect();
    BinaryMask {
        width: src.width,
        height: src.height,
        data,
    }
}
