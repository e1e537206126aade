use serde::{Deserialize, Serialize};

/// Borrowed 8-bit grayscale raster.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

/// Owned 8-bit grayscale raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl GrayImageView<'_> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}

/// Axis-aligned sheet sub-area `[x1, x2) x [y1, y2)` in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Region {
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Intersect with an image of the given size.
    pub fn clamp_to(&self, width: usize, height: usize) -> Region {
        let w = u32::try_from(width).unwrap_or(u32::MAX);
        let h = u32::try_from(height).unwrap_or(u32::MAX);
        let x1 = self.x1.min(w);
        let y1 = self.y1.min(h);
        Region {
            x1,
            y1,
            x2: self.x2.min(w).max(x1),
            y2: self.y2.min(h).max(y1),
        }
    }
}

/// Copy the pixels under `region` into a new image.
///
/// The region is clamped to the source bounds first, so a region that lies
/// partly outside yields the overlapping part and one that lies fully outside
/// yields an empty image.
pub fn crop(src: &GrayImageView<'_>, region: Region) -> GrayImage {
    let r = region.clamp_to(src.width, src.height);
    let (x1, y1) = (r.x1 as usize, r.y1 as usize);
    let w = r.width() as usize;
    let h = r.height() as usize;

    let mut out = Vec::with_capacity(w * h);
    for y in y1..y1 + h {
        let row = y * src.width;
        out.extend_from_slice(&src.data[row + x1..row + x1 + w]);
    }
    GrayImage {
        width: w,
        height: h,
        data: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> GrayImage {
        GrayImage {
            width,
            height,
            data: (0..width * height).map(|i| i as u8).collect(),
        }
    }

    #[test]
    fn crop_copies_the_requested_window() {
        let img = ramp(4, 3);
        let out = crop(&img.view(), Region::new(1, 1, 3, 3));
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.data, vec![5, 6, 9, 10]);
    }

    #[test]
    fn crop_clamps_to_image_bounds() {
        let img = ramp(4, 3);
        let out = crop(&img.view(), Region::new(2, 1, 100, 100));
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.data, vec![6, 7, 10, 11]);

        let outside = crop(&img.view(), Region::new(10, 10, 20, 20));
        assert!(outside.is_empty());
        assert!(outside.data.is_empty());
    }

    #[test]
    fn inverted_region_is_empty() {
        let r = Region::new(5, 5, 2, 2);
        assert!(r.is_empty());
        assert_eq!(r.clamp_to(10, 10).width(), 0);
    }
}
