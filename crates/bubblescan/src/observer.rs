//! Hooks into intermediate pipeline stages.
//!
//! Observers see every stage image but cannot change what the pipeline
//! computes. [`NoopObserver`] is the headless default; [`DebugDumpObserver`]
//! writes each stage to disk as PNG.

use std::fs;
use std::path::{Path, PathBuf};

use bubblescan_core::{BinaryMask, GrayImage};
use bubblescan_marks::Mark;
use image::{Luma, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;

/// Callbacks invoked after each stage of one box.
///
/// `box_name` is `"roll"` or `"answers_<n>"`.
pub trait StageObserver {
    /// A new sheet is about to be processed.
    fn begin_sheet(&mut self, _sheet: &str) {}

    /// The box was cropped out of the sheet.
    fn region(&mut self, _box_name: &str, _crop: &GrayImage) {}

    /// The crop was binarized.
    fn mask(&mut self, _box_name: &str, _mask: &BinaryMask) {}

    /// Marks were detected and classified.
    fn marks(&mut self, _box_name: &str, _crop: &GrayImage, _marks: &[Mark]) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {}

const FILLED_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const EMPTY_COLOR: Rgb<u8> = Rgb([220, 0, 0]);

/// Writes `<sheet>_<box>_{crop,mask,marks}.png` into a directory.
///
/// Write failures are logged and counted; they never abort grading.
#[derive(Debug)]
pub struct DebugDumpObserver {
    dir: PathBuf,
    sheet: String,
    written: Vec<PathBuf>,
    failures: usize,
}

impl DebugDumpObserver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sheet: "sheet".to_string(),
            written: Vec::new(),
            failures: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every file written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    fn path_for(&self, box_name: &str, stage: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}_{}.png", self.sheet, box_name, stage))
    }

    fn save<I>(&mut self, path: PathBuf, img: Option<I>)
    where
        I: ImageSave,
    {
        let result = match img {
            Some(img) => fs::create_dir_all(&self.dir)
                .map_err(image::ImageError::IoError)
                .and_then(|_| img.save_png(&path)),
            None => {
                log::warn!("debug dump {}: buffer size mismatch", path.display());
                self.failures += 1;
                return;
            }
        };
        match result {
            Ok(()) => self.written.push(path),
            Err(e) => {
                log::warn!("debug dump {} failed: {e}", path.display());
                self.failures += 1;
            }
        }
    }
}

/// Image buffers the dump can encode.
trait ImageSave {
    fn save_png(&self, path: &Path) -> image::ImageResult<()>;
}

impl ImageSave for image::GrayImage {
    fn save_png(&self, path: &Path) -> image::ImageResult<()> {
        self.save_with_format(path, image::ImageFormat::Png)
    }
}

impl ImageSave for RgbImage {
    fn save_png(&self, path: &Path) -> image::ImageResult<()> {
        self.save_with_format(path, image::ImageFormat::Png)
    }
}

fn to_luma(width: usize, height: usize, data: &[u8]) -> Option<image::GrayImage> {
    image::GrayImage::from_raw(width as u32, height as u32, data.to_vec())
}

/// Crop in gray with a circle per mark: green when filled, red otherwise.
pub fn render_marks(crop: &GrayImage, marks: &[Mark]) -> Option<RgbImage> {
    let gray = to_luma(crop.width, crop.height, &crop.data)?;
    let mut out = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let Luma([v]) = *gray.get_pixel(x, y);
        Rgb([v, v, v])
    });
    for m in marks {
        let color = if m.filled { FILLED_COLOR } else { EMPTY_COLOR };
        let center = (m.x().round() as i32, m.y().round() as i32);
        let radius = m.radius.round().max(1.0) as i32;
        draw_hollow_circle_mut(&mut out, center, radius, color);
        draw_hollow_circle_mut(&mut out, center, radius + 1, color);
    }
    Some(out)
}

impl StageObserver for DebugDumpObserver {
    fn begin_sheet(&mut self, sheet: &str) {
        self.sheet = sheet.to_string();
    }

    fn region(&mut self, box_name: &str, crop: &GrayImage) {
        if crop.is_empty() {
            return;
        }
        let path = self.path_for(box_name, "crop");
        self.save(path, to_luma(crop.width, crop.height, &crop.data));
    }

    fn mask(&mut self, box_name: &str, mask: &BinaryMask) {
        if mask.width == 0 || mask.height == 0 {
            return;
        }
        let path = self.path_for(box_name, "mask");
        self.save(path, to_luma(mask.width, mask.height, &mask.data));
    }

    fn marks(&mut self, box_name: &str, crop: &GrayImage, marks: &[Mark]) {
        if crop.is_empty() {
            return;
        }
        let path = self.path_for(box_name, "marks");
        self.save(path, render_marks(crop, marks));
    }
}
