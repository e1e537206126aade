//! Single-sheet pipeline: crop, binarize, detect, classify, decode, score.

use std::path::{Path, PathBuf};

use bubblescan_core::{crop, GrayImage, Region};
use bubblescan_grid::{decode_answers, decode_roll_number, DetectionResult, RollNumber};
use bubblescan_marks::{DetectionProfile, MarkDetector, MarkScan};
use bubblescan_score::{score, AnswerKey, AnswerKeyError, SheetScore};
use serde::Serialize;

use crate::observer::StageObserver;
use crate::template::{SheetTemplate, TemplateError};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum SheetError {
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    AnswerKey(#[from] AnswerKeyError),
}

/// Decoded content of one sheet, before scoring.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SheetReading {
    pub roll_number: RollNumber,
    /// Answers of every box, merged.
    pub answers: DetectionResult,
}

/// A sheet read and scored against its key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradedSheet {
    pub reading: SheetReading,
    pub score: SheetScore,
}

/// Decode a raster file to 8-bit gray.
pub fn load_gray(path: &Path) -> Result<GrayImage, SheetError> {
    let img = image::open(path).map_err(|source| SheetError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(from_luma(img.to_luma8()))
}

/// Take ownership of an `image::GrayImage` as the core raster type.
pub fn from_luma(img: image::GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    GrayImage {
        width: width as usize,
        height: height as usize,
        data: img.into_raw(),
    }
}

fn scan_box(
    image: &GrayImage,
    name: &str,
    region: &Region,
    profile: &DetectionProfile,
    observer: &mut dyn StageObserver,
) -> MarkScan {
    let clamped = region.clamp_to(image.width, image.height);
    if clamped != *region {
        log::warn!("box {name}: region {region:?} clamped to image bounds as {clamped:?}");
    }
    let cropped = crop(&image.view(), *region);
    observer.region(name, &cropped);

    let detector = MarkDetector::from_profile(profile);
    let mask = detector.binarize(&cropped.view());
    observer.mask(name, &mask);

    let scan = detector.scan_mask(mask);
    observer.marks(name, &cropped, &scan.marks);
    log::debug!(
        "box {name} ({} profile): {} marks, {} filled",
        profile.name(),
        scan.marks.len(),
        scan.filled_count()
    );
    scan
}

/// Read the roll number and every answer box of a loaded sheet.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image, template, observer), fields(width = image.width, height = image.height))
)]
pub fn read_sheet(
    image: &GrayImage,
    template: &SheetTemplate,
    observer: &mut dyn StageObserver,
) -> Result<SheetReading, SheetError> {
    template.validate()?;

    let roll_scan = scan_box(
        image,
        "roll",
        &template.roll.region,
        &template.roll.profile,
        observer,
    );
    let roll_number = decode_roll_number(&roll_scan.filled(), &template.roll.layout);

    let mut answers = DetectionResult::new();
    for (i, b) in template.answer_boxes.iter().enumerate() {
        let name = SheetTemplate::answer_box_name(i);
        let scan = scan_box(image, &name, &b.region, &b.profile, observer);
        let decoded = decode_answers(&scan.marks, &scan.filled(), &b.layout).map_err(|source| {
            TemplateError::Layout {
                name: name.clone(),
                source,
            }
        })?;
        answers.merge(decoded);
    }

    log::info!(
        "roll number {roll_number}, {} questions decoded",
        answers.len()
    );
    Ok(SheetReading {
        roll_number,
        answers,
    })
}

/// Load `image_path` and `key_path`, read the sheet and score it.
///
/// The key is loaded before the image is decoded, so a broken key fails fast.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(template, observer), fields(image = %image_path.display()))
)]
pub fn grade_sheet(
    image_path: &Path,
    key_path: &Path,
    template: &SheetTemplate,
    observer: &mut dyn StageObserver,
) -> Result<GradedSheet, SheetError> {
    let key = AnswerKey::load_csv(key_path)?;
    let image = load_gray(image_path)?;
    let reading = read_sheet(&image, template, observer)?;
    let score = score(&reading.answers, &key, &reading.roll_number.to_string());
    Ok(GradedSheet { reading, score })
}
