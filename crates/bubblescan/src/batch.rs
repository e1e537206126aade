//! Folder grading: pair images with keys by file stem and grade each pair.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bubblescan_score::{write_batch_report, ReportError, ScoreRecord};
use serde::Serialize;

use crate::observer::StageObserver;
use crate::pipeline::grade_sheet;
use crate::template::SheetTemplate;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Raster extensions accepted as sheet images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];
/// Extension of answer-key files.
pub const KEY_EXTENSION: &str = "csv";

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("the specified folder does not exist: {0}")]
    MissingDirectory(PathBuf),
    #[error("failed to list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// An image and the key it is graded against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SheetPair {
    pub stem: String,
    pub image: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMember {
    Image,
    Key,
}

/// A stem that had only one of its two files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedStem {
    pub stem: String,
    pub missing: MissingMember,
}

/// A pair whose grading failed; the rest of the batch went on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SheetFailure {
    pub stem: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// One record per successfully graded pair, in stem order.
    pub records: Vec<ScoreRecord>,
    pub skipped: Vec<SkippedStem>,
    pub failures: Vec<SheetFailure>,
}

impl BatchResult {
    /// Write `summary_results_<stamp>.csv` into `dir`.
    pub fn write_summary(&self, dir: &Path, stamp: &str) -> Result<PathBuf, BatchError> {
        Ok(write_batch_report(dir, &self.records, stamp)?)
    }
}

#[derive(Default)]
struct StemFiles {
    image: Option<PathBuf>,
    key: Option<PathBuf>,
}

fn is_image(ext: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Group the files of `dir` by stem into complete pairs and incomplete stems.
///
/// Files with other extensions and subdirectories are ignored. When a stem
/// has several images, the first in file-name order is used.
pub fn pair_files(dir: &Path) -> Result<(Vec<SheetPair>, Vec<SkippedStem>), BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::MissingDirectory(dir.to_path_buf()));
    }
    let io_err = |source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut stems: BTreeMap<String, StemFiles> = BTreeMap::new();
    for path in paths {
        let (Some(stem), Some(ext)) = (path.file_stem(), path.extension()) else {
            continue;
        };
        let (Some(stem), Some(ext)) = (stem.to_str(), ext.to_str()) else {
            log::warn!("skipping {}: name is not valid UTF-8", path.display());
            continue;
        };
        let slot = if ext.eq_ignore_ascii_case(KEY_EXTENSION) {
            &mut stems.entry(stem.to_string()).or_default().key
        } else if is_image(ext) {
            &mut stems.entry(stem.to_string()).or_default().image
        } else {
            continue;
        };
        if let Some(kept) = slot {
            log::warn!(
                "stem {stem}: ignoring {} (already using {})",
                path.display(),
                kept.display()
            );
            continue;
        }
        *slot = Some(path.clone());
    }

    let mut pairs = Vec::new();
    let mut skipped = Vec::new();
    for (stem, files) in stems {
        match (files.image, files.key) {
            (Some(image), Some(key)) => pairs.push(SheetPair { stem, image, key }),
            (Some(_), None) => skipped.push(SkippedStem {
                stem,
                missing: MissingMember::Key,
            }),
            (None, _) => skipped.push(SkippedStem {
                stem,
                missing: MissingMember::Image,
            }),
        }
    }
    Ok((pairs, skipped))
}

/// Grade every complete pair in `dir`.
///
/// Only a missing or unreadable directory is fatal. Incomplete stems are
/// skipped and sheets that fail to grade are recorded as [`SheetFailure`]s.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(template, observer), fields(dir = %dir.display()))
)]
pub fn run_batch(
    dir: &Path,
    template: &SheetTemplate,
    observer: &mut dyn StageObserver,
) -> Result<BatchResult, BatchError> {
    let (pairs, skipped) = pair_files(dir)?;
    for s in &skipped {
        log::warn!("missing pair for {}: no {:?} file", s.stem, s.missing);
    }
    log::info!(
        "processing {} sheet pairs from {}",
        pairs.len(),
        dir.display()
    );

    let mut result = BatchResult {
        skipped,
        ..BatchResult::default()
    };
    for pair in pairs {
        log::info!(
            "processing {} with {}",
            pair.image.display(),
            pair.key.display()
        );
        observer.begin_sheet(&pair.stem);
        match grade_sheet(&pair.image, &pair.key, template, observer) {
            Ok(graded) => result.records.push(graded.score.record),
            Err(e) => {
                log::error!("sheet {} failed: {e}", pair.stem);
                result.failures.push(SheetFailure {
                    stem: pair.stem,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(result)
}
