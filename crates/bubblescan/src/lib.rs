//! High-level facade for the `bubblescan-*` workspace.
//!
//! This crate provides:
//! - re-exports of the underlying crates (`core`, `marks`, `grid`, `score`),
//! - [`SheetTemplate`], the JSON-configurable geometry of a sheet design,
//! - the single-sheet pipeline ([`read_sheet`], [`grade_sheet`]),
//! - folder grading ([`run_batch`]),
//! - stage observers, including a PNG debug dump.
//!
//! ## Quickstart
//!
//! ```no_run
//! use bubblescan::{grade_sheet, NoopObserver, SheetTemplate};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let template = SheetTemplate::default();
//! let graded = grade_sheet(
//!     Path::new("sheet.png"),
//!     Path::new("sheet.csv"),
//!     &template,
//!     &mut NoopObserver,
//! )?;
//! println!(
//!     "{}: {}/{}",
//!     graded.score.record.roll_number,
//!     graded.score.record.obtained_marks,
//!     graded.score.record.total_marks
//! );
//! # Ok(())
//! # }
//! ```

pub use bubblescan_core as core;
pub use bubblescan_grid as grid;
pub use bubblescan_marks as marks;
pub use bubblescan_score as score;

pub mod batch;
pub mod observer;
pub mod pipeline;
pub mod template;

pub use batch::{
    pair_files, run_batch, BatchError, BatchResult, MissingMember, SheetFailure, SheetPair,
    SkippedStem,
};
pub use observer::{DebugDumpObserver, NoopObserver, StageObserver};
pub use pipeline::{grade_sheet, load_gray, read_sheet, GradedSheet, SheetError, SheetReading};
pub use template::{AnswerBox, RollBox, SheetTemplate, TemplateError};
