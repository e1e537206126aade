//! CSV reports with timestamped file names.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::score::{ScoreRecord, SheetScore};
use crate::table::join_record;

pub const DETAILED_HEADER: [&str; 4] = [
    "question_no",
    "correct_answer",
    "detected_answer",
    "is_correct",
];
pub const SUMMARY_HEADER: [&str; 3] = ["Roll Number", "Total Marks", "Obtained Marks"];

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File-name stamp, e.g. `20260115_100000`.
pub fn timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn detailed_file_name(stamp: &str) -> String {
    format!("results_{stamp}.csv")
}

pub fn summary_file_name(stamp: &str) -> String {
    format!("summary_results_{stamp}.csv")
}

/// Detailed table: one row per key question, then the `Total` row.
pub fn write_detailed<W: Write>(out: &mut W, sheet: &SheetScore) -> io::Result<()> {
    writeln!(out, "{}", join_record(&DETAILED_HEADER))?;
    for d in &sheet.details {
        let question = d.question_no.to_string();
        writeln!(
            out,
            "{}",
            join_record(&[
                question.as_str(),
                d.correct_answer.as_str(),
                d.detected_answer.as_str(),
                if d.is_correct { "Yes" } else { "No" },
            ])
        )?;
    }
    writeln!(
        out,
        "{}",
        join_record(&[
            "Total".to_string(),
            sheet.record.total_marks.to_string(),
            sheet.record.obtained_marks.to_string(),
            String::new(),
        ])
    )
}

pub fn write_summary<W: Write>(out: &mut W, records: &[ScoreRecord]) -> io::Result<()> {
    writeln!(out, "{}", join_record(&SUMMARY_HEADER))?;
    for r in records {
        writeln!(
            out,
            "{}",
            join_record(&[
                r.roll_number.clone(),
                r.total_marks.to_string(),
                r.obtained_marks.to_string(),
            ])
        )?;
    }
    Ok(())
}

/// Paths written for one graded sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetReportPaths {
    pub detailed: PathBuf,
    pub summary: PathBuf,
}

/// Write `results_<stamp>.csv` and `summary_results_<stamp>.csv` into `dir`.
pub fn write_sheet_reports(
    dir: &Path,
    sheet: &SheetScore,
    stamp: &str,
) -> Result<SheetReportPaths, ReportError> {
    let detailed = dir.join(detailed_file_name(stamp));
    let summary = dir.join(summary_file_name(stamp));
    write_file(&detailed, |w| write_detailed(w, sheet))?;
    write_file(&summary, |w| {
        write_summary(w, std::slice::from_ref(&sheet.record))
    })?;
    log::info!("results saved to {}", detailed.display());
    log::info!("summary saved to {}", summary.display());
    Ok(SheetReportPaths { detailed, summary })
}

/// Write the batch summary (one row per record) into `dir`.
pub fn write_batch_report(
    dir: &Path,
    records: &[ScoreRecord],
    stamp: &str,
) -> Result<PathBuf, ReportError> {
    let path = dir.join(summary_file_name(stamp));
    write_file(&path, |w| write_summary(w, records))?;
    log::info!("batch summary ({} sheets) saved to {}", records.len(), path.display());
    Ok(path)
}

fn write_file(
    path: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    body(&mut out).map_err(io_err)?;
    out.flush().map_err(io_err)
}
