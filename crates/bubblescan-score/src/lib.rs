//! Grading of decoded sheets.
//!
//! - [`AnswerKey`]: the `question_no,answer` table a sheet is scored against.
//! - [`score`]: per-question comparison plus total/obtained marks.
//! - [`report`]: the detailed, summary and batch CSV files.

mod key;
pub mod report;
mod score;
mod table;

pub use key::{AnswerKey, AnswerKeyError, ANSWER_COLUMN, QUESTION_COLUMN};
pub use report::{
    write_batch_report, write_detailed, write_sheet_reports, write_summary, ReportError,
    SheetReportPaths,
};
pub use score::{score, QuestionScore, ScoreRecord, SheetScore};
