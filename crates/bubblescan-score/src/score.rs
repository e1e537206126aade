use bubblescan_grid::{DetectedAnswer, DetectionResult};
use serde::{Deserialize, Serialize};

use crate::key::AnswerKey;

/// Per-sheet summary: one row of the summary and batch reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub roll_number: String,
    pub total_marks: usize,
    pub obtained_marks: usize,
}

/// One key question compared against the detection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_no: u32,
    pub correct_answer: String,
    pub detected_answer: DetectedAnswer,
    pub is_correct: bool,
}

/// Summary plus the detailed per-question table, in key order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetScore {
    pub record: ScoreRecord,
    pub details: Vec<QuestionScore>,
}

/// Compare `detected` to `key`.
///
/// Only key questions are scored; a key question missing from the detection
/// counts as unanswered. A sentinel answer never matches.
pub fn score(detected: &DetectionResult, key: &AnswerKey, roll_number: &str) -> SheetScore {
    let details: Vec<QuestionScore> = key
        .iter()
        .map(|(question_no, correct)| {
            let detected_answer = detected.answer_or_sentinel(question_no);
            QuestionScore {
                question_no,
                correct_answer: correct.to_string(),
                is_correct: detected_answer.matches(correct),
                detected_answer,
            }
        })
        .collect();

    let record = ScoreRecord {
        roll_number: roll_number.to_string(),
        total_marks: details.len(),
        obtained_marks: details.iter().filter(|d| d.is_correct).count(),
    };
    log::info!(
        "roll {}: {}/{} correct",
        record.roll_number,
        record.obtained_marks,
        record.total_marks
    );
    SheetScore { record, details }
}
