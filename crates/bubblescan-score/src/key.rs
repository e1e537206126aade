use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::table::split_record;

pub const QUESTION_COLUMN: &str = "question_no";
pub const ANSWER_COLUMN: &str = "answer";

#[derive(thiserror::Error, Debug)]
pub enum AnswerKeyError {
    #[error("failed to read answer key {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("answer key is empty (no header row)")]
    MissingHeader,
    #[error("answer key header has no {0:?} column")]
    MissingColumn(&'static str),
    #[error("line {line}: invalid question number {value:?}")]
    BadQuestion { line: usize, value: String },
    #[error("line {line}: expected {expected} fields, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Question number -> expected answer, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    entries: Vec<(u32, String)>,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the answer for `question`. A repeated question keeps its original
    /// position and takes the new answer.
    pub fn insert(&mut self, question: u32, answer: impl Into<String>) {
        let answer = answer.into();
        match self.entries.iter_mut().find(|(q, _)| *q == question) {
            Some(entry) => entry.1 = answer,
            None => self.entries.push((question, answer)),
        }
    }

    pub fn get(&self, question: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|(q, _)| *q == question)
            .map(|(_, a)| a.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(q, a)| (*q, a.as_str()))
    }

    /// Parse key-file text.
    ///
    /// The first non-blank line is the header and must name a `question_no`
    /// and an `answer` column, in any order. Blank lines are skipped.
    pub fn parse_csv(text: &str) -> Result<Self, AnswerKeyError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or(AnswerKeyError::MissingHeader)?;
        let header = split_record(header.trim_start_matches('\u{feff}'));
        let column = |name: &'static str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or(AnswerKeyError::MissingColumn(name))
        };
        let q_col = column(QUESTION_COLUMN)?;
        let a_col = column(ANSWER_COLUMN)?;

        let mut key = AnswerKey::new();
        for (line, record) in lines {
            let fields = split_record(record);
            if fields.len() != header.len() {
                return Err(AnswerKeyError::ColumnCount {
                    line,
                    expected: header.len(),
                    found: fields.len(),
                });
            }
            let question = parse_question(&fields[q_col]).ok_or_else(|| {
                AnswerKeyError::BadQuestion {
                    line,
                    value: fields[q_col].clone(),
                }
            })?;
            key.insert(question, fields[a_col].as_str());
        }
        Ok(key)
    }

    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self, AnswerKeyError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AnswerKeyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let key = Self::parse_csv(&text)?;
        log::debug!("loaded {} key entries from {}", key.len(), path.display());
        Ok(key)
    }
}

/// Positive integer, also accepting an integral float such as `3.0`.
fn parse_question(value: &str) -> Option<u32> {
    let q = match value.parse::<u32>() {
        Ok(q) => q,
        Err(_) => {
            let f = value.parse::<f64>().ok()?;
            if f.fract() != 0.0 || f < 1.0 || f > u32::MAX as f64 {
                return None;
            }
            f as u32
        }
    };
    (q > 0).then_some(q)
}

impl FromIterator<(u32, String)> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        let mut key = AnswerKey::new();
        for (q, a) in iter {
            key.insert(q, a);
        }
        key
    }
}
