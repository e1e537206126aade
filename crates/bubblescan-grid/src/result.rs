use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Text written for a question whose row has no filled bubble.
pub const NO_ANSWER: &str = "No answer detected";
/// Text written for a question rejected under [`ConflictPolicy::Reject`](crate::ConflictPolicy).
pub const MULTIPLE_ANSWERS: &str = "Multiple answers detected";

/// Decoded state of one question row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedAnswer {
    Marked(String),
    NoAnswer,
    Conflict,
}

impl DetectedAnswer {
    pub fn as_str(&self) -> &str {
        match self {
            DetectedAnswer::Marked(label) => label,
            DetectedAnswer::NoAnswer => NO_ANSWER,
            DetectedAnswer::Conflict => MULTIPLE_ANSWERS,
        }
    }

    /// `true` only for a marked option equal to `expected`.
    pub fn matches(&self, expected: &str) -> bool {
        matches!(self, DetectedAnswer::Marked(label) if label == expected)
    }
}

impl fmt::Display for DetectedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question number -> decoded answer, for one box or a whole sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    answers: BTreeMap<u32, DetectedAnswer>,
}

impl DetectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: u32, answer: DetectedAnswer) {
        self.answers.insert(question, answer);
    }

    pub fn get(&self, question: u32) -> Option<&DetectedAnswer> {
        self.answers.get(&question)
    }

    /// Detected answer for `question`, treating a missing entry as no answer.
    pub fn answer_or_sentinel(&self, question: u32) -> DetectedAnswer {
        self.get(question)
            .cloned()
            .unwrap_or(DetectedAnswer::NoAnswer)
    }

    /// Merge another box's answers; later boxes win on overlapping numbers.
    pub fn merge(&mut self, other: DetectionResult) {
        self.answers.extend(other.answers);
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &DetectedAnswer)> {
        self.answers.iter().map(|(q, a)| (*q, a))
    }
}

impl FromIterator<(u32, DetectedAnswer)> for DetectionResult {
    fn from_iter<I: IntoIterator<Item = (u32, DetectedAnswer)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_never_matches_a_key() {
        assert!(DetectedAnswer::Marked("B".into()).matches("B"));
        assert!(!DetectedAnswer::Marked("B".into()).matches("C"));
        assert!(!DetectedAnswer::NoAnswer.matches(NO_ANSWER));
        assert_eq!(DetectedAnswer::NoAnswer.to_string(), "No answer detected");
        assert_eq!(DetectedAnswer::Conflict.to_string(), MULTIPLE_ANSWERS);
    }

    #[test]
    fn merge_keeps_disjoint_ranges() {
        let mut a: DetectionResult = [(1, DetectedAnswer::Marked("A".into()))]
            .into_iter()
            .collect();
        let b: DetectionResult = [(11, DetectedAnswer::NoAnswer)].into_iter().collect();
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.answer_or_sentinel(11), DetectedAnswer::NoAnswer);
        assert_eq!(a.answer_or_sentinel(42), DetectedAnswer::NoAnswer);
    }
}
