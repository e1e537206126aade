//! Answer grid: equal-height row bands, labeled column ranges.

use bubblescan_marks::Mark;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::policy::{ConflictPolicy, Resolution, Resolver};
use crate::result::{DetectedAnswer, DetectionResult};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Horizontal interval `[start, end]` (inclusive) mapped to an option label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub label: String,
    pub start: f32,
    pub end: f32,
}

impl ColumnRange {
    pub fn new(label: impl Into<String>, start: f32, end: f32) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    #[inline]
    pub fn contains(&self, x: f32) -> bool {
        self.start <= x && x <= self.end
    }
}

/// Where the vertical extent of the question rows comes from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RowSpan {
    /// From the topmost to the bottommost detected bubble.
    #[default]
    Observed,
    /// Fixed box coordinates.
    Fixed { top: f32, bottom: f32 },
    /// Observed when at least two bubbles were detected, fixed otherwise.
    ObservedOrFixed { top: f32, bottom: f32 },
}

impl RowSpan {
    /// `(top, bottom)` for the given detections, if the strategy can provide one.
    pub fn resolve(&self, marks: &[Mark]) -> Option<(f32, f32)> {
        match *self {
            RowSpan::Observed => observed_span(marks),
            RowSpan::Fixed { top, bottom } => Some((top, bottom)),
            RowSpan::ObservedOrFixed { top, bottom } => {
                if marks.len() >= 2 {
                    observed_span(marks)
                } else {
                    Some((top, bottom))
                }
            }
        }
    }

    fn fixed_bounds(&self) -> Option<(f32, f32)> {
        match *self {
            RowSpan::Observed => None,
            RowSpan::Fixed { top, bottom } | RowSpan::ObservedOrFixed { top, bottom } => {
                Some((top, bottom))
            }
        }
    }
}

fn observed_span(marks: &[Mark]) -> Option<(f32, f32)> {
    let mut ys: Vec<f32> = marks.iter().map(|m| m.pixel().1).collect();
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some((*ys.first()?, *ys.last()?))
}

/// One question row: `[y_start, y_end]`, inclusive on both ends.
///
/// Neighbouring bands share their boundary value, so a bubble sitting exactly
/// on it belongs to both.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowBand {
    pub index: usize,
    pub y_start: f32,
    pub y_end: f32,
}

impl RowBand {
    #[inline]
    pub fn contains(&self, y: f32) -> bool {
        self.y_start <= y && y <= self.y_end
    }
}

/// Split `[top, bottom]` into `total_rows` contiguous equal-height bands.
pub fn row_bands(top: f32, bottom: f32, total_rows: usize) -> Vec<RowBand> {
    if total_rows == 0 {
        return Vec::new();
    }
    let height = (bottom - top) / total_rows as f32;
    (0..total_rows)
        .map(|i| RowBand {
            index: i,
            y_start: top + i as f32 * height,
            y_end: if i + 1 == total_rows {
                bottom
            } else {
                top + (i + 1) as f32 * height
            },
        })
        .collect()
}

/// Static layout of one answer box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerBoxLayout {
    /// Option ranges, scanned in this order.
    pub options: Vec<ColumnRange>,
    pub total_rows: usize,
    /// Question number of the first band.
    pub start_question: u32,
    #[serde(default)]
    pub row_span: RowSpan,
    #[serde(default)]
    pub conflict: ConflictPolicy,
}

impl AnswerBoxLayout {
    pub fn new(options: Vec<ColumnRange>, total_rows: usize, start_question: u32) -> Self {
        Self {
            options,
            total_rows,
            start_question,
            row_span: RowSpan::default(),
            conflict: ConflictPolicy::default(),
        }
    }

    /// One past the last question number, or `None` when it does not fit in
    /// a `u32`.
    pub fn end_question(&self) -> Option<u32> {
        u32::try_from(self.total_rows)
            .ok()
            .and_then(|rows| self.start_question.checked_add(rows))
    }

    /// Question numbers covered by this box, cut short at `u32::MAX` for a
    /// layout that fails [`validate`](Self::validate).
    pub fn questions(&self) -> std::ops::Range<u32> {
        self.start_question..self.end_question().unwrap_or(u32::MAX)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.options.is_empty() {
            return Err(LayoutError::MissingColumnRanges);
        }
        if self.total_rows == 0 {
            return Err(LayoutError::ZeroRows);
        }
        if self.start_question == 0 {
            return Err(LayoutError::ZeroStartQuestion);
        }
        if self.end_question().is_none() {
            return Err(LayoutError::QuestionOverflow {
                start: self.start_question,
                rows: self.total_rows,
            });
        }
        if let Some(r) = self.options.iter().find(|r| r.start > r.end) {
            return Err(LayoutError::InvertedRange {
                label: r.label.clone(),
                start: r.start,
                end: r.end,
            });
        }
        if let Some((top, bottom)) = self.row_span.fixed_bounds() {
            if top.partial_cmp(&bottom) != Some(std::cmp::Ordering::Less) {
                return Err(LayoutError::InvalidSpan { top, bottom });
            }
        }
        Ok(())
    }
}

/// Map filled bubbles of one box to an answer per question.
///
/// `all` (every detected bubble, filled or not) fixes the vertical span when
/// the layout uses [`RowSpan::Observed`]; `filled` are the bubbles that count
/// as answers. Bubbles are placed by their [`Mark::pixel`] centre. Every
/// band produces an entry, so the result always covers `layout.questions()`;
/// rows without a matching bubble hold [`DetectedAnswer::NoAnswer`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(all, filled, layout), fields(start = layout.start_question))
)]
pub fn decode_answers(
    all: &[Mark],
    filled: &[Mark],
    layout: &AnswerBoxLayout,
) -> Result<DetectionResult, LayoutError> {
    if layout.options.is_empty() {
        return Err(LayoutError::MissingColumnRanges);
    }
    if layout.end_question().is_none() {
        return Err(LayoutError::QuestionOverflow {
            start: layout.start_question,
            rows: layout.total_rows,
        });
    }

    let Some((top, bottom)) = layout.row_span.resolve(all) else {
        log::debug!(
            "no bubbles to span questions {:?}; every row is unanswered",
            layout.questions()
        );
        return Ok(layout
            .questions()
            .map(|q| (q, DetectedAnswer::NoAnswer))
            .collect());
    };

    let mut result = DetectionResult::new();
    let bands = row_bands(top, bottom, layout.total_rows);
    for (question, band) in layout.questions().zip(bands) {
        let mut resolver = Resolver::new(layout.conflict);
        for (x, _) in filled
            .iter()
            .map(Mark::pixel)
            .filter(|&(_, y)| band.contains(y))
        {
            for option in layout.options.iter().filter(|o| o.contains(x)) {
                resolver.offer(&option.label);
            }
        }
        let answer = match resolver.resolve() {
            Resolution::Picked(label) => DetectedAnswer::Marked(label),
            Resolution::Empty => DetectedAnswer::NoAnswer,
            Resolution::Conflict => DetectedAnswer::Conflict,
        };
        result.insert(question, answer);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<ColumnRange> {
        vec![
            ColumnRange::new("A", 0.0, 19.0),
            ColumnRange::new("B", 20.0, 39.0),
            ColumnRange::new("C", 40.0, 59.0),
            ColumnRange::new("D", 60.0, 79.0),
        ]
    }

    /// Four bubbles per row at y = 10, 40, 70; `picks` are (row, column).
    fn grid(picks: &[(usize, usize)]) -> (Vec<Mark>, Vec<Mark>) {
        let mut all = Vec::new();
        let mut filled = Vec::new();
        for row in 0..3 {
            for col in 0..4 {
                let mut m = Mark::new(10.0 + 20.0 * col as f32, 10.0 + 30.0 * row as f32, 6.0);
                if picks.contains(&(row, col)) {
                    m.filled = true;
                    filled.push(m);
                }
                all.push(m);
            }
        }
        (all, filled)
    }

    fn marked(s: &str) -> DetectedAnswer {
        DetectedAnswer::Marked(s.to_string())
    }

    #[test]
    fn three_bands_with_one_empty_row() {
        let (all, filled) = grid(&[(0, 1), (1, 3)]);
        let layout = AnswerBoxLayout::new(options(), 3, 1);
        let res = decode_answers(&all, &filled, &layout).expect("decode");
        assert_eq!(res.len(), 3);
        assert_eq!(res.get(1), Some(&marked("B")));
        assert_eq!(res.get(2), Some(&marked("D")));
        assert_eq!(res.get(3), Some(&DetectedAnswer::NoAnswer));
    }

    #[test]
    fn start_question_offsets_numbering() {
        let (all, filled) = grid(&[(2, 0)]);
        let layout = AnswerBoxLayout::new(options(), 3, 21);
        let res = decode_answers(&all, &filled, &layout).expect("decode");
        let questions: Vec<u32> = res.iter().map(|(q, _)| q).collect();
        assert_eq!(questions, vec![21, 22, 23]);
        assert_eq!(res.get(23), Some(&marked("A")));
    }

    #[test]
    fn bands_cover_the_observed_span() {
        let bands = row_bands(10.0, 70.0, 3);
        assert_eq!(bands.len(), 3);
        assert_eq!((bands[0].y_start, bands[0].y_end), (10.0, 30.0));
        assert_eq!((bands[1].y_start, bands[1].y_end), (30.0, 50.0));
        assert_eq!(bands[2].y_end, 70.0);
        assert!(bands[0].contains(30.0) && bands[1].contains(30.0));
        assert!(row_bands(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn no_marks_means_no_answers() {
        let layout = AnswerBoxLayout::new(options(), 4, 11);
        let res = decode_answers(&[], &[], &layout).expect("decode");
        assert_eq!(res.len(), 4);
        assert!(res.iter().all(|(_, a)| *a == DetectedAnswer::NoAnswer));
    }

    #[test]
    fn fixed_span_survives_a_missing_extreme_row() {
        // only the top two rows were detected at all
        let (all, filled) = grid(&[(0, 2)]);
        let all: Vec<Mark> = all.into_iter().filter(|m| m.y() < 50.0).collect();

        let mut layout = AnswerBoxLayout::new(options(), 3, 1);
        layout.row_span = RowSpan::Fixed {
            top: 0.0,
            bottom: 90.0,
        };
        let res = decode_answers(&all, &filled, &layout).expect("decode");
        assert_eq!(res.get(1), Some(&marked("C")));
        assert_eq!(res.get(3), Some(&DetectedAnswer::NoAnswer));

        layout.row_span = RowSpan::ObservedOrFixed {
            top: 0.0,
            bottom: 90.0,
        };
        assert_eq!(layout.row_span.resolve(&all), Some((10.0, 40.0)));
        assert_eq!(layout.row_span.resolve(&all[..1]), Some((0.0, 90.0)));
    }

    #[test]
    fn later_marks_overwrite_under_last_match() {
        let (all, filled) = grid(&[(1, 0), (1, 2)]);
        let mut layout = AnswerBoxLayout::new(options(), 3, 1);
        let res = decode_answers(&all, &filled, &layout).expect("decode");
        assert_eq!(res.get(2), Some(&marked("C")));

        layout.conflict = ConflictPolicy::FirstMatch;
        let res = decode_answers(&all, &filled, &layout).expect("decode");
        assert_eq!(res.get(2), Some(&marked("A")));

        layout.conflict = ConflictPolicy::Reject;
        let res = decode_answers(&all, &filled, &layout).expect("decode");
        assert_eq!(res.get(2), Some(&DetectedAnswer::Conflict));
        assert_eq!(res.get(1), Some(&DetectedAnswer::NoAnswer));
    }

    #[test]
    fn filled_mark_outside_every_range_is_ignored() {
        let all = vec![Mark::new(10.0, 10.0, 5.0), Mark::new(200.0, 40.0, 5.0)];
        let filled = vec![all[1]];
        let layout = AnswerBoxLayout::new(options(), 1, 1);
        let res = decode_answers(&all, &filled, &layout).expect("decode");
        assert_eq!(res.get(1), Some(&DetectedAnswer::NoAnswer));
    }

    #[test]
    fn missing_column_ranges_is_an_error() {
        let layout = AnswerBoxLayout::new(Vec::new(), 3, 1);
        assert_eq!(
            decode_answers(&[], &[], &layout),
            Err(LayoutError::MissingColumnRanges)
        );
        assert_eq!(layout.validate(), Err(LayoutError::MissingColumnRanges));
    }

    #[test]
    fn validation_catches_bad_layouts() {
        assert_eq!(
            AnswerBoxLayout::new(options(), 0, 1).validate(),
            Err(LayoutError::ZeroRows)
        );
        assert_eq!(
            AnswerBoxLayout::new(options(), 3, 0).validate(),
            Err(LayoutError::ZeroStartQuestion)
        );
        let inverted = AnswerBoxLayout::new(vec![ColumnRange::new("A", 5.0, 1.0)], 3, 1);
        assert!(matches!(
            inverted.validate(),
            Err(LayoutError::InvertedRange { .. })
        ));
        let mut span = AnswerBoxLayout::new(options(), 3, 1);
        span.row_span = RowSpan::Fixed {
            top: 50.0,
            bottom: 50.0,
        };
        assert!(matches!(span.validate(), Err(LayoutError::InvalidSpan { .. })));
    }

    #[test]
    fn half_pixel_centres_fall_into_integer_ranges() {
        let options = vec![
            ColumnRange::new("A", 0.0, 750.0),
            ColumnRange::new("B", 751.0, 790.0),
            ColumnRange::new("C", 791.0, 820.0),
        ];
        let all = vec![
            Mark::new(750.5, 20.5, 6.0),
            Mark::new(790.5, 50.5, 6.0),
            Mark::new(820.5, 80.5, 6.0),
        ];
        let filled: Vec<Mark> = all.iter().map(|m| Mark { filled: true, ..*m }).collect();
        let layout = AnswerBoxLayout::new(options, 3, 1);
        let res = decode_answers(&all, &filled, &layout).expect("decode");
        assert_eq!(res.get(1), Some(&marked("A")));
        assert_eq!(res.get(2), Some(&marked("B")));
        assert_eq!(res.get(3), Some(&marked("C")));
    }

    #[test]
    fn question_numbers_past_u32_max_are_rejected() {
        let layout = AnswerBoxLayout::new(options(), 10, u32::MAX - 3);
        let err = LayoutError::QuestionOverflow {
            start: u32::MAX - 3,
            rows: 10,
        };
        assert_eq!(layout.end_question(), None);
        assert_eq!(layout.validate(), Err(err.clone()));
        assert_eq!(decode_answers(&[], &[], &layout), Err(err));
        assert_eq!(layout.questions(), u32::MAX - 3..u32::MAX);

        let last = AnswerBoxLayout::new(options(), 3, u32::MAX - 3);
        assert_eq!(last.validate(), Ok(()));
        assert_eq!(last.questions().count(), 3);
    }

    #[test]
    fn layout_deserializes_with_defaults() {
        let json = r#"{
            "options": [{"label": "A", "start": 0, "end": 60}],
            "total_rows": 10,
            "start_question": 11
        }"#;
        let layout: AnswerBoxLayout = serde_json::from_str(json).expect("parse");
        assert_eq!(layout.row_span, RowSpan::Observed);
        assert_eq!(layout.conflict, ConflictPolicy::LastMatch);
        assert_eq!(layout.questions(), 11..21);
    }
}
