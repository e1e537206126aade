//! Roll-number grid: one digit per column, picked by the filled bubble's row.

use std::collections::BTreeMap;
use std::fmt;

use bubblescan_marks::Mark;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::policy::{ConflictPolicy, Resolution, Resolver};

/// Character written for a column rejected under [`ConflictPolicy::Reject`].
pub const CONFLICT_DIGIT: &str = "?";

fn default_digit() -> String {
    "0".to_string()
}

/// Static geometry of a roll-number grid, in box coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RollNumberLayout {
    /// `N + 1` ascending x boundaries for `N` columns; column `i` is
    /// `[bounds[i], bounds[i + 1])`.
    pub column_bounds: Vec<f32>,
    /// Reference y of each digit row.
    pub row_ys: Vec<f32>,
    /// Label per row; empty means `"0"`, `"1"`, ... by row index.
    #[serde(default)]
    pub row_labels: Vec<String>,
    /// Columns that always emit a literal instead of a decoded digit.
    #[serde(default)]
    pub fixed_columns: BTreeMap<usize, String>,
    /// Emitted for a column with no matching bubble.
    #[serde(default = "default_digit")]
    pub default_digit: String,
    #[serde(default)]
    pub conflict: ConflictPolicy,
}

impl RollNumberLayout {
    pub fn new(column_bounds: Vec<f32>, row_ys: Vec<f32>) -> Self {
        Self {
            column_bounds,
            row_ys,
            row_labels: Vec::new(),
            fixed_columns: BTreeMap::new(),
            default_digit: default_digit(),
            conflict: ConflictPolicy::default(),
        }
    }

    pub fn with_fixed_column(mut self, column: usize, literal: impl Into<String>) -> Self {
        self.fixed_columns.insert(column, literal.into());
        self
    }

    pub fn column_count(&self) -> usize {
        self.column_bounds.len().saturating_sub(1)
    }

    /// Maximum |y - row_y| for a bubble to belong to a row: half the spacing
    /// of the first two rows, rounded down to whole pixels.
    pub fn row_tolerance(&self) -> f32 {
        match self.row_ys.as_slice() {
            [a, b, ..] => ((b - a) / 2.0).floor(),
            _ => 0.0,
        }
    }

    pub fn row_label(&self, row: usize) -> String {
        self.row_labels
            .get(row)
            .cloned()
            .unwrap_or_else(|| row.to_string())
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.column_bounds.len() < 2 {
            return Err(LayoutError::TooFewColumns(self.column_bounds.len()));
        }
        if self.column_bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LayoutError::UnorderedColumns);
        }
        if self.row_ys.len() < 2 {
            return Err(LayoutError::TooFewRows(self.row_ys.len()));
        }
        if self.row_ys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LayoutError::UnorderedRows);
        }
        if !self.row_labels.is_empty() && self.row_labels.len() != self.row_ys.len() {
            return Err(LayoutError::LabelCount {
                labels: self.row_labels.len(),
                rows: self.row_ys.len(),
            });
        }
        Ok(())
    }
}

/// Decoded roll number, one entry per column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollNumber {
    pub columns: Vec<String>,
}

impl RollNumber {
    pub fn as_string(&self) -> String {
        self.columns.concat()
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.columns {
            f.write_str(c)?;
        }
        Ok(())
    }
}

/// Map filled bubbles to one label per column.
///
/// Bubbles are placed by their [`Mark::pixel`] centre. Each bubble inside a
/// column is assigned to the first reference row within
/// [`RollNumberLayout::row_tolerance`]; the column's digit is then chosen
/// among its bubbles by the layout's [`ConflictPolicy`]. Columns without a
/// matching bubble get `default_digit`.
pub fn decode_roll_number(filled: &[Mark], layout: &RollNumberLayout) -> RollNumber {
    let tolerance = layout.row_tolerance();
    let mut columns = Vec::with_capacity(layout.column_count());

    for (col, bounds) in layout.column_bounds.windows(2).enumerate() {
        if let Some(literal) = layout.fixed_columns.get(&col) {
            columns.push(literal.clone());
            continue;
        }
        let (start, end) = (bounds[0], bounds[1]);

        let mut resolver = Resolver::new(layout.conflict);
        for (_, y) in filled
            .iter()
            .map(Mark::pixel)
            .filter(|&(x, _)| start <= x && x < end)
        {
            let row = layout
                .row_ys
                .iter()
                .position(|&row_y| (y - row_y).abs() <= tolerance);
            if let Some(row) = row {
                resolver.offer(&layout.row_label(row));
            }
        }

        columns.push(match resolver.resolve() {
            Resolution::Picked(label) => label,
            Resolution::Empty => layout.default_digit.clone(),
            Resolution::Conflict => CONFLICT_DIGIT.to_string(),
        });
    }

    let roll = RollNumber { columns };
    log::debug!("roll number decoded as {roll}");
    roll
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> RollNumberLayout {
        RollNumberLayout::new(
            vec![0.0, 40.0, 80.0, 120.0],
            (0..10).map(|i| 10.0 + 20.0 * i as f32).collect(),
        )
        .with_fixed_column(2, "P")
    }

    fn filled(x: f32, y: f32) -> Mark {
        Mark {
            filled: true,
            ..Mark::new(x, y, 6.0)
        }
    }

    #[test]
    fn fixed_column_and_default_digit() {
        // column 0: row 5 (y = 110); column 1: bubble far from any row
        let marks = [filled(20.0, 111.0), filled(60.0, 500.0), filled(100.0, 30.0)];
        let roll = decode_roll_number(&marks, &layout());
        assert_eq!(roll.columns, vec!["5", "0", "P"]);
        assert_eq!(roll.to_string(), "50P");
        assert_eq!(roll.as_string(), "50P");
    }

    #[test]
    fn tolerance_is_half_the_first_spacing() {
        let l = layout();
        assert_eq!(l.row_tolerance(), 10.0);
        // exactly on the tolerance still matches row 0, just past it does not
        assert_eq!(decode_roll_number(&[filled(5.0, 20.0)], &l).columns[0], "0");
        assert_eq!(decode_roll_number(&[filled(5.0, 40.0)], &l).columns[0], "1");
        let odd = RollNumberLayout::new(vec![0.0, 10.0], vec![0.0, 21.0]);
        assert_eq!(odd.row_tolerance(), 10.0);
    }

    #[test]
    fn fractional_centres_are_truncated_to_pixels() {
        // y = 40.9 reads as 40, on row 1's tolerance edge rather than row 2
        let roll = decode_roll_number(&[filled(39.5, 40.9)], &layout());
        assert_eq!(roll.columns, vec!["1", "0", "P"]);
    }

    #[test]
    fn column_bounds_are_half_open() {
        let marks = [filled(40.0, 70.0)];
        let roll = decode_roll_number(&marks, &layout());
        assert_eq!(roll.columns, vec!["0", "3", "P"]);
    }

    #[test]
    fn conflict_policies() {
        let marks = [filled(10.0, 30.0), filled(12.0, 150.0)];
        let mut l = layout();
        assert_eq!(decode_roll_number(&marks, &l).columns[0], "7");
        l.conflict = ConflictPolicy::FirstMatch;
        assert_eq!(decode_roll_number(&marks, &l).columns[0], "1");
        l.conflict = ConflictPolicy::Reject;
        assert_eq!(decode_roll_number(&marks, &l).columns[0], CONFLICT_DIGIT);
    }

    #[test]
    fn custom_labels() {
        let mut l = RollNumberLayout::new(vec![0.0, 50.0], vec![10.0, 30.0, 50.0]);
        l.row_labels = vec!["X".into(), "Y".into(), "Z".into()];
        assert!(l.validate().is_ok());
        assert_eq!(decode_roll_number(&[filled(25.0, 48.0)], &l).to_string(), "Z");
    }

    #[test]
    fn validation() {
        assert_eq!(
            RollNumberLayout::new(vec![0.0], vec![0.0, 1.0]).validate(),
            Err(LayoutError::TooFewColumns(1))
        );
        assert_eq!(
            RollNumberLayout::new(vec![0.0, 5.0, 5.0], vec![0.0, 1.0]).validate(),
            Err(LayoutError::UnorderedColumns)
        );
        assert_eq!(
            RollNumberLayout::new(vec![0.0, 5.0], vec![0.0]).validate(),
            Err(LayoutError::TooFewRows(1))
        );
        let mut l = layout();
        l.row_labels = vec!["a".into()];
        assert!(matches!(l.validate(), Err(LayoutError::LabelCount { .. })));
        assert!(layout().validate().is_ok());
    }
}
