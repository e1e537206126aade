/// Invalid grid layout configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("answer box has no column ranges configured")]
    MissingColumnRanges,
    #[error("total_rows must be > 0")]
    ZeroRows,
    #[error("start_question must be >= 1")]
    ZeroStartQuestion,
    #[error("questions {start}.. over {rows} rows run past u32::MAX")]
    QuestionOverflow { start: u32, rows: usize },
    #[error("column range {label:?} is inverted (start={start}, end={end})")]
    InvertedRange { label: String, start: f32, end: f32 },
    #[error("fixed row span needs top < bottom (top={top}, bottom={bottom})")]
    InvalidSpan { top: f32, bottom: f32 },
    #[error("roll-number grid needs at least 2 column boundaries, got {0}")]
    TooFewColumns(usize),
    #[error("roll-number column boundaries must be strictly increasing")]
    UnorderedColumns,
    #[error("roll-number grid needs at least 2 reference rows, got {0}")]
    TooFewRows(usize),
    #[error("roll-number reference rows must be strictly increasing")]
    UnorderedRows,
    #[error("{labels} row labels for {rows} reference rows")]
    LabelCount { labels: usize, rows: usize },
}
