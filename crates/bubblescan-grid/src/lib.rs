//! Grid decoding: turn detected bubbles into roll-number digits and answers.
//!
//! Two layouts are supported:
//! - [`RollNumberLayout`]: fixed column boundaries and reference row
//!   positions; each column yields one digit (or a literal).
//! - [`AnswerBoxLayout`]: the vertical span of the box is split into equal
//!   question bands, and labeled x ranges name the options.
//!
//! Both resolve cells with more than one filled bubble via [`ConflictPolicy`].

mod answer;
mod error;
mod policy;
mod result;
mod roll;

pub use answer::{decode_answers, row_bands, AnswerBoxLayout, ColumnRange, RowBand, RowSpan};
pub use error::LayoutError;
pub use policy::ConflictPolicy;
pub use result::{DetectedAnswer, DetectionResult, MULTIPLE_ANSWERS, NO_ANSWER};
pub use roll::{decode_roll_number, RollNumber, RollNumberLayout, CONFLICT_DIGIT};
