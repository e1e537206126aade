//! Sheet templates: where the boxes are and how to read them.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use bubblescan_core::Region;
use bubblescan_grid::{AnswerBoxLayout, ColumnRange, LayoutError, RollNumberLayout};
use bubblescan_marks::{DetectionProfile, MarkDetectorParams};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("failed to access template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("box {name:?}: {source}")]
    Layout {
        name: String,
        #[source]
        source: LayoutError,
    },
    #[error("box {0:?} has an empty region")]
    EmptyRegion(String),
    #[error("box {name:?}: {reason}")]
    Profile { name: String, reason: String },
    #[error("template has no answer boxes")]
    NoAnswerBoxes,
    #[error("question {0} is covered by more than one answer box")]
    OverlappingQuestions(u32),
}

/// Roll-number box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RollBox {
    pub region: Region,
    pub layout: RollNumberLayout,
    #[serde(default = "basic_profile")]
    pub profile: DetectionProfile,
}

/// One answer box; boxes cover disjoint question ranges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerBox {
    pub region: Region,
    pub layout: AnswerBoxLayout,
    #[serde(default)]
    pub profile: DetectionProfile,
}

fn basic_profile() -> DetectionProfile {
    DetectionProfile::Basic
}

/// Full geometry of one printed sheet design.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetTemplate {
    pub roll: RollBox,
    pub answer_boxes: Vec<AnswerBox>,
}

impl Default for SheetTemplate {
    /// The classic 30-question sheet with a seven-column roll number.
    fn default() -> Self {
        let roll_layout = RollNumberLayout::new(
            vec![40.0, 80.0, 120.0, 160.0, 200.0, 240.0, 280.0, 320.0],
            vec![
                50.0, 70.0, 90.0, 110.0, 130.0, 150.0, 170.0, 190.0, 207.0, 230.0,
            ],
        )
        .with_fixed_column(2, "P");

        let answer_box = |region: Region, bounds: [(f32, f32); 4], start_question: u32| {
            let options = ["A", "B", "C", "D"]
                .iter()
                .zip(bounds)
                .map(|(label, (start, end))| ColumnRange::new(*label, start, end))
                .collect();
            AnswerBox {
                region,
                layout: AnswerBoxLayout::new(options, 10, start_question),
                profile: DetectionProfile::Advanced,
            }
        };

        Self {
            roll: RollBox {
                region: Region::new(670, 250, 1000, 490),
                layout: roll_layout,
                profile: DetectionProfile::Basic,
            },
            answer_boxes: vec![
                answer_box(
                    Region::new(0, 580, 860, 900),
                    [(0.0, 750.0), (751.0, 790.0), (791.0, 820.0), (821.0, 850.0)],
                    1,
                ),
                answer_box(
                    Region::new(860, 580, 1035, 1100),
                    [(0.0, 60.0), (61.0, 90.0), (91.0, 130.0), (131.0, 160.0)],
                    11,
                ),
                answer_box(
                    Region::new(1035, 580, 1600, 1100),
                    [(0.0, 60.0), (61.0, 100.0), (101.0, 140.0), (141.0, 180.0)],
                    21,
                ),
            ],
        }
    }
}

impl SheetTemplate {
    /// Name used in logs, errors and debug dumps for answer box `index`.
    pub fn answer_box_name(index: usize) -> String {
        format!("answers_{}", index + 1)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let template: SheetTemplate = serde_json::from_str(&text)?;
        template.validate()?;
        Ok(template)
    }

    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TemplateError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        check_box("roll", &self.roll.region, &self.roll.profile)?;
        self.roll
            .layout
            .validate()
            .map_err(|source| TemplateError::Layout {
                name: "roll".into(),
                source,
            })?;

        if self.answer_boxes.is_empty() {
            return Err(TemplateError::NoAnswerBoxes);
        }
        let mut seen = BTreeSet::new();
        for (i, b) in self.answer_boxes.iter().enumerate() {
            let name = Self::answer_box_name(i);
            check_box(&name, &b.region, &b.profile)?;
            b.layout
                .validate()
                .map_err(|source| TemplateError::Layout {
                    name: name.clone(),
                    source,
                })?;
            if let Some(q) = b.layout.questions().find(|q| !seen.insert(*q)) {
                return Err(TemplateError::OverlappingQuestions(q));
            }
        }
        Ok(())
    }
}

fn check_box(name: &str, region: &Region, profile: &DetectionProfile) -> Result<(), TemplateError> {
    if region.is_empty() {
        return Err(TemplateError::EmptyRegion(name.to_string()));
    }
    check_params(&profile.params()).map_err(|reason| TemplateError::Profile {
        name: name.to_string(),
        reason,
    })
}

fn check_params(p: &MarkDetectorParams) -> Result<(), String> {
    if !(p.min_area < p.max_area) {
        return Err(format!(
            "area bounds must satisfy min < max (got {} .. {})",
            p.min_area, p.max_area
        ));
    }
    if !(p.min_radius >= 0.0 && p.min_radius < p.max_radius) {
        return Err(format!(
            "radius bounds must satisfy 0 <= min < max (got {} .. {})",
            p.min_radius, p.max_radius
        ));
    }
    if !(0.0..=1.0).contains(&p.fill_ratio) {
        return Err(format!("fill_ratio must be in [0, 1] (got {})", p.fill_ratio));
    }
    Ok(())
}
