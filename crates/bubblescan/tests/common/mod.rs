//! Synthetic sheets for integration tests.
//!
//! Layout (image 220 x 260, pixel coordinates):
//! - roll box (0,0)-(140,120): columns [0,40) and [40,80) with five digit
//!   rows at y = 20, 40, ..., 100; column 2 prints a literal "P".
//! - answer box (0,120)-(220,260): three question rows at box y = 20, 60,
//!   100 and options A..D centred at x = 20, 60, 100, 140.
//!
//! Every bubble position is printed as a thin ring; chosen ones are solid.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use bubblescan::core::Region;
use bubblescan::grid::{AnswerBoxLayout, ColumnRange, RollNumberLayout};
use bubblescan::marks::DetectionProfile;
use bubblescan::{AnswerBox, RollBox, SheetTemplate};
use image::{GrayImage, Luma};

pub const WIDTH: u32 = 220;
pub const HEIGHT: u32 = 260;
const PAPER: Luma<u8> = Luma([235]);
const INK: Luma<u8> = Luma([20]);

const ROLL_XS: [i32; 2] = [20, 60];
const ROLL_YS: [i32; 5] = [20, 40, 60, 80, 100];
const ROLL_RADIUS: i32 = 5;

const ANSWER_TOP: i32 = 120;
const ANSWER_XS: [i32; 4] = [20, 60, 100, 140];
const ANSWER_YS: [i32; 3] = [20, 60, 100];
const ANSWER_RADIUS: i32 = 7;

pub fn template() -> SheetTemplate {
    let roll_layout = RollNumberLayout::new(
        vec![0.0, 40.0, 80.0, 120.0],
        ROLL_YS.iter().map(|&y| y as f32).collect(),
    )
    .with_fixed_column(2, "P");
    let options = vec![
        ColumnRange::new("A", 0.0, 39.0),
        ColumnRange::new("B", 40.0, 79.0),
        ColumnRange::new("C", 80.0, 119.0),
        ColumnRange::new("D", 120.0, 159.0),
    ];
    SheetTemplate {
        roll: RollBox {
            region: Region::new(0, 0, 140, 120),
            layout: roll_layout,
            profile: DetectionProfile::Basic,
        },
        answer_boxes: vec![AnswerBox {
            region: Region::new(0, ANSWER_TOP as u32, WIDTH, HEIGHT),
            layout: AnswerBoxLayout::new(options, 3, 1),
            profile: DetectionProfile::Advanced,
        }],
    }
}

fn paint(img: &mut GrayImage, cx: i32, cy: i32, r: i32, solid: bool) {
    let inner = (r - 1) * (r - 1);
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            let d2 = (x - cx).pow(2) + (y - cy).pow(2);
            let ink = d2 <= r * r && (solid || d2 >= inner);
            if ink && x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, INK);
            }
        }
    }
}

/// `roll[c]` is the digit row filled in roll column `c`; `answers[q]` the
/// option index filled for question `q + 1`.
pub fn render(roll: [Option<usize>; 2], answers: [&[usize]; 3]) -> GrayImage {
    let mut img = GrayImage::from_pixel(WIDTH, HEIGHT, PAPER);
    for (c, &x) in ROLL_XS.iter().enumerate() {
        for (r, &y) in ROLL_YS.iter().enumerate() {
            paint(&mut img, x, y, ROLL_RADIUS, roll[c] == Some(r));
        }
    }
    for (q, &y) in ANSWER_YS.iter().enumerate() {
        for (o, &x) in ANSWER_XS.iter().enumerate() {
            paint(
                &mut img,
                x,
                ANSWER_TOP + y,
                ANSWER_RADIUS,
                answers[q].contains(&o),
            );
        }
    }
    img
}

/// The reference sheet: roll "24P", answers B, D and nothing for question 3.
pub fn reference_sheet() -> GrayImage {
    render([Some(2), Some(4)], [&[1], &[3], &[]])
}

pub const REFERENCE_KEY: &str = "question_no,answer\n1,B\n2,C\n3,A\n";

/// Write `<stem>.png` and `<stem>.csv` into `dir`.
pub fn write_pair(dir: &Path, stem: &str, sheet: &GrayImage, key: &str) -> (PathBuf, PathBuf) {
    let image = dir.join(format!("{stem}.png"));
    let key_path = dir.join(format!("{stem}.csv"));
    sheet.save(&image).expect("save sheet");
    fs::write(&key_path, key).expect("write key");
    (image, key_path)
}

pub fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("template.json");
    template().write_json(&path).expect("write template");
    path
}
