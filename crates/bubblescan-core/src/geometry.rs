//! Planar helpers used to turn pixel contours into circle candidates.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

const CONTAIN_EPS: f64 = 1e-7;

/// Circle in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
}

impl Circle {
    pub fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }
}

/// Absolute area of a closed polygon (shoelace formula).
///
/// The polygon is implicitly closed; fewer than three vertices give zero.
pub fn polygon_area(points: &[Point2<f32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    (twice.abs() * 0.5) as f32
}

/// Convex hull by Andrew's monotone chain, counter-clockwise, no collinear points.
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut pts: Vec<Point2<f32>> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f64 {
        (a.x as f64 - o.x as f64) * (b.y as f64 - o.y as f64)
            - (a.y as f64 - o.y as f64) * (b.x as f64 - o.x as f64)
    }

    let mut hull: Vec<Point2<f32>> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

#[derive(Clone, Copy)]
struct Disc {
    cx: f64,
    cy: f64,
    r: f64,
}

impl Disc {
    fn contains(&self, p: (f64, f64)) -> bool {
        let d = ((p.0 - self.cx).powi(2) + (p.1 - self.cy).powi(2)).sqrt();
        d <= self.r + CONTAIN_EPS * self.r.max(1.0)
    }

    fn from_two(a: (f64, f64), b: (f64, f64)) -> Disc {
        let cx = 0.5 * (a.0 + b.0);
        let cy = 0.5 * (a.1 + b.1);
        let r = 0.5 * ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
        Disc { cx, cy, r }
    }

    fn from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Disc {
        let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
        if d.abs() < 1e-12 {
            // collinear: the widest pair spans the other point
            let ab = Disc::from_two(a, b);
            let bc = Disc::from_two(b, c);
            let ac = Disc::from_two(a, c);
            return [ab, bc, ac]
                .into_iter()
                .fold(ab, |best, d| if d.r > best.r { d } else { best });
        }
        let a2 = a.0 * a.0 + a.1 * a.1;
        let b2 = b.0 * b.0 + b.1 * b.1;
        let c2 = c.0 * c.0 + c.1 * c.1;
        let cx = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
        let cy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
        let r = ((a.0 - cx).powi(2) + (a.1 - cy).powi(2)).sqrt();
        Disc { cx, cy, r }
    }
}

/// Smallest circle enclosing every point, or `None` for an empty input.
///
/// Runs the incremental Welzl construction on the convex hull, visited in a
/// fixed scrambled order so the result is deterministic.
pub fn min_enclosing_circle(points: &[Point2<f32>]) -> Option<Circle> {
    let hull = convex_hull(points);
    let mut pts: Vec<(f64, f64)> = hull.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    if pts.is_empty() {
        return None;
    }
    scramble(&mut pts);

    let mut disc = Disc {
        cx: pts[0].0,
        cy: pts[0].1,
        r: 0.0,
    };
    for i in 1..pts.len() {
        if disc.contains(pts[i]) {
            continue;
        }
        disc = Disc {
            cx: pts[i].0,
            cy: pts[i].1,
            r: 0.0,
        };
        for j in 0..i {
            if disc.contains(pts[j]) {
                continue;
            }
            disc = Disc::from_two(pts[i], pts[j]);
            for k in 0..j {
                if !disc.contains(pts[k]) {
                    disc = Disc::from_three(pts[i], pts[j], pts[k]);
                }
            }
        }
    }

    Some(Circle {
        center: Point2::new(disc.cx as f32, disc.cy as f32),
        radius: disc.r as f32,
    })
}

/// Fisher-Yates with a fixed xorshift seed.
fn scramble<T>(v: &mut [T]) {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    for i in (1..v.len()).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let j = (state % (i as u64 + 1)) as usize;
        v.swap(i, j);
    }
}
