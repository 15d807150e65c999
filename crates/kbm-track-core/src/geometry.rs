//! Line and polygon primitives used by corner detection.
//!
//! All functions are pure: they borrow their inputs and return freshly
//! ordered sequences, so a failed calibration attempt never disturbs
//! geometry owned by the caller.

use std::cmp::Ordering;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Sine of the smallest angle between two consecutive quad edges that still
/// counts as a corner.
const MIN_CORNER_SINE: f64 = 1e-6;

#[derive(Clone, Copy, Debug)]
enum Line {
    Vertical { x: f64 },
    Sloped { m: f64, c: f64 },
}

impl Line {
    fn through(a: Point2<f32>, b: Point2<f32>) -> Self {
        let (ax, ay) = (a.x as f64, a.y as f64);
        let (bx, by) = (b.x as f64, b.y as f64);
        if bx == ax {
            return Line::Vertical { x: ax };
        }
        let m = (by - ay) / (bx - ax);
        Line::Sloped { m, c: ay - m * ax }
    }
}

/// Intersect the infinite lines through `(p1, p2)` and `(p3, p4)`.
///
/// Vertical lines are handled explicitly. Returns `None` for parallel lines
/// (equal slopes, including two vertical lines). The result does not depend
/// on which pair is passed first.
///
/// Callers must not pass two identical points for the same line.
pub fn line_intersection(
    p1: Point2<f32>,
    p2: Point2<f32>,
    p3: Point2<f32>,
    p4: Point2<f32>,
) -> Option<Point2<f32>> {
    let (x, y) = match (Line::through(p1, p2), Line::through(p3, p4)) {
        (Line::Vertical { .. }, Line::Vertical { .. }) => return None,
        (Line::Vertical { x }, Line::Sloped { m, c })
        | (Line::Sloped { m, c }, Line::Vertical { x }) => (x, m * x + c),
        (Line::Sloped { m: m1, c: c1 }, Line::Sloped { m: m2, c: c2 }) => {
            if m1 == m2 {
                return None;
            }
            let x = (c2 - c1) / (m1 - m2);
            // Evaluate y on the flatter line; the choice is order-independent.
            let (m, c) = match m1.abs().total_cmp(&m2.abs()).then(m1.total_cmp(&m2)) {
                Ordering::Greater => (m2, c2),
                _ => (m1, c1),
            };
            (x, m * x + c)
        }
    };

    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point2::new(x as f32, y as f32))
}

/// Return `points` sorted by ascending Euclidean distance to `reference`.
///
/// Ties are broken by x, then y.
pub fn sort_by_distance(points: &[Point2<f32>], reference: Point2<f32>) -> Vec<Point2<f32>> {
    let dist = |p: &Point2<f32>| {
        let dx = p.x as f64 - reference.x as f64;
        let dy = p.y as f64 - reference.y as f64;
        (dx * dx + dy * dy).sqrt()
    };

    let mut out = points.to_vec();
    out.sort_by(|a, b| {
        dist(a)
            .total_cmp(&dist(b))
            .then(a.x.total_cmp(&b.x))
            .then(a.y.total_cmp(&b.y))
    });
    out
}

/// Order four points as `[top-left, top-right, bottom-right, bottom-left]`.
///
/// Points are walked clockwise (on screen, y down) around their centroid,
/// starting from the point with the smallest `x + y`.
pub fn order_quad_corners(points: [Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let cx = points.iter().map(|p| p.x as f64).sum::<f64>() / 4.0;
    let cy = points.iter().map(|p| p.y as f64).sum::<f64>() / 4.0;
    let angle = |p: &Point2<f32>| (p.y as f64 - cy).atan2(p.x as f64 - cx);

    let mut sorted = points;
    sorted.sort_by(|a, b| angle(a).total_cmp(&angle(b)));

    let start = (0..4)
        .min_by(|&i, &j| {
            let si = sorted[i].x + sorted[i].y;
            let sj = sorted[j].x + sorted[j].y;
            si.total_cmp(&sj).then(sorted[i].x.total_cmp(&sorted[j].x))
        })
        .unwrap_or(0);

    sorted.rotate_left(start);
    sorted
}

fn distance_to_line(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = (b.x as f64 - ax, b.y as f64 - ay);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    ((px - ax) * dy - (py - ay) * dx).abs() / len
}

fn douglas_peucker(chain: &[Point2<f32>], epsilon: f64) -> Vec<Point2<f32>> {
    let n = chain.len();
    if n <= 2 {
        return chain.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((s, e)) = stack.pop() {
        if e <= s + 1 {
            continue;
        }
        let (mut best, mut dmax) = (s, 0.0);
        for k in s + 1..e {
            let d = distance_to_line(chain[k], chain[s], chain[e]);
            if d > dmax {
                best = k;
                dmax = d;
            }
        }
        if dmax > epsilon {
            keep[best] = true;
            stack.push((s, best));
            stack.push((best, e));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn farthest_from(points: &[Point2<f32>], from: usize) -> usize {
    let o = points[from];
    (0..points.len())
        .max_by(|&i, &j| {
            let di = (points[i] - o).norm_squared();
            let dj = (points[j] - o).norm_squared();
            di.total_cmp(&dj)
        })
        .unwrap_or(from)
}

/// Simplify a closed contour with the Douglas–Peucker algorithm.
///
/// The contour is split at a diameter pair (farthest point from the start,
/// then farthest point from that), so both seam points are extreme vertices
/// of the shape rather than whatever pixel the contour tracer started on.
/// Returned vertices keep the contour's traversal order and the polygon is
/// implicitly closed (the first vertex is not repeated).
pub fn simplify_closed_polygon(points: &[Point2<f32>], epsilon: f64) -> Vec<Point2<f32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let a = farthest_from(points, 0);
    let b = farthest_from(points, a);
    let (i, j) = (a.min(b), a.max(b));
    if i == j {
        return vec![points[i]];
    }

    let mut out = douglas_peucker(&points[i..=j], epsilon);
    out.pop();

    let wrap: Vec<Point2<f32>> = points[j..].iter().chain(&points[..=i]).copied().collect();
    let mut rest = douglas_peucker(&wrap, epsilon);
    rest.pop();

    out.extend(rest);
    out
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QuadError {
    #[error("corners {0}, {1} and {2} are collinear")]
    Collinear(usize, usize, usize),
    #[error("quadrilateral edges cross each other")]
    SelfIntersecting,
}

/// Four corners in `[top-left, top-right, bottom-right, bottom-left]` order.
///
/// Construction checks that no three consecutive corners are collinear and
/// that the polygon is simple.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    corners: [Point2<f32>; 4],
}

fn cross(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f64 {
    let (ox, oy) = (o.x as f64, o.y as f64);
    (a.x as f64 - ox) * (b.y as f64 - oy) - (a.y as f64 - oy) * (b.x as f64 - ox)
}

fn segments_cross(p1: Point2<f32>, p2: Point2<f32>, q1: Point2<f32>, q2: Point2<f32>) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

impl Quad {
    /// Validate corners that are already in canonical order.
    pub fn new(corners: [Point2<f32>; 4]) -> Result<Self, QuadError> {
        for i in 0..4 {
            let (a, b, c) = (corners[i], corners[(i + 1) % 4], corners[(i + 2) % 4]);
            let e1 = (b - a).norm() as f64;
            let e2 = (c - b).norm() as f64;
            let area = cross(a, b, c).abs();
            if e1 * e2 < 1e-12 || area <= MIN_CORNER_SINE * e1 * e2 {
                return Err(QuadError::Collinear(i, (i + 1) % 4, (i + 2) % 4));
            }
        }
        if segments_cross(corners[0], corners[1], corners[2], corners[3])
            || segments_cross(corners[1], corners[2], corners[3], corners[0])
        {
            return Err(QuadError::SelfIntersecting);
        }
        Ok(Self { corners })
    }

    /// Order arbitrary corners with [`order_quad_corners`], then validate.
    pub fn from_unordered(points: [Point2<f32>; 4]) -> Result<Self, QuadError> {
        Self::new(order_quad_corners(points))
    }

    #[inline]
    pub fn corners(&self) -> &[Point2<f32>; 4] {
        &self.corners
    }

    pub fn top_left(&self) -> Point2<f32> {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point2<f32> {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point2<f32> {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point2<f32> {
        self.corners[3]
    }
}
