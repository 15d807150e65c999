//! Turning a simplified template outline into four corners.

use std::fmt::Debug;

use kbm_track_core::{line_intersection, sort_by_distance, Quad};
use nalgebra::Point2;

use crate::CalibrationError;

/// Recovers the template quadrilateral from a simplified outline polygon.
///
/// The engine checks the vertex count against
/// [`expected_vertices`](Self::expected_vertices) before calling
/// [`reconstruct`](Self::reconstruct).
pub trait CornerReconstructionStrategy: Debug + Send + Sync {
    /// Number of vertices the simplified outline must have.
    fn expected_vertices(&self) -> usize;

    /// Build the quad from `polygon` (contour order) seen in a frame of
    /// `frame_width × frame_height` pixels.
    fn reconstruct(
        &self,
        polygon: &[Point2<f32>],
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Quad, CalibrationError>;
}

fn check_count(polygon: &[Point2<f32>], expected: usize) -> Result<(), CalibrationError> {
    if polygon.len() != expected {
        return Err(CalibrationError::WrongVertexCount {
            expected,
            got: polygon.len(),
        });
    }
    Ok(())
}

/// Template whose silhouette shows every corner.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuadCornerStrategy;

impl CornerReconstructionStrategy for QuadCornerStrategy {
    fn expected_vertices(&self) -> usize {
        4
    }

    fn reconstruct(
        &self,
        polygon: &[Point2<f32>],
        _frame_width: u32,
        _frame_height: u32,
    ) -> Result<Quad, CalibrationError> {
        check_count(polygon, 4)?;
        Ok(Quad::from_unordered([
            polygon[0], polygon[1], polygon[2], polygon[3],
        ])?)
    }
}

/// Template with one corner split into two close vertices.
///
/// The physical pad has a notch next to one corner, so its outline simplifies
/// to five vertices. Ranked by distance to the frame's top-right pixel, the
/// vertices are: nearest corner, second corner, the two split vertices, and
/// the farthest corner. The missing apex is where the edge through the first
/// split vertex and its corner neighbour meets the edge through the second
/// split vertex and its corner neighbour.
#[derive(Clone, Copy, Debug, Default)]
pub struct SplitCornerStrategy;

fn cyclic_neighbours(polygon: &[Point2<f32>], p: Point2<f32>, q: Point2<f32>) -> bool {
    let n = polygon.len();
    let (Some(i), Some(j)) = (
        polygon.iter().position(|v| *v == p),
        polygon.iter().position(|v| *v == q),
    ) else {
        return false;
    };
    (i + 1) % n == j || (j + 1) % n == i
}

impl CornerReconstructionStrategy for SplitCornerStrategy {
    fn expected_vertices(&self) -> usize {
        5
    }

    fn reconstruct(
        &self,
        polygon: &[Point2<f32>],
        frame_width: u32,
        _frame_height: u32,
    ) -> Result<Quad, CalibrationError> {
        check_count(polygon, 5)?;

        let top_right = Point2::new(frame_width.saturating_sub(1) as f32, 0.0);
        let ranked = sort_by_distance(polygon, top_right);
        let (near, far) = (ranked[0], ranked[4]);
        let (mut split_a, mut split_b) = (ranked[2], ranked[3]);

        // Rank order pairs split_a with `near`; trust the outline's edges
        // when they clearly say otherwise.
        let ranked_pairing = cyclic_neighbours(polygon, split_a, near)
            && cyclic_neighbours(polygon, split_b, far);
        let crossed_pairing = cyclic_neighbours(polygon, split_a, far)
            && cyclic_neighbours(polygon, split_b, near);
        if crossed_pairing && !ranked_pairing {
            std::mem::swap(&mut split_a, &mut split_b);
        }

        let apex = line_intersection(split_a, near, split_b, far)
            .ok_or(CalibrationError::NoIntersection)?;
        log::debug!(
            "split corner ({:.1}, {:.1}) / ({:.1}, {:.1}) -> apex ({:.1}, {:.1})",
            split_a.x,
            split_a.y,
            split_b.x,
            split_b.y,
            apex.x,
            apex.y
        );

        Ok(Quad::from_unordered([apex, ranked[0], ranked[1], ranked[4]])?)
    }
}
