use kbm_track_core::QuadError;

/// Reasons a calibration attempt was abandoned.
///
/// All of these are recoverable: the engine logs them and keeps whatever
/// calibration was active before the attempt.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("calibration batch is empty")]
    EmptyBatch,
    #[error("no frame in the batch produced a template mask")]
    NoUsableFrames,
    #[error("no contours found")]
    NoContours,
    #[error("template outline hull is degenerate ({points} points)")]
    DegenerateHull { points: usize },
    #[error("simplified outline has {got} vertices (expected {expected})")]
    WrongVertexCount { expected: usize, got: usize },
    #[error("edges around the occluded corner are parallel")]
    NoIntersection,
    #[error(transparent)]
    InvalidQuad(#[from] QuadError),
    #[error("homography estimation failed")]
    HomographyFailed,
    #[error("homography not invertible")]
    NonInvertible,
}
