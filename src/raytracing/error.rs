//! Error types for scene construction and vector geometry.

use thiserror::Error;

/// Errors from vector and ray algebra.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// Normalizing a zero-length vector, or measuring an angle against one.
    #[error("degenerate zero-length vector")]
    DegenerateVector,
}

/// Errors raised while assembling a scene, before any rendering starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Sphere with a non-positive radius.
    #[error("sphere radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    /// Plane corners that do not span a plane.
    #[error("plane corners are collinear")]
    DegeneratePlane,
}
