//! Configuration errors for the simulation core
//!
//! Everything here is raised once, while building a grid, octree, boundary
//! or scenario. Numeric trouble during a step is never an error: it is
//! recovered locally and counted in a [`StepReport`](super::report::StepReport)

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    #[error("cell size {cell_size} is smaller than search radius {radius}")]
    CellSmallerThanRadius { cell_size: f64, radius: f64 },

    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("octree depth must be at least 1, got {0}")]
    InvalidDepth(usize),

    #[error("octree depth {depth} exceeds the supported maximum of {max}")]
    DepthTooLarge { depth: usize, max: usize },

    #[error("octree extents must be positive and finite, got {0:?}")]
    InvalidExtents([f64; 3]),

    #[error("far-field level {level} is deeper than octree depth {max_depth}")]
    InvalidLevel { level: usize, max_depth: usize },

    #[error("restitution must lie in [0, 1], got {0}")]
    InvalidRestitution(f64),

    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("mass of particle {index} must be positive and finite, got {mass}")]
    InvalidMass { index: usize, mass: f64 },

    #[error("{what} has {got} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("body {index}: {reason}")]
    InvalidBody { index: usize, reason: String },

    #[error("missing configuration section `{0}`")]
    MissingSection(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
