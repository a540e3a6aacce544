//! High-level runtime engine settings
//!
//! Selects the integrator, the force model, and the optional container
//! used when building and running a `Scenario`

use super::boundary::Containment;
use super::integrator::IntegratorKind;

/// How pairwise interactions are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceModel {
    Direct, // all pairs, O(N^2)
    Grid, // spatial hash neighbors within the search radius only
    Hybrid, // grid near field + octree aggregates far field
    Sph, // smoothed-particle pressure and viscosity
    Boids, // alignment, cohesion and separation over grid neighbors
}

#[derive(Debug, Clone)]
pub struct Engine {
    pub integrator: IntegratorKind, // euler or verlet
    pub force_model: ForceModel,
    pub containment: Option<Containment>, // walls, if the scene is enclosed
}
