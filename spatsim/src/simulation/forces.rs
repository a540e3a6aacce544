//! Acceleration contributors for the particle engine
//!
//! An [`AccelSet`] holds any number of [`Acceleration`] terms and sums their
//! contributions into one buffer per step. Terms range from a constant field
//! to the grid/octree accelerated pairwise sums in
//! [`evaluator`](super::evaluator).

use super::evaluator::{
    compute_approximate_forces, compute_direct_forces, compute_forces, ForceLaw, NeighborSearch,
};
use super::kernels::SphModel;
use super::octree::Octree;
use super::report::StepReport;
use super::states::{NVec3, System};

/// Collection of acceleration terms (gravity, pair laws, fluid terms)
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per particle
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add an acceleration term
    pub fn with(mut self, term: impl Acceleration + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations at time `t` for all particles in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(
        &mut self,
        t: f64,
        sys: &System,
        out: &mut [NVec3],
        report: &mut StepReport,
    ) {
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }
        // Iterate over all acceleration contributors
        for term in &mut self.terms {
            term.acceleration(t, sys, out, report);
        }
    }
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for acceleration sources operating on [`System`].
/// Implementations add their contribution into `out[i]` for each particle
/// and record any recovered degeneracy in `report`
pub trait Acceleration {
    fn acceleration(&mut self, t: f64, sys: &System, out: &mut [NVec3], report: &mut StepReport);
}

/// Same acceleration on every particle (e.g. gravity in the fluid scenes)
pub struct UniformField {
    pub g: NVec3,
}

impl Acceleration for UniformField {
    fn acceleration(&mut self, _t: f64, _sys: &System, out: &mut [NVec3], _report: &mut StepReport) {
        for a in out.iter_mut() {
            *a += self.g;
        }
    }
}

/// Pair law summed over all pairs (direct n^2 sum)
pub struct DirectSum<L> {
    pub law: L,
}

impl<L: ForceLaw> Acceleration for DirectSum<L> {
    fn acceleration(&mut self, _t: f64, sys: &System, out: &mut [NVec3], report: &mut StepReport) {
        report.skipped_pairs += compute_direct_forces(&sys.x, Some(&sys.m), &self.law, out);
    }
}

/// Pair law summed over grid neighbor lists only
pub struct NearField<L> {
    pub law: L,
    pub search: NeighborSearch,
}

impl<L: ForceLaw> Acceleration for NearField<L> {
    fn acceleration(&mut self, _t: f64, sys: &System, out: &mut [NVec3], report: &mut StepReport) {
        let neighbors = self.search.neighbor_lists(&sys.x);
        report.unbucketed += self.search.unbucketed();
        report.skipped_pairs += compute_forces(&sys.x, Some(&sys.m), &neighbors, &self.law, out);
    }
}

/// Exact near field from the grid plus octree aggregates at `far_level`
pub struct HybridField<L> {
    pub law: L,
    pub search: NeighborSearch, // radius = near radius
    pub octree: Octree,
    pub far_level: usize,
}

impl<L: ForceLaw> Acceleration for HybridField<L> {
    fn acceleration(&mut self, _t: f64, sys: &System, out: &mut [NVec3], report: &mut StepReport) {
        let hybrid = compute_approximate_forces(
            &sys.x,
            Some(&sys.m),
            &mut self.octree,
            &mut self.search,
            self.far_level,
            &self.law,
            out,
        );
        report.merge(&hybrid);
    }
}

/// SPH pressure and viscosity, sharing one neighbor pass per step
pub struct SphForces {
    pub model: SphModel,
    pub search: NeighborSearch, // radius = smoothing length
    densities: Vec<f64>,
}

impl SphForces {
    pub fn new(model: SphModel, search: NeighborSearch) -> Self {
        Self {
            model,
            search,
            densities: Vec::new(),
        }
    }

    /// Densities from the most recent evaluation
    pub fn densities(&self) -> &[f64] {
        &self.densities
    }
}

impl Acceleration for SphForces {
    fn acceleration(&mut self, _t: f64, sys: &System, out: &mut [NVec3], report: &mut StepReport) {
        let neighbors = self.search.neighbor_lists(&sys.x);
        report.unbucketed += self.search.unbucketed();

        self.densities.resize(sys.len(), 0.0);
        self.model.densities(&sys.x, &sys.m, &neighbors, &mut self.densities);
        self.model.pressure_accel(&sys.x, &self.densities, &neighbors, out);
        self.model.viscosity_accel(&sys.x, &sys.v, &neighbors, out);
    }
}

/// Boids steering weights and limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockingRule {
    pub alignment: f64, // weight of the mean neighbor heading
    pub cohesion: f64, // weight of the pull toward the neighbors' centroid
    pub separation: f64, // weight of the push away from close neighbors
    pub max_speed: f64, // desired velocity is clamped to this length
    pub responsiveness: f64, // 1 / time constant for turning toward the desired velocity
}

impl Default for FlockingRule {
    fn default() -> Self {
        Self {
            alignment: 1.3,
            cohesion: 1.0,
            separation: 1.1,
            max_speed: 1.0,
            responsiveness: 6.0,
        }
    }
}

impl FlockingRule {
    /// Velocity boid `i` steers toward, from its neighbors within `radius`.
    ///
    /// Alignment and cohesion are unit directions scaled by their weights;
    /// separation grows linearly from 0 at `radius` to 1 at contact.
    /// Coincident neighbors give no separation direction and are ignored
    /// there. No neighbors means a desired velocity of zero.
    pub fn desired_velocity(
        &self,
        i: usize,
        positions: &[NVec3],
        velocities: &[NVec3],
        neighbors: &[usize],
        radius: f64,
    ) -> NVec3 {
        if neighbors.is_empty() {
            return NVec3::zeros();
        }
        let xi = positions[i];

        let mut heading = NVec3::zeros();
        let mut centroid = NVec3::zeros();
        let mut push = NVec3::zeros();
        for &j in neighbors {
            heading += velocities[j];
            centroid += positions[j];

            let away = xi - positions[j];
            let d = away.norm();
            if d > 0.0 && d < radius {
                push += away * ((1.0 - d / radius) / d);
            }
        }
        let n = neighbors.len() as f64;
        heading /= n;
        centroid /= n;

        let mut desired = push * self.separation;
        if let Some(dir) = heading.try_normalize(f64::EPSILON) {
            desired += dir * self.alignment;
        }
        if let Some(dir) = (centroid - xi).try_normalize(f64::EPSILON) {
            desired += dir * self.cohesion;
        }

        let speed = desired.norm();
        if speed > self.max_speed {
            desired *= self.max_speed / speed;
        }
        desired
    }
}

/// Boids: each particle turns toward the velocity its neighbors suggest,
/// `a = responsiveness * (desired − v)`
pub struct Flocking {
    pub rule: FlockingRule,
    pub search: NeighborSearch, // radius = perception radius
}

impl Acceleration for Flocking {
    fn acceleration(&mut self, _t: f64, sys: &System, out: &mut [NVec3], report: &mut StepReport) {
        let neighbors = self.search.neighbor_lists(&sys.x);
        report.unbucketed += self.search.unbucketed();
        let radius = self.search.radius();

        for (i, list) in neighbors.iter().enumerate() {
            let desired = self.rule.desired_velocity(i, &sys.x, &sys.v, list, radius);
            out[i] += (desired - sys.v[i]) * self.rule.responsiveness;
        }
    }
}
