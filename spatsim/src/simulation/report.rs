//! Per-step diagnostics
//!
//! Degenerate numerics never abort a step. Each recovery is counted here so
//! callers and tests can assert on it.

/// Outcome of advancing a single particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleStatus {
    Ok,
    SkippedNonFinite, // update produced NaN/Inf, previous state kept
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub skipped_pairs: usize, // pairs dropped by the min-distance cutoff
    pub skipped_particles: Vec<usize>, // indices whose update was discarded
    pub outside_octree: usize, // particles beyond the octree extents
    pub unbucketed: usize, // non-finite positions the grid ignored
    pub boundary_hits: usize, // reflections off the container
}

impl StepReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_particles.len()
    }

    pub fn record(&mut self, index: usize, status: ParticleStatus) {
        if status == ParticleStatus::SkippedNonFinite {
            self.skipped_particles.push(index);
        }
    }

    /// Fold another report into this one (used when running several steps)
    pub fn merge(&mut self, other: &StepReport) {
        self.skipped_pairs += other.skipped_pairs;
        self.skipped_particles.extend_from_slice(&other.skipped_particles);
        self.outside_octree += other.outside_octree;
        self.unbucketed += other.unbucketed;
        self.boundary_hits += other.boundary_hits;
    }
}
