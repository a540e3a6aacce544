//! Neighbor lists and pairwise force accumulation
//!
//! Turns positions into per-particle accelerations without paying the full
//! O(N²) pair loop:
//! - short range: exact neighbor lists from the spatial hash grid
//! - long range: octree aggregates at one fixed level (a simplified
//!   Barnes–Hut scheme with no opening-angle test)
//!
//! All accumulation functions *add* into the caller's buffer; zeroing it is
//! the caller's job (see [`AccelSet`](super::forces::AccelSet)).
//!
//! Singularity policy: the built-in force laws drop any pair whose squared
//! distance is below `min_dist2`. This is a hard cutoff rather than a
//! softening, so forces are deliberately inexact at very short range. Every
//! dropped pair is counted.

use super::error::SimError;
use super::grid::SpatialHashGrid;
use super::octree::Octree;
use super::report::StepReport;
use super::states::NVec3;

/// Pairs closer than this (squared) are skipped by the built-in laws
pub const DEFAULT_MIN_DIST2: f64 = 0.1;

/// `lists[i]` holds the neighbors of particle `i`, never `i` itself
pub type NeighborLists = Vec<Vec<usize>>;

// =========================================================================================
// Neighbor search
// =========================================================================================

/// Fixed-radius neighbor search backed by a [`SpatialHashGrid`]
#[derive(Debug, Clone)]
pub struct NeighborSearch {
    radius: f64,
    grid: SpatialHashGrid,
    unbucketed: usize, // non-finite positions seen by the last rebuild
}

impl NeighborSearch {
    /// Search with the grid cell size equal to the radius
    pub fn new(radius: f64) -> Result<Self, SimError> {
        Self::with_cell_size(radius, radius)
    }

    /// Search with an explicit cell size, which must not be smaller than
    /// the radius or the 27-cell block would miss neighbors
    pub fn with_cell_size(radius: f64, cell_size: f64) -> Result<Self, SimError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidRadius(radius));
        }
        let grid = SpatialHashGrid::new(cell_size)?;
        if cell_size < radius {
            return Err(SimError::CellSmallerThanRadius { cell_size, radius });
        }
        Ok(Self {
            radius,
            grid,
            unbucketed: 0,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    pub fn unbucketed(&self) -> usize {
        self.unbucketed
    }

    /// Rebuild the grid from `positions` and return, for every particle,
    /// the other particles strictly closer than the radius
    pub fn neighbor_lists(&mut self, positions: &[NVec3]) -> NeighborLists {
        self.unbucketed = self.grid.rebuild(positions);
        let r2 = self.radius * self.radius;

        let mut candidates = Vec::new();
        positions
            .iter()
            .enumerate()
            .map(|(i, xi)| {
                candidates.clear();
                self.grid.neighbors_into(xi, &mut candidates);
                candidates
                    .iter()
                    .copied()
                    .filter(|&j| j != i && (positions[j] - xi).norm_squared() < r2)
                    .collect()
            })
            .collect()
    }
}

/// O(N²) reference: every pair strictly closer than `radius`
pub fn brute_force_neighbor_lists(positions: &[NVec3], radius: f64) -> NeighborLists {
    let r2 = radius * radius;
    positions
        .iter()
        .enumerate()
        .map(|(i, xi)| {
            positions
                .iter()
                .enumerate()
                .filter(|&(j, xj)| j != i && (xj - xi).norm_squared() < r2)
                .map(|(j, _)| j)
                .collect()
        })
        .collect()
}

// =========================================================================================
// Force laws
// =========================================================================================

/// Pairwise interaction: acceleration of the particle at `xi` caused by a
/// source of mass `mj` at `xj`.
///
/// Returning `None` means the pair was dropped as degenerate (too close);
/// the caller counts it.
pub trait ForceLaw {
    fn pair(&self, xi: &NVec3, xj: &NVec3, mj: f64) -> Option<NVec3>;
}

impl<F> ForceLaw for F
where
    F: Fn(&NVec3, &NVec3, f64) -> Option<NVec3>,
{
    fn pair(&self, xi: &NVec3, xj: &NVec3, mj: f64) -> Option<NVec3> {
        self(xi, xj, mj)
    }
}

/// `a_i = strength * m_j * r / |r|^3`, pointing from i toward j
#[derive(Debug, Clone, Copy)]
pub struct InverseSquareAttraction {
    pub strength: f64,
    pub min_dist2: f64,
}

impl InverseSquareAttraction {
    pub fn new(strength: f64) -> Self {
        Self {
            strength,
            min_dist2: DEFAULT_MIN_DIST2,
        }
    }
}

impl ForceLaw for InverseSquareAttraction {
    fn pair(&self, xi: &NVec3, xj: &NVec3, mj: f64) -> Option<NVec3> {
        let r = xj - xi;
        let d2 = r.norm_squared();
        if d2 < self.min_dist2 || d2 == 0.0 {
            return None;
        }
        let inv_r = d2.sqrt().recip();
        let inv_r3 = inv_r * inv_r * inv_r;
        Some(self.strength * mj * inv_r3 * r)
    }
}

/// `a_i = strength * m_j * r̂ / |r|^2`, pointing from j toward i.
///
/// With a `range` the push only acts on pairs closer than it, the way the
/// fluid demos keep particles from overlapping.
#[derive(Debug, Clone, Copy)]
pub struct InverseSquareRepulsion {
    pub strength: f64,
    pub min_dist2: f64,
    pub range: Option<f64>,
}

impl InverseSquareRepulsion {
    pub fn new(strength: f64) -> Self {
        Self {
            strength,
            min_dist2: DEFAULT_MIN_DIST2,
            range: None,
        }
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = Some(range);
        self
    }
}

impl ForceLaw for InverseSquareRepulsion {
    fn pair(&self, xi: &NVec3, xj: &NVec3, mj: f64) -> Option<NVec3> {
        let r = xi - xj;
        let d2 = r.norm_squared();
        if d2 < self.min_dist2 || d2 == 0.0 {
            return None;
        }
        if let Some(range) = self.range {
            if d2 >= range * range {
                return Some(NVec3::zeros());
            }
        }
        let inv_r = d2.sqrt().recip();
        Some(self.strength * mj * inv_r * inv_r * inv_r * r)
    }
}

/// Built-in law picked at runtime from a scenario file
#[derive(Debug, Clone, Copy)]
pub enum PairLaw {
    Attraction(InverseSquareAttraction),
    Repulsion(InverseSquareRepulsion),
}

impl ForceLaw for PairLaw {
    fn pair(&self, xi: &NVec3, xj: &NVec3, mj: f64) -> Option<NVec3> {
        match self {
            PairLaw::Attraction(law) => law.pair(xi, xj, mj),
            PairLaw::Repulsion(law) => law.pair(xi, xj, mj),
        }
    }
}

// =========================================================================================
// Accumulation
// =========================================================================================

/// Add `Σ_j law(x_i, x_j, m_j)` over each particle's neighbor list into
/// `out[i]`. Returns the number of pairs the law dropped.
pub fn compute_forces<L: ForceLaw + ?Sized>(
    positions: &[NVec3],
    masses: Option<&[f64]>,
    neighbors: &[Vec<usize>],
    law: &L,
    out: &mut [NVec3],
) -> usize {
    let mut skipped = 0;
    for (i, list) in neighbors.iter().enumerate() {
        let xi = positions[i];
        for &j in list {
            let mj = masses.map_or(1.0, |m| m[j]);
            match law.pair(&xi, &positions[j], mj) {
                Some(a) => out[i] += a,
                None => skipped += 1,
            }
        }
    }
    skipped
}

/// Hybrid near/far accumulation.
///
/// Near field: exact `law` over neighbors closer than `search.radius()`.
/// Far field: `law(x_i, com, mass)` for every octree aggregate at
/// `far_level` at least `search.radius()` away from `x_i`.
///
/// The whole level is used for every particle; there is no per-node
/// opening criterion. An aggregate may contain particles that were already
/// counted in the near field, which is part of the approximation.
pub fn compute_approximate_forces<L: ForceLaw + ?Sized>(
    positions: &[NVec3],
    masses: Option<&[f64]>,
    octree: &mut Octree,
    search: &mut NeighborSearch,
    far_level: usize,
    law: &L,
    out: &mut [NVec3],
) -> StepReport {
    let mut report = StepReport::new();

    // near field
    let neighbors = search.neighbor_lists(positions);
    report.unbucketed = search.unbucketed();
    report.skipped_pairs += compute_forces(positions, masses, &neighbors, law, out);

    // far field
    report.outside_octree = octree.rebuild(positions);
    let aggregates = octree.aggregates_at(far_level, positions, masses);
    let near2 = search.radius() * search.radius();

    for (i, xi) in positions.iter().enumerate() {
        for agg in &aggregates {
            if (agg.com - xi).norm_squared() < near2 {
                continue;
            }
            match law.pair(xi, &agg.com, agg.mass) {
                Some(a) => out[i] += a,
                None => report.skipped_pairs += 1,
            }
        }
    }

    log::debug!(
        "hybrid pass: {} far sources at level {far_level}, {} pairs skipped",
        aggregates.len(),
        report.skipped_pairs
    );
    report
}

/// O(N²) accumulation over every ordered pair, the exact answer the
/// accelerated paths approximate
pub fn compute_direct_forces<L: ForceLaw + ?Sized>(
    positions: &[NVec3],
    masses: Option<&[f64]>,
    law: &L,
    out: &mut [NVec3],
) -> usize {
    let mut skipped = 0;
    for (i, xi) in positions.iter().enumerate() {
        for (j, xj) in positions.iter().enumerate() {
            if i == j {
                continue;
            }
            let mj = masses.map_or(1.0, |m| m[j]);
            match law.pair(xi, xj, mj) {
                Some(a) => out[i] += a,
                None => skipped += 1,
            }
        }
    }
    skipped
}
