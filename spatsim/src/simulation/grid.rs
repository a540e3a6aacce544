//! Uniform spatial hash grid
//!
//! Buckets particle indices into cubic cells of side `cell_size`. A cell is
//! addressed by its integer coordinates `floor(p / cell_size)` per axis; the
//! triple itself is the hash key, so two distinct cells can never share a
//! bucket.
//!
//! A radius query looks at the 3×3×3 block of cells around the query point.
//! That block covers every point within `cell_size` of the query, but it is
//! a cube, not a sphere: callers filter by exact distance themselves.

use std::collections::HashMap;

use super::error::SimError;
use super::states::NVec3;

/// Integer cell coordinates
pub type CellKey = (i64, i64, i64);

#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    cell_size: f64,
    buckets: HashMap<CellKey, Vec<usize>>,
    len: usize, // number of bucketed particles
}

impl SpatialHashGrid {
    pub fn new(cell_size: f64) -> Result<Self, SimError> {
        validate_cell_size(cell_size)?;
        Ok(Self {
            cell_size,
            buckets: HashMap::new(),
            len: 0,
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Change the cell size. Existing buckets are dropped since every key
    /// depends on it
    pub fn set_cell_size(&mut self, cell_size: f64) -> Result<(), SimError> {
        validate_cell_size(cell_size)?;
        self.cell_size = cell_size;
        self.buckets.clear();
        self.len = 0;
        Ok(())
    }

    /// Integer cell of `p`. The float to `i64` casts saturate, so cells
    /// beyond `±i64::MAX * cell_size` collapse onto the edge key and a NaN
    /// coordinate maps to 0; non-finite points are never bucketed or queried
    pub fn cell_key(&self, p: &NVec3) -> CellKey {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    /// Clear all buckets and re-insert every particle.
    ///
    /// Returns how many positions were skipped for being non-finite; those
    /// indices end up in no bucket at all.
    pub fn rebuild(&mut self, positions: &[NVec3]) -> usize {
        // keep the bucket allocations around, only drop their contents
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }

        let mut skipped = 0;
        for (i, p) in positions.iter().enumerate() {
            if !is_finite(p) {
                skipped += 1;
                continue;
            }
            let key = self.cell_key(p);
            self.buckets.entry(key).or_default().push(i);
        }

        // empty buckets left over from the last step would only slow queries
        self.buckets.retain(|_, bucket| !bucket.is_empty());
        self.len = positions.len() - skipped;

        if skipped > 0 {
            log::debug!("grid rebuild skipped {skipped} non-finite positions");
        }
        skipped
    }

    /// Every particle in the 27 cells around `point`
    pub fn neighbors(&self, point: &NVec3) -> Vec<usize> {
        let mut out = Vec::new();
        self.neighbors_into(point, &mut out);
        out
    }

    /// Same as [`neighbors`](Self::neighbors) but appends into `out`.
    /// A non-finite `point` has no neighbors
    pub fn neighbors_into(&self, point: &NVec3, out: &mut Vec<usize>) {
        if !is_finite(point) {
            return;
        }
        let (cx, cy, cz) = self.cell_key(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    // saturated keys at the far edge of i64 have no neighbor there
                    let (Some(x), Some(y), Some(z)) =
                        (cx.checked_add(dx), cy.checked_add(dy), cz.checked_add(dz))
                    else {
                        continue;
                    };
                    if let Some(bucket) = self.buckets.get(&(x, y, z)) {
                        out.extend_from_slice(bucket);
                    }
                }
            }
        }
    }

    pub fn bucket(&self, key: CellKey) -> Option<&[usize]> {
        self.buckets.get(&key).map(Vec::as_slice)
    }

    /// Number of populated cells
    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn validate_cell_size(cell_size: f64) -> Result<(), SimError> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidCellSize(cell_size))
    }
}

fn is_finite(p: &NVec3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}
