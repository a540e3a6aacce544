//! # Fixed-depth octree (3D)
//!
//! A complete 8-ary tree over a fixed axis-aligned box, used to aggregate
//! particles into far-field sources.
//!
//! ## Layout
//!
//! - Every node down to `max_depth` is allocated once at construction, so
//!   memory grows as `8^max_depth`; depth is capped at [`MAX_OCTREE_DEPTH`].
//! - Nodes live in a single arena (`Vec<OctreeNode>`) and refer to each
//!   other by index. Children are stored as `[Option<usize>; 8]`, all `None`
//!   on leaves, and every node knows its parent.
//! - The arena is filled breadth-first, so the nodes of one level form a
//!   contiguous slice. Level 0 is the root.
//!
//! ## Membership
//!
//! A particle is recorded in **every** node on its path from the root down
//! to its leaf, not only in the leaf. Aggregating at a shallow
//! level relies on this. Bounds are inclusive; a point lying exactly on a
//! split plane goes to the first child (in octant order) that accepts it, so
//! each level still holds every particle at most once.
//!
//! Particles outside the root box are not inserted anywhere. They still
//! take part in grid-based near-field queries, which have no fixed extents.

use super::error::SimError;
use super::states::NVec3;

/// Deepest tree accepted by [`Octree::new`] (8^6 = 262144 leaves)
pub const MAX_OCTREE_DEPTH: usize = 6;

#[derive(Debug, Clone)]
pub struct OctreeNode {
    pub bbox_min: NVec3,
    pub bbox_max: NVec3,
    pub depth: usize, // 0 = root
    pub parent: Option<usize>, // index into Octree::nodes
    pub children: [Option<usize>; 8], // indices into Octree::nodes
    pub particles: Vec<usize>, // particle indices, in insertion order
}

impl OctreeNode {
    fn new(bbox_min: NVec3, bbox_max: NVec3, depth: usize, parent: Option<usize>) -> Self {
        Self {
            bbox_min,
            bbox_max,
            depth,
            parent,
            children: [None; 8],
            particles: Vec::new(),
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, p: &NVec3) -> bool {
        p.x >= self.bbox_min.x
            && p.x <= self.bbox_max.x
            && p.y >= self.bbox_min.y
            && p.y <= self.bbox_max.y
            && p.z >= self.bbox_min.z
            && p.z <= self.bbox_max.z
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }

    pub fn center(&self) -> NVec3 {
        (self.bbox_min + self.bbox_max) * 0.5
    }
}

/// One far-field source: the center of mass of a populated node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub com: NVec3, // center of mass
    pub mass: f64, // total mass (particle count for unit masses)
    pub count: usize, // number of particles in the node
}

#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    level_offsets: Vec<usize>, // level L occupies nodes[level_offsets[L]..level_offsets[L + 1]]
    max_depth: usize,
}

impl Octree {
    /// Build the complete tree over `center ± half_extents`.
    ///
    /// # Errors
    /// - [`SimError::InvalidDepth`] if `max_depth` is 0
    /// - [`SimError::DepthTooLarge`] if `max_depth > MAX_OCTREE_DEPTH`
    /// - [`SimError::InvalidExtents`] if any half extent is not positive and finite
    pub fn new(center: NVec3, half_extents: NVec3, max_depth: usize) -> Result<Self, SimError> {
        if max_depth == 0 {
            return Err(SimError::InvalidDepth(max_depth));
        }
        if max_depth > MAX_OCTREE_DEPTH {
            return Err(SimError::DepthTooLarge {
                depth: max_depth,
                max: MAX_OCTREE_DEPTH,
            });
        }
        let extents_ok = half_extents.iter().all(|h| h.is_finite() && *h > 0.0);
        if !extents_ok || !center.iter().all(|c| c.is_finite()) {
            return Err(SimError::InvalidExtents([
                half_extents.x,
                half_extents.y,
                half_extents.z,
            ]));
        }

        let total: usize = (0..=max_depth).map(|l| 8usize.pow(l as u32)).sum();
        let mut nodes = Vec::with_capacity(total);
        let mut level_offsets = Vec::with_capacity(max_depth + 2);

        nodes.push(OctreeNode::new(center - half_extents, center + half_extents, 0, None));
        level_offsets.push(0);

        // Breadth-first: subdivide every node of the current level before
        // moving on, so each level ends up contiguous in the arena
        for depth in 0..max_depth {
            let start = level_offsets[depth];
            let end = nodes.len();
            level_offsets.push(end);

            for parent in start..end {
                let (pmin, pmax) = (nodes[parent].bbox_min, nodes[parent].bbox_max);
                for child_idx in 0..8 {
                    let (cmin, cmax) = child_bbox(&pmin, &pmax, child_idx);
                    let new_idx = nodes.len();
                    nodes.push(OctreeNode::new(cmin, cmax, depth + 1, Some(parent)));
                    nodes[parent].children[child_idx] = Some(new_idx);
                }
            }
        }
        level_offsets.push(nodes.len());

        log::debug!("octree built: depth {max_depth}, {} nodes", nodes.len());

        Ok(Self {
            nodes,
            level_offsets,
            max_depth,
        })
    }

    /// Tree over `[-half_extents, half_extents]`
    pub fn centered(half_extents: NVec3, max_depth: usize) -> Result<Self, SimError> {
        Self::new(NVec3::zeros(), half_extents, max_depth)
    }

    /// Insert every position, starting at the root.
    ///
    /// Returns the number of particles that fell outside the root bounds and
    /// were therefore left out of the tree.
    pub fn insert(&mut self, positions: &[NVec3]) -> usize {
        let mut outside = 0;
        for (i, p) in positions.iter().enumerate() {
            if !self.insert_particle(0, i, p) {
                outside += 1;
            }
        }
        if outside > 0 {
            log::debug!("{outside} particles outside octree extents, excluded from aggregation");
        }
        outside
    }

    /// Empty every node, keeping the structure
    pub fn clear(&mut self) {
        for node in &mut self.nodes {
            node.particles.clear();
        }
    }

    /// [`clear`](Self::clear) followed by [`insert`](Self::insert)
    pub fn rebuild(&mut self, positions: &[NVec3]) -> usize {
        self.clear();
        self.insert(positions)
    }

    /// Mean position of every populated node at `level`.
    ///
    /// Levels deeper than `max_depth` have no nodes and yield nothing.
    pub fn aggregate_at(&self, level: usize, positions: &[NVec3]) -> Vec<NVec3> {
        self.aggregates_at(level, positions, None)
            .into_iter()
            .map(|a| a.com)
            .collect()
    }

    /// Center of mass, total mass and count of every populated node at
    /// `level`. Without `masses` every particle weighs 1
    pub fn aggregates_at(
        &self,
        level: usize,
        positions: &[NVec3],
        masses: Option<&[f64]>,
    ) -> Vec<Aggregate> {
        let mut out = Vec::new();
        for node in self.nodes_at(level) {
            if node.particles.is_empty() {
                continue;
            }

            let mut mass = 0.0;
            let mut com = NVec3::zeros();
            for &i in &node.particles {
                let m = masses.map_or(1.0, |ms| ms[i]);
                mass += m;
                com += positions[i] * m;
            }
            if mass > 0.0 {
                com /= mass;
            }

            out.push(Aggregate {
                com,
                mass,
                count: node.particles.len(),
            });
        }
        out
    }

    /// Nodes at `level`, empty past `max_depth`
    pub fn nodes_at(&self, level: usize) -> &[OctreeNode] {
        if level > self.max_depth {
            return &[];
        }
        &self.nodes[self.level_offsets[level]..self.level_offsets[level + 1]]
    }

    /// Walk from `node_idx`'s parent up to the root
    pub fn ancestors(&self, node_idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes[node_idx].parent, move |&i| self.nodes[i].parent)
    }

    pub fn root(&self) -> &OctreeNode {
        &self.nodes[0]
    }

    pub fn node(&self, idx: usize) -> &OctreeNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn contains(&self, p: &NVec3) -> bool {
        self.root().contains(p)
    }

    // helpers ==============================================================================

    /// Record `particle` in `node_idx` if it lies inside, then offer it to
    /// the children in octant order; the containment check does the
    /// filtering. Only the first accepting child keeps it, which matters
    /// for points on a shared face.
    fn insert_particle(&mut self, node_idx: usize, particle: usize, p: &NVec3) -> bool {
        if !self.nodes[node_idx].contains(p) {
            return false;
        }
        self.nodes[node_idx].particles.push(particle);

        let children = self.nodes[node_idx].children; // [Option<usize>; 8] is Copy
        for child in children.iter().flatten() {
            if self.insert_particle(*child, particle, p) {
                break;
            }
        }
        true
    }
}

// helpers ===========================================================================

/// Compute the axis-aligned bounding box for a given child octant.
///
/// The child index encodes one bit per axis: bit 0 (value 1) selects the
/// upper x half, bit 1 (value 2) the upper y half, bit 2 (value 4) the upper
/// z half.
fn child_bbox(parent_min: &NVec3, parent_max: &NVec3, child_idx: usize) -> (NVec3, NVec3) {
    let center = (parent_min + parent_max) * 0.5;

    let mut min = *parent_min;
    let mut max = *parent_max;

    // x: bit 0
    if (child_idx & 1) == 0 {
        max.x = center.x;
    } else {
        min.x = center.x;
    }

    // y: bit 1
    if (child_idx & 2) == 0 {
        max.y = center.y;
    } else {
        min.y = center.y;
    }

    // z: bit 2
    if (child_idx & 4) == 0 {
        max.z = center.z;
    } else {
        min.z = center.z;
    }

    (min, max)
}
