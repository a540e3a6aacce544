//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator, force model, spatial index settings, walls
//! - [`ParametersConfig`] – step size, interaction strength, cutoffs, SPH constants
//! - [`BoidsConfig`]      – flocking weights for the boids model
//! - [`BodyConfig`]       – initial state for each explicit particle
//! - [`CloudConfig`]      – optional seeded random particle cloud
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario matching these types:
//!
//! ```yaml
//! engine:
//!   integrator: "verlet"      # or "euler"
//!   force_model: "hybrid"     # "direct", "grid", "hybrid", "sph" or "boids"
//!   law: "attraction"         # or "repulsion"
//!   search_radius: 2.0        # near-field radius
//!   cell_size: 2.0            # optional, defaults to search_radius
//!   octree:
//!     half_extents: [10.0, 10.0, 10.0]
//!     max_depth: 4
//!     far_level: 2
//!   boundary:
//!     kind: "sphere"
//!     radius: 10.0
//!     restitution: 0.8
//!
//! parameters:
//!   t_end: 1.0                # total simulation time
//!   h0: 0.01                  # fixed step size
//!   G: 1.0                    # interaction strength
//!   min_dist2: 0.1            # pair cutoff (squared distance)
//!   seed: 42                  # seed for the cloud generator
//!
//! bodies:
//!   - x: [ -0.5, 0.0, 0.0 ]
//!     v: [  0.0, 1.0, 0.0 ]
//!   - x: [  0.5, 0.0, 0.0 ]
//!     v: [  0.0, -1.0, 0.0 ]
//!     m: 2.0
//!
//! cloud:
//!   count: 500
//!   half_extent: 5.0
//!   speed: 0.1
//! ```
//!
//! The scenario builder validates this configuration and maps it into the
//! runtime representation; every configuration error surfaces there, before
//! the first step.

use serde::Deserialize;

/// Which integrator method used by the engine
/// `integrator: "euler"` or `integrator: "verlet"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // semi-implicit Euler: v += a dt, then x += v dt
    Euler,

    #[serde(rename = "verlet")] // velocity Verlet: x += v dt + a dt^2 / 2, then v += a dt
    Verlet,
}

/// How pairwise accelerations are evaluated
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForceModelConfig {
    Direct,
    Grid,
    Hybrid,
    Sph,
    Boids,
}

/// Which built-in pair law the pairwise models use
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LawConfig {
    #[default]
    Attraction,
    Repulsion,
}

/// Fixed-extent octree used by the hybrid model
#[derive(Deserialize, Debug, Clone)]
pub struct OctreeConfig {
    pub half_extents: Vec<f64>, // half size of the root box per axis
    pub center: Option<Vec<f64>>, // root box center, origin if omitted
    pub max_depth: usize, // levels below the root, allocated up front
    pub far_level: usize, // level whose aggregates act as far-field sources
}

/// Container walls; omitted for open scenes
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BoundaryConfig {
    Sphere {
        center: Option<Vec<f64>>,
        radius: f64,
        restitution: f64,
    },
    Box {
        min: Vec<f64>,
        max: Vec<f64>,
        restitution: f64,
    },
    Convex {
        planes: Vec<PlaneConfig>, // inside is where every normal · x <= offset
        restitution: f64,
    },
}

/// One wall of a convex container, `normal` points out
#[derive(Deserialize, Debug, Clone)]
pub struct PlaneConfig {
    pub normal: Vec<f64>,
    pub offset: f64,
}

/// High-level engine configuration
/// Controls the structure of the simulation
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // Time integrator used for advancing the system state
    pub force_model: ForceModelConfig, // How pairwise interactions are evaluated
    #[serde(default)]
    pub law: LawConfig, // Pair law for direct / grid / hybrid
    pub law_range: Option<f64>, // Repulsion only acts closer than this
    pub search_radius: Option<f64>, // Near-field radius, required by grid and hybrid
    pub cell_size: Option<f64>, // Grid cell size, must be >= search_radius
    pub octree: Option<OctreeConfig>, // Required by the hybrid model
    pub boundary: Option<BoundaryConfig>, // Container walls
}

/// Smoothed-particle hydrodynamics constants
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct SphConfig {
    pub smoothing_length: f64, // kernel support h, also the neighbor radius
    pub gas_constant: f64, // pressure = gas_constant * density
    pub viscosity: f64, // viscosity coefficient
}

/// Flocking constants, every field optional
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct BoidsConfig {
    pub radius: f64, // perception radius
    pub alignment: f64,
    pub cohesion: f64,
    pub separation: f64,
    pub max_speed: f64,
    pub responsiveness: f64, // how fast velocity turns toward the desired one
}

impl Default for BoidsConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            alignment: 1.3,
            cohesion: 1.0,
            separation: 1.1,
            max_speed: 1.0,
            responsiveness: 6.0,
        }
    }
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64, // time end
    pub h0: f64, // time step size
    pub G: f64, // interaction strength
    pub min_dist2: Option<f64>, // pair cutoff, squared distance
    #[serde(default)]
    pub seed: u64, // deterministic seed to make runs reproducible
    pub gravity: Option<Vec<f64>>, // uniform acceleration, e.g. [0, -2, 0]
    pub sph: Option<SphConfig>, // Required by the sph model
    pub boids: Option<BoidsConfig>, // Used by the boids model, defaults if omitted
}

/// Configuration for a single particle's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // Initial position in simulation units
    #[serde(default)]
    pub v: Vec<f64>, // Initial velocity, at rest if omitted
    pub m: Option<f64>, // Mass, 1 if omitted
}

/// Seeded random cloud: positions uniform in a cube, velocities uniform in
/// `[-speed, speed]` per axis
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct CloudConfig {
    pub count: usize,
    pub half_extent: f64,
    #[serde(default)]
    pub speed: f64,
    pub mass: Option<f64>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // Engine-level configuration
    pub parameters: ParametersConfig, // Global numerical and physical parameters
    #[serde(default)]
    pub bodies: Vec<BodyConfig>, // Explicit particles
    pub cloud: Option<CloudConfig>, // Generated particles, appended after `bodies`
}

impl ScenarioConfig {
    pub fn from_yaml(src: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(src)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}
