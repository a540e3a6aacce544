pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{System, NVec3};
pub use simulation::error::SimError;
pub use simulation::report::{StepReport, ParticleStatus};
pub use simulation::grid::{SpatialHashGrid, CellKey};
pub use simulation::octree::{Octree, OctreeNode, Aggregate, MAX_OCTREE_DEPTH};
pub use simulation::evaluator::{
    NeighborSearch, NeighborLists, ForceLaw, PairLaw, InverseSquareAttraction, InverseSquareRepulsion,
    brute_force_neighbor_lists, compute_forces, compute_approximate_forces, compute_direct_forces,
    DEFAULT_MIN_DIST2,
};
pub use simulation::kernels::{kernel, kernel_gradient, SphModel};
pub use simulation::forces::{
    Acceleration, AccelSet, UniformField, DirectSum, NearField, HybridField, SphForces, Flocking, FlockingRule,
};
pub use simulation::integrator::{integrate, advance_particle, IntegratorKind};
pub use simulation::boundary::{Boundary, Containment, Plane};
pub use simulation::engine::{Engine, ForceModel};
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;

pub use configuration::config::{
    ScenarioConfig, EngineConfig, ParametersConfig, BodyConfig, CloudConfig, OctreeConfig, BoundaryConfig,
    SphConfig, BoidsConfig, PlaneConfig, IntegratorConfig, ForceModelConfig, LawConfig,
};

pub use benchmark::benchmark::{bench_neighbors, bench_forces, bench_steps};
