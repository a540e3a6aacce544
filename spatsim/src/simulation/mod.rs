pub mod states;
pub mod params;
pub mod engine;
pub mod error;
pub mod report;
pub mod grid;
pub mod octree;
pub mod evaluator;
pub mod kernels;
pub mod forces;
pub mod integrator;
pub mod boundary;
pub mod scenario;
