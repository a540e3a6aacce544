//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - step size and end time,
//! - interaction strength `G` and the pair cutoff `min_dist2`,
//! - an optional uniform field (gravity) and the random seed

use super::states::NVec3;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub t_end: f64, // time end
    pub h0: f64, // step size
    pub G: f64, // interaction strength of the pair law
    pub min_dist2: f64, // pairs closer than this (squared) are skipped
    pub seed: u64, // deterministic seed for generated clouds
    pub gravity: Option<NVec3>, // uniform acceleration on every particle
}

impl Parameters {
    /// Number of whole steps needed to reach `t_end` from t = 0
    pub fn step_count(&self) -> usize {
        (self.t_end / self.h0).ceil().max(0.0) as usize
    }
}
