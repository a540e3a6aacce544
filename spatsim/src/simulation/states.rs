//! Core state types for the particle simulation.
//!
//! Particle state is stored as a struct of arrays: positions, velocities and
//! masses live in parallel dense vectors indexed by particle id. The
//! population is fixed once the `System` is built; indices are stable for
//! the whole run.

use nalgebra::Vector3;

use super::error::SimError;

pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone)]
pub struct System {
    pub x: Vec<NVec3>, // positions
    pub v: Vec<NVec3>, // velocities
    pub m: Vec<f64>, // masses
    pub t: f64, // time
}

impl System {
    /// Build a system from parallel arrays. All three must have the same
    /// length and every mass must be positive and finite
    pub fn new(x: Vec<NVec3>, v: Vec<NVec3>, m: Vec<f64>) -> Result<Self, SimError> {
        if v.len() != x.len() {
            return Err(SimError::LengthMismatch {
                what: "velocities",
                expected: x.len(),
                got: v.len(),
            });
        }
        if m.len() != x.len() {
            return Err(SimError::LengthMismatch {
                what: "masses",
                expected: x.len(),
                got: m.len(),
            });
        }
        if let Some((index, &mass)) = m
            .iter()
            .enumerate()
            .find(|(_, mass)| !(mass.is_finite() && **mass > 0.0))
        {
            return Err(SimError::InvalidMass { index, mass });
        }

        Ok(Self { x, v, m, t: 0.0 })
    }

    /// Unit-mass particles at rest
    pub fn at_rest(x: Vec<NVec3>) -> Self {
        let n = x.len();
        Self {
            x,
            v: vec![NVec3::zeros(); n],
            m: vec![1.0; n],
            t: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Mass-weighted center of the whole population
    pub fn center_of_mass(&self) -> NVec3 {
        let total: f64 = self.m.iter().sum();
        if total == 0.0 {
            return NVec3::zeros();
        }
        let weighted = self
            .x
            .iter()
            .zip(&self.m)
            .fold(NVec3::zeros(), |acc, (x, m)| acc + x * *m);
        weighted / total
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.v
            .iter()
            .zip(&self.m)
            .map(|(v, m)| 0.5 * m * v.norm_squared())
            .sum()
    }
}
