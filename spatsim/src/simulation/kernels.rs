//! SPH smoothing kernel and the fluid terms built on it
//!
//! The kernel is a piecewise cubic spline over support radius `h`, with
//! `q = r / h` and normalization `σ = 40 / (7π h²)`:
//!
//! | range            | `W(q)`                 | `dW/dq`              |
//! |------------------|------------------------|----------------------|
//! | `0 <= q <= 0.5`  | `σ (6 (q³ − q²) + 1)`  | `σ (18 q² − 12 q)`   |
//! | `0.5 < q <= 1`   | `σ · 2 (1 − q)³`       | `σ (−6 (1 − q)²)`    |
//! | `q > 1`          | `0`                    | `0`                  |
//!
//! [`kernel_gradient`] returns `dW/dq · 2 / h`.
//!
//! Density, pressure and viscosity all reuse the neighbor lists produced by
//! [`NeighborSearch`](super::evaluator::NeighborSearch), so the neighbor
//! radius should equal `h`.

use std::f64::consts::PI;

use super::error::SimError;
use super::states::NVec3;

/// Keeps the pressure term finite when a neighbor density is zero
const DENSITY_EPS: f64 = 1e-4;

fn sigma(h: f64) -> f64 {
    40.0 / (7.0 * PI * h * h)
}

pub fn kernel(r: f64, h: f64) -> f64 {
    let q = r / h;
    let s = sigma(h);
    if q <= 0.5 {
        s * (6.0 * (q.powi(3) - q.powi(2)) + 1.0)
    } else if q <= 1.0 {
        s * (2.0 * (1.0 - q).powi(3))
    } else {
        0.0
    }
}

pub fn kernel_gradient(r: f64, h: f64) -> f64 {
    let q = r / h;
    let s = sigma(h);
    let gradient = if q <= 0.5 {
        s * (18.0 * q.powi(2) - 12.0 * q)
    } else if q <= 1.0 {
        s * (-6.0 * (1.0 - q).powi(2))
    } else {
        0.0
    };
    gradient * 2.0 / h
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphModel {
    pub smoothing_length: f64, // h, kernel support
    pub gas_constant: f64, // k in p = k * rho
    pub viscosity: f64, // mu
}

impl SphModel {
    pub fn new(smoothing_length: f64, gas_constant: f64, viscosity: f64) -> Result<Self, SimError> {
        if !(smoothing_length.is_finite() && smoothing_length > 0.0) {
            return Err(SimError::InvalidRadius(smoothing_length));
        }
        if !gas_constant.is_finite() || !viscosity.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "sph constants must be finite (gas_constant {gas_constant}, viscosity {viscosity})"
            )));
        }
        Ok(Self {
            smoothing_length,
            gas_constant,
            viscosity,
        })
    }

    /// `rho_i = Σ_j m_j W(|x_i − x_j|, h)` over each neighbor list
    pub fn densities(
        &self,
        positions: &[NVec3],
        masses: &[f64],
        neighbors: &[Vec<usize>],
        out: &mut [f64],
    ) {
        let h = self.smoothing_length;
        for (i, list) in neighbors.iter().enumerate() {
            out[i] = list
                .iter()
                .map(|&j| masses[j] * kernel((positions[j] - positions[i]).norm(), h))
                .sum();
        }
    }

    pub fn pressure(&self, density: f64) -> f64 {
        self.gas_constant * density
    }

    /// Add the pressure acceleration into `out`:
    /// `Σ_j (x_j − x_i) · ∇W(r) · (p_i + p_j) / (2 rho_j + ε)`.
    /// Coincident pairs contribute nothing.
    pub fn pressure_accel(
        &self,
        positions: &[NVec3],
        densities: &[f64],
        neighbors: &[Vec<usize>],
        out: &mut [NVec3],
    ) {
        let h = self.smoothing_length;
        for (i, list) in neighbors.iter().enumerate() {
            let pi = self.pressure(densities[i]);
            for &j in list {
                let dx = positions[j] - positions[i];
                let r = dx.norm();
                if r == 0.0 {
                    continue;
                }
                let pj = self.pressure(densities[j]);
                let factor = kernel_gradient(r, h) * (pi + pj) / (2.0 * densities[j] + DENSITY_EPS);
                out[i] += dx * factor;
            }
        }
    }

    /// Add the viscous acceleration into `out`: `Σ_j ∇W(r) · mu · (v_j − v_i)`
    pub fn viscosity_accel(
        &self,
        positions: &[NVec3],
        velocities: &[NVec3],
        neighbors: &[Vec<usize>],
        out: &mut [NVec3],
    ) {
        let h = self.smoothing_length;
        for (i, list) in neighbors.iter().enumerate() {
            for &j in list {
                let r = (positions[j] - positions[i]).norm();
                let factor = kernel_gradient(r, h) * self.viscosity;
                out[i] += (velocities[j] - velocities[i]) * factor;
            }
        }
    }
}
