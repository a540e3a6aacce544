//! Fixed-step time integrators
//!
//! Both schemes consume an acceleration buffer filled beforehand by an
//! [`AccelSet`](super::forces::AccelSet); positions are never read and
//! written in the same pass.
//!
//! A particle whose update turns non-finite keeps its previous position and
//! velocity. The skip is logged and recorded in the [`StepReport`]; the
//! remaining particles are advanced normally.

use super::report::{ParticleStatus, StepReport};
use super::states::{NVec3, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorKind {
    Euler, // semi-implicit: velocity first, then position with the new velocity
    Verlet, // x += v dt + a dt^2 / 2, then v += a dt
}

/// Advance one particle in place.
///
/// Returns [`ParticleStatus::SkippedNonFinite`] (and leaves `x`, `v`
/// untouched) if either updated vector has a NaN or infinite component
pub fn advance_particle(
    kind: IntegratorKind,
    x: &mut NVec3,
    v: &mut NVec3,
    a: &NVec3,
    dt: f64,
) -> ParticleStatus {
    let (x_new, v_new) = match kind {
        IntegratorKind::Euler => {
            // v_n+1 = v_n + dt a_n, x_n+1 = x_n + dt v_n+1
            let v_new = *v + a * dt;
            (*x + v_new * dt, v_new)
        }
        IntegratorKind::Verlet => {
            // x_n+1 = x_n + dt v_n + dt^2/2 a_n, v_n+1 = v_n + dt a_n
            let x_new = *x + *v * dt + a * (0.5 * dt * dt);
            (x_new, *v + a * dt)
        }
    };

    if !(is_finite(&x_new) && is_finite(&v_new)) {
        return ParticleStatus::SkippedNonFinite;
    }
    *x = x_new;
    *v = v_new;
    ParticleStatus::Ok
}

/// Advance every particle of `sys` by `dt` using `accel[i]`, then `sys.t`
pub fn integrate(
    kind: IntegratorKind,
    sys: &mut System,
    accel: &[NVec3],
    dt: f64,
    report: &mut StepReport,
) {
    for (i, ((x, v), a)) in sys.x.iter_mut().zip(sys.v.iter_mut()).zip(accel).enumerate() {
        let status = advance_particle(kind, x, v, a, dt);
        if status == ParticleStatus::SkippedNonFinite {
            log::warn!("non-finite update for particle {i} at t = {}, keeping previous state", sys.t);
        }
        report.record(i, status);
    }
    sys.t += dt;
}

fn is_finite(v: &NVec3) -> bool {
    v.iter().all(|c| c.is_finite())
}
