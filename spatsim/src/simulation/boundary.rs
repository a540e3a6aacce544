//! Container walls for enclosed simulations
//!
//! A particle found outside its container after integration is clamped back
//! onto the surface and, if it was still moving outward, has its velocity
//! reflected about the outward normal and scaled by the restitution
//! coefficient (0 = perfectly inelastic, 1 = perfectly elastic).

use super::error::SimError;
use super::states::NVec3;

/// Half-space `normal · x <= offset`, `normal` is unit length and points out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: NVec3,
    pub offset: f64,
}

impl Plane {
    pub fn new(normal: NVec3, offset: f64) -> Result<Self, SimError> {
        let len = normal.norm();
        if !(len.is_finite() && len > 0.0) || !offset.is_finite() {
            return Err(SimError::InvalidBoundary(format!(
                "plane normal {normal:?} / offset {offset} is degenerate"
            )));
        }
        Ok(Self {
            normal: normal / len,
            offset: offset / len,
        })
    }

    /// Signed distance, positive outside
    pub fn distance(&self, p: &NVec3) -> f64 {
        self.normal.dot(p) - self.offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Sphere { center: NVec3, radius: f64 },
    Box { min: NVec3, max: NVec3 },
    Convex(Vec<Plane>), // intersection of half-spaces, e.g. a polygonal table
}

impl Boundary {
    fn validate(&self) -> Result<(), SimError> {
        match self {
            Boundary::Sphere { center, radius } => {
                if !(radius.is_finite() && *radius > 0.0) || !center.iter().all(|c| c.is_finite()) {
                    return Err(SimError::InvalidBoundary(format!(
                        "sphere radius {radius} must be positive and finite"
                    )));
                }
            }
            Boundary::Box { min, max } => {
                let ordered = (0..3).all(|k| min[k].is_finite() && max[k].is_finite() && min[k] < max[k]);
                if !ordered {
                    return Err(SimError::InvalidBoundary(format!(
                        "box min {min:?} must be strictly below max {max:?}"
                    )));
                }
            }
            Boundary::Convex(planes) => {
                if planes.is_empty() {
                    return Err(SimError::InvalidBoundary("convex boundary has no planes".into()));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Containment {
    pub boundary: Boundary,
    pub restitution: f64,
}

impl Containment {
    pub fn new(boundary: Boundary, restitution: f64) -> Result<Self, SimError> {
        if !(0.0..=1.0).contains(&restitution) {
            return Err(SimError::InvalidRestitution(restitution));
        }
        boundary.validate()?;
        Ok(Self {
            boundary,
            restitution,
        })
    }

    /// Push `x` back inside and reflect `v`. Returns true on a hit
    pub fn apply(&self, x: &mut NVec3, v: &mut NVec3) -> bool {
        match &self.boundary {
            Boundary::Sphere { center, radius } => {
                let offset = *x - center;
                let dist = offset.norm();
                if dist <= *radius || dist == 0.0 {
                    return false;
                }
                let normal = offset / dist;
                *x = center + normal * *radius;
                self.reflect(v, &normal);
                true
            }
            Boundary::Box { min, max } => {
                let mut hit = false;
                for k in 0..3 {
                    if x[k] < min[k] {
                        x[k] = min[k];
                        if v[k] < 0.0 {
                            v[k] = -v[k];
                        }
                        hit = true;
                    } else if x[k] > max[k] {
                        x[k] = max[k];
                        if v[k] > 0.0 {
                            v[k] = -v[k];
                        }
                        hit = true;
                    }
                }
                // restitution once per hit, even at a corner
                if hit {
                    *v *= self.restitution;
                }
                hit
            }
            Boundary::Convex(planes) => {
                let mut hit = false;
                for plane in planes {
                    let d = plane.distance(x);
                    if d > 0.0 {
                        *x -= plane.normal * d;
                        let vn = v.dot(&plane.normal);
                        if vn > 0.0 {
                            *v -= plane.normal * (2.0 * vn);
                        }
                        hit = true;
                    }
                }
                if hit {
                    *v *= self.restitution;
                }
                hit
            }
        }
    }

    fn reflect(&self, v: &mut NVec3, normal: &NVec3) {
        let vn = v.dot(normal);
        if vn > 0.0 {
            *v -= normal * (2.0 * vn);
        }
        *v *= self.restitution;
    }
}
