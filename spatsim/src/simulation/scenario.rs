//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System` with particles at t = 0)
//! - active force set (`AccelSet`)
//!
//! The bundle is the explicit configuration object handed to every step;
//! nothing about a running simulation lives in globals.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{
    BoidsConfig, BoundaryConfig, CloudConfig, ForceModelConfig, IntegratorConfig, LawConfig,
    ScenarioConfig,
};
use crate::simulation::boundary::{Boundary, Containment, Plane};
use crate::simulation::engine::{Engine, ForceModel};
use crate::simulation::error::SimError;
use crate::simulation::evaluator::{
    InverseSquareAttraction, InverseSquareRepulsion, NeighborSearch, PairLaw, DEFAULT_MIN_DIST2,
};
use crate::simulation::forces::{
    AccelSet, DirectSum, Flocking, FlockingRule, HybridField, NearField, SphForces, UniformField,
};
use crate::simulation::integrator::{integrate, IntegratorKind};
use crate::simulation::kernels::SphModel;
use crate::simulation::octree::Octree;
use crate::simulation::params::Parameters;
use crate::simulation::report::StepReport;
use crate::simulation::states::{NVec3, System};

/// A fully-initialized simulation
///
/// Constructed from a [`ScenarioConfig`]: it contains the engine settings,
/// parameters, current system state, and the set of active acceleration
/// terms. [`Scenario::step`] advances it by one `h0`.
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub forces: AccelSet,
    accel: Vec<NVec3>, // scratch acceleration buffer, one entry per particle
}

impl Scenario {
    /// Assemble a scenario from already-built parts
    pub fn new(engine: Engine, parameters: Parameters, system: System, forces: AccelSet) -> Self {
        let n = system.len();
        Self {
            engine,
            parameters,
            system,
            forces,
            accel: vec![NVec3::zeros(); n],
        }
    }

    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, SimError> {
        // Parameters (runtime) from ParametersConfig
        let p_cfg = &cfg.parameters;
        if !(p_cfg.h0.is_finite() && p_cfg.h0 > 0.0) {
            return Err(SimError::InvalidTimeStep(p_cfg.h0));
        }
        if !(p_cfg.t_end.is_finite() && p_cfg.t_end >= 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "t_end must be finite and non-negative, got {}",
                p_cfg.t_end
            )));
        }
        let min_dist2 = p_cfg.min_dist2.unwrap_or(DEFAULT_MIN_DIST2);
        if !(min_dist2.is_finite() && min_dist2 >= 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "min_dist2 must be finite and non-negative, got {min_dist2}"
            )));
        }
        let gravity = p_cfg
            .gravity
            .as_deref()
            .map(|g| vec3(g, "parameters.gravity"))
            .transpose()?;
        if !p_cfg.G.is_finite() {
            return Err(SimError::InvalidParameter(format!("G must be finite, got {}", p_cfg.G)));
        }
        if let Some(g) = gravity {
            if !g.iter().all(|c| c.is_finite()) {
                return Err(SimError::InvalidParameter(format!(
                    "parameters.gravity must be finite, got {g:?}"
                )));
            }
        }
        let parameters = Parameters {
            t_end: p_cfg.t_end,
            h0: p_cfg.h0,
            G: p_cfg.G,
            min_dist2,
            seed: p_cfg.seed,
            gravity,
        };

        // Particles: explicit bodies first, then the generated cloud
        let system = build_system(&cfg, parameters.seed)?;

        // Engine (runtime) from EngineConfig
        let e_cfg = &cfg.engine;
        let integrator = match e_cfg.integrator {
            IntegratorConfig::Euler => IntegratorKind::Euler,
            IntegratorConfig::Verlet => IntegratorKind::Verlet,
        };
        let force_model = match e_cfg.force_model {
            ForceModelConfig::Direct => ForceModel::Direct,
            ForceModelConfig::Grid => ForceModel::Grid,
            ForceModelConfig::Hybrid => ForceModel::Hybrid,
            ForceModelConfig::Sph => ForceModel::Sph,
            ForceModelConfig::Boids => ForceModel::Boids,
        };
        let containment = e_cfg.boundary.as_ref().map(build_containment).transpose()?;
        let engine = Engine {
            integrator,
            force_model,
            containment,
        };

        // Forces: optional uniform field, then the configured pair model
        let forces = build_forces(&cfg, &parameters)?;

        log::info!(
            "scenario built: {} particles, {:?} / {:?}, dt = {}",
            system.len(),
            engine.force_model,
            engine.integrator,
            parameters.h0
        );

        Ok(Self::new(engine, parameters, system, forces))
    }

    /// Advance by one time step:
    /// accelerations into a separate buffer, then integration, then walls
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport::new();
        let dt = self.parameters.h0;

        self.accel.resize(self.system.len(), NVec3::zeros());
        self.forces
            .accumulate_accels(self.system.t, &self.system, &mut self.accel, &mut report);

        integrate(self.engine.integrator, &mut self.system, &self.accel, dt, &mut report);

        if let Some(containment) = &self.engine.containment {
            for (x, v) in self.system.x.iter_mut().zip(self.system.v.iter_mut()) {
                if containment.apply(x, v) {
                    report.boundary_hits += 1;
                }
            }
        }

        report
    }

    /// Run `steps` steps and return the combined report
    pub fn run(&mut self, steps: usize) -> StepReport {
        let mut total = StepReport::new();
        for _ in 0..steps {
            total.merge(&self.step());
        }
        total
    }

    /// Accelerations computed by the last step
    pub fn accelerations(&self) -> &[NVec3] {
        &self.accel
    }
}

// helpers ===========================================================================

fn vec3(values: &[f64], what: &str) -> Result<NVec3, SimError> {
    match values {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(SimError::InvalidParameter(format!(
            "{what} needs 3 components, got {}",
            values.len()
        ))),
    }
}

fn build_system(cfg: &ScenarioConfig, seed: u64) -> Result<System, SimError> {
    let mut x = Vec::new();
    let mut v = Vec::new();
    let mut m = Vec::new();

    // Bodies: map `BodyConfig` -> parallel arrays using nalgebra vectors
    for (index, bc) in cfg.bodies.iter().enumerate() {
        let pos = match bc.x.as_slice() {
            [a, b, c] => NVec3::new(*a, *b, *c),
            other => {
                return Err(SimError::InvalidBody {
                    index,
                    reason: format!("position needs 3 components, got {}", other.len()),
                })
            }
        };
        let vel = match bc.v.as_slice() {
            [] => NVec3::zeros(),
            [a, b, c] => NVec3::new(*a, *b, *c),
            other => {
                return Err(SimError::InvalidBody {
                    index,
                    reason: format!("velocity needs 3 components, got {}", other.len()),
                })
            }
        };
        x.push(pos);
        v.push(vel);
        m.push(bc.m.unwrap_or(1.0));
    }

    if let Some(cloud) = &cfg.cloud {
        generate_cloud(cloud, seed, &mut x, &mut v, &mut m)?;
    }

    System::new(x, v, m)
}

/// Uniform random positions in a cube and velocities in `[-speed, speed]`
fn generate_cloud(
    cloud: &CloudConfig,
    seed: u64,
    x: &mut Vec<NVec3>,
    v: &mut Vec<NVec3>,
    m: &mut Vec<f64>,
) -> Result<(), SimError> {
    let h = cloud.half_extent;
    if !(h.is_finite() && h > 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "cloud.half_extent must be positive and finite, got {h}"
        )));
    }
    if !(cloud.speed.is_finite() && cloud.speed >= 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "cloud.speed must be finite and non-negative, got {}",
            cloud.speed
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let speed = cloud.speed;
    for _ in 0..cloud.count {
        x.push(NVec3::new(
            rng.random_range(-h..h),
            rng.random_range(-h..h),
            rng.random_range(-h..h),
        ));
        let vel = if speed > 0.0 {
            NVec3::new(
                rng.random_range(-speed..speed),
                rng.random_range(-speed..speed),
                rng.random_range(-speed..speed),
            )
        } else {
            NVec3::zeros()
        };
        v.push(vel);
        m.push(cloud.mass.unwrap_or(1.0));
    }
    Ok(())
}

fn build_containment(cfg: &BoundaryConfig) -> Result<Containment, SimError> {
    match cfg {
        BoundaryConfig::Sphere {
            center,
            radius,
            restitution,
        } => {
            let center = center
                .as_deref()
                .map(|c| vec3(c, "boundary.center"))
                .transpose()?
                .unwrap_or_else(NVec3::zeros);
            Containment::new(
                Boundary::Sphere {
                    center,
                    radius: *radius,
                },
                *restitution,
            )
        }
        BoundaryConfig::Box {
            min,
            max,
            restitution,
        } => Containment::new(
            Boundary::Box {
                min: vec3(min, "boundary.min")?,
                max: vec3(max, "boundary.max")?,
            },
            *restitution,
        ),
        BoundaryConfig::Convex {
            planes,
            restitution,
        } => {
            let planes = planes
                .iter()
                .map(|p| Plane::new(vec3(&p.normal, "boundary.planes.normal")?, p.offset))
                .collect::<Result<Vec<_>, _>>()?;
            Containment::new(Boundary::Convex(planes), *restitution)
        }
    }
}

fn build_search(radius: Option<f64>, cell_size: Option<f64>) -> Result<NeighborSearch, SimError> {
    let radius = radius.ok_or(SimError::MissingSection("engine.search_radius"))?;
    match cell_size {
        Some(cell) => NeighborSearch::with_cell_size(radius, cell),
        None => NeighborSearch::new(radius),
    }
}

fn build_forces(cfg: &ScenarioConfig, parameters: &Parameters) -> Result<AccelSet, SimError> {
    let e_cfg = &cfg.engine;
    let mut forces = AccelSet::new();

    if let Some(g) = parameters.gravity {
        forces = forces.with(UniformField { g });
    }

    // a NaN range would silently disable the cutoff
    if let Some(range) = e_cfg.law_range {
        if !(range.is_finite() && range > 0.0) {
            return Err(SimError::InvalidRadius(range));
        }
    }

    let law = match e_cfg.law {
        LawConfig::Attraction => PairLaw::Attraction(InverseSquareAttraction {
            strength: parameters.G,
            min_dist2: parameters.min_dist2,
        }),
        LawConfig::Repulsion => PairLaw::Repulsion(InverseSquareRepulsion {
            strength: parameters.G,
            min_dist2: parameters.min_dist2,
            range: e_cfg.law_range,
        }),
    };

    forces = match e_cfg.force_model {
        ForceModelConfig::Direct => forces.with(DirectSum { law }),
        ForceModelConfig::Grid => forces.with(NearField {
            law,
            search: build_search(e_cfg.search_radius, e_cfg.cell_size)?,
        }),
        ForceModelConfig::Hybrid => {
            let o_cfg = e_cfg.octree.as_ref().ok_or(SimError::MissingSection("engine.octree"))?;
            let half_extents = vec3(&o_cfg.half_extents, "octree.half_extents")?;
            let center = o_cfg
                .center
                .as_deref()
                .map(|c| vec3(c, "octree.center"))
                .transpose()?
                .unwrap_or_else(NVec3::zeros);
            let octree = Octree::new(center, half_extents, o_cfg.max_depth)?;
            if o_cfg.far_level > o_cfg.max_depth {
                return Err(SimError::InvalidLevel {
                    level: o_cfg.far_level,
                    max_depth: o_cfg.max_depth,
                });
            }
            forces.with(HybridField {
                law,
                search: build_search(e_cfg.search_radius, e_cfg.cell_size)?,
                octree,
                far_level: o_cfg.far_level,
            })
        }
        ForceModelConfig::Sph => {
            let s_cfg = cfg.parameters.sph.ok_or(SimError::MissingSection("parameters.sph"))?;
            let model = SphModel::new(s_cfg.smoothing_length, s_cfg.gas_constant, s_cfg.viscosity)?;
            let search = build_search(Some(model.smoothing_length), e_cfg.cell_size)?;
            forces.with(SphForces::new(model, search))
        }
        ForceModelConfig::Boids => {
            let b_cfg = cfg.parameters.boids.unwrap_or_default();
            let rule = build_flocking_rule(&b_cfg)?;
            let search = build_search(Some(b_cfg.radius), e_cfg.cell_size)?;
            forces.with(Flocking { rule, search })
        }
    };

    Ok(forces)
}

fn build_flocking_rule(cfg: &BoidsConfig) -> Result<FlockingRule, SimError> {
    let weights = [cfg.alignment, cfg.cohesion, cfg.separation, cfg.responsiveness];
    if !weights.iter().all(|w| w.is_finite() && *w >= 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "boids weights must be finite and non-negative, got {weights:?}"
        )));
    }
    if !(cfg.max_speed.is_finite() && cfg.max_speed > 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "boids.max_speed must be positive and finite, got {}",
            cfg.max_speed
        )));
    }
    Ok(FlockingRule {
        alignment: cfg.alignment,
        cohesion: cfg.cohesion,
        separation: cfg.separation,
        max_speed: cfg.max_speed,
        responsiveness: cfg.responsiveness,
    })
}
