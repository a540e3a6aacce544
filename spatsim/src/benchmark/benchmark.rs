use std::time::Instant;
use crate::simulation::states::{System, NVec3};
use crate::simulation::evaluator::{brute_force_neighbor_lists, InverseSquareAttraction, NeighborSearch};
use crate::simulation::forces::{AccelSet, DirectSum, HybridField, NearField};
use crate::simulation::integrator::{integrate, IntegratorKind};
use crate::simulation::octree::Octree;
use crate::simulation::report::StepReport;
use crate::simulation::error::SimError;

const RADIUS: f64 = 1.0;
const HALF_EXTENT: f64 = 6.0;

/// Deterministic particle cloud inside [-5, 5]^3, no rand needed
fn make_positions(n: usize) -> Vec<NVec3> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            )
        })
        .collect()
}

fn same_set(a: &[usize], b: &[usize]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Brute-force neighbor lists against the grid-backed search
pub fn bench_neighbors() -> Result<(), SimError> {
    let ns = [200, 400, 800, 1600, 3200, 6400];

    for n in ns {
        let positions = make_positions(n);
        let mut search = NeighborSearch::new(RADIUS)?;

        // Warm up
        let _ = search.neighbor_lists(&positions);

        let t0 = Instant::now();
        let brute = brute_force_neighbor_lists(&positions, RADIUS);
        let dt_brute = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        let grid = search.neighbor_lists(&positions);
        let dt_grid = t1.elapsed().as_secs_f64();

        let pairs: usize = grid.iter().map(Vec::len).sum();
        let agree = brute.iter().zip(&grid).all(|(a, b)| same_set(a, b));

        println!(
            "N = {n:5}, brute = {:8.6} s, grid = {:8.6} s, pairs = {pairs}, agree = {agree}",
            dt_brute, dt_grid
        );
    }
    Ok(())
}

/// One acceleration pass: direct sum, grid near field, hybrid near/far
pub fn bench_forces() -> Result<(), SimError> {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let law = InverseSquareAttraction::new(0.1);

    for n in ns {
        let sys = System::at_rest(make_positions(n));
        let mut out = vec![NVec3::zeros(); n];
        let mut report = StepReport::new();

        let mut direct = AccelSet::new().with(DirectSum { law });
        let mut near = AccelSet::new().with(NearField {
            law,
            search: NeighborSearch::new(RADIUS)?,
        });
        let mut hybrid = AccelSet::new().with(HybridField {
            law,
            search: NeighborSearch::new(RADIUS)?,
            octree: Octree::centered(NVec3::repeat(HALF_EXTENT), 4)?,
            far_level: 3,
        });

        let t0 = Instant::now();
        direct.accumulate_accels(0.0, &sys, &mut out, &mut report);
        let dt_direct = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        near.accumulate_accels(0.0, &sys, &mut out, &mut report);
        let dt_near = t1.elapsed().as_secs_f64();

        let t2 = Instant::now();
        hybrid.accumulate_accels(0.0, &sys, &mut out, &mut report);
        let dt_hybrid = t2.elapsed().as_secs_f64();

        println!(
            "N = {n:5}, direct = {:8.6} s, grid = {:8.6} s, hybrid = {:8.6} s",
            dt_direct, dt_near, dt_hybrid
        );
    }
    Ok(())
}

/// Full steps (forces + Verlet) per model
/// Paste output directly into a spreadsheet to graph
pub fn bench_steps() -> Result<(), SimError> {
    println!("N,direct_ms,hybrid_ms");

    let law = InverseSquareAttraction::new(0.1);
    let dt = 0.001;

    for n in (400..=6400).step_by(400) {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 1600 { 5 } else { 1 };
        let template = System::at_rest(make_positions(n));

        let mut direct = AccelSet::new().with(DirectSum { law });
        let ms_direct = time_steps(&mut direct, template.clone(), steps, dt);

        let mut hybrid = AccelSet::new().with(HybridField {
            law,
            search: NeighborSearch::new(RADIUS)?,
            octree: Octree::centered(NVec3::repeat(HALF_EXTENT), 4)?,
            far_level: 3,
        });
        let ms_hybrid = time_steps(&mut hybrid, template, steps, dt);

        println!("{},{:.6},{:.6}", n, ms_direct, ms_hybrid);
    }
    Ok(())
}

/// Milliseconds per step
fn time_steps(forces: &mut AccelSet, mut sys: System, steps: usize, dt: f64) -> f64 {
    let mut accel = vec![NVec3::zeros(); sys.len()];
    let mut report = StepReport::new();

    let t0 = Instant::now();
    for _ in 0..steps {
        forces.accumulate_accels(sys.t, &sys, &mut accel, &mut report);
        integrate(IntegratorKind::Verlet, &mut sys, &accel, dt, &mut report);
    }
    t0.elapsed().as_secs_f64() * 1000.0 / steps as f64
}
