use std::time::Instant;

use crate::error::ConfigError;
use crate::simulation::entity::BoxKind;
use crate::simulation::forces::{CentralPull, ForceSet, Spring};
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, PhysState};
use crate::simulation::world::{BoxHandle, PhysWorld};

/// Helper to build a world of `n` live boxes spread on deterministic positions
fn make_world(n: usize, forces: ForceSet) -> Result<PhysWorld, ConfigError> {
    let mut world = PhysWorld::new(&Parameters::default(), forces)?;

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let position = NVec3::new(
            (i_f * 0.37).sin() * 20.0,
            (i_f * 0.13).cos() * 20.0,
            (i_f * 0.07).sin() * 20.0,
        );
        let state = PhysState::new(1.0)
            .with_position(position)
            .with_scale(NVec3::repeat(0.5))
            .with_angular_momentum(NVec3::new(0.0, (i_f * 0.11).sin(), 0.0));
        world.spawn(state, BoxKind::Spawned);
    }

    Ok(world)
}

/// Time one RK4 tick over the whole world for a range of box counts
pub fn bench_integrate() -> Result<(), ConfigError> {
    let ns = [100, 200, 400, 800, 1600, 3200, 6400];
    let steps = 60; // one simulated second per measurement

    for n in ns {
        let central = make_world(n, ForceSet::new().with(CentralPull::default()))?;
        let spring = make_world(
            n,
            ForceSet::new().with(Spring {
                anchor: NVec3::zeros(),
                stiffness: 2.0,
                damping: 0.1,
            }),
        )?;

        let ms_central = time_ticks(central, steps);
        let ms_spring = time_ticks(spring, steps);

        println!("N = {n:5}, central tick = {ms_central:8.4} ms, spring tick = {ms_spring:8.4} ms");
    }

    Ok(())
}

fn time_ticks(mut world: PhysWorld, steps: usize) -> f64 {
    let dt = world.engine().fixed_dt();

    // Warm up
    world.advance(dt);

    let t0 = Instant::now();
    let mut ticks = 0;
    for _ in 0..steps {
        ticks += world.advance(dt);
    }
    t0.elapsed().as_secs_f64() * 1000.0 / ticks.max(1) as f64
}

/// Time the brute-force AABB pass: one box against all, and every pair
/// Paste output directly into a spreadsheet to graph
pub fn bench_collisions() -> Result<(), ConfigError> {
    println!("N,single_ms,all_pairs_ms,pairs");

    for n in (200..=3200).step_by(200) {
        let world = make_world(n, ForceSet::new())?;
        let Some((first, _)) = world.iter().next() else {
            continue;
        };

        let t0 = Instant::now();
        let hits = world.collisions(first);
        let ms_single = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        let pairs = world.report_collisions(&mut |_: BoxHandle, _: BoxHandle| {});
        let ms_all = t1.elapsed().as_secs_f64() * 1000.0;

        log::debug!("N = {n}: first box overlaps {}", hits.len());
        println!("{},{:.6},{:.6},{}", n, ms_single, ms_all, pairs);
    }

    Ok(())
}
