//! Windowless driver
//!
//! Feeds the world synthetic 60 Hz frames for a fixed span of wall time and
//! logs what a viewer would show: tick counts, interpolated poses, live flags
//! and overlapping pairs.

use crate::simulation::engine::ManualClock;
use crate::simulation::scenario::Scenario;
use crate::simulation::world::BoxHandle;

/// Length of one synthetic frame
const FRAME_DELTA: f64 = 1.0 / 60.0;

/// Frames between two pose reports
const REPORT_EVERY: u64 = 60;

/// Run `scenario` for `seconds` of synthetic frame time. Returns the total
/// number of fixed ticks executed.
pub fn run_headless(mut scenario: Scenario, seconds: f64) -> u64 {
    let frames = (seconds.max(0.0) / FRAME_DELTA).round() as u64;
    log::info!(
        "run_headless: {} boxes, {frames} frames of {:.4} s",
        scenario.world.len(),
        FRAME_DELTA
    );

    let world = &mut scenario.world;
    let mut clock = ManualClock::new();
    let mut ticks = 0u64;

    for frame in 1..=frames {
        clock.push(FRAME_DELTA);
        ticks += world.update(&mut clock) as u64;

        if frame % REPORT_EVERY == 0 || frame == frames {
            log::info!(
                "frame {frame}: t = {:.3}, ticks = {ticks}, alpha = {:.3}",
                world.sim_time(),
                world.alpha()
            );

            let handles: Vec<BoxHandle> = world.iter().map(|(h, _)| h).collect();
            for handle in handles {
                let (Some(pose), Some(b)) = (world.pose(handle), world.get(handle)) else {
                    continue;
                };
                let p = pose.position;
                log::info!(
                    "  {:?} {:?}: pos = ({:.3}, {:.3}, {:.3}), live = {}",
                    b.kind(),
                    handle,
                    p.x,
                    p.y,
                    p.z,
                    b.is_live()
                );
            }

            let overlaps = world.report_collisions(&mut |a: BoxHandle, b: BoxHandle| {
                log::debug!("  overlap {a:?} / {b:?}");
            });
            log::info!("  {overlaps} overlapping pairs");
        }
    }

    ticks
}
