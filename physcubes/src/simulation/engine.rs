//! Fixed-timestep driver
//!
//! Converts variable frame deltas into a whole number of constant-length
//! simulation ticks. Leftover time stays in the accumulator and is exposed as
//! `alpha` for render interpolation.

use std::time::Instant;

use crate::configuration::config::ClampMode;
use crate::error::ConfigError;
use crate::simulation::params::Parameters;

/// Source of elapsed wall time, polled once per driver invocation
pub trait TimeSource {
    /// Seconds since the previous call
    fn elapsed(&mut self) -> f64;
}

/// Monotonic clock, restarts on every poll
#[derive(Debug, Clone)]
pub struct InstantClock {
    last: Instant,
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl InstantClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }
}

impl TimeSource for InstantClock {
    fn elapsed(&mut self) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        dt
    }
}

/// Hand-fed clock for headless runs and tests
/// Returns whatever was pushed since the last poll
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    pending: f64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, seconds: f64) {
        self.pending += seconds;
    }
}

impl TimeSource for ManualClock {
    fn elapsed(&mut self) -> f64 {
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    fixed_dt: f64, // tick length
    frame_clamp: f64, // clamp value for frame deltas
    clamp_mode: ClampMode,
    accumulator: f64, // real time not yet consumed by a tick
    sim_time: f64, // virtual simulation clock
    total_ticks: u64,
}

impl Engine {
    /// Fails on a tick or clamp that [`Parameters::validate`] rejects
    pub fn new(params: &Parameters) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            fixed_dt: params.fixed_dt,
            frame_clamp: params.frame_clamp,
            clamp_mode: params.clamp_mode,
            accumulator: 0.0,
            sim_time: 0.0,
            total_ticks: 0,
        })
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Fraction of a tick left in the accumulator, in `[0, 1)`
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.fixed_dt
    }

    /// Apply the clamp to a raw frame delta
    /// `Floor` raises small deltas to the clamp value, large ones pass through.
    /// A non-finite delta counts as zero.
    pub fn clamp_frame(&self, frame_delta: f64) -> f64 {
        let frame_delta = if frame_delta.is_finite() { frame_delta } else { 0.0 };
        match self.clamp_mode {
            ClampMode::Floor => frame_delta.max(self.frame_clamp),
            ClampMode::Ceiling => frame_delta.max(0.0).min(self.frame_clamp),
        }
    }

    /// Poll `clock` once and run the resulting ticks
    pub fn update<F>(&mut self, clock: &mut impl TimeSource, tick: F) -> usize
    where
        F: FnMut(f64, f64),
    {
        let frame_delta = clock.elapsed();
        self.advance(frame_delta, tick)
    }

    /// Add a frame delta to the accumulator and call `tick(t, dt)` once per
    /// whole fixed step it now holds. Returns the number of ticks run.
    pub fn advance<F>(&mut self, frame_delta: f64, mut tick: F) -> usize
    where
        F: FnMut(f64, f64),
    {
        self.accumulator += self.clamp_frame(frame_delta);

        let mut ticks = 0;
        while self.accumulator >= self.fixed_dt {
            tick(self.sim_time, self.fixed_dt);
            self.accumulator -= self.fixed_dt;
            self.sim_time += self.fixed_dt;
            ticks += 1;
        }

        self.total_ticks += ticks as u64;
        log::trace!("engine: {ticks} ticks, t = {:.4}, alpha = {:.3}", self.sim_time, self.alpha());
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::params::FIXED_DT;

    fn ceiling_params() -> Parameters {
        Parameters {
            clamp_mode: ClampMode::Ceiling,
            ..Parameters::default()
        }
    }

    #[test]
    fn floor_raises_small_deltas() {
        let engine = Engine::new(&Parameters::default()).unwrap();
        assert_eq!(engine.clamp_frame(0.001), 0.25);
        assert_eq!(engine.clamp_frame(2.0), 2.0);
    }

    #[test]
    fn ceiling_caps_large_deltas() {
        let engine = Engine::new(&ceiling_params()).unwrap();
        assert_eq!(engine.clamp_frame(2.0), 0.25);
        assert_eq!(engine.clamp_frame(0.01), 0.01);
        assert_eq!(engine.clamp_frame(-1.0), 0.0);
    }

    #[test]
    fn ticks_advance_clock() {
        let mut engine = Engine::new(&ceiling_params()).unwrap();
        let mut seen = Vec::new();
        let n = engine.advance(0.04, |t, dt| seen.push((t, dt)));

        assert_eq!(n, 2);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, 0.0);
        assert!((seen[1].0 - FIXED_DT).abs() < 1e-15);
        assert!((engine.sim_time() - 2.0 * FIXED_DT).abs() < 1e-12);
        assert!(engine.alpha() >= 0.0 && engine.alpha() < 1.0);
    }

    #[test]
    fn manual_clock_drains() {
        let mut clock = ManualClock::new();
        clock.push(0.1);
        clock.push(0.2);
        assert!((clock.elapsed() - 0.3).abs() < 1e-15);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn zero_tick_is_rejected() {
        let params = Parameters {
            fixed_dt: 0.0,
            ..Parameters::default()
        };
        assert!(matches!(
            Engine::new(&params),
            Err(ConfigError::InvalidParameter { name: "fixed_dt", .. })
        ));
    }

    #[test]
    fn non_finite_delta_counts_as_zero() {
        let floor = Engine::new(&Parameters::default()).unwrap();
        assert_eq!(floor.clamp_frame(f64::INFINITY), 0.25);
        assert_eq!(floor.clamp_frame(f64::NAN), 0.25);

        let mut ceiling = Engine::new(&ceiling_params()).unwrap();
        assert_eq!(ceiling.clamp_frame(f64::INFINITY), 0.0);
        assert_eq!(ceiling.advance(f64::NEG_INFINITY, |_, _| {}), 0);
    }

    #[test]
    fn infinite_delta_runs_one_clamped_frame() {
        let mut engine = Engine::new(&Parameters::default()).unwrap();
        let ticks = engine.advance(f64::INFINITY, |_, _| {});
        assert!((14..=15).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn instant_clock_restarts_on_poll() {
        let mut clock = InstantClock::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let first = clock.elapsed();
        let second = clock.elapsed();
        assert!(first >= 0.005);
        assert!(second < first);
    }

    #[test]
    fn update_polls_clock_once() {
        let mut engine = Engine::new(&ceiling_params()).unwrap();
        let mut clock = ManualClock::new();
        clock.push(0.04);
        assert_eq!(engine.update(&mut clock, |_, _| {}), 2);
        assert_eq!(engine.update(&mut clock, |_, _| {}), 0);
        assert_eq!(engine.total_ticks(), 2);
    }
}
