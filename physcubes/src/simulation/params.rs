//! Numerical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - fixed tick length,
//! - frame delta clamp value and whether it acts as a floor or a ceiling,
//! - whether the render interpolation also blends orientation

use crate::configuration::config::ClampMode;
use crate::error::ConfigError;

/// Default fixed tick, 60 Hz
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Default frame delta clamp in seconds
pub const FRAME_CLAMP: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub fixed_dt: f64, // length of one simulation tick
    pub frame_clamp: f64, // clamp applied to each frame delta
    pub clamp_mode: ClampMode, // floor = max(delta, clamp), ceiling = min(delta, clamp)
    pub interpolate_orientation: bool, // slerp orientation between ticks
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            fixed_dt: FIXED_DT,
            frame_clamp: FRAME_CLAMP,
            clamp_mode: ClampMode::Floor,
            interpolate_orientation: false,
        }
    }
}

impl Parameters {
    /// Reject settings the fixed-step loop cannot run with
    /// A non-positive tick would never drain the accumulator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "fixed_dt",
                value: self.fixed_dt,
            });
        }
        if !(self.frame_clamp.is_finite() && self.frame_clamp >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "frame_clamp",
                value: self.frame_clamp,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_tick_and_clamp() {
        for dt in [0.0, -1.0 / 60.0, f64::NAN, f64::INFINITY] {
            let p = Parameters { fixed_dt: dt, ..Parameters::default() };
            assert!(matches!(p.validate(), Err(ConfigError::InvalidParameter { name: "fixed_dt", .. })));
        }
        for clamp in [-0.25, f64::NAN] {
            let p = Parameters { frame_clamp: clamp, ..Parameters::default() };
            assert!(matches!(p.validate(), Err(ConfigError::InvalidParameter { name: "frame_clamp", .. })));
        }
    }
}
