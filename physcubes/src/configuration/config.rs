//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]   – fixed-step driver options (tick, clamp, interpolation)
//! - [`ForceConfig`]    – force terms sampled by the integrator
//! - [`BoxConfig`]      – initial state for each box
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   fixed_dt: 0.016666666666666666   # simulation tick
//!   frame_clamp: 0.25                # clamp for each frame delta
//!   clamp_mode: "floor"              # or "ceiling"
//!   interpolate_orientation: false   # slerp orientation between ticks
//!
//! forces:
//!   - kind: central                  # pull along the normalized position
//!     strength: -0.1635
//!
//! boxes:
//!   - kind: ground
//!     position: [0.0, 0.0, 0.0]
//!     scale: [10.0, 0.5, 10.0]
//!     live: false
//!   - position: [0.0, 5.0, 0.0]
//!     mass: 1.0
//! ```
//!
//! Every section and most box fields are optional; missing values fall back to
//! the defaults listed on each type.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::simulation::forces::DEFAULT_PULL;
use crate::simulation::params::{FIXED_DT, FRAME_CLAMP};

/// How the frame delta clamp is applied
/// clamp_mode: "floor"` or `clamp_mode: "ceiling"
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClampMode {
    #[serde(rename = "floor")] // max(delta, clamp): small deltas are raised
    #[default]
    Floor,

    #[serde(rename = "ceiling")] // min(delta, clamp): large deltas are capped
    Ceiling,
}

/// Fixed-step driver configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f64, // simulation tick, must be positive
    #[serde(default = "default_frame_clamp")]
    pub frame_clamp: f64, // clamp value applied to each frame delta
    #[serde(default)]
    pub clamp_mode: ClampMode,
    #[serde(default)]
    pub interpolate_orientation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_dt: FIXED_DT,
            frame_clamp: FRAME_CLAMP,
            clamp_mode: ClampMode::Floor,
            interpolate_orientation: false,
        }
    }
}

/// One force term
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForceConfig {
    /// Constant magnitude along the normalized position vector
    Central { strength: f64 },

    /// Same force on every box
    Uniform { force: [f64; 3] },

    /// Damped spring toward a fixed anchor
    Spring {
        anchor: [f64; 3],
        stiffness: f64,
        #[serde(default)]
        damping: f64,
    },
}

/// Role of a configured box
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoxKindConfig {
    Ground,
    #[default]
    Scenario,
}

/// Configuration for a single box's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BoxConfig {
    #[serde(default)]
    pub kind: BoxKindConfig,
    pub position: [f64; 3], // center of the box
    #[serde(default = "identity_orientation")]
    pub orientation: [f64; 4], // quaternion as [x, y, z, w]
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3], // half extents
    #[serde(default)]
    pub linear_momentum: [f64; 3],
    #[serde(default)]
    pub angular_momentum: [f64; 3],
    #[serde(default = "unit_mass")]
    pub mass: f64,
    #[serde(default = "default_live")]
    pub live: bool,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig, // fixed-step driver settings
    #[serde(default = "default_forces")]
    pub forces: Vec<ForceConfig>, // force terms, central pull if omitted
    #[serde(default)]
    pub boxes: Vec<BoxConfig>, // initial boxes
}

impl Default for ScenarioConfig {
    /// Ground slab plus one box hovering above it
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            forces: default_forces(),
            boxes: vec![
                BoxConfig {
                    kind: BoxKindConfig::Ground,
                    position: [0.0, 0.0, 0.0],
                    orientation: identity_orientation(),
                    scale: [10.0, 0.5, 10.0],
                    linear_momentum: [0.0; 3],
                    angular_momentum: [0.0; 3],
                    mass: 1.0,
                    live: false,
                },
                BoxConfig {
                    kind: BoxKindConfig::Scenario,
                    position: [0.0, 5.0, 0.0],
                    orientation: identity_orientation(),
                    scale: unit_scale(),
                    linear_momentum: [0.0; 3],
                    angular_momentum: [0.0; 3],
                    mass: 1.0,
                    live: true,
                },
            ],
        }
    }
}

impl ScenarioConfig {
    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

fn default_fixed_dt() -> f64 {
    FIXED_DT
}

fn default_frame_clamp() -> f64 {
    FRAME_CLAMP
}

fn default_forces() -> Vec<ForceConfig> {
    vec![ForceConfig::Central { strength: DEFAULT_PULL }]
}

fn identity_orientation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn unit_mass() -> f64 {
    1.0
}

fn default_live() -> bool {
    true
}
