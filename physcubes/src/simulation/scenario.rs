//! Build a fully-initialized simulation scenario from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing), validates it and produces the
//! runtime bundle `Scenario` containing:
//! - numerical parameters (`Parameters`)
//! - the world (`PhysWorld`) with its force set and every configured box
//!
//! The scenario is inserted into Bevy as a `Resource` and consumed by the
//! stepping, input and rendering systems

use bevy::prelude::Resource;

use crate::configuration::config::{BoxConfig, BoxKindConfig, ForceConfig, ScenarioConfig};
use crate::error::ConfigError;
use crate::simulation::entity::BoxKind;
use crate::simulation::forces::{CentralPull, ForceSet, Spring, UniformForce};
use crate::simulation::params::Parameters;
use crate::simulation::states::{NQuat, NVec3, PhysState};
use crate::simulation::world::PhysWorld;

/// Bevy resource representing a fully-initialized scenario
#[derive(Resource)]
pub struct Scenario {
    pub parameters: Parameters,
    pub world: PhysWorld,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        // Parameters (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        let parameters = Parameters {
            fixed_dt: e_cfg.fixed_dt,
            frame_clamp: e_cfg.frame_clamp,
            clamp_mode: e_cfg.clamp_mode,
            interpolate_orientation: e_cfg.interpolate_orientation,
        };

        // Forces: one term per configured entry
        let forces = cfg.forces.iter().fold(ForceSet::new(), |set, f_cfg| match f_cfg {
            ForceConfig::Central { strength } => set.with(CentralPull { strength: *strength }),
            ForceConfig::Uniform { force } => set.with(UniformForce {
                force: NVec3::from(*force),
            }),
            ForceConfig::Spring {
                anchor,
                stiffness,
                damping,
            } => set.with(Spring {
                anchor: NVec3::from(*anchor),
                stiffness: *stiffness,
                damping: *damping,
            }),
        });

        // rejects a tick or clamp the fixed-step loop cannot run with
        let mut world = PhysWorld::new(&parameters, forces)?;

        // Boxes: map `BoxConfig` -> runtime `PhysState`
        for b_cfg in &cfg.boxes {
            if !b_cfg.mass.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    name: "mass",
                    value: b_cfg.mass,
                });
            }
            let [x, y, z, w] = b_cfg.orientation;
            let norm = (x * x + y * y + z * z + w * w).sqrt();
            if !(norm.is_finite() && norm > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name: "orientation",
                    value: norm,
                });
            }
            let kind = match b_cfg.kind {
                BoxKindConfig::Ground => BoxKind::Ground,
                BoxKindConfig::Scenario => BoxKind::Scenario,
            };
            world.spawn(initial_state(b_cfg), kind);
        }

        log::info!(
            "built scenario: {} boxes, {} force terms, dt = {:.5}",
            world.len(),
            world.forces().len(),
            parameters.fixed_dt
        );

        Ok(Self { parameters, world })
    }
}

fn initial_state(b_cfg: &BoxConfig) -> PhysState {
    let [x, y, z, w] = b_cfg.orientation;
    PhysState::new(b_cfg.mass)
        .with_position(NVec3::from(b_cfg.position))
        .with_scale(NVec3::from(b_cfg.scale))
        .with_orientation(NQuat::new(w, x, y, z))
        .with_linear_momentum(NVec3::from(b_cfg.linear_momentum))
        .with_angular_momentum(NVec3::from(b_cfg.angular_momentum))
        .with_live(b_cfg.live)
}
