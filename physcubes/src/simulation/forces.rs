//! Force contributors sampled by the RK4 integrator
//!
//! A [`ForceSet`] sums the contributions of its [`ForceTerm`]s into one force
//! per sample. Terms only produce force: the automatic force model never adds
//! torque, torque only enters a box through an explicit impulse.

use crate::simulation::states::{NVec3, PhysState};

/// Strength of the default central pull (negative pulls toward the origin)
pub const DEFAULT_PULL: f64 = -0.1635;

/// Collection of force terms
/// Each term implements [`ForceTerm`] and their contributions are summed
pub struct ForceSet {
    terms: Vec<Box<dyn ForceTerm + Send + Sync>>,
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with(mut self, term: impl ForceTerm + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Total force on `state` at time `t`
    /// `velocity` is the state's linear velocity, already derived by the caller
    pub fn total_force(&self, t: f64, state: &PhysState, velocity: &NVec3) -> NVec3 {
        self.terms
            .iter()
            .fold(NVec3::zeros(), |acc, term| acc + term.force(t, state, velocity))
    }
}

/// A force source operating on a single [`PhysState`]
pub trait ForceTerm {
    fn force(&self, t: f64, state: &PhysState, velocity: &NVec3) -> NVec3;
}

/// Constant-magnitude force along the normalized position vector
/// With a negative strength every box is pulled toward the origin.
/// A box sitting exactly on the origin feels nothing.
pub struct CentralPull {
    pub strength: f64,
}

impl Default for CentralPull {
    fn default() -> Self {
        Self { strength: DEFAULT_PULL }
    }
}

impl ForceTerm for CentralPull {
    fn force(&self, _t: f64, state: &PhysState, _velocity: &NVec3) -> NVec3 {
        match state.position.try_normalize(f64::EPSILON) {
            Some(dir) => dir * self.strength,
            None => NVec3::zeros(),
        }
    }
}

/// Same force on every box regardless of its state (e.g. downward gravity)
pub struct UniformForce {
    pub force: NVec3,
}

impl ForceTerm for UniformForce {
    fn force(&self, _t: f64, _state: &PhysState, _velocity: &NVec3) -> NVec3 {
        self.force
    }
}

/// Damped spring pulling each box toward a fixed anchor
pub struct Spring {
    pub anchor: NVec3,
    pub stiffness: f64, // k
    pub damping: f64,   // b
}

impl ForceTerm for Spring {
    fn force(&self, _t: f64, state: &PhysState, velocity: &NVec3) -> NVec3 {
        spring_force_with_damping(self.stiffness, &(state.position - self.anchor), self.damping, velocity)
    }
}

/// Hooke's law with linear damping: `-k * x - b * v`
pub fn spring_force_with_damping(k: f64, displacement: &NVec3, b: f64, rel_vel: &NVec3) -> NVec3 {
    -k * *displacement - b * *rel_vel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_pull_points_at_origin() {
        let state = PhysState::new(1.0).with_position(NVec3::new(0.0, 5.0, 0.0));
        let f = CentralPull::default().force(0.0, &state, &NVec3::zeros());
        assert!((f - NVec3::new(0.0, DEFAULT_PULL, 0.0)).norm() < 1e-12);

        let state = PhysState::new(1.0).with_position(NVec3::new(3.0, 0.0, 4.0));
        let f = CentralPull { strength: -1.0 }.force(0.0, &state, &NVec3::zeros());
        assert!((f - NVec3::new(-0.6, 0.0, -0.8)).norm() < 1e-12);
    }

    #[test]
    fn central_pull_at_origin_is_zero() {
        let state = PhysState::new(1.0);
        let f = CentralPull::default().force(0.0, &state, &NVec3::zeros());
        assert_eq!(f, NVec3::zeros());
    }

    #[test]
    fn set_sums_terms() {
        let set = ForceSet::new()
            .with(UniformForce { force: NVec3::new(0.0, -1.0, 0.0) })
            .with(UniformForce { force: NVec3::new(2.0, 0.0, 0.0) });
        let state = PhysState::default();
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_force(0.0, &state, &NVec3::zeros()), NVec3::new(2.0, -1.0, 0.0));
    }

    #[test]
    fn spring_restores_and_damps() {
        let spring = Spring {
            anchor: NVec3::new(1.0, 0.0, 0.0),
            stiffness: 2.0,
            damping: 0.5,
        };
        let state = PhysState::new(1.0).with_position(NVec3::new(3.0, 0.0, 0.0));
        let f = spring.force(0.0, &state, &NVec3::new(0.0, 4.0, 0.0));
        assert!((f - NVec3::new(-4.0, -2.0, 0.0)).norm() < 1e-12);
    }
}
