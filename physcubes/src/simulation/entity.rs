//! A single simulated cube
//!
//! A `PhysBox` keeps three snapshots of its state:
//! - `init_state`: reset baseline
//! - `prev_state`: state at the last completed tick
//! - `curr_state`: state at the tick in progress
//!
//! Only [`PhysBox::step`] writes `prev_state`, and only by copying
//! `curr_state` right before integrating it.

use nalgebra::{Matrix4, UnitQuaternion};

use super::bounds::Aabb;
use super::forces::ForceSet;
use super::integrator::integrate;
use super::interpolation::interpolate;
use super::states::{NVec3, PhysState};

/// Role of a box inside the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxKind {
    Ground, // never touched by pause
    #[default]
    Scenario, // loaded with the scenario
    Spawned, // created at runtime, removed by clear
}

/// Render-facing pose of a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub scale: NVec3,
    pub orientation: UnitQuaternion<f64>,
    pub position: NVec3,
}

impl Pose {
    pub fn from_state(state: &PhysState) -> Self {
        Self {
            scale: state.scale(),
            orientation: UnitQuaternion::from_quaternion(state.raw_orientation()),
            position: state.position,
        }
    }

    /// Scale, then rotate, then translate
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position)
            * self.orientation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

#[derive(Debug, Clone)]
pub struct PhysBox {
    init_state: PhysState,
    prev_state: PhysState,
    curr_state: PhysState,
    bounds: Aabb, // half extents fixed at creation, only translated afterwards
    kind: BoxKind,
}

impl PhysBox {
    pub fn new(init: PhysState, kind: BoxKind) -> Self {
        // hull of the [-1, 1]^3 cube after scale and initial rotation
        let rotation = UnitQuaternion::from_quaternion(init.raw_orientation());
        let bounds = Aabb::enclosing_rotated(init.position, init.scale(), &rotation);

        Self {
            init_state: init,
            prev_state: init,
            curr_state: init,
            bounds,
            kind,
        }
    }

    pub fn kind(&self) -> BoxKind {
        self.kind
    }

    pub fn init_state(&self) -> &PhysState {
        &self.init_state
    }

    pub fn prev_state(&self) -> &PhysState {
        &self.prev_state
    }

    pub fn curr_state(&self) -> &PhysState {
        &self.curr_state
    }

    /// Direct access for external operators
    /// Call [`PhysBox::refresh`] after moving the box
    pub fn curr_state_mut(&mut self) -> &mut PhysState {
        &mut self.curr_state
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn is_live(&self) -> bool {
        self.curr_state.live
    }

    pub fn set_live(&mut self, live: bool) {
        self.curr_state.live = live;
    }

    /// One fixed tick: `prev <- curr`, integrate `curr`, move the bounds
    pub fn step(&mut self, t: f64, dt: f64, forces: &ForceSet) {
        self.prev_state = self.curr_state;
        integrate(&mut self.curr_state, t, dt, forces);
        self.refresh();
    }

    /// Instantaneous impulse at `point` (world space)
    /// Adds `force` to linear momentum and `(point - position) x force` to
    /// angular momentum. Sustained forces must be reapplied every tick.
    pub fn apply_force(&mut self, force: NVec3, point: NVec3) {
        let state = &mut self.curr_state;
        let arm = point - state.position;
        state.set_linear_momentum(state.linear_momentum() + force);
        state.set_angular_momentum(state.angular_momentum() + arm.cross(&force));
    }

    /// Velocity of a world-space point rigidly attached to the box
    pub fn velocity_of_point(&mut self, point: NVec3) -> NVec3 {
        let state = &mut self.curr_state;
        let arm = point - state.position;
        state.linear_velocity() + state.angular_velocity().cross(&arm)
    }

    /// Recenter the bounding box on the current position
    pub fn refresh(&mut self) {
        self.bounds = self.bounds.recentered(self.curr_state.position);
    }

    /// Bake the current state (including applied impulses) as the reset baseline
    pub fn refresh_init(&mut self) {
        self.init_state = self.curr_state;
    }

    /// Put the box back to its baseline
    pub fn reset(&mut self) {
        self.curr_state = self.init_state;
        self.refresh();
    }

    pub fn interpolated_state(&self, alpha: f64, blend_orientation: bool) -> PhysState {
        interpolate(&self.prev_state, &self.curr_state, alpha, blend_orientation)
    }

    pub fn pose(&self, alpha: f64, blend_orientation: bool) -> Pose {
        Pose::from_state(&self.interpolated_state(alpha, blend_orientation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::forces::UniformForce;

    #[test]
    fn bounds_follow_scale() {
        let state = PhysState::new(1.0)
            .with_position(NVec3::new(0.0, 1.0, 0.0))
            .with_scale(NVec3::new(10.0, 0.5, 10.0));
        let b = PhysBox::new(state, BoxKind::Ground);
        assert!((b.bounds().half_extents() - NVec3::new(10.0, 0.5, 10.0)).norm() < 1e-12);
        assert_eq!(b.bounds().center(), NVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn step_copies_curr_into_prev() {
        let forces = ForceSet::new().with(UniformForce { force: NVec3::new(0.0, -1.0, 0.0) });
        let mut b = PhysBox::new(PhysState::new(1.0).with_position(NVec3::new(0.0, 5.0, 0.0)), BoxKind::Scenario);
        let before = b.curr_state().position;

        b.step(0.0, 0.1, &forces);
        assert_eq!(b.prev_state().position, before);
        assert!(b.curr_state().position.y < before.y);
        assert!((b.bounds().center() - b.curr_state().position).norm() < 1e-12);
        assert_eq!(b.init_state().position, before);
    }

    #[test]
    fn reset_restores_baseline() {
        let mut b = PhysBox::new(PhysState::new(1.0), BoxKind::Spawned);
        b.apply_force(NVec3::new(1.0, 0.0, 0.0), NVec3::zeros());
        b.curr_state_mut().position = NVec3::new(3.0, 0.0, 0.0);
        b.refresh();

        b.reset();
        assert_eq!(b.curr_state().position, NVec3::zeros());
        assert_eq!(b.curr_state().linear_momentum(), NVec3::zeros());
        assert_eq!(b.bounds().center(), NVec3::zeros());
    }

    #[test]
    fn refresh_init_bakes_impulses() {
        let mut b = PhysBox::new(PhysState::new(1.0), BoxKind::Spawned);
        b.apply_force(NVec3::new(0.0, 2.0, 0.0), NVec3::zeros());
        b.refresh_init();
        b.reset();
        assert_eq!(b.curr_state().linear_momentum(), NVec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn pose_matrix_places_corner() {
        let state = PhysState::new(1.0)
            .with_position(NVec3::new(1.0, 2.0, 3.0))
            .with_scale(NVec3::new(2.0, 1.0, 1.0));
        let pose = Pose::from_state(&state);
        let corner = pose.to_matrix() * nalgebra::Vector4::new(1.0, 1.0, 1.0, 1.0);
        assert!((corner.xyz() - NVec3::new(3.0, 3.0, 4.0)).norm() < 1e-12);
    }
}
