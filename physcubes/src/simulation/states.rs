//! Core state types for the cube simulation.
//!
//! - `PhysState` holds the primary quantities of one box (position,
//!   orientation, scale, momenta, mass) and caches the quantities derived
//!   from them (velocities, inertia, spin)
//! - `PhysDeriv` is one derivative sample, produced and consumed inside a
//!   single RK4 step
//!
//! State is stored as momenta so impulses add directly. Every setter that
//! touches momentum, orientation or mass drops the derived cache; the next
//! derived read rebuilds it, which is also the only point where the
//! orientation is renormalized.

use nalgebra::{Quaternion, Vector3};

pub type NVec3 = Vector3<f64>;
pub type NQuat = Quaternion<f64>;

/// Lower bound for mass, anything below is raised to this on write.
pub const MIN_MASS: f64 = 0.0001;

/// Quantities derived from the primary fields of a [`PhysState`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct Derived {
    linear_vel: NVec3,
    angular_vel: NVec3,
    spin: NQuat,
    inertia: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PhysState {
    pub position: NVec3, // world position of the box center
    scale: NVec3,        // half extents of the cube, fixed after construction
    orientation: NQuat,  // unit after any recompute
    lin_momentum: NVec3,
    ang_momentum: NVec3,
    mass: f64,
    pub live: bool,             // false = frozen, skipped by the fixed-step loop
    derived: Option<Derived>,   // None when dirty
}

impl Default for PhysState {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PhysState {
    /// Box at the origin with identity orientation, unit scale, no momentum.
    pub fn new(mass: f64) -> Self {
        Self {
            position: NVec3::zeros(),
            scale: NVec3::repeat(1.0),
            orientation: NQuat::identity(),
            lin_momentum: NVec3::zeros(),
            ang_momentum: NVec3::zeros(),
            mass: mass.max(MIN_MASS),
            live: true,
            derived: None,
        }
    }

    pub fn with_position(mut self, position: NVec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: NVec3) -> Self {
        self.scale = scale;
        self.derived = None;
        self
    }

    pub fn with_orientation(mut self, orientation: NQuat) -> Self {
        self.set_orientation(orientation);
        self
    }

    pub fn with_linear_momentum(mut self, momentum: NVec3) -> Self {
        self.set_linear_momentum(momentum);
        self
    }

    pub fn with_angular_momentum(mut self, momentum: NVec3) -> Self {
        self.set_angular_momentum(momentum);
        self
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    // =========================================================================================
    // Primary fields
    // =========================================================================================

    pub fn scale(&self) -> NVec3 {
        self.scale
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Silently clamps to [`MIN_MASS`].
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass.max(MIN_MASS);
        self.derived = None;
    }

    pub fn linear_momentum(&self) -> NVec3 {
        self.lin_momentum
    }

    pub fn set_linear_momentum(&mut self, momentum: NVec3) {
        self.lin_momentum = momentum;
        self.derived = None;
    }

    pub fn angular_momentum(&self) -> NVec3 {
        self.ang_momentum
    }

    pub fn set_angular_momentum(&mut self, momentum: NVec3) {
        self.ang_momentum = momentum;
        self.derived = None;
    }

    /// Orientation as last written, without forcing a renormalize.
    pub fn raw_orientation(&self) -> NQuat {
        self.orientation
    }

    /// Orientation, renormalized if the cache was dirty.
    pub fn orientation(&mut self) -> NQuat {
        self.update();
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: NQuat) {
        self.orientation = orientation;
        self.derived = None;
    }

    // =========================================================================================
    // Derived fields
    // =========================================================================================

    pub fn linear_velocity(&mut self) -> NVec3 {
        self.update().linear_vel
    }

    pub fn angular_velocity(&mut self) -> NVec3 {
        self.update().angular_vel
    }

    /// Time derivative of the orientation quaternion.
    pub fn spin(&mut self) -> NQuat {
        self.update().spin
    }

    /// Scalar inertia, `m * sx^2 / 6` applied to every axis.
    pub fn inertia(&mut self) -> f64 {
        self.update().inertia
    }

    /// True when the next derived read will recompute.
    pub fn is_dirty(&self) -> bool {
        self.derived.is_none()
    }

    fn update(&mut self) -> Derived {
        match self.derived {
            Some(derived) => derived,
            None => self.recalculate(),
        }
    }

    fn recalculate(&mut self) -> Derived {
        let linear_vel = self.lin_momentum / self.mass;

        // single-axis approximation, a zero x scale is not guarded
        let inertia = self.mass * self.scale.x * self.scale.x / 6.0;
        let angular_vel = self.ang_momentum / inertia;

        let norm = self.orientation.norm();
        if norm > 0.0 {
            self.orientation = self.orientation / norm;
        }

        // q' = 1/2 * (w, 0) * q
        let spin = NQuat::from_imag(angular_vel) * self.orientation * 0.5;

        let derived = Derived {
            linear_vel,
            angular_vel,
            spin,
            inertia,
        };
        self.derived = Some(derived);
        derived
    }
}

/// One derivative sample of a [`PhysState`]
/// Only lives inside a single integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysDeriv {
    pub velocity: NVec3, // d(position)/dt
    pub force: NVec3,    // d(linear momentum)/dt
    pub spin: NQuat,     // d(orientation)/dt
    pub torque: NVec3,   // d(angular momentum)/dt
}

impl Default for PhysDeriv {
    fn default() -> Self {
        Self {
            velocity: NVec3::zeros(),
            force: NVec3::zeros(),
            spin: NQuat::new(0.0, 0.0, 0.0, 0.0),
            torque: NVec3::zeros(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_invalidate_cache() {
        let mut s = PhysState::new(2.0);
        let _ = s.linear_velocity();
        assert!(!s.is_dirty());

        s.set_linear_momentum(NVec3::new(4.0, 0.0, 0.0));
        assert!(s.is_dirty());
        assert_eq!(s.linear_velocity(), NVec3::new(2.0, 0.0, 0.0));

        s.set_mass(4.0);
        assert!(s.is_dirty());
        assert_eq!(s.linear_velocity(), NVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn position_write_keeps_cache() {
        let mut s = PhysState::new(1.0);
        let _ = s.spin();
        s.position = NVec3::new(1.0, 2.0, 3.0);
        assert!(!s.is_dirty());
    }

    #[test]
    fn mass_is_clamped() {
        let mut s = PhysState::new(0.0);
        assert_eq!(s.mass(), MIN_MASS);
        s.set_mass(-3.0);
        assert_eq!(s.mass(), MIN_MASS);
        assert!(s.linear_velocity().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn inertia_uses_x_scale_only() {
        let mut s = PhysState::new(3.0).with_scale(NVec3::new(2.0, 7.0, 9.0));
        assert!((s.inertia() - 3.0 * 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn spin_of_pure_rotation() {
        // inertia = 1/6, so L = (0, 0, 1/6) gives w = (0, 0, 1)
        let mut s = PhysState::new(1.0).with_angular_momentum(NVec3::new(0.0, 0.0, 1.0 / 6.0));
        let w = s.angular_velocity();
        assert!((w - NVec3::new(0.0, 0.0, 1.0)).norm() < 1e-12);

        let spin = s.spin();
        assert!((spin.k - 0.5).abs() < 1e-12);
        assert!(spin.w.abs() < 1e-12);
    }
}
