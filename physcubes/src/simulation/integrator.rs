//! Fixed-step RK4 integrator for a single box
//!
//! The state is advanced as momenta: position, linear momentum, orientation
//! and angular momentum each get the weighted sum of four derivative samples.
//! Samples are always taken on copies, the caller's state is only written by
//! the final update in [`integrate`].

use super::forces::ForceSet;
use super::states::{PhysDeriv, PhysState};

/// Sample the derivative of `state` at time `t`
pub fn evaluate(state: &PhysState, t: f64, forces: &ForceSet) -> PhysDeriv {
    let mut probe = *state;
    sample(&mut probe, t, forces)
}

/// Advance a copy of `state` by `prior * dt`, then sample at `t + dt`
/// This is the midpoint/endpoint probe used by the b, c and d stages
pub fn evaluate_from(state: &PhysState, t: f64, dt: f64, prior: &PhysDeriv, forces: &ForceSet) -> PhysDeriv {
    let mut probe = *state;

    probe.position += prior.velocity * dt;
    probe.set_linear_momentum(probe.linear_momentum() + prior.force * dt);
    let orientation = probe.orientation();
    probe.set_orientation(orientation + prior.spin * dt);
    probe.set_angular_momentum(probe.angular_momentum() + prior.torque * dt);

    sample(&mut probe, t + dt, forces)
}

fn sample(probe: &mut PhysState, t: f64, forces: &ForceSet) -> PhysDeriv {
    let velocity = probe.linear_velocity();
    let spin = probe.spin();
    let force = forces.total_force(t, probe, &velocity);

    // torque stays zero, force terms cannot produce it
    PhysDeriv {
        velocity,
        force,
        spin,
        ..PhysDeriv::default()
    }
}

/// Advance `state` in-place by one RK4 step of length `dt` starting at `t`
pub fn integrate(state: &mut PhysState, t: f64, dt: f64, forces: &ForceSet) {
    let half_dt = 0.5 * dt;

    let a = evaluate(state, t, forces);
    let b = evaluate_from(state, t, half_dt, &a, forces);
    let c = evaluate_from(state, t, half_dt, &b, forces);
    let d = evaluate_from(state, t, dt, &c, forces);

    let w = dt / 6.0;

    // dPos
    state.position += (a.velocity + 2.0 * (b.velocity + c.velocity) + d.velocity) * w;

    // dLinMomentum
    let d_lin = (a.force + 2.0 * (b.force + c.force) + d.force) * w;
    state.set_linear_momentum(state.linear_momentum() + d_lin);

    // dRot
    let d_rot = (a.spin + (b.spin + c.spin) * 2.0 + d.spin) * w;
    let orientation = state.orientation();
    state.set_orientation(orientation + d_rot);

    // dAngMomentum
    let d_ang = (a.torque + 2.0 * (b.torque + c.torque) + d.torque) * w;
    state.set_angular_momentum(state.angular_momentum() + d_ang);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::forces::UniformForce;
    use crate::simulation::states::NVec3;

    #[test]
    fn evaluate_leaves_input_untouched() {
        let forces = ForceSet::new().with(UniformForce { force: NVec3::new(0.0, -1.0, 0.0) });
        let state = PhysState::new(1.0).with_linear_momentum(NVec3::new(1.0, 0.0, 0.0));
        let prior = evaluate(&state, 0.0, &forces);
        let _ = evaluate_from(&state, 0.0, 0.5, &prior, &forces);

        assert_eq!(state.position, NVec3::zeros());
        assert_eq!(state.linear_momentum(), NVec3::new(1.0, 0.0, 0.0));
        assert!(state.is_dirty());
    }

    #[test]
    fn derivative_has_no_torque() {
        let forces = ForceSet::new().with(UniformForce { force: NVec3::new(3.0, 1.0, 2.0) });
        let state = PhysState::new(1.0).with_angular_momentum(NVec3::new(0.0, 1.0, 0.0));
        let d = evaluate(&state, 0.0, &forces);
        assert_eq!(d.torque, NVec3::zeros());
        assert_eq!(d.force, NVec3::new(3.0, 1.0, 2.0));
    }

    #[test]
    fn free_box_drifts_linearly() {
        let forces = ForceSet::new();
        let mut state = PhysState::new(2.0).with_linear_momentum(NVec3::new(4.0, 0.0, 0.0));
        integrate(&mut state, 0.0, 0.5, &forces);
        assert!((state.position - NVec3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert_eq!(state.linear_momentum(), NVec3::new(4.0, 0.0, 0.0));
    }
}
