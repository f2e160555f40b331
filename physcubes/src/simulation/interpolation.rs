//! Blending of the previous and current tick states for rendering
//!
//! The fixed-step loop leaves a fractional remainder of a tick in its
//! accumulator. Rendering at `alpha = remainder / fixed_dt` between the last
//! two tick states hides the step frequency.

use nalgebra::UnitQuaternion;

use super::states::PhysState;

/// Render-facing blend of `prev` and `curr`
/// - position and linear momentum: `curr * alpha + prev * (1 - alpha)`
/// - orientation and angular momentum: taken from `curr` unless
///   `blend_orientation` is set, then slerped / lerped as well
/// - everything else comes from `curr`
pub fn interpolate(prev: &PhysState, curr: &PhysState, alpha: f64, blend_orientation: bool) -> PhysState {
    let mut out = *curr;
    let keep = 1.0 - alpha;

    out.position = curr.position * alpha + prev.position * keep;
    out.set_linear_momentum(curr.linear_momentum() * alpha + prev.linear_momentum() * keep);

    if blend_orientation {
        let from = UnitQuaternion::from_quaternion(prev.raw_orientation());
        let to = UnitQuaternion::from_quaternion(curr.raw_orientation());
        let blended = from.try_slerp(&to, alpha, 1.0e-9).unwrap_or(to);
        out.set_orientation(blended.into_inner());
        out.set_angular_momentum(curr.angular_momentum() * alpha + prev.angular_momentum() * keep);
    }

    out
}
