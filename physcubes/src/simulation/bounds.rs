//! Axis-aligned bounding boxes for coarse overlap tests.

use nalgebra::UnitQuaternion;

use crate::simulation::states::NVec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: NVec3,
    max: NVec3,
}

impl Aabb {
    pub fn from_center(center: NVec3, half_extents: NVec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Axis-aligned hull of a box with `half_extents`, rotated by `rotation`
    /// and centered on `center`.
    pub fn enclosing_rotated(center: NVec3, half_extents: NVec3, rotation: &UnitQuaternion<f64>) -> Self {
        // each world axis picks up |R_ij| of every local half extent
        let hull = rotation.to_rotation_matrix().matrix().abs() * half_extents;
        Self::from_center(center, hull)
    }

    pub fn center(&self) -> NVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> NVec3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> NVec3 {
        self.size() * 0.5
    }

    pub fn translate(&self, translation: NVec3) -> Self {
        Self {
            min: self.min + translation,
            max: self.max + translation,
        }
    }

    /// Same extents, moved so the center lands on `center`.
    pub fn recentered(&self, center: NVec3) -> Self {
        self.translate(center - self.center())
    }

    /// Strict overlap on all three axes, touching faces do not count.
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min[i] < other.max[i] && self.max[i] > other.min[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_needs_every_axis() {
        let a = Aabb::from_center(NVec3::zeros(), NVec3::repeat(1.0));
        let b = Aabb::from_center(NVec3::new(1.5, 0.0, 0.0), NVec3::repeat(1.0));
        let c = Aabb::from_center(NVec3::new(1.5, 3.0, 0.0), NVec3::repeat(1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn touching_faces_do_not_overlap() {
        let a = Aabb::from_center(NVec3::zeros(), NVec3::repeat(1.0));
        let b = Aabb::from_center(NVec3::new(2.0, 0.0, 0.0), NVec3::repeat(1.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn recenter_keeps_extents() {
        let a = Aabb::from_center(NVec3::new(1.0, 1.0, 1.0), NVec3::new(1.0, 2.0, 3.0));
        let moved = a.recentered(NVec3::new(-4.0, 0.0, 2.0));
        assert_eq!(moved.center(), NVec3::new(-4.0, 0.0, 2.0));
        assert_eq!(moved.half_extents(), NVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn rotated_hull_grows() {
        let quarter = UnitQuaternion::from_axis_angle(&NVec3::z_axis(), std::f64::consts::FRAC_PI_2);
        let hull = Aabb::enclosing_rotated(NVec3::zeros(), NVec3::new(2.0, 1.0, 1.0), &quarter);
        assert!((hull.half_extents() - NVec3::new(1.0, 2.0, 1.0)).norm() < 1e-9);

        let eighth = UnitQuaternion::from_axis_angle(&NVec3::z_axis(), std::f64::consts::FRAC_PI_4);
        let hull = Aabb::enclosing_rotated(NVec3::zeros(), NVec3::repeat(1.0), &eighth);
        assert!((hull.half_extents().x - 2.0_f64.sqrt()).abs() < 1e-9);
    }
}
