//! Axis-aligned bounding boxes

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box used for frustum culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing all `points`; zero-sized at origin when empty.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut iter = points.iter();
        let Some(&first) = iter.next() else {
            return Self::default();
        };
        let mut bounds = Self::new(first, first);
        for &p in iter {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
        }
        bounds
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Transform the box by an affine matrix, returning the axis-aligned
    /// box of the transformed corners (center/abs-extent method).
    pub fn transformed(&self, matrix: Mat4) -> Self {
        let center = matrix.transform_point3(self.center());
        let he = self.half_extents();
        let world_he = matrix.x_axis.truncate().abs() * he.x
            + matrix.y_axis.truncate().abs() * he.y
            + matrix.z_axis.truncate().abs() * he.z;
        Self::from_center_extents(center, world_he)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn center_and_extents() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(32.0));
        assert_eq!(aabb.center(), Vec3::splat(16.0));
        assert_eq!(aabb.half_extents(), Vec3::splat(16.0));
    }

    #[test]
    fn translation_moves_bounds() {
        let aabb = Aabb::from_center_extents(Vec3::ZERO, Vec3::ONE);
        let moved = aabb.transformed(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert!((moved.center() - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-6);
        assert!((moved.half_extents() - Vec3::ONE).length() < 1e-6);
    }

    #[test]
    fn rotation_grows_axis_aligned_extents() {
        let aabb = Aabb::from_center_extents(Vec3::ZERO, Vec3::ONE);
        let rotated = aabb.transformed(Mat4::from_quat(Quat::from_rotation_y(
            std::f32::consts::FRAC_PI_4,
        )));
        let he = rotated.half_extents();
        assert!(he.x > 1.0 && he.z > 1.0);
        assert!((he.y - 1.0).abs() < 1e-5);
    }
}
