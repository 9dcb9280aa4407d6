//! Frustum culling for view-dependent dispatch
//!
//! Extracts the six frustum planes from a view-projection matrix and tests
//! instance bounds against them.

use crate::scene::Aabb;
use glam::{Mat4, Vec4, Vec4Swizzles};

/// View frustum: left, right, bottom, top, near, far planes.
///
/// Each plane is `Vec4(nx, ny, nz, d)` with the normal pointing inward, so a
/// point is inside when `n.dot(p) + d >= 0` for all six planes.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract normalized frustum planes from a view-projection matrix
    /// (Gribb/Hartmann row combinations).
    pub fn from_view_projection(view_projection: Mat4) -> Self {
        let r0 = view_projection.row(0);
        let r1 = view_projection.row(1);
        let r2 = view_projection.row(2);
        let r3 = view_projection.row(3);

        let planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r3 + r2, // near
            r3 - r2, // far
        ]
        .map(normalize_plane);

        Self { planes }
    }

    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Whether a bounding box intersects the frustum.
    ///
    /// Conservative projected-radius test: the box is rejected only when it
    /// lies entirely outside at least one plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let half = aabb.half_extents();

        for plane in &self.planes {
            let normal = plane.xyz();
            let radius = half.dot(normal.abs());
            let distance = normal.dot(center) + plane.w;
            if distance < -radius {
                return false;
            }
        }
        true
    }
}

fn normalize_plane(plane: Vec4) -> Vec4 {
    let length = plane.xyz().length();
    if length > 0.0 {
        plane / length
    } else {
        plane
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Camera, CameraId};
    use glam::Vec3;

    fn test_frustum() -> Frustum {
        // Camera at origin looking down -Z, 45 degree fov
        let camera = Camera::new(CameraId(1), "main", Vec3::ZERO, -Vec3::Z);
        Frustum::from_view_projection(camera.view_projection_matrix())
    }

    #[test]
    fn box_in_front_is_visible() {
        let frustum = test_frustum();
        let aabb = Aabb::from_center_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        assert!(frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn box_behind_camera_is_culled() {
        let frustum = test_frustum();
        let aabb = Aabb::from_center_extents(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE);
        assert!(!frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn box_far_to_the_side_is_culled() {
        let frustum = test_frustum();
        let aabb = Aabb::from_center_extents(Vec3::new(-100.0, 0.0, -10.0), Vec3::ONE);
        assert!(!frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn box_straddling_a_plane_is_visible() {
        let frustum = test_frustum();
        // Straddles the near plane
        let aabb = Aabb::from_center_extents(Vec3::new(0.0, 0.0, -0.1), Vec3::ONE);
        assert!(frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn planes_are_normalized() {
        let frustum = test_frustum();
        for plane in frustum.planes() {
            assert!((plane.xyz().length() - 1.0).abs() < 1e-4);
        }
    }
}
