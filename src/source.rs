//! Mesh source contract
//!
//! A mesh source supplies the geometry a renderable instance snapshots, plus
//! its world placement and bounds. Whether a source is re-baked every frame
//! is decided once at construction via [`RefreshPolicy`], not re-checked by
//! type inspection on every call.

use crate::resources::Mesh;
use crate::scene::{Aabb, Transform};
use glam::{Mat4, Vec3};
use std::rc::Rc;

/// How an instance keeps its snapshot in sync with the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Geometry is copied once at init and assumed stable.
    SnapshotOnce,
    /// Geometry deforms; the snapshot is re-baked every frame.
    BakePerFrame,
}

/// A mesh source a renderable instance references but does not own.
pub trait MeshSource {
    fn refresh_policy(&self) -> RefreshPolicy;

    /// Whether the source currently has no usable geometry.
    fn is_empty(&self) -> bool;

    /// Write the current geometry into `out`. For [`RefreshPolicy::BakePerFrame`]
    /// sources this re-evaluates the deformation; normals are recomputed by
    /// the caller afterwards.
    fn bake(&mut self, out: &mut Mesh);

    /// Local-to-world matrix of the instance.
    fn world_transform(&self) -> Mat4;

    /// Accumulated world scale, used to keep outline thickness isotropic
    /// under non-uniform scaling.
    fn lossy_scale(&self) -> Vec3;

    /// Current world-space bounding volume.
    fn world_bounds(&self) -> Aabb;
}

/// Static source: shares an immutable mesh, snapshotted once.
pub struct StaticMeshSource {
    mesh: Rc<Mesh>,
    pub transform: Transform,
}

impl StaticMeshSource {
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self {
            mesh,
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mesh: Rc<Mesh>, transform: Transform) -> Self {
        Self { mesh, transform }
    }
}

impl MeshSource for StaticMeshSource {
    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::SnapshotOnce
    }

    fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    fn bake(&mut self, out: &mut Mesh) {
        out.positions = self.mesh.positions.clone();
        out.normals = self.mesh.normals.clone();
        out.uvs = self.mesh.uvs.clone();
        out.indices = self.mesh.indices.clone();
    }

    fn world_transform(&self) -> Mat4 {
        self.transform.matrix()
    }

    fn lossy_scale(&self) -> Vec3 {
        self.transform.scale
    }

    fn world_bounds(&self) -> Aabb {
        self.mesh.local_bounds().transformed(self.transform.matrix())
    }
}

/// Deforming source: a baker closure re-evaluates the geometry on demand,
/// standing in for a skinned renderer's bake.
pub struct DeformingMeshSource<B: FnMut(&mut Mesh)> {
    baker: B,
    rest_mesh: Rc<Mesh>,
    pub transform: Transform,
}

impl<B: FnMut(&mut Mesh)> DeformingMeshSource<B> {
    /// `rest_mesh` supplies the undeformed topology, uvs, and local bounds;
    /// `baker` overwrites positions each frame.
    pub fn new(rest_mesh: Rc<Mesh>, baker: B) -> Self {
        Self {
            baker,
            rest_mesh,
            transform: Transform::default(),
        }
    }
}

impl<B: FnMut(&mut Mesh)> MeshSource for DeformingMeshSource<B> {
    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::BakePerFrame
    }

    fn is_empty(&self) -> bool {
        self.rest_mesh.is_empty()
    }

    fn bake(&mut self, out: &mut Mesh) {
        if out.is_empty() {
            out.positions = self.rest_mesh.positions.clone();
            out.normals = self.rest_mesh.normals.clone();
            out.uvs = self.rest_mesh.uvs.clone();
            out.indices = self.rest_mesh.indices.clone();
        }
        (self.baker)(out);
    }

    fn world_transform(&self) -> Mat4 {
        self.transform.matrix()
    }

    fn lossy_scale(&self) -> Vec3 {
        self.transform.scale
    }

    fn world_bounds(&self) -> Aabb {
        // Rest-pose bounds; a real skinned renderer would track deformed
        // bounds, which the instance only forwards anyway.
        self.rest_mesh
            .local_bounds()
            .transformed(self.transform.matrix())
    }
}
