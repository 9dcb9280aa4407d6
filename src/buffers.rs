//! Per-instance GPU geometry buffers
//!
//! Each renderable instance owns one [`GeometryBufferSet`]: four structured
//! buffers (positions, normals, uvs, edges) sized exactly to the current
//! element counts. There is no growable allocation; a count change means a
//! full reallocation of that buffer. Every reallocation must be followed by
//! a rebind, or the shading stage can read through a freed handle.

use crate::backend::{
    AllocationResult, BufferHandle, GpuDevice, StructuredBufferDescriptor,
};
use crate::edge::EdgeRecord;
use crate::resources::Mesh;
use crate::shading::{BufferSlot, ShadingResource};
use glam::{Vec2, Vec3};

const POSITION_STRIDE: usize = std::mem::size_of::<Vec3>();
const NORMAL_STRIDE: usize = std::mem::size_of::<Vec3>();
const UV_STRIDE: usize = std::mem::size_of::<Vec2>();
const EDGE_STRIDE: usize = std::mem::size_of::<EdgeRecord>();

/// Element counts the buffer set is sized to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryCounts {
    pub positions: usize,
    pub normals: usize,
    pub uvs: usize,
    pub edges: usize,
}

impl GeometryCounts {
    pub fn of(mesh: &Mesh, edge_count: usize) -> Self {
        Self {
            positions: mesh.positions.len(),
            normals: mesh.normals.len(),
            uvs: mesh.uvs.len(),
            edges: edge_count,
        }
    }
}

/// GPU-resident geometry buffers for one renderable instance.
#[derive(Debug, Default)]
pub struct GeometryBufferSet {
    positions: Option<BufferHandle>,
    normals: Option<BufferHandle>,
    uvs: Option<BufferHandle>,
    edges: Option<BufferHandle>,
    counts: GeometryCounts,
}

impl GeometryBufferSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> GeometryCounts {
        self.counts
    }

    pub fn is_allocated(&self) -> bool {
        self.positions.is_some()
            && self.normals.is_some()
            && self.uvs.is_some()
            && self.edges.is_some()
    }

    pub fn positions_buffer(&self) -> Option<BufferHandle> {
        self.positions
    }

    pub fn normals_buffer(&self) -> Option<BufferHandle> {
        self.normals
    }

    pub fn uvs_buffer(&self) -> Option<BufferHandle> {
        self.uvs
    }

    pub fn edges_buffer(&self) -> Option<BufferHandle> {
        self.edges
    }

    /// Allocate all four buffers sized exactly to `counts`, uploading the
    /// snapshot contents. Any previously held buffers are released first;
    /// a mid-way failure releases the buffers created so far, so a failed
    /// allocation never leaks.
    pub fn allocate(
        &mut self,
        device: &mut dyn GpuDevice,
        mesh: &Mesh,
        edges: &[EdgeRecord],
    ) -> AllocationResult<()> {
        self.release(device);

        let counts = GeometryCounts::of(mesh, edges.len());
        let result = (|| {
            let positions = device.create_structured_buffer(
                &StructuredBufferDescriptor::new("outline positions", counts.positions, POSITION_STRIDE),
                bytemuck::cast_slice(&mesh.positions),
            )?;
            self.positions = Some(positions);

            let normals = device.create_structured_buffer(
                &StructuredBufferDescriptor::new("outline normals", counts.normals, NORMAL_STRIDE),
                bytemuck::cast_slice(&mesh.normals),
            )?;
            self.normals = Some(normals);

            let uvs = device.create_structured_buffer(
                &StructuredBufferDescriptor::new("outline uvs", counts.uvs, UV_STRIDE),
                bytemuck::cast_slice(&mesh.uvs),
            )?;
            self.uvs = Some(uvs);

            let edge_buffer = device.create_structured_buffer(
                &StructuredBufferDescriptor::new("outline edges", counts.edges, EDGE_STRIDE),
                bytemuck::cast_slice(edges),
            )?;
            self.edges = Some(edge_buffer);
            Ok(())
        })();

        if result.is_err() {
            self.release(device);
            return result;
        }

        self.counts = counts;
        Ok(())
    }

    /// Refresh positions and normals from a re-baked snapshot. Topology is
    /// assumed stable, so uvs and edges are untouched.
    pub fn write_deformed(&mut self, device: &mut dyn GpuDevice, mesh: &Mesh) {
        if let Some(buffer) = self.positions {
            device.write_buffer(buffer, bytemuck::cast_slice(&mesh.positions));
        }
        if let Some(buffer) = self.normals {
            device.write_buffer(buffer, bytemuck::cast_slice(&mesh.normals));
        }
    }

    /// Replace the edges buffer after a topology reload. The new buffer is
    /// sized exactly to the new edge count; the caller must rebind.
    pub fn reallocate_edges(
        &mut self,
        device: &mut dyn GpuDevice,
        edges: &[EdgeRecord],
    ) -> AllocationResult<()> {
        if let Some(old) = self.edges.take() {
            device.destroy_buffer(old);
        }

        let buffer = device.create_structured_buffer(
            &StructuredBufferDescriptor::new("outline edges", edges.len(), EDGE_STRIDE),
            bytemuck::cast_slice(edges),
        )?;
        self.edges = Some(buffer);
        self.counts.edges = edges.len();
        Ok(())
    }

    /// Bind all allocated buffers to the shading resource's named slots.
    /// Required after every (re)allocation, and after content refreshes on
    /// backends that do not retain bindings.
    pub fn bind_to(&self, shading: &mut ShadingResource) {
        let slots = [
            (BufferSlot::Positions, self.positions),
            (BufferSlot::Normals, self.normals),
            (BufferSlot::Uvs, self.uvs),
            (BufferSlot::Edges, self.edges),
        ];
        for (slot, handle) in slots {
            if let Some(handle) = handle {
                shading.set_buffer(slot, handle);
            }
        }
    }

    /// Release all buffers. Idempotent, and safe when nothing was ever
    /// allocated.
    pub fn release(&mut self, device: &mut dyn GpuDevice) {
        for handle in [
            self.positions.take(),
            self.normals.take(),
            self.uvs.take(),
            self.edges.take(),
        ]
        .into_iter()
        .flatten()
        {
            device.destroy_buffer(handle);
        }
        self.counts = GeometryCounts::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessDevice;
    use crate::edge::EdgeIndexBuilder;

    fn cube_set(device: &mut HeadlessDevice) -> (GeometryBufferSet, Mesh, Vec<EdgeRecord>) {
        let mesh = Mesh::cube();
        let edges = EdgeIndexBuilder::new().build(&mesh.positions, &mesh.indices);
        let mut set = GeometryBufferSet::new();
        set.allocate(device, &mesh, &edges).unwrap();
        (set, mesh, edges)
    }

    #[test]
    fn allocate_sizes_buffers_exactly() {
        let mut device = HeadlessDevice::new();
        let (set, mesh, edges) = cube_set(&mut device);

        assert!(set.is_allocated());
        assert_eq!(device.live_buffer_count(), 4);
        assert_eq!(
            device.buffer_element_count(set.positions_buffer().unwrap()),
            Some(mesh.positions.len())
        );
        assert_eq!(
            device.buffer_element_count(set.edges_buffer().unwrap()),
            Some(edges.len())
        );
    }

    #[test]
    fn release_is_idempotent_and_safe_unallocated() {
        let mut device = HeadlessDevice::new();

        let mut empty = GeometryBufferSet::new();
        empty.release(&mut device); // never allocated

        let (mut set, _, _) = cube_set(&mut device);
        set.release(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
        assert!(!set.is_allocated());
        set.release(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
    }

    #[test]
    fn reallocation_yields_fresh_handles_only() {
        let mut device = HeadlessDevice::new();
        let (mut set, _, _) = cube_set(&mut device);
        let old_positions = set.positions_buffer().unwrap();
        let old_edges = set.edges_buffer().unwrap();

        // Smaller topology forces full reallocation
        let small = Mesh::plane(1.0, 1.0, 1);
        let small_edges = EdgeIndexBuilder::new().build(&small.positions, &small.indices);
        set.allocate(&mut device, &small, &small_edges).unwrap();

        assert_eq!(device.live_buffer_count(), 4);
        assert!(!device.is_live(old_positions));
        assert!(!device.is_live(old_edges));
        assert_eq!(
            device.buffer_element_count(set.edges_buffer().unwrap()),
            Some(small_edges.len())
        );
    }

    #[test]
    fn failed_allocation_releases_partial_buffers() {
        let mut device = HeadlessDevice::new();
        let mesh = Mesh::cube();
        let edges = EdgeIndexBuilder::new().build(&mesh.positions, &mesh.indices);

        // Positions and normals succeed, uvs fails: the partial buffers are
        // released, nothing leaks.
        let mut set = GeometryBufferSet::new();
        device.fail_allocation_after(2);
        assert!(set.allocate(&mut device, &mesh, &edges).is_err());
        assert_eq!(device.live_buffer_count(), 0);
        assert!(!set.is_allocated());
    }

    #[test]
    fn bind_fills_all_shading_slots() {
        let mut device = HeadlessDevice::new();
        let (set, _, _) = cube_set(&mut device);

        let mut shading = ShadingResource::outline();
        set.bind_to(&mut shading);
        assert!(shading.fully_bound());
        assert_eq!(shading.buffer(BufferSlot::Edges), set.edges_buffer());
    }

    #[test]
    fn reallocate_edges_keeps_other_buffers() {
        let mut device = HeadlessDevice::new();
        let (mut set, _, edges) = cube_set(&mut device);
        let positions = set.positions_buffer().unwrap();
        let old_edges = set.edges_buffer().unwrap();

        let fewer = &edges[..edges.len() / 2];
        set.reallocate_edges(&mut device, fewer).unwrap();

        assert_eq!(set.positions_buffer(), Some(positions));
        assert!(!device.is_live(old_edges));
        assert_eq!(set.counts().edges, fewer.len());
    }
}
