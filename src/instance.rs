//! Renderable outline instance
//!
//! Couples a mesh source, a [`GeometryBufferSet`], and a shading resource
//! behind an `Uninitialized → Initialized → Released` state machine. The
//! host adapter invokes `init` on activation, `draw` from the per-camera
//! dispatch, and `release` on deactivation or teardown; all three are safe
//! in any order.

use crate::backend::{GpuDevice, PrimitiveTopology};
use crate::buffers::GeometryBufferSet;
use crate::command::CommandList;
use crate::edge::{EdgeIndexBuilder, EdgeRecord};
use crate::resources::Mesh;
use crate::scene::Aabb;
use crate::shading::{ShadingResource, OUTLINE_SHADING_KIND};
use crate::source::{MeshSource, RefreshPolicy};
use glam::{Mat4, Vec3};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Instance init failure
#[derive(Error, Debug)]
pub enum InitError {
    #[error("shading resource is missing")]
    Resource,
    #[error("shading resource kind `{found}` does not match `{expected}`")]
    Contract { expected: String, found: String },
    #[error("mesh source is missing or empty")]
    Mesh,
    #[error("buffer allocation failed: {0}")]
    Allocation(#[from] crate::backend::AllocationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstanceState {
    Uninitialized,
    Initialized,
}

/// One renderable mesh instance in the outline pipeline.
pub struct RenderableInstance {
    state: InstanceState,
    source: Rc<RefCell<dyn MeshSource>>,
    shading: Option<Rc<RefCell<ShadingResource>>>,
    /// Compose the inverse lossy world scale into the draw transform so the
    /// shading stage's outline offsets stay isotropic under non-uniform
    /// scaling.
    pub respect_scale: bool,
    snapshot: Mesh,
    edges: Vec<EdgeRecord>,
    buffers: GeometryBufferSet,
    edge_builder: EdgeIndexBuilder,
}

impl RenderableInstance {
    pub fn new(
        source: Rc<RefCell<dyn MeshSource>>,
        shading: Option<Rc<RefCell<ShadingResource>>>,
    ) -> Self {
        Self {
            state: InstanceState::Uninitialized,
            source,
            shading,
            respect_scale: false,
            snapshot: Mesh::new("outline snapshot"),
            edges: Vec::new(),
            buffers: GeometryBufferSet::new(),
            edge_builder: EdgeIndexBuilder::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state == InstanceState::Initialized
    }

    /// Extracted edge records (valid once initialized).
    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn buffers(&self) -> &GeometryBufferSet {
        &self.buffers
    }

    /// Current world-space bounds, delegated to the mesh source.
    pub fn bounds(&self) -> Aabb {
        self.source.borrow().world_bounds()
    }

    /// Validate contracts, snapshot the mesh, extract the edge index, and
    /// allocate and bind the GPU buffers.
    ///
    /// Failures are logged and leave the instance `Uninitialized`; a failed
    /// instance simply never draws, it cannot break the frame loop or other
    /// instances. Already-initialized instances return `Ok` untouched.
    pub fn init(&mut self, device: &mut dyn GpuDevice) -> Result<(), InitError> {
        if self.is_initialized() {
            return Ok(());
        }

        match self.try_init(device) {
            Ok(()) => {
                log::debug!(
                    "outline instance initialized: {} vertices, {} edges",
                    self.snapshot.vertex_count(),
                    self.edges.len()
                );
                Ok(())
            }
            Err(err) => {
                log::error!("outline instance init failed: {err}");
                Err(err)
            }
        }
    }

    fn try_init(&mut self, device: &mut dyn GpuDevice) -> Result<(), InitError> {
        let shading = self.shading.clone().ok_or(InitError::Resource)?;
        {
            let shading = shading.borrow();
            if shading.kind() != OUTLINE_SHADING_KIND {
                return Err(InitError::Contract {
                    expected: OUTLINE_SHADING_KIND.to_string(),
                    found: shading.kind().to_string(),
                });
            }
        }

        {
            let mut source = self.source.borrow_mut();
            if source.is_empty() {
                return Err(InitError::Mesh);
            }

            self.snapshot.clear();
            source.bake(&mut self.snapshot);
            if source.refresh_policy() == RefreshPolicy::BakePerFrame {
                self.snapshot.recalculate_normals();
            }
        }
        if self.snapshot.is_empty() {
            return Err(InitError::Mesh);
        }

        // Topology is assumed stable across frames: the edge index is built
        // exactly once here.
        self.edges = self
            .edge_builder
            .build(&self.snapshot.positions, &self.snapshot.indices);

        self.buffers
            .allocate(device, &self.snapshot, &self.edges)?;
        self.buffers.bind_to(&mut shading.borrow_mut());

        self.state = InstanceState::Initialized;
        Ok(())
    }

    /// Re-run edge extraction over the current snapshot and swap in a fresh
    /// edges buffer. For out-of-band topology edits; not part of the frame
    /// loop.
    pub fn reload_edges(&mut self, device: &mut dyn GpuDevice) -> Result<(), InitError> {
        if !self.is_initialized() {
            return Ok(());
        }

        self.edges = self
            .edge_builder
            .build(&self.snapshot.positions, &self.snapshot.indices);
        self.buffers.reallocate_edges(device, &self.edges)?;
        if let Some(shading) = &self.shading {
            self.buffers.bind_to(&mut shading.borrow_mut());
        }
        Ok(())
    }

    /// Issue this instance's procedural draw into `list`.
    ///
    /// A no-op unless initialized: the cull pass may have selected this
    /// instance before a teardown landed in the same tick, so state is
    /// re-checked here rather than trusted.
    pub fn draw(&mut self, device: &mut dyn GpuDevice, list: &mut CommandList) {
        if !self.is_initialized() {
            return;
        }
        // init() guarantees this
        let Some(shading) = self.shading.clone() else {
            return;
        };

        let policy = self.source.borrow().refresh_policy();
        if policy == RefreshPolicy::BakePerFrame {
            self.source.borrow_mut().bake(&mut self.snapshot);
            self.snapshot.recalculate_normals();
            self.buffers.write_deformed(device, &self.snapshot);
        }

        // A refresh can invalidate bindings on backends that do not retain
        // them; rebinding stale handles would corrupt the draw.
        if !device.retains_bindings() {
            self.buffers.bind_to(&mut shading.borrow_mut());
        }

        let mut transform = self.source.borrow().world_transform();
        if self.respect_scale {
            let scale = self.source.borrow().lossy_scale();
            transform *= Mat4::from_scale(Vec3::ONE / scale);
        }

        log::trace!("outline draw: {} edge points", self.edges.len());
        list.draw_procedural(
            transform,
            shading,
            PrimitiveTopology::PointList,
            self.edges.len() as u32,
        );
    }

    /// Release all GPU buffers and snapshot storage.
    ///
    /// Idempotent and callable from any state, including mid-tick between
    /// cull and draw. The instance returns to `Uninitialized`.
    pub fn release(&mut self, device: &mut dyn GpuDevice) {
        self.buffers.release(device);
        if let Some(shading) = &self.shading {
            shading.borrow_mut().clear_bindings();
        }
        self.snapshot.clear();
        self.edges.clear();
        self.state = InstanceState::Uninitialized;
        log::debug!("outline instance released");
    }
}
