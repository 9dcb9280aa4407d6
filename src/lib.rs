//! Outline Engine - silhouette/outline geometry extraction and dispatch
//!
//! Extracts deduplicated edge-adjacency data from triangle meshes and drives
//! a procedural GPU draw pipeline that renders outline geometry per camera,
//! per frame, for many simultaneously active mesh instances.
//!
//! # Pipeline
//! - [`edge::EdgeIndexBuilder`] reduces a mesh to an edge list annotated
//!   with opposite-apex indices (the shading stage's input)
//! - [`buffers::GeometryBufferSet`] owns the per-instance GPU buffers
//! - [`instance::RenderableInstance`] runs the Init/Draw/Release lifecycle
//! - [`dispatcher::FrameDispatcher`] frustum-culls the registry and issues
//!   the per-camera procedural draws
//!
//! The shading stage that amplifies edge points into visible outline
//! triangles is an external collaborator, consumed through the
//! [`shading::ShadingResource`] contract. The core is single-threaded and
//! cooperative with the host's per-frame callbacks; every call runs to
//! completion within the calling frame tick.

pub mod backend;
pub mod buffers;
pub mod command;
pub mod culling;
pub mod dispatcher;
pub mod edge;
pub mod instance;
pub mod registry;
pub mod resources;
pub mod scene;
pub mod shading;
pub mod source;

pub use backend::{
    AllocationError, BufferHandle, GpuDevice, HeadlessDevice, PrimitiveTopology, WgpuDevice,
};
pub use buffers::{GeometryBufferSet, GeometryCounts};
pub use command::{CommandList, DrawCommand, InsertionPoint};
pub use culling::Frustum;
pub use dispatcher::{FrameDispatcher, OutlineContext, COMMAND_LIST_NAME, PREVIEW_CAMERA_NAME};
pub use edge::{EdgeIndexBuilder, EdgeRecord, NO_OPPOSITE};
pub use instance::{InitError, RenderableInstance};
pub use registry::{InstanceId, RenderableRegistry};
pub use resources::Mesh;
pub use scene::{Aabb, Camera, CameraId, Projection, Transform};
pub use shading::{BufferSlot, ShadingResource, OUTLINE_SHADING_KIND};
pub use source::{DeformingMeshSource, MeshSource, RefreshPolicy, StaticMeshSource};
