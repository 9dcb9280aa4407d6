//! GPU backend abstraction

pub mod headless;
pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use headless::HeadlessDevice;
pub use traits::{AllocationError, AllocationResult, BufferHandle, GpuDevice};
pub use types::{PrimitiveTopology, StructuredBufferDescriptor};
pub use wgpu_backend::WgpuDevice;
