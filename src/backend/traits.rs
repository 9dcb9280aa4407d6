//! GPU device abstraction
//!
//! The outline pipeline talks to the GPU exclusively through [`GpuDevice`],
//! so backends (wgpu, headless) can be swapped without touching the
//! buffer-lifecycle or dispatch code.

use crate::backend::types::StructuredBufferDescriptor;
use thiserror::Error;

/// Buffer allocation error
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("failed to create buffer `{label}`: {reason}")]
    BufferCreationFailed { label: String, reason: String },
    #[error("out of device memory")]
    OutOfMemory,
}

pub type AllocationResult<T> = Result<T, AllocationError>;

/// Handle to a GPU-resident structured buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Device trait implemented by each backend.
///
/// Handles are never reused: destroying a buffer and allocating a new one
/// always yields a fresh handle, so a stale handle can be detected rather
/// than silently aliasing a new resource.
pub trait GpuDevice {
    /// Create a structured buffer sized exactly to the descriptor and upload
    /// the initial contents.
    fn create_structured_buffer(
        &mut self,
        desc: &StructuredBufferDescriptor,
        data: &[u8],
    ) -> AllocationResult<BufferHandle>;

    /// Overwrite a buffer's contents from the start.
    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]);

    /// Destroy a buffer. Destroying an already-destroyed handle is a no-op.
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Whether shading-resource bindings survive content updates on this
    /// backend. When `false`, callers must rebind after every refresh or the
    /// shading stage may read through a stale handle.
    fn retains_bindings(&self) -> bool {
        true
    }
}
