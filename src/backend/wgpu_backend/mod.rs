//! wgpu device backend
//!
//! Structured buffers are storage buffers; contents are refreshed through
//! the queue so per-frame updates never stall the frame loop.

use crate::backend::traits::{AllocationResult, BufferHandle, GpuDevice};
use crate::backend::types::StructuredBufferDescriptor;
use std::collections::HashMap;
use wgpu::util::DeviceExt;

/// [`GpuDevice`] implementation over an existing wgpu device and queue.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,

    // Resource storage
    buffers: HashMap<u64, wgpu::Buffer>,
    next_buffer_id: u64,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            next_buffer_id: 1,
        }
    }

    /// Access the underlying wgpu buffer for a handle, e.g. to build the
    /// shading stage's bind group.
    pub fn raw_buffer(&self, buffer: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(&buffer.0)
    }
}

impl GpuDevice for WgpuDevice {
    fn create_structured_buffer(
        &mut self,
        desc: &StructuredBufferDescriptor,
        data: &[u8],
    ) -> AllocationResult<BufferHandle> {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&desc.label),
                contents: data,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            });

        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        self.buffers.insert(id, buffer);
        Ok(BufferHandle(id))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        if let Some(buf) = self.buffers.get(&buffer.0) {
            self.queue.write_buffer(buf, 0, data);
        } else {
            log::warn!("write_buffer on dead handle {:?}", buffer);
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(buf) = self.buffers.remove(&buffer.0) {
            buf.destroy();
        }
    }

    fn retains_bindings(&self) -> bool {
        true
    }
}
