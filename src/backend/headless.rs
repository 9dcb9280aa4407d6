//! Headless device backend
//!
//! Tracks allocations in host memory with the same handle discipline as the
//! GPU backends. Used by tests and by tools that run the pipeline without a
//! device (e.g. offline edge-index generation checks).

use crate::backend::traits::{AllocationError, AllocationResult, BufferHandle, GpuDevice};
use crate::backend::types::StructuredBufferDescriptor;
use std::collections::HashMap;

struct HeadlessBuffer {
    label: String,
    element_count: usize,
    element_stride: usize,
    data: Vec<u8>,
}

/// In-memory [`GpuDevice`] implementation.
pub struct HeadlessDevice {
    buffers: HashMap<u64, HeadlessBuffer>,
    next_buffer_id: u64,
    fail_in: Option<u32>,
    retains_bindings: bool,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next_buffer_id: 1,
            fail_in: None,
            retains_bindings: true,
        }
    }

    /// Make the next `create_structured_buffer` call fail. Lets tests drive
    /// the allocation-failure path of instance init.
    pub fn fail_next_allocation(&mut self) {
        self.fail_in = Some(0);
    }

    /// Let `n` allocations succeed, then fail the one after.
    pub fn fail_allocation_after(&mut self, n: u32) {
        self.fail_in = Some(n);
    }

    /// Configure whether this device pretends to retain shading bindings
    /// across content updates.
    pub fn set_retains_bindings(&mut self, retains: bool) {
        self.retains_bindings = retains;
    }

    /// Number of currently live buffers.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Whether a handle refers to a live buffer.
    pub fn is_live(&self, buffer: BufferHandle) -> bool {
        self.buffers.contains_key(&buffer.0)
    }

    /// Element count of a live buffer.
    pub fn buffer_element_count(&self, buffer: BufferHandle) -> Option<usize> {
        self.buffers.get(&buffer.0).map(|b| b.element_count)
    }

    /// Current contents of a live buffer.
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(|b| b.data.as_slice())
    }

    /// Label of a live buffer.
    pub fn buffer_label(&self, buffer: BufferHandle) -> Option<&str> {
        self.buffers.get(&buffer.0).map(|b| b.label.as_str())
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuDevice for HeadlessDevice {
    fn create_structured_buffer(
        &mut self,
        desc: &StructuredBufferDescriptor,
        data: &[u8],
    ) -> AllocationResult<BufferHandle> {
        match self.fail_in {
            Some(0) => {
                self.fail_in = None;
                return Err(AllocationError::BufferCreationFailed {
                    label: desc.label.clone(),
                    reason: "injected failure".to_string(),
                });
            }
            Some(n) => self.fail_in = Some(n - 1),
            None => {}
        }

        let mut contents = vec![0u8; desc.byte_size()];
        let n = data.len().min(contents.len());
        contents[..n].copy_from_slice(&data[..n]);

        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        self.buffers.insert(
            id,
            HeadlessBuffer {
                label: desc.label.clone(),
                element_count: desc.element_count,
                element_stride: desc.element_stride,
                data: contents,
            },
        );
        Ok(BufferHandle(id))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        if let Some(buf) = self.buffers.get_mut(&buffer.0) {
            let n = data.len().min(buf.data.len());
            buf.data[..n].copy_from_slice(&data[..n]);
        } else {
            log::warn!("write_buffer on dead handle {:?}", buffer);
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer.0);
    }

    fn retains_bindings(&self) -> bool {
        self.retains_bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(label: &str, count: usize, stride: usize) -> StructuredBufferDescriptor {
        StructuredBufferDescriptor::new(label, count, stride)
    }

    #[test]
    fn create_and_destroy() {
        let mut device = HeadlessDevice::new();
        let buf = device
            .create_structured_buffer(&desc("positions", 3, 12), &[0u8; 36])
            .unwrap();
        assert_eq!(device.live_buffer_count(), 1);
        assert_eq!(device.buffer_element_count(buf), Some(3));

        device.destroy_buffer(buf);
        assert_eq!(device.live_buffer_count(), 0);
        assert!(!device.is_live(buf));
        // double destroy is a no-op
        device.destroy_buffer(buf);
    }

    #[test]
    fn handles_are_never_reused() {
        let mut device = HeadlessDevice::new();
        let a = device
            .create_structured_buffer(&desc("a", 1, 4), &[0u8; 4])
            .unwrap();
        device.destroy_buffer(a);
        let b = device
            .create_structured_buffer(&desc("b", 1, 4), &[0u8; 4])
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn injected_failure_fails_once() {
        let mut device = HeadlessDevice::new();
        device.fail_next_allocation();
        assert!(device
            .create_structured_buffer(&desc("a", 1, 4), &[0u8; 4])
            .is_err());
        assert!(device
            .create_structured_buffer(&desc("a", 1, 4), &[0u8; 4])
            .is_ok());
    }

    #[test]
    fn write_overwrites_contents() {
        let mut device = HeadlessDevice::new();
        let buf = device
            .create_structured_buffer(&desc("a", 1, 4), &[1, 2, 3, 4])
            .unwrap();
        device.write_buffer(buf, &[9, 9, 9, 9]);
        assert_eq!(device.buffer_data(buf), Some(&[9u8, 9, 9, 9][..]));
    }
}
