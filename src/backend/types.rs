//! Common types shared between backends

/// Structured buffer descriptor
#[derive(Debug, Clone)]
pub struct StructuredBufferDescriptor {
    pub label: String,
    pub element_count: usize,
    pub element_stride: usize,
}

impl StructuredBufferDescriptor {
    pub fn new(label: &str, element_count: usize, element_stride: usize) -> Self {
        Self {
            label: label.to_string(),
            element_count,
            element_stride,
        }
    }

    /// Total buffer size in bytes.
    pub fn byte_size(&self) -> usize {
        self.element_count * self.element_stride
    }
}

/// Primitive topology for procedural draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    TriangleList,
}
