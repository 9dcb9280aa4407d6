//! Shading resource contract
//!
//! The shading stage that amplifies edge points into outline triangles is an
//! external collaborator. This module models only its binding surface: four
//! named structured-buffer slots and a stable kind string validated at
//! instance init.

use crate::backend::BufferHandle;

/// Kind string the outline pipeline expects its shading resource to carry.
pub const OUTLINE_SHADING_KIND: &str = "outline/mesh-line";

/// Named buffer slots on the shading resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSlot {
    Positions,
    Normals,
    Uvs,
    Edges,
}

impl BufferSlot {
    pub const ALL: [BufferSlot; 4] = [
        BufferSlot::Positions,
        BufferSlot::Normals,
        BufferSlot::Uvs,
        BufferSlot::Edges,
    ];

    fn index(self) -> usize {
        match self {
            BufferSlot::Positions => 0,
            BufferSlot::Normals => 1,
            BufferSlot::Uvs => 2,
            BufferSlot::Edges => 3,
        }
    }
}

/// A shading resource with four named buffer slots.
#[derive(Debug, Clone)]
pub struct ShadingResource {
    kind: String,
    slots: [Option<BufferHandle>; 4],
}

impl ShadingResource {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            slots: [None; 4],
        }
    }

    /// The outline shading resource every instance binds against.
    pub fn outline() -> Self {
        Self::new(OUTLINE_SHADING_KIND)
    }

    /// Contract identity checked at instance init.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn set_buffer(&mut self, slot: BufferSlot, buffer: BufferHandle) {
        self.slots[slot.index()] = Some(buffer);
    }

    pub fn buffer(&self, slot: BufferSlot) -> Option<BufferHandle> {
        self.slots[slot.index()]
    }

    /// Drop all bindings, e.g. when the bound buffers are released.
    pub fn clear_bindings(&mut self) {
        self.slots = [None; 4];
    }

    /// Whether every slot has a bound buffer.
    pub fn fully_bound(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_start_unbound() {
        let shading = ShadingResource::outline();
        assert_eq!(shading.kind(), OUTLINE_SHADING_KIND);
        assert!(!shading.fully_bound());
        for slot in BufferSlot::ALL {
            assert!(shading.buffer(slot).is_none());
        }
    }

    #[test]
    fn bind_and_clear() {
        let mut shading = ShadingResource::outline();
        for (i, slot) in BufferSlot::ALL.into_iter().enumerate() {
            shading.set_buffer(slot, BufferHandle(i as u64 + 1));
        }
        assert!(shading.fully_bound());
        assert_eq!(shading.buffer(BufferSlot::Edges), Some(BufferHandle(4)));

        shading.clear_bindings();
        assert!(!shading.fully_bound());
    }
}
