//! Per-camera command lists
//!
//! A command list owns no geometry; it accumulates the draw commands issued
//! for one camera in one frame and is re-recorded from scratch every tick.

use crate::backend::{BufferHandle, PrimitiveTopology};
use crate::shading::{BufferSlot, ShadingResource};
use glam::Mat4;
use std::cell::RefCell;
use std::rc::Rc;

/// Render-pass insertion point a command list is attached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPoint {
    BeforeOpaque,
    #[default]
    AfterOpaque,
    AfterTransparent,
}

/// A recorded command.
#[derive(Clone)]
pub enum DrawCommand {
    BindBuffer {
        slot: BufferSlot,
        buffer: BufferHandle,
    },
    DrawProcedural {
        transform: Mat4,
        shading: Rc<RefCell<ShadingResource>>,
        topology: PrimitiveTopology,
        vertex_count: u32,
    },
}

/// Command list attached to one camera.
pub struct CommandList {
    name: String,
    insertion_point: InsertionPoint,
    commands: Vec<DrawCommand>,
}

impl CommandList {
    pub fn new(name: &str, insertion_point: InsertionPoint) -> Self {
        Self {
            name: name.to_string(),
            insertion_point,
            commands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insertion_point(&self) -> InsertionPoint {
        self.insertion_point
    }

    /// Drop all recorded commands. Called at the start of every camera tick.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn bind(&mut self, slot: BufferSlot, buffer: BufferHandle) {
        self.commands.push(DrawCommand::BindBuffer { slot, buffer });
    }

    /// Record a procedural draw: `vertex_count` points read from the shading
    /// resource's buffers, no vertex/index buffer pair.
    pub fn draw_procedural(
        &mut self,
        transform: Mat4,
        shading: Rc<RefCell<ShadingResource>>,
        topology: PrimitiveTopology,
        vertex_count: u32,
    ) {
        self.commands.push(DrawCommand::DrawProcedural {
            transform,
            shading,
            topology,
            vertex_count,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_recorded_commands() {
        let mut list = CommandList::new("outline", InsertionPoint::default());
        let shading = Rc::new(RefCell::new(ShadingResource::outline()));
        list.draw_procedural(Mat4::IDENTITY, shading, PrimitiveTopology::PointList, 12);
        assert_eq!(list.len(), 1);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.insertion_point(), InsertionPoint::AfterOpaque);
    }
}
