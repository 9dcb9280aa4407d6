//! Per-camera frame dispatch
//!
//! On each camera's pre-render notification the dispatcher clears that
//! camera's command list, extracts the view frustum, culls the registry
//! against instance bounds, and issues the surviving draws. Within one
//! camera tick the order is always frustum → cull → draw; across cameras
//! the order follows the host's callback order and is not assumed stable.

use crate::backend::GpuDevice;
use crate::command::{CommandList, InsertionPoint};
use crate::culling::Frustum;
use crate::registry::RenderableRegistry;
use crate::scene::{Camera, CameraId};
use std::collections::HashMap;

/// Name of the non-rendering preview camera that is always excluded from
/// dispatch, regardless of camera type.
pub const PREVIEW_CAMERA_NAME: &str = "Preview Scene Camera";

/// Name under which the outline command list is attached to cameras.
pub const COMMAND_LIST_NAME: &str = "outline";

/// Session-scoped state shared by the dispatcher: the active-instance
/// registry and the per-camera command-list cache. Owned explicitly by the
/// application scope, not process-wide.
#[derive(Default)]
pub struct OutlineContext {
    pub registry: RenderableRegistry,
    command_lists: HashMap<CameraId, CommandList>,
}

impl OutlineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The command list currently attached to a camera, if any.
    pub fn command_list(&self, camera: CameraId) -> Option<&CommandList> {
        self.command_lists.get(&camera)
    }

    pub fn attached_camera_count(&self) -> usize {
        self.command_lists.len()
    }

    /// Session shutdown: release every registered instance and detach all
    /// command lists.
    pub fn clear(&mut self, device: &mut dyn GpuDevice) {
        for instance in self.registry.iter() {
            instance.borrow_mut().release(device);
        }
        self.registry.clear();
        self.command_lists.clear();
    }
}

/// Culls the registry and issues draws, once per camera per frame.
pub struct FrameDispatcher {
    insertion_point: InsertionPoint,
}

impl Default for FrameDispatcher {
    fn default() -> Self {
        Self {
            insertion_point: InsertionPoint::AfterOpaque,
        }
    }
}

impl FrameDispatcher {
    pub fn new(insertion_point: InsertionPoint) -> Self {
        Self { insertion_point }
    }

    /// Handle one camera's pre-render notification.
    ///
    /// Lazily creates and attaches the camera's command list on first
    /// sight, then records this frame's culled draws into it.
    pub fn dispatch_camera(
        &mut self,
        ctx: &mut OutlineContext,
        camera: &Camera,
        device: &mut dyn GpuDevice,
    ) {
        if camera.name() == PREVIEW_CAMERA_NAME {
            return;
        }

        let OutlineContext {
            registry,
            command_lists,
        } = ctx;

        let list = command_lists
            .entry(camera.id())
            .or_insert_with(|| CommandList::new(COMMAND_LIST_NAME, self.insertion_point));
        list.clear();

        let frustum = Frustum::from_view_projection(camera.view_projection_matrix());

        let mut visible = 0usize;
        for instance in registry.iter() {
            let mut instance = instance.borrow_mut();
            if frustum.intersects_aabb(&instance.bounds()) {
                instance.draw(device, list);
                visible += 1;
            }
        }
        log::trace!(
            "camera `{}`: {visible}/{} outline instances visible",
            camera.name(),
            registry.len()
        );
    }

    /// Handle a camera's teardown: detach and discard its command list so no
    /// dangling attachment survives the camera.
    pub fn on_camera_teardown(&mut self, ctx: &mut OutlineContext, camera: CameraId) {
        ctx.command_lists.remove(&camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessDevice;
    use crate::instance::RenderableInstance;
    use crate::resources::Mesh;
    use crate::shading::ShadingResource;
    use crate::source::StaticMeshSource;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn instance_at(
        device: &mut HeadlessDevice,
        position: Vec3,
    ) -> Rc<RefCell<RenderableInstance>> {
        let source = Rc::new(RefCell::new(StaticMeshSource::new(Rc::new(Mesh::cube()))));
        source.borrow_mut().transform.position = position;
        let shading = Rc::new(RefCell::new(ShadingResource::outline()));
        let mut instance = RenderableInstance::new(source, Some(shading));
        instance.init(device).unwrap();
        Rc::new(RefCell::new(instance))
    }

    fn main_camera() -> Camera {
        // At origin looking down -Z
        Camera::new(CameraId(1), "main", Vec3::ZERO, -Vec3::Z)
    }

    #[test]
    fn visible_instances_are_drawn_and_culled_ones_are_not() {
        let mut device = HeadlessDevice::new();
        let mut ctx = OutlineContext::new();
        ctx.registry
            .insert(instance_at(&mut device, Vec3::new(0.0, 0.0, -10.0)));
        ctx.registry
            .insert(instance_at(&mut device, Vec3::new(0.0, 0.0, 50.0))); // behind camera

        let camera = main_camera();
        let mut dispatcher = FrameDispatcher::default();
        dispatcher.dispatch_camera(&mut ctx, &camera, &mut device);

        assert_eq!(ctx.command_list(camera.id()).unwrap().len(), 1);
    }

    #[test]
    fn command_list_is_recreated_lazily_and_cleared_each_frame() {
        let mut device = HeadlessDevice::new();
        let mut ctx = OutlineContext::new();
        ctx.registry
            .insert(instance_at(&mut device, Vec3::new(0.0, 0.0, -10.0)));

        let camera = main_camera();
        let mut dispatcher = FrameDispatcher::default();

        dispatcher.dispatch_camera(&mut ctx, &camera, &mut device);
        assert_eq!(ctx.attached_camera_count(), 1);
        assert_eq!(ctx.command_list(camera.id()).unwrap().len(), 1);

        // Second frame: commands do not accumulate
        dispatcher.dispatch_camera(&mut ctx, &camera, &mut device);
        assert_eq!(ctx.attached_camera_count(), 1);
        assert_eq!(ctx.command_list(camera.id()).unwrap().len(), 1);
    }

    #[test]
    fn preview_camera_is_always_excluded() {
        let mut device = HeadlessDevice::new();
        let mut ctx = OutlineContext::new();
        ctx.registry
            .insert(instance_at(&mut device, Vec3::new(0.0, 0.0, -10.0)));

        let preview = Camera::new(CameraId(9), PREVIEW_CAMERA_NAME, Vec3::ZERO, -Vec3::Z);
        let mut dispatcher = FrameDispatcher::default();
        dispatcher.dispatch_camera(&mut ctx, &preview, &mut device);

        assert_eq!(ctx.attached_camera_count(), 0);
        assert!(ctx.command_list(preview.id()).is_none());
    }

    #[test]
    fn camera_teardown_detaches_its_list() {
        let mut device = HeadlessDevice::new();
        let mut ctx = OutlineContext::new();
        let camera = main_camera();
        let mut dispatcher = FrameDispatcher::default();

        dispatcher.dispatch_camera(&mut ctx, &camera, &mut device);
        assert_eq!(ctx.attached_camera_count(), 1);

        dispatcher.on_camera_teardown(&mut ctx, camera.id());
        assert_eq!(ctx.attached_camera_count(), 0);
    }

    #[test]
    fn each_camera_gets_its_own_list() {
        let mut device = HeadlessDevice::new();
        let mut ctx = OutlineContext::new();
        ctx.registry
            .insert(instance_at(&mut device, Vec3::new(0.0, 0.0, -10.0)));

        let main = main_camera();
        // Looks at the cube from the side
        let other = Camera::new(
            CameraId(2),
            "secondary",
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, -10.0),
        );
        let mut dispatcher = FrameDispatcher::default();
        dispatcher.dispatch_camera(&mut ctx, &main, &mut device);
        dispatcher.dispatch_camera(&mut ctx, &other, &mut device);

        assert_eq!(ctx.attached_camera_count(), 2);
        assert_eq!(ctx.command_list(main.id()).unwrap().len(), 1);
        assert_eq!(ctx.command_list(other.id()).unwrap().len(), 1);
    }

    #[test]
    fn released_mid_tick_instance_is_a_silent_skip() {
        let mut device = HeadlessDevice::new();
        let mut ctx = OutlineContext::new();
        let instance = instance_at(&mut device, Vec3::new(0.0, 0.0, -10.0));
        ctx.registry.insert(instance.clone());

        // Teardown lands after activation but before this camera's dispatch.
        instance.borrow_mut().release(&mut device);

        let camera = main_camera();
        let mut dispatcher = FrameDispatcher::default();
        dispatcher.dispatch_camera(&mut ctx, &camera, &mut device);
        assert!(ctx.command_list(camera.id()).unwrap().is_empty());
    }

    #[test]
    fn context_clear_releases_everything() {
        let mut device = HeadlessDevice::new();
        let mut ctx = OutlineContext::new();
        ctx.registry
            .insert(instance_at(&mut device, Vec3::ZERO));
        let camera = main_camera();
        FrameDispatcher::default().dispatch_camera(&mut ctx, &camera, &mut device);

        ctx.clear(&mut device);
        assert!(ctx.registry.is_empty());
        assert_eq!(ctx.attached_camera_count(), 0);
        assert_eq!(device.live_buffer_count(), 0);
    }
}
