//! Registry of active renderable instances
//!
//! Pure membership bookkeeping: instances are added on activation and
//! removed on deactivation. The registry owns nothing and guarantees no
//! iteration order; draw ordering must never depend on it.

use crate::instance::RenderableInstance;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Registry membership key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

/// Membership set of currently active instances.
#[derive(Default)]
pub struct RenderableRegistry {
    instances: HashMap<InstanceId, Rc<RefCell<RenderableInstance>>>,
    next_id: u64,
}

impl RenderableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance, returning its membership key.
    pub fn insert(&mut self, instance: Rc<RefCell<RenderableInstance>>) -> InstanceId {
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        self.instances.insert(id, instance);
        id
    }

    /// Remove a member. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: InstanceId) -> Option<Rc<RefCell<RenderableInstance>>> {
        self.instances.remove(&id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&Rc<RefCell<RenderableInstance>>> {
        self.instances.get(&id)
    }

    /// Iterate over members in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<RefCell<RenderableInstance>>> {
        self.instances.values()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drop all memberships. Does not release the instances' buffers; that
    /// is the owner's job.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}
