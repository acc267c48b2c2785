use serde::{Deserialize, Serialize};

use crate::fx::VisualHandle;

/// Stable per-run entity identifier. Never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

pub trait Entity {
    fn id(&self) -> EntityId;
    fn is_dead(&self) -> bool;
    fn visual(&self) -> VisualHandle;
}

/// Dense arena of live entities.
///
/// Ids are handed out by the pool so they stay unique across sweeps. Dead
/// entities stay in place (and addressable) until [`EntityPool::sweep_dead`]
/// swap-removes them and hands them back for visual teardown and drops.
#[derive(Debug, Clone)]
pub struct EntityPool<T> {
    items: Vec<T>,
    next_id: u64,
}

impl<T> Default for EntityPool<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: Entity> EntityPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and stores an entity under a freshly allocated id.
    pub fn insert_with(&mut self, build: impl FnOnce(EntityId) -> T) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.items.push(build(id));
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.items.iter().filter(|e| !e.is_dead()).count()
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Removes every dead entity and returns them in removal order.
    pub fn sweep_dead(&mut self) -> Vec<T> {
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.items.len() {
            if self.items[i].is_dead() {
                removed.push(self.items.swap_remove(i));
            } else {
                i += 1;
            }
        }
        removed
    }

    /// Empties the pool (restart). Id allocation keeps counting.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }
}
