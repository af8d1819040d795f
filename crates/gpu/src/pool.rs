use foundation::handles::{Handle, HandleAllocator};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryHandle(pub Handle);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialHandle(pub Handle);

/// Generational slot storage for backend resources.
#[derive(Debug)]
pub struct ResourcePool<T> {
    handles: HandleAllocator,
    slots: Vec<Option<T>>,
}

impl<T> Default for ResourcePool<T> {
    fn default() -> Self {
        Self {
            handles: HandleAllocator::new(),
            slots: Vec::new(),
        }
    }
}

impl<T> ResourcePool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Handle {
        let handle = self.handles.alloc();
        let slot = handle.index() as usize;
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(value);
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.handles.is_live(handle) {
            return None;
        }
        self.slots.get(handle.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.handles.is_live(handle) {
            return None;
        }
        self.slots.get_mut(handle.index() as usize)?.as_mut()
    }

    /// `None` when the handle is stale or was already removed.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.handles.release(handle) {
            return None;
        }
        self.slots.get_mut(handle.index() as usize)?.take()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.is_live(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
