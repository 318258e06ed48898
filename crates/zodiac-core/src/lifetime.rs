//! Mount-scoped ownership of frame loops, timers and listeners.
//!
//! Everything a mounted loader registers with the host goes through a
//! [`Lifetime`]. Dropping the lifetime releases whatever is still live, so an
//! unmount cannot leak a listener or an animation-frame request.

use fnv::FnvHashMap;

/// A host resource that must be handed back exactly once.
pub trait Release {
    fn release(self);

    /// Short tag used in logs ("raf", "listener:pointermove", ...).
    fn describe(&self) -> String {
        String::from("handle")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

pub struct Lifetime<H: Release> {
    next_id: u64,
    handles: FnvHashMap<HandleId, H>,
}

impl<H: Release> Default for Lifetime<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Release> Lifetime<H> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handles: FnvHashMap::default(),
        }
    }

    pub fn register(&mut self, handle: H) -> HandleId {
        let id = HandleId(self.next_id);
        self.next_id += 1;
        log::debug!("[lifetime] register {} as {:?}", handle.describe(), id);
        self.handles.insert(id, handle);
        id
    }

    /// Release one handle early. Returns false if it was already released.
    pub fn release(&mut self, id: HandleId) -> bool {
        match self.handles.remove(&id) {
            Some(h) => {
                log::debug!("[lifetime] release {}", h.describe());
                h.release();
                true
            }
            None => false,
        }
    }

    /// Forget a handle whose resource the host already reclaimed (a timer
    /// that fired, for instance) without releasing it again.
    pub fn forget(&mut self, id: HandleId) -> Option<H> {
        self.handles.remove(&id)
    }

    pub fn release_all(&mut self) {
        let mut ids: Vec<HandleId> = self.handles.keys().copied().collect();
        // newest first, mirroring registration order in reverse
        ids.sort_unstable_by(|a, b| b.cmp(a));
        for id in ids {
            self.release(id);
        }
    }

    #[inline]
    pub fn outstanding(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn contains(&self, id: HandleId) -> bool {
        self.handles.contains_key(&id)
    }
}

impl<H: Release> Drop for Lifetime<H> {
    fn drop(&mut self) {
        self.release_all();
    }
}
