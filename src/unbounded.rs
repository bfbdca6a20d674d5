use std::cmp::max;

use crossbeam_queue::ArrayQueue;

use crate::entry::{Entry, Lease};
use crate::slot::Slot;
use crate::Poolable;

/// Configuration for the unbounded pool family.
pub struct Config<T> {
    /// Number of idle instances the pool will cache.
    pub capacity: usize,
    /// Optional hook run on an instance before it re-enters the cache.
    pub reset_func: Option<fn(&mut T)>,
}

impl<T> Default for Config<T> {
    fn default() -> Self {
        Self {
            capacity: 0,
            reset_func: None,
        }
    }
}

/// A pool that never blocks.
///
/// Up to `capacity` idle instances are cached; an acquire finding the cache
/// empty constructs an untracked instance instead, which is destroyed on
/// release rather than cached. Dropping the pool drops every cached
/// instance.
pub struct UnboundedPool<T: Poolable> {
    /// Idle slots, seeded with `capacity` empty slots at construction.
    /// Leased slots live inside their entry until release pushes them back.
    queue: ArrayQueue<Slot<T>>,
    reset_func: Option<fn(&mut T)>,
    capacity: usize,
}

impl<T: Poolable> UnboundedPool<T> {
    /// Create a pool caching up to `capacity` idle instances.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(Config {
            capacity,
            ..Config::default()
        })
    }

    /// Create a pool with the given configuration.
    pub fn with_config(config: Config<T>) -> Self {
        // `ArrayQueue` rejects zero capacity; a zero-size pool keeps an
        // empty queue it never pushes to.
        let queue = ArrayQueue::new(max(1, config.capacity));
        for _ in 0..config.capacity {
            let _ = queue.push(Slot::empty());
        }
        Self {
            queue,
            reset_func: config.reset_func,
            capacity: config.capacity,
        }
    }

    /// Nominal cache size.
    pub fn size(&self) -> usize {
        self.capacity
    }

    /// Number of idle slots currently in the cache.
    pub fn idle(&self) -> usize {
        self.queue.len()
    }

    /// Borrow an instance without blocking.
    ///
    /// Pops an idle slot when one is available, reusing its cached value if
    /// it was already constructed; otherwise constructs an untracked
    /// instance. A factory error pushes the popped slot back before
    /// propagating.
    pub fn acquire(&self, args: T::Args) -> Result<Entry<'_, T>, T::Error> {
        let lease = match self.queue.pop() {
            Some(mut slot) => {
                if !slot.is_filled() {
                    match T::make(args) {
                        Ok(value) => slot.fill(value),
                        Err(err) => {
                            let _ = self.queue.push(slot);
                            return Err(err);
                        }
                    }
                }
                Lease::Tracked(slot)
            }
            None => Lease::Untracked(Box::new(T::make(args)?)),
        };
        Ok(Entry {
            lease: Some(lease),
            pool: self,
        })
    }

    /// Destroy every idle cached instance, keeping the slots for reuse.
    ///
    /// Outstanding borrows are unaffected and release back into the cache
    /// as usual.
    pub fn clear(&self) {
        for _ in 0..self.queue.len() {
            let Some(mut slot) = self.queue.pop() else { break };
            slot.clear();
            let _ = self.queue.push(slot);
        }
    }

    pub(crate) fn release(&self, lease: Lease<T>) {
        match lease {
            Lease::Tracked(slot) => self.recycle(slot),
            Lease::Untracked(value) => drop(value),
        }
    }

    /// Return a slot to the cache, wiping its value first if a reset hook
    /// is configured.
    fn recycle(&self, mut slot: Slot<T>) {
        if let Some(reset) = self.reset_func {
            if let Some(value) = slot.get_mut() {
                reset(value);
            }
        }
        let _ = self.queue.push(slot);
    }
}
