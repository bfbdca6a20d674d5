use std::cmp::max;
use std::mem;
use std::sync::atomic::Ordering::*;
use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use parking_lot::RwLock;

use crate::entry::{Lease, VolatileEntry};
use crate::slot::Slot;
use crate::unbounded::Config;
use crate::Poolable;

/// One generation of cached instances.
///
/// Entries reference their generation block directly, never the pool, so a
/// borrowed instance survives `clear(true)` and pool destruction; the block
/// dies with its last holder. `members` counts the instances associated
/// with the generation: one per outstanding borrow plus one per cached
/// idle instance.
pub(crate) struct Generation<T> {
    queue: ArrayQueue<Slot<T>>,
    members: AtomicUsize,
    /// Set when the generation is detached; releases into a retired
    /// generation destroy their instance instead of caching it.
    retired: AtomicBool,
    reset_func: Option<fn(&mut T)>,
}

impl<T> Generation<T> {
    fn new(capacity: usize, reset_func: Option<fn(&mut T)>) -> Self {
        let queue = ArrayQueue::new(max(1, capacity));
        for _ in 0..capacity {
            let _ = queue.push(Slot::empty());
        }
        Self {
            queue,
            members: AtomicUsize::new(0),
            retired: AtomicBool::new(false),
            reset_func,
        }
    }

    pub(crate) fn release(&self, lease: Lease<T>) {
        match lease {
            Lease::Tracked(mut slot) => {
                if self.retired.load(Acquire) {
                    // Orphaned: the instance dies with its slot.
                    self.members.fetch_sub(1, Relaxed);
                } else {
                    if let Some(reset) = self.reset_func {
                        if let Some(value) = slot.get_mut() {
                            reset(value);
                        }
                    }
                    // Borrowed becomes cached; the membership count is
                    // unchanged.
                    let _ = self.queue.push(slot);
                }
            }
            Lease::Untracked(value) => {
                self.members.fetch_sub(1, Relaxed);
                drop(value);
            }
        }
    }

    /// Destroy idle cached instances, keeping the slots for reuse.
    fn clear_idle(&self) {
        for _ in 0..self.queue.len() {
            let Some(mut slot) = self.queue.pop() else { break };
            if slot.is_filled() {
                slot.clear();
                self.members.fetch_sub(1, Relaxed);
            }
            let _ = self.queue.push(slot);
        }
    }

    /// Mark the generation dead and destroy its cached instances.
    fn retire(&self) {
        self.retired.store(true, Release);
        while let Some(slot) = self.queue.pop() {
            if slot.is_filled() {
                self.members.fetch_sub(1, Relaxed);
            }
        }
    }
}

/// State shared by a [`VolatilePool`] and its clones.
struct PoolState<T> {
    current: RwLock<Arc<Generation<T>>>,
    capacity: usize,
    reset_func: Option<fn(&mut T)>,
}

/// An unbounded pool whose cached set can be invalidated wholesale.
///
/// Behaves like [`UnboundedPool`](crate::UnboundedPool) — non-blocking
/// acquire, up to `capacity` cached idle instances, untracked overflow —
/// with two additions:
///
/// - every borrow belongs to a *generation*, and
///   [`clear(true)`](VolatilePool::clear) detaches the current generation
///   so outstanding borrows, when released, are destroyed instead of
///   re-entering the cache;
/// - entries hold the generation alive on their own, so they remain valid
///   after the pool itself is dropped.
///
/// The pool is cheap to clone; clones co-own all state and always report
/// the same [`generation_size`](VolatilePool::generation_size).
pub struct VolatilePool<T: Poolable> {
    state: Arc<PoolState<T>>,
}

impl<T: Poolable> Clone for VolatilePool<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Poolable> VolatilePool<T> {
    /// Create a pool caching up to `capacity` idle instances.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(Config {
            capacity,
            ..Config::default()
        })
    }

    /// Create a pool with the given configuration.
    pub fn with_config(config: Config<T>) -> Self {
        let generation = Arc::new(Generation::new(config.capacity, config.reset_func));
        Self {
            state: Arc::new(PoolState {
                current: RwLock::new(generation),
                capacity: config.capacity,
                reset_func: config.reset_func,
            }),
        }
    }

    /// Nominal cache size.
    pub fn size(&self) -> usize {
        self.state.capacity
    }

    /// Number of instances associated with the current generation: one per
    /// outstanding borrow plus one per cached idle instance.
    pub fn generation_size(&self) -> usize {
        self.state.current.read().members.load(Relaxed)
    }

    /// Borrow an instance without blocking.
    ///
    /// Same admission and reuse rules as
    /// [`UnboundedPool::acquire`](crate::UnboundedPool::acquire); the entry
    /// additionally joins the current generation.
    pub fn acquire(&self, args: T::Args) -> Result<VolatileEntry<T>, T::Error> {
        let generation = Arc::clone(&*self.state.current.read());
        let lease = match generation.queue.pop() {
            Some(mut slot) => {
                if !slot.is_filled() {
                    match T::make(args) {
                        Ok(value) => {
                            slot.fill(value);
                            generation.members.fetch_add(1, Relaxed);
                        }
                        Err(err) => {
                            let _ = generation.queue.push(slot);
                            return Err(err);
                        }
                    }
                }
                // Reusing a cached value moves it from cached to borrowed;
                // the membership count is unchanged.
                Lease::Tracked(slot)
            }
            None => {
                let value = Box::new(T::make(args)?);
                generation.members.fetch_add(1, Relaxed);
                Lease::Untracked(value)
            }
        };
        Ok(VolatileEntry {
            lease: Some(lease),
            generation,
        })
    }

    /// Destroy every idle cached instance.
    ///
    /// With `detach == false`, the slots stay in the current generation and
    /// outstanding borrows release back into the cache as usual. With
    /// `detach == true`, a fresh generation replaces the current one:
    /// outstanding borrows keep their (still readable) instances but are
    /// orphaned, destroying them on release, and
    /// [`generation_size`](VolatilePool::generation_size) restarts at zero.
    pub fn clear(&self, detach: bool) {
        if detach {
            let fresh = Arc::new(Generation::new(self.state.capacity, self.state.reset_func));
            let old = mem::replace(&mut *self.state.current.write(), fresh);
            old.retire();
        } else {
            self.state.current.read().clear_idle();
        }
    }
}
