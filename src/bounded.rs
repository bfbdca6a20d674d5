use std::cell::UnsafeCell;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::*;

use parking_lot::{Condvar, Mutex};

use crate::entry::BoundedEntry;
use crate::Poolable;

/// A pool admitting at most `capacity` concurrent borrowers.
///
/// [`acquire`](BoundedPool::acquire) blocks while every slot is handed out
/// and wakes when one is returned. The value constructed for a slot stays
/// canonical for the life of the pool: a later acquire landing on the same
/// slot returns the cached value and its arguments are ignored, so at most
/// `capacity` instances are ever constructed.
pub struct BoundedPool<T: Poolable> {
    /// Fixed slot array; slots never move, so instance addresses are
    /// stable for the lifetime of the pool.
    slots: Box<[BoundedSlot<T>]>,
    /// Indices of slots not currently handed out.
    free: Mutex<Vec<usize>>,
    /// Signalled whenever an index is pushed back onto `free`.
    vacancy: Condvar,
}

struct BoundedSlot<T> {
    value: UnsafeCell<Option<T>>,
    /// Set once the value has been constructed and published. Never unset.
    ready: AtomicBool,
}

// The value is written once, by the thread holding the slot's admission
// token, before the `ready` release-store; afterwards it is only ever read.
unsafe impl<T: Send + Sync> Sync for BoundedSlot<T> {}

impl<T: Poolable> BoundedPool<T> {
    /// Create a pool with `capacity` slots.
    ///
    /// A zero-capacity pool is valid; every acquire on it blocks forever.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| BoundedSlot {
                value: UnsafeCell::new(None),
                ready: AtomicBool::new(false),
            })
            .collect();
        Self {
            slots,
            free: Mutex::new((0..capacity).collect()),
            vacancy: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently handed out.
    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.lock().len()
    }

    /// Borrow an instance, blocking until a slot is free.
    ///
    /// If the slot has never held a value, the factory runs with `args`;
    /// otherwise the cached value is returned and `args` is dropped. A
    /// factory error releases the admission token before propagating, so
    /// the pool is left unchanged.
    pub fn acquire(&self, args: T::Args) -> Result<BoundedEntry<'_, T>, T::Error> {
        let index = {
            let mut free = self.free.lock();
            loop {
                if let Some(index) = free.pop() {
                    break index;
                }
                self.vacancy.wait(&mut free);
            }
        };

        let slot = &self.slots[index];
        if !slot.ready.load(Acquire) {
            let value = match T::make(args) {
                Ok(value) => value,
                Err(err) => {
                    self.vacate(index);
                    return Err(err);
                }
            };
            // Sole leaseholder of an unpublished slot; nobody reads the
            // cell until `ready` is set.
            unsafe { *slot.value.get() = Some(value) };
            slot.ready.store(true, Release);
        }
        Ok(BoundedEntry::new(self, index))
    }

    /// Call `visitor` for every instance in the pool, stopping early when
    /// it returns `false`.
    ///
    /// With `shared == true` the pass is read-only: it never blocks and may
    /// run concurrently with outstanding borrows and other visitors. With
    /// `shared == false` the call waits until every slot has been returned
    /// and keeps acquirers blocked for the duration of the pass, so it
    /// blocks indefinitely while any borrow is outstanding.
    ///
    /// The visitor must not call back into this pool.
    pub fn visit<F>(&self, mut visitor: F, shared: bool)
    where
        F: FnMut(&T) -> bool,
    {
        if shared {
            self.visit_published(&mut visitor);
        } else {
            let mut free = self.free.lock();
            while free.len() < self.slots.len() {
                self.vacancy.wait(&mut free);
            }
            self.visit_published(&mut visitor);
        }
    }

    fn visit_published<F>(&self, visitor: &mut F)
    where
        F: FnMut(&T) -> bool,
    {
        for index in 0..self.slots.len() {
            if let Some(value) = self.published(index) {
                if !visitor(value) {
                    break;
                }
            }
        }
    }

    /// Read a slot's value if one has been published.
    pub(crate) fn published(&self, index: usize) -> Option<&T> {
        let slot = &self.slots[index];
        if !slot.ready.load(Acquire) {
            return None;
        }
        // Published values are never written again.
        unsafe { (*slot.value.get()).as_ref() }
    }

    /// Return a slot to the free set and wake waiters.
    pub(crate) fn vacate(&self, index: usize) {
        self.free.lock().push(index);
        // Acquirers and exclusive visitors share the condvar.
        self.vacancy.notify_all();
    }
}
