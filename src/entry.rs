use std::ops::Deref;
use std::sync::Arc;

use crate::bounded::BoundedPool;
use crate::slot::Slot;
use crate::unbounded::UnboundedPool;
use crate::volatile::Generation;
use crate::Poolable;

/// Ownership tag for a borrow from the unbounded pool family.
///
/// A tracked lease owns the slot it was popped from and returns it to the
/// free-list on release. An untracked lease owns an overflow instance that
/// is destroyed on release and never enters the cache, even when a slot is
/// free at that point.
pub(crate) enum Lease<T> {
    Tracked(Slot<T>),
    Untracked(Box<T>),
}

impl<T> Lease<T> {
    fn value(&self) -> &T {
        match self {
            // Leased slots are filled before they are handed out.
            Lease::Tracked(slot) => slot.get().unwrap(),
            Lease::Untracked(value) => value,
        }
    }

    fn value_mut(&mut self) -> &mut T {
        match self {
            Lease::Tracked(slot) => slot.get_mut().unwrap(),
            Lease::Untracked(value) => value,
        }
    }
}

/// An exclusive borrow from an [`UnboundedPool`].
///
/// Dropping the entry releases the instance: back into the pool's cache for
/// a tracked borrow, destroyed for an overflow borrow.
pub struct Entry<'a, T: Poolable> {
    // `None` once the entry has been reset.
    pub(crate) lease: Option<Lease<T>>,
    pub(crate) pool: &'a UnboundedPool<T>,
}

impl<'a, T: Poolable> Entry<'a, T> {
    /// Reference to the borrowed instance, or `None` for an empty entry.
    pub fn get(&self) -> Option<&T> {
        self.lease.as_ref().map(Lease::value)
    }

    /// Mutable reference to the borrowed instance.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.lease.as_mut().map(Lease::value_mut)
    }

    /// Release the instance now, leaving the entry empty.
    ///
    /// Resetting an empty entry is a no-op.
    pub fn reset(&mut self) {
        if let Some(lease) = self.lease.take() {
            self.pool.release(lease);
        }
    }

    /// Give up the exclusive claim and return a reference-counted alias.
    ///
    /// The instance is released when the last alias is dropped.
    pub fn into_shared(self) -> SharedEntry<'a, T> {
        SharedEntry {
            entry: Arc::new(self),
        }
    }
}

impl<'a, T: Poolable> Drop for Entry<'a, T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<'a, T: Poolable> Deref for Entry<'a, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.lease.as_ref().unwrap().value()
    }
}

/// A reference-counted alias of an [`Entry`].
///
/// Cloning produces another alias of the same borrow; the final alias
/// dropping runs the release path exactly once.
pub struct SharedEntry<'a, T: Poolable> {
    entry: Arc<Entry<'a, T>>,
}

impl<'a, T: Poolable> Clone for SharedEntry<'a, T> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
        }
    }
}

impl<'a, T: Poolable> SharedEntry<'a, T> {
    /// Reference to the borrowed instance, or `None` if the alias was made
    /// from an empty entry.
    pub fn get(&self) -> Option<&T> {
        self.entry.get()
    }
}

impl<'a, T: Poolable> Deref for SharedEntry<'a, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}

/// An exclusive borrow from a [`BoundedPool`](crate::BoundedPool).
///
/// Dropping the entry returns the slot to the pool and wakes blocked
/// acquirers.
pub struct BoundedEntry<'a, T: Poolable> {
    index: Option<usize>,
    pool: &'a BoundedPool<T>,
}

impl<'a, T: Poolable> BoundedEntry<'a, T> {
    pub(crate) fn new(pool: &'a BoundedPool<T>, index: usize) -> Self {
        Self {
            index: Some(index),
            pool,
        }
    }

    /// Reference to the borrowed instance, or `None` for an empty entry.
    pub fn get(&self) -> Option<&T> {
        self.index.and_then(|index| self.pool.published(index))
    }

    /// Release the slot now, leaving the entry empty.
    ///
    /// Resetting an empty entry is a no-op.
    pub fn reset(&mut self) {
        if let Some(index) = self.index.take() {
            self.pool.vacate(index);
        }
    }

    /// Give up the exclusive claim and return a reference-counted alias.
    ///
    /// The slot is released when the last alias is dropped.
    pub fn into_shared(self) -> SharedBoundedEntry<'a, T> {
        SharedBoundedEntry {
            entry: Arc::new(self),
        }
    }
}

impl<'a, T: Poolable> Drop for BoundedEntry<'a, T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<'a, T: Poolable> Deref for BoundedEntry<'a, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.get().unwrap()
    }
}

/// A reference-counted alias of a [`BoundedEntry`].
pub struct SharedBoundedEntry<'a, T: Poolable> {
    entry: Arc<BoundedEntry<'a, T>>,
}

impl<'a, T: Poolable> Clone for SharedBoundedEntry<'a, T> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
        }
    }
}

impl<'a, T: Poolable> SharedBoundedEntry<'a, T> {
    /// Reference to the borrowed instance, or `None` if the alias was made
    /// from an empty entry.
    pub fn get(&self) -> Option<&T> {
        self.entry.get()
    }
}

impl<'a, T: Poolable> Deref for SharedBoundedEntry<'a, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}

/// An exclusive borrow from a [`VolatilePool`](crate::VolatilePool).
///
/// The entry holds a strong reference to the generation it was produced
/// under, never to the pool itself, so it stays valid and readable after
/// the pool is cleared, cloned, or dropped.
pub struct VolatileEntry<T: Poolable> {
    pub(crate) lease: Option<Lease<T>>,
    pub(crate) generation: Arc<Generation<T>>,
}

impl<T: Poolable> VolatileEntry<T> {
    /// Reference to the borrowed instance, or `None` for an empty entry.
    pub fn get(&self) -> Option<&T> {
        self.lease.as_ref().map(Lease::value)
    }

    /// Mutable reference to the borrowed instance.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.lease.as_mut().map(Lease::value_mut)
    }

    /// Release the instance now, leaving the entry empty.
    ///
    /// A tracked instance re-enters its generation's cache unless that
    /// generation has been detached, in which case it is destroyed.
    /// Resetting an empty entry is a no-op.
    pub fn reset(&mut self) {
        if let Some(lease) = self.lease.take() {
            self.generation.release(lease);
        }
    }

    /// Give up the exclusive claim and return a reference-counted alias.
    ///
    /// The instance is released when the last alias is dropped.
    pub fn into_shared(self) -> SharedVolatileEntry<T> {
        SharedVolatileEntry {
            entry: Arc::new(self),
        }
    }
}

impl<T: Poolable> Drop for VolatileEntry<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: Poolable> Deref for VolatileEntry<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.lease.as_ref().unwrap().value()
    }
}

/// A reference-counted alias of a [`VolatileEntry`].
pub struct SharedVolatileEntry<T: Poolable> {
    entry: Arc<VolatileEntry<T>>,
}

impl<T: Poolable> Clone for SharedVolatileEntry<T> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
        }
    }
}

impl<T: Poolable> SharedVolatileEntry<T> {
    /// Reference to the borrowed instance, or `None` if the alias was made
    /// from an empty entry.
    pub fn get(&self) -> Option<&T> {
        self.entry.get()
    }
}

impl<T: Poolable> Deref for SharedVolatileEntry<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}
