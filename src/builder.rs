use crate::{Config, Poolable, UnboundedPool, VolatilePool};

/// A builder for the unbounded pool family.
///
/// # Example
///
/// ```rust
/// use object_pool::{Builder, Poolable};
/// use std::convert::Infallible;
///
/// struct Scratch {
///     text: String,
/// }
///
/// impl Poolable for Scratch {
///     type Args = String;
///     type Error = Infallible;
///
///     fn make(text: String) -> Result<Self, Infallible> {
///         Ok(Self { text })
///     }
/// }
///
/// let mut builder = Builder::<Scratch>::new();
/// let pool = builder
///     .capacity(8)
///     .reset_func(|scratch| scratch.text.clear())
///     .build();
/// assert_eq!(pool.size(), 8);
/// ```
pub struct Builder<T: Poolable> {
    config: Config<T>,
}

impl<T: Poolable> Builder<T> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the number of idle instances the pool will cache.
    pub fn capacity(&mut self, capacity: usize) -> &mut Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the hook run on an instance before it re-enters the cache.
    pub fn reset_func(&mut self, func: fn(&mut T)) -> &mut Self {
        self.config.reset_func = Some(func);
        self
    }

    /// Build an [`UnboundedPool`] with the current configuration.
    pub fn build(&mut self) -> UnboundedPool<T> {
        UnboundedPool::with_config(std::mem::take(&mut self.config))
    }

    /// Build a [`VolatilePool`] with the current configuration.
    pub fn build_volatile(&mut self) -> VolatilePool<T> {
        VolatilePool::with_config(std::mem::take(&mut self.config))
    }
}

impl<T: Poolable> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}
