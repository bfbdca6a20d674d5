//! Concurrent object pools.
//!
//! A pool amortizes the cost of expensive-to-construct instances (parsers,
//! buffers, compiled state) across many short-lived borrows: acquire, use,
//! release. Three variants with distinct admission and lifetime guarantees:
//!
//! - [`BoundedPool`] admits at most `N` concurrent borrowers and blocks
//!   further acquirers until an instance is returned.
//! - [`UnboundedPool`] never blocks: it caches up to `N` idle instances
//!   and serves overflow from untracked instances destroyed on release.
//! - [`VolatilePool`] extends the unbounded pool with generation tracking:
//!   [`clear`](VolatilePool::clear) can detach the current generation so
//!   outstanding borrows never re-enter the cache, and its entries remain
//!   valid after the pool itself is dropped.
//!
//! Pooled types implement [`Poolable`]; the factory runs only when no
//! cached instance is available, so a reused instance keeps the state it
//! was first constructed with.
//!
//! ```rust
//! use object_pool::{Poolable, UnboundedPool};
//! use std::convert::Infallible;
//!
//! struct Scratch {
//!     name: String,
//! }
//!
//! impl Poolable for Scratch {
//!     type Args = String;
//!     type Error = Infallible;
//!
//!     fn make(name: String) -> Result<Self, Infallible> {
//!         Ok(Self { name })
//!     }
//! }
//!
//! let pool = UnboundedPool::<Scratch>::new(4);
//! let entry = pool.acquire("lexer".to_string()).unwrap();
//! assert_eq!(entry.name, "lexer");
//! ```

mod bounded;
mod builder;
mod entry;
mod pooled;
mod slot;
mod unbounded;
mod volatile;

pub use bounded::BoundedPool;
pub use builder::Builder;
pub use entry::{
    BoundedEntry, Entry, SharedBoundedEntry, SharedEntry, SharedVolatileEntry, VolatileEntry,
};
pub use pooled::Poolable;
pub use unbounded::{Config, UnboundedPool};
pub use volatile::VolatilePool;
