/// A type that can live in one of this crate's pools.
///
/// The pool calls [`make`](Poolable::make) only when it has to construct a
/// fresh instance: the first time a slot is handed out, and for every
/// overflow acquire on the unbounded pools. A cached instance is returned
/// as-is and `make` is *not* run again, so the arguments passed to that
/// `acquire` call are dropped unused.
///
/// A failed construction propagates out of `acquire` and leaves the pool
/// unchanged.
pub trait Poolable: Sized {
    /// Arguments consumed by one construction.
    type Args;

    /// Error returned by a failed construction. Use
    /// [`std::convert::Infallible`] for factories that cannot fail.
    type Error;

    /// Construct a fresh instance.
    fn make(args: Self::Args) -> Result<Self, Self::Error>;
}
