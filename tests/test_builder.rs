use std::convert::Infallible;

use object_pool::{Builder, Poolable};

struct PageBuffer {
    bytes: Vec<u8>,
}

impl Poolable for PageBuffer {
    type Args = usize;
    type Error = Infallible;

    fn make(len: usize) -> Result<Self, Infallible> {
        Ok(Self { bytes: vec![0; len] })
    }
}

#[test]
fn builds_an_unbounded_pool() {
    let mut builder = Builder::<PageBuffer>::new();
    let pool = builder.capacity(10).build();
    assert_eq!(pool.size(), 10);
    assert_eq!(pool.idle(), 10);
}

#[test]
fn builds_a_volatile_pool() {
    let mut builder = Builder::<PageBuffer>::new();
    let pool = builder.capacity(4).build_volatile();
    assert_eq!(pool.size(), 4);
    assert_eq!(pool.generation_size(), 0);
}

#[test]
fn reset_func_wipes_recycled_instances() {
    fn wipe(buffer: &mut PageBuffer) {
        buffer.bytes.clear();
    }

    let mut builder = Builder::<PageBuffer>::new();
    let pool = builder.capacity(1).reset_func(wipe).build();

    let mut entry = pool.acquire(3).unwrap();
    assert_eq!(entry.bytes.len(), 3);
    if let Some(buffer) = entry.get_mut() {
        buffer.bytes.extend_from_slice(&[1, 2, 3]);
    }
    entry.reset();

    // Reused without re-running the factory, but wiped by the hook.
    let entry = pool.acquire(100).unwrap();
    assert!(entry.bytes.is_empty());
}

#[test]
fn volatile_reset_func_wipes_recycled_instances() {
    fn wipe(buffer: &mut PageBuffer) {
        buffer.bytes.clear();
    }

    let mut builder = Builder::<PageBuffer>::new();
    let pool = builder.capacity(1).reset_func(wipe).build_volatile();

    let mut entry = pool.acquire(2).unwrap();
    assert_eq!(entry.bytes.len(), 2);
    entry.reset();
    assert_eq!(pool.generation_size(), 1);

    let entry = pool.acquire(100).unwrap();
    assert!(entry.bytes.is_empty());
    assert_eq!(pool.generation_size(), 1);
}
