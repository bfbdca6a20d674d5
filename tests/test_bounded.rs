use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

use object_pool::{BoundedPool, Poolable};

struct Parser {
    id: u32,
}

impl Poolable for Parser {
    type Args = u32;
    type Error = Infallible;

    fn make(id: u32) -> Result<Self, Infallible> {
        Ok(Self { id })
    }
}

static SLOW_BUILDS: AtomicUsize = AtomicUsize::new(0);

struct SlowParser {
    id: u32,
}

impl Poolable for SlowParser {
    type Args = u32;
    type Error = Infallible;

    fn make(id: u32) -> Result<Self, Infallible> {
        SLOW_BUILDS.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        Ok(Self { id })
    }
}

struct Flaky {
    ok: bool,
}

impl Poolable for Flaky {
    type Args = bool;
    type Error = &'static str;

    fn make(ok: bool) -> Result<Self, &'static str> {
        if ok {
            Ok(Self { ok })
        } else {
            Err("construction refused")
        }
    }
}

#[test]
fn capacity_and_in_use() {
    let pool = BoundedPool::<Parser>::new(3);
    assert_eq!(pool.capacity(), 3);
    assert_eq!(pool.in_use(), 0);

    let entry = pool.acquire(1).unwrap();
    assert_eq!(pool.in_use(), 1);
    drop(entry);
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn caps_total_number_of_instances() {
    const THREADS: usize = 16;
    let pool = Arc::new(BoundedPool::<SlowParser>::new(2));
    let barrier = Arc::new(Barrier::new(THREADS));

    let mut workers = Vec::new();
    for i in 0..THREADS {
        let pool = Arc::clone(&pool);
        let barrier = Arc::clone(&barrier);
        workers.push(thread::spawn(move || {
            barrier.wait();
            if i % 2 == 0 {
                let entry = pool.acquire(i as u32).unwrap();
                assert!(entry.get().is_some());
            } else {
                let shared = pool.acquire(i as u32).unwrap().into_shared();
                assert!(shared.get().is_some());
            }
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }

    assert!(SLOW_BUILDS.load(Ordering::SeqCst) <= 2);
}

#[test]
fn blocks_when_full() {
    let pool = Arc::new(BoundedPool::<Parser>::new(1));
    let mut first = pool.acquire(1).unwrap();

    let (tx, rx) = mpsc::channel();
    let waiter = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            let entry = pool.acquire(2).unwrap();
            tx.send(entry.id).unwrap();
        })
    };

    // The pool is full, so the second acquire must still be parked.
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

    first.reset();
    // The waiter lands on the released slot and sees its cached value.
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    waiter.join().unwrap();
}

#[test]
fn reuses_first_instance() {
    let pool = BoundedPool::<Parser>::new(1);
    let mut entry = pool.acquire(1).unwrap();
    let first: *const Parser = entry.get().unwrap();
    assert_eq!(entry.id, 1);

    entry.reset();
    assert!(entry.get().is_none());

    let shared = pool.acquire(2).unwrap().into_shared();
    assert_eq!(shared.id, 1);
    assert!(std::ptr::eq(first, shared.get().unwrap()));
}

#[test]
fn shared_visit_runs_with_outstanding_borrow() {
    let pool = Arc::new(BoundedPool::<Parser>::new(1));
    let entry = pool.acquire(1).unwrap();

    let (tx, rx) = mpsc::channel();
    let visitor = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            let mut seen = 0;
            pool.visit(
                |parser| {
                    seen += parser.id;
                    true
                },
                true,
            );
            tx.send(seen).unwrap();
        })
    };

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    visitor.join().unwrap();
    drop(entry);
}

#[test]
fn exclusive_visit_waits_for_release() {
    let pool = Arc::new(BoundedPool::<Parser>::new(1));
    let mut entry = pool.acquire(7).unwrap();

    let (tx, rx) = mpsc::channel();
    let visitor = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            let mut seen = Vec::new();
            pool.visit(
                |parser| {
                    seen.push(parser.id);
                    true
                },
                false,
            );
            tx.send(seen).unwrap();
        })
    };

    // The borrow is outstanding, so the exclusive pass must still be parked.
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

    entry.reset();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), vec![7]);
    visitor.join().unwrap();
}

#[test]
fn visitor_can_stop_early() {
    let pool = BoundedPool::<Parser>::new(3);
    let a = pool.acquire(1).unwrap();
    let b = pool.acquire(2).unwrap();
    let c = pool.acquire(3).unwrap();
    drop(a);
    drop(b);
    drop(c);

    let mut seen = 0;
    pool.visit(
        |_| {
            seen += 1;
            false
        },
        false,
    );
    assert_eq!(seen, 1);
}

#[test]
fn factory_error_releases_the_permit() {
    let pool = BoundedPool::<Flaky>::new(1);
    assert!(pool.acquire(false).is_err());
    assert_eq!(pool.in_use(), 0);

    // The permit went back, so this acquire must not block.
    let entry = pool.acquire(true).unwrap();
    assert!(entry.ok);
}

#[test]
fn reset_twice_is_a_no_op() {
    let pool = BoundedPool::<Parser>::new(1);
    let mut entry = pool.acquire(1).unwrap();
    entry.reset();
    entry.reset();
    assert!(entry.get().is_none());
    assert_eq!(pool.in_use(), 0);
}

#[test]
fn move_preserves_the_instance() {
    let pool = BoundedPool::<Parser>::new(1);
    let entry = pool.acquire(5).unwrap();
    let before: *const Parser = entry.get().unwrap();

    let moved = entry;
    assert!(std::ptr::eq(before, moved.get().unwrap()));
    assert_eq!(moved.id, 5);
}
