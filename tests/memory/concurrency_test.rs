/*!
 * Concurrency Tests
 * Lock discipline and multi-threaded allocation
 */

use pool_allocator::memory::{MemoryPool, PoolError};
use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `op` on another thread and fail if it does not finish in time
fn assert_lock_released<F>(pool: &Arc<MemoryPool>, op: F)
where
    F: FnOnce(&MemoryPool) + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let pool = Arc::clone(pool);
    thread::spawn(move || {
        op(&pool);
        let _ = tx.send(());
    });
    rx.recv_timeout(LOCK_TIMEOUT)
        .expect("Pool lock was not released after a failed operation");
}

#[test]
fn test_two_threads_allocate_disjoint_blocks() {
    let pool = Arc::new(MemoryPool::with_capacity(2000 * 64));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                (0..1000)
                    .map(|_| pool.allocate(64).expect("Pool should have room"))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut addrs: Vec<usize> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(addrs.len(), 2000);

    let unique: HashSet<_> = addrs.iter().copied().collect();
    assert_eq!(unique.len(), 2000);

    // Every 64-byte extent is disjoint from its neighbour
    addrs.sort_unstable();
    for pair in addrs.windows(2) {
        assert!(pair[0] + 64 <= pair[1]);
    }

    let stats = pool.stats();
    assert_eq!(stats.allocated_blocks, 2000);
    assert_eq!(stats.free_bytes, 0);
    pool.validate().unwrap();
}

#[test]
fn test_concurrent_alloc_free_keeps_invariants() {
    let pool = Arc::new(MemoryPool::with_capacity(64 * 1024));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let mut live = Vec::new();
                for i in 0..500 {
                    let size = 16 + ((t * 31 + i * 7) % 96);
                    if let Some(addr) = pool.allocate(size) {
                        pool.write(addr, 0, &[t as u8; 16]).unwrap();
                        live.push(addr);
                    }
                    if i % 3 == 0 {
                        if let Some(addr) = live.pop() {
                            // Nobody else wrote into our block
                            assert_eq!(pool.read(addr).unwrap()[..16], [t as u8; 16]);
                            pool.free(Some(addr));
                        }
                    }
                }
                live
            })
        })
        .collect();

    let live: Vec<usize> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    pool.validate().unwrap();
    for addr in &live {
        assert!(pool.is_allocated(*addr));
    }
    for addr in live {
        pool.free(Some(addr));
    }
    assert_eq!(pool.stats().used_bytes, 0);
    pool.validate().unwrap();
}

#[test]
fn test_every_failure_branch_releases_lock() {
    let pool = Arc::new(MemoryPool::with_capacity(128));
    let addr = pool.allocate(64).unwrap();

    assert_eq!(pool.try_allocate(0), Err(PoolError::ZeroSize));
    assert_lock_released(&pool, |p| assert!(p.allocate(8).is_some()));

    assert!(matches!(
        pool.try_allocate(1024),
        Err(PoolError::OutOfMemory { .. })
    ));
    assert_lock_released(&pool, |p| {
        p.stats();
    });

    assert_eq!(pool.try_free(None), Err(PoolError::NullPointer));
    assert_eq!(pool.try_free(Some(3)), Err(PoolError::InvalidAddress(3)));
    assert_lock_released(&pool, |p| {
        p.blocks();
    });

    pool.free(Some(addr));
    assert_eq!(pool.try_free(Some(addr)), Err(PoolError::DoubleFree(addr)));
    assert_lock_released(&pool, |p| p.free(None));

    assert_eq!(pool.try_resize(Some(5), 8), Err(PoolError::InvalidAddress(5)));
    assert_eq!(pool.try_resize(Some(addr), 8), Err(PoolError::NotAllocated(addr)));
    let held = pool.allocate(8).unwrap();
    assert!(matches!(
        pool.try_resize(Some(held), 4096),
        Err(PoolError::OutOfMemory { .. })
    ));
    assert_lock_released(&pool, move |p| assert!(p.is_allocated(held)));

    assert_eq!(pool.read(7), Err(PoolError::InvalidAddress(7)));
    assert!(pool.write(held, 7, b"xx").is_err());
    assert_lock_released(&pool, move |p| p.write(held, 0, b"ok").unwrap());

    assert_eq!(pool.init(64), Err(PoolError::AlreadyInitialized));
    assert_lock_released(&pool, |p| p.validate().unwrap());

    pool.deinit();
    assert_eq!(pool.try_allocate(8), Err(PoolError::Uninitialized));
    assert_lock_released(&pool, |p| p.init(32).unwrap());
}

#[test]
fn test_readers_run_alongside_writers() {
    let pool = Arc::new(MemoryPool::with_capacity(32 * 1024));

    let writer = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            for _ in 0..200 {
                let a = pool.allocate(32).unwrap();
                let b = pool.allocate(64).unwrap();
                pool.free(Some(a));
                pool.free(Some(b));
            }
        })
    };

    let reader = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            for _ in 0..200 {
                let stats = pool.stats();
                assert_eq!(stats.used_bytes + stats.free_bytes, stats.capacity);
                pool.validate().unwrap();
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(pool.stats().used_bytes, 0);
}
