/*!
 * Property Tests
 * Block chain invariants over random operation sequences
 */

use pool_allocator::memory::{BlockInfo, MemoryPool};
use proptest::prelude::*;

const CAPACITY: usize = 4096;

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize),
    Free(usize),
    Resize(usize, usize),
    FreeForeign(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1usize..512).prop_map(Op::Allocate),
        3 => any::<usize>().prop_map(Op::Free),
        2 => (any::<usize>(), 1usize..768).prop_map(|(i, s)| Op::Resize(i, s)),
        1 => (0usize..CAPACITY * 2).prop_map(Op::FreeForeign),
    ]
}

fn assert_coverage(blocks: &[BlockInfo]) {
    let mut expected = 0;
    for block in blocks {
        assert_eq!(block.address, expected, "gap or overlap at {:?}", block);
        assert!(block.size > 0);
        expected = block.end();
    }
    assert_eq!(expected, CAPACITY);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_chain_covers_pool(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let pool = MemoryPool::with_capacity(CAPACITY);
        // (address, size, fill byte) for each live allocation
        let mut live: Vec<(usize, usize, u8)> = Vec::new();

        for (step, op) in ops.into_iter().enumerate() {
            let tag = step as u8;
            match op {
                Op::Allocate(size) => {
                    if let Some(addr) = pool.allocate(size) {
                        pool.write(addr, 0, &vec![tag; size]).unwrap();
                        live.push((addr, size, tag));
                    }
                }
                Op::Free(i) if !live.is_empty() => {
                    let (addr, _, _) = live.swap_remove(i % live.len());
                    pool.free(Some(addr));
                }
                Op::Resize(i, new_size) if !live.is_empty() => {
                    let idx = i % live.len();
                    let (addr, size, fill) = live[idx];
                    let old_block = pool.block_size(addr).unwrap();
                    match pool.resize(Some(addr), new_size) {
                        Some(moved) if new_size <= old_block => {
                            prop_assert_eq!(moved, addr);
                        }
                        Some(moved) => {
                            let contents = pool.read(moved).unwrap();
                            prop_assert!(contents[..size].iter().all(|b| *b == fill));
                            live[idx] = (moved, size, fill);
                        }
                        None => prop_assert!(pool.is_allocated(addr)),
                    }
                }
                Op::FreeForeign(addr) => {
                    let blocks_before = pool.blocks();
                    if !live.iter().any(|(a, _, _)| *a == addr) {
                        pool.free(Some(addr));
                        // Freeing an unknown or already-free start never changes the chain
                        prop_assert_eq!(pool.blocks(), blocks_before);
                    }
                }
                _ => {}
            }

            let blocks = pool.blocks();
            assert_coverage(&blocks);
            prop_assert!(pool.validate().is_ok());

            // Live allocations are exactly the allocated blocks, and keep their data
            let allocated: Vec<usize> = blocks
                .iter()
                .filter(|b| b.is_allocated())
                .map(|b| b.address)
                .collect();
            let mut tracked: Vec<usize> = live.iter().map(|(a, _, _)| *a).collect();
            tracked.sort_unstable();
            prop_assert_eq!(allocated, tracked);

            for (addr, size, fill) in &live {
                let contents = pool.read(*addr).unwrap();
                prop_assert!(contents[..*size].iter().all(|b| b == fill));
            }
        }
    }

    #[test]
    fn prop_split_sizes_add_up(first in 1usize..CAPACITY, second in 1usize..CAPACITY) {
        let pool = MemoryPool::with_capacity(CAPACITY);
        let a = pool.allocate(first).unwrap();
        prop_assert_eq!(a, 0);

        let blocks = pool.blocks();
        prop_assert_eq!(blocks[0].size, first);
        prop_assert_eq!(blocks[1].size, CAPACITY - first);

        let b = pool.allocate(second);
        prop_assert_eq!(b.is_some(), second <= CAPACITY - first);
        if let Some(b) = b {
            prop_assert_eq!(b, first);
        }
    }
}
