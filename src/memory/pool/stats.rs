/*!
 * Pool Introspection
 * Statistics, block snapshots and invariant checks
 */

use super::super::types::{BlockInfo, PoolError, PoolResult, PoolStats};
use super::MemoryPool;
use crate::core::types::{Address, Size};

impl MemoryPool {
    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let state = self.state.read();
        let Some(pool) = state.as_ref() else {
            return PoolStats::empty();
        };

        let mut stats = PoolStats::empty();
        stats.capacity = pool.chain.capacity();
        for (_, block) in pool.chain.iter() {
            if block.free {
                stats.free_bytes += block.size;
                stats.free_blocks += 1;
                stats.largest_free_block = stats.largest_free_block.max(block.size);
            } else {
                stats.used_bytes += block.size;
                stats.allocated_blocks += 1;
            }
        }
        stats
    }

    /// Blocks in chain (address) order; empty when uninitialized
    pub fn blocks(&self) -> Vec<BlockInfo> {
        self.state
            .read()
            .as_ref()
            .map(|pool| pool.chain.snapshot())
            .unwrap_or_default()
    }

    /// Size of the block starting at `address`, free or allocated
    pub fn block_size(&self, address: Address) -> Option<Size> {
        let state = self.state.read();
        let pool = state.as_ref()?;
        let id = pool.chain.lookup(address)?;
        Some(pool.chain.block(id).size)
    }

    /// Check if `address` is the start of an allocated block
    pub fn is_allocated(&self, address: Address) -> bool {
        let state = self.state.read();
        state
            .as_ref()
            .and_then(|pool| pool.chain.lookup(address).map(|id| pool.chain.block(id)))
            .map_or(false, |block| !block.free)
    }

    /// Verify that the blocks tile the pool exactly and the address index agrees
    pub fn validate(&self) -> PoolResult<()> {
        let state = self.state.read();
        let pool = state.as_ref().ok_or(PoolError::Uninitialized)?;
        if pool.region.len() != pool.chain.capacity() {
            return Err(PoolError::CorruptionDetected(format!(
                "region is {} bytes, chain covers {}",
                pool.region.len(),
                pool.chain.capacity()
            )));
        }
        pool.chain.validate()
    }
}
