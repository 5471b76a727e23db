/*!
 * Memory Traits
 * Pool allocator abstractions
 */

use super::pool::MemoryPool;
use super::types::*;
use crate::core::types::{Address, Size};

/// Allocate/free/resize service over a fixed pool
pub trait Allocator: Send + Sync {
    /// Allocate `size` bytes
    fn try_allocate(&self, size: Size) -> PoolResult<Address>;

    /// Free the block starting at `address`
    fn try_free(&self, address: Option<Address>) -> PoolResult<()>;

    /// Grow a block, moving it if needed
    fn try_resize(&self, address: Option<Address>, new_size: Size) -> PoolResult<Address>;

    /// Allocate, `None` on failure
    fn allocate(&self, size: Size) -> Option<Address>;

    /// Free, ignoring misuse
    fn free(&self, address: Option<Address>);

    /// Resize, `None` on failure
    fn resize(&self, address: Option<Address>, new_size: Size) -> Option<Address>;

    /// Tear down the pool
    fn deinit(&self);
}

/// Pool introspection
pub trait PoolInfo: Send + Sync {
    fn stats(&self) -> PoolStats;

    fn blocks(&self) -> Vec<BlockInfo>;

    fn validate(&self) -> PoolResult<()>;

    /// Bytes in free blocks
    fn available(&self) -> Size {
        self.stats().free_bytes
    }
}

impl Allocator for MemoryPool {
    fn try_allocate(&self, size: Size) -> PoolResult<Address> {
        MemoryPool::try_allocate(self, size)
    }

    fn try_free(&self, address: Option<Address>) -> PoolResult<()> {
        MemoryPool::try_free(self, address)
    }

    fn try_resize(&self, address: Option<Address>, new_size: Size) -> PoolResult<Address> {
        MemoryPool::try_resize(self, address, new_size)
    }

    fn allocate(&self, size: Size) -> Option<Address> {
        MemoryPool::allocate(self, size)
    }

    fn free(&self, address: Option<Address>) {
        MemoryPool::free(self, address)
    }

    fn resize(&self, address: Option<Address>, new_size: Size) -> Option<Address> {
        MemoryPool::resize(self, address, new_size)
    }

    fn deinit(&self) {
        MemoryPool::deinit(self)
    }
}

impl PoolInfo for MemoryPool {
    fn stats(&self) -> PoolStats {
        MemoryPool::stats(self)
    }

    fn blocks(&self) -> Vec<BlockInfo> {
        MemoryPool::blocks(self)
    }

    fn validate(&self) -> PoolResult<()> {
        MemoryPool::validate(self)
    }
}
