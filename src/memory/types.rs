/*!
 * Memory Types
 * Common types for pool management
 */

use crate::core::types::{Address, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pool operation result
pub type PoolResult<T> = Result<T, PoolError>;

/// Pool errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum PoolError {
    #[error("Pool is not initialized")]
    #[diagnostic(
        code(pool::uninitialized),
        help("Call init() or construct the pool with with_capacity() first.")
    )]
    Uninitialized,

    #[error("Pool is already initialized")]
    #[diagnostic(
        code(pool::already_initialized),
        help("Call deinit() before initializing the pool again.")
    )]
    AlreadyInitialized,

    #[error("Invalid pool capacity: {0} bytes")]
    #[diagnostic(code(pool::invalid_capacity), help("Pool capacity must be non-zero."))]
    InvalidCapacity(Size),

    #[error("Failed to reserve {requested} bytes for the pool region")]
    #[diagnostic(
        code(pool::reservation_failed),
        help("The host allocator could not supply the pool. Reduce the capacity.")
    )]
    ReservationFailed { requested: Size },

    #[error("Zero-sized allocation requested")]
    #[diagnostic(code(pool::zero_size), help("Request at least one byte."))]
    ZeroSize,

    #[error("Out of memory: requested {requested} bytes, largest free block {largest_free} bytes ({free} bytes free)")]
    #[diagnostic(
        code(pool::out_of_memory),
        help("No single free block is large enough. Free adjacent blocks to allow coalescing.")
    )]
    OutOfMemory {
        requested: Size,
        largest_free: Size,
        free: Size,
    },

    #[error("Block metadata allocation failed while splitting block at 0x{0:x}")]
    #[diagnostic(
        code(pool::metadata_exhausted),
        help("The host allocator could not grow the block metadata arena.")
    )]
    MetadataExhausted(Address),

    #[error("Attempted to free a null pointer")]
    #[diagnostic(code(pool::null_pointer))]
    NullPointer,

    #[error("Pointer 0x{0:x} not found in the memory pool")]
    #[diagnostic(
        code(pool::invalid_address),
        help("Only addresses returned by allocate() or resize() may be passed back.")
    )]
    InvalidAddress(Address),

    #[error("Attempted to free an already freed block at 0x{0:x}")]
    #[diagnostic(code(pool::double_free))]
    DoubleFree(Address),

    #[error("Block at 0x{0:x} is not allocated")]
    #[diagnostic(code(pool::not_allocated))]
    NotAllocated(Address),

    #[error("Access out of bounds: {len} bytes at offset {offset} of {size}-byte block 0x{address:x}")]
    #[diagnostic(code(pool::out_of_bounds))]
    OutOfBounds {
        address: Address,
        offset: Size,
        len: Size,
        size: Size,
    },

    #[error("Block chain corruption detected: {0}")]
    #[diagnostic(code(pool::corruption_detected))]
    CorruptionDetected(String),
}

impl PoolError {
    /// Caller misuse rather than an exhausted pool
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            PoolError::Uninitialized
                | PoolError::AlreadyInitialized
                | PoolError::NullPointer
                | PoolError::InvalidAddress(_)
                | PoolError::DoubleFree(_)
                | PoolError::NotAllocated(_)
                | PoolError::OutOfBounds { .. }
        )
    }
}

/// Snapshot of one block in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub address: Address,
    pub size: Size,
    pub free: bool,
}

impl BlockInfo {
    /// One past the last byte of the block
    pub fn end(&self) -> Address {
        self.address + self.size
    }

    pub fn is_allocated(&self) -> bool {
        !self.free
    }
}

/// Pool statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub capacity: Size,
    pub used_bytes: Size,
    pub free_bytes: Size,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
}

impl PoolStats {
    /// Stats reported by an uninitialized pool
    pub fn empty() -> Self {
        Self {
            capacity: 0,
            used_bytes: 0,
            free_bytes: 0,
            allocated_blocks: 0,
            free_blocks: 0,
            largest_free_block: 0,
        }
    }

    pub fn usage_percentage(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.capacity as f64) * 100.0
    }

    /// 0.0 when all free space is one block, approaching 1.0 as it scatters
    pub fn fragmentation(&self) -> f64 {
        if self.free_bytes == 0 {
            return 0.0;
        }
        1.0 - (self.largest_free_block as f64 / self.free_bytes as f64)
    }
}
