/*!
 * Pool Allocator Implementation
 * Allocation, deallocation and resize logic
 */

use super::super::types::{PoolError, PoolResult};
use super::{MemoryPool, PoolState};
use crate::core::types::{Address, Size};
use tracing::{debug, instrument, trace, warn};

impl PoolState {
    fn resize(&mut self, address: Address, new_size: Size) -> PoolResult<Address> {
        let id = self
            .chain
            .lookup(address)
            .ok_or(PoolError::InvalidAddress(address))?;
        let block = self.chain.block(id);
        if block.free {
            return Err(PoolError::NotAllocated(address));
        }

        let old_size = block.size;
        if old_size >= new_size {
            return Ok(address);
        }

        // The old block stays allocated until the copy is done, so the new
        // block cannot overlap it.
        let new_address = self.chain.allocate(new_size)?;
        self.region.copy(address, new_address, old_size);
        self.chain.free(address)?;

        debug!(
            from = address,
            to = new_address,
            old_size,
            new_size,
            "Moved block to satisfy resize"
        );
        Ok(new_address)
    }
}

impl MemoryPool {
    /// Allocate `size` bytes, returning the block's pool address
    ///
    /// Contents of the returned block are unspecified.
    pub fn try_allocate(&self, size: Size) -> PoolResult<Address> {
        let mut state = self.state.write();
        let pool = state.as_mut().ok_or(PoolError::Uninitialized)?;
        let address = pool.chain.allocate(size)?;
        trace!(address, size, "Allocated block");
        Ok(address)
    }

    /// Allocate `size` bytes; `None` when no free block is large enough
    pub fn allocate(&self, size: Size) -> Option<Address> {
        report("allocate", self.try_allocate(size))
    }

    /// Return the block starting at `address` to the pool
    pub fn try_free(&self, address: Option<Address>) -> PoolResult<()> {
        let address = address.ok_or(PoolError::NullPointer)?;
        let mut state = self.state.write();
        let pool = state.as_mut().ok_or(PoolError::Uninitialized)?;
        let merged_size = pool.chain.free(address)?;
        trace!(address, merged_size, "Freed block");
        Ok(())
    }

    /// Free a block; misuse (null, double free, unknown address) is logged and ignored
    pub fn free(&self, address: Option<Address>) {
        report("free", self.try_free(address));
    }

    /// Grow the block at `address` to at least `new_size` bytes
    ///
    /// - `None` behaves as `try_allocate(new_size)`
    /// - A block already large enough is returned unchanged; blocks never shrink
    /// - Otherwise the contents move to a new block and the old one is freed.
    ///   If no block fits, the old block is left untouched.
    /// - A block that is currently free is rejected with
    ///   [`PoolError::NotAllocated`] rather than being resized in place or moved
    #[instrument(level = "trace", skip(self))]
    pub fn try_resize(&self, address: Option<Address>, new_size: Size) -> PoolResult<Address> {
        let mut state = self.state.write();
        let pool = state.as_mut().ok_or(PoolError::Uninitialized)?;
        match address {
            None => pool.chain.allocate(new_size),
            Some(address) => pool.resize(address, new_size),
        }
    }

    /// Resize a block; `None` on failure, in which case the old block is still valid
    pub fn resize(&self, address: Option<Address>, new_size: Size) -> Option<Address> {
        report("resize", self.try_resize(address, new_size))
    }
}

/// Resolve a pool result at the public boundary
///
/// Misuse is logged as a warning, plain allocation failure at debug level.
fn report<T>(operation: &'static str, result: PoolResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_misuse() => {
            warn!(operation, error = %err, "Ignoring invalid pool operation");
            None
        }
        Err(err) => {
            debug!(operation, error = %err, "Pool request failed");
            None
        }
    }
}
