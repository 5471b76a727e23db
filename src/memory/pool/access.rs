/*!
 * Block Content Access
 * Bounded reads and writes of allocated blocks
 */

use super::super::types::{PoolError, PoolResult};
use super::{MemoryPool, PoolState};
use crate::core::types::{Address, Size};

impl PoolState {
    /// Size of the allocated block starting at `address`
    fn allocated_size(&self, address: Address) -> PoolResult<Size> {
        let id = self
            .chain
            .lookup(address)
            .ok_or(PoolError::InvalidAddress(address))?;
        let block = self.chain.block(id);
        if block.free {
            return Err(PoolError::NotAllocated(address));
        }
        Ok(block.size)
    }
}

impl MemoryPool {
    /// Copy `bytes` into the block at `address`, starting `offset` bytes in
    pub fn write(&self, address: Address, offset: Size, bytes: &[u8]) -> PoolResult<()> {
        self.with_block_mut(address, |block| -> PoolResult<()> {
            let size = block.len();
            let end = offset
                .checked_add(bytes.len())
                .filter(|end| *end <= size)
                .ok_or(PoolError::OutOfBounds {
                    address,
                    offset,
                    len: bytes.len(),
                    size,
                })?;
            block[offset..end].copy_from_slice(bytes);
            Ok(())
        })?
    }

    /// Copy out the full contents of the block at `address`
    pub fn read(&self, address: Address) -> PoolResult<Vec<u8>> {
        self.with_block(address, |block| block.to_vec())
    }

    /// Run `f` over the block's bytes under the shared lock
    ///
    /// # Deadlocks
    ///
    /// `f` runs while the pool lock is held and must not call back into the
    /// pool. The read lock is not recursive, so even `stats` can block once a
    /// writer is queued.
    pub fn with_block<R>(&self, address: Address, f: impl FnOnce(&[u8]) -> R) -> PoolResult<R> {
        let state = self.state.read();
        let pool = state.as_ref().ok_or(PoolError::Uninitialized)?;
        let size = pool.allocated_size(address)?;
        Ok(f(pool.region.slice(address, size)))
    }

    /// Run `f` over the block's bytes under the exclusive lock
    ///
    /// # Deadlocks
    ///
    /// `f` runs while the pool's write lock is held; any call back into the
    /// pool from `f` blocks forever.
    pub fn with_block_mut<R>(
        &self,
        address: Address,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> PoolResult<R> {
        let mut state = self.state.write();
        let pool = state.as_mut().ok_or(PoolError::Uninitialized)?;
        let size = pool.allocated_size(address)?;
        Ok(f(pool.region.slice_mut(address, size)))
    }
}
