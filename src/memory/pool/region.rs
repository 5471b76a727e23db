/*!
 * Pool Region
 * The contiguous byte range carved up by the block chain
 */

use super::super::types::{PoolError, PoolResult};
use crate::core::types::{Address, Size};
use std::fmt;

/// Backing storage for the pool, reserved once at initialization
pub(super) struct PoolRegion {
    bytes: Box<[u8]>,
}

impl fmt::Debug for PoolRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegion")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PoolRegion {
    /// Reserve `capacity` bytes from the host allocator without aborting on failure
    pub fn reserve(capacity: Size) -> PoolResult<Self> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| PoolError::ReservationFailed {
                requested: capacity,
            })?;
        bytes.resize(capacity, 0);
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    pub fn len(&self) -> Size {
        self.bytes.len()
    }

    #[inline]
    pub fn slice(&self, address: Address, len: Size) -> &[u8] {
        &self.bytes[address..address + len]
    }

    #[inline]
    pub fn slice_mut(&mut self, address: Address, len: Size) -> &mut [u8] {
        &mut self.bytes[address..address + len]
    }

    /// Copy `len` bytes between two non-overlapping extents
    pub fn copy(&mut self, from: Address, to: Address, len: Size) {
        self.bytes.copy_within(from..from + len, to);
    }
}
