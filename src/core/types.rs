/*!
 * Core Types
 * Common types used across the allocator
 */

/// Pool-relative address handed to callers
///
/// An address is the byte offset of a block's start within the pool. It is
/// only meaningful for the pool that issued it.
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Index of a block record inside the metadata arena
pub type BlockId = usize;
