/*!
 * Pool Allocator Library
 * Fixed-size memory pool with first-fit allocation, splitting and forward coalescing
 */

pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::{Address, ConfigError, PoolConfig, Size};
pub use memory::{Allocator, BlockInfo, MemoryPool, PoolError, PoolInfo, PoolResult, PoolStats};
pub use monitoring::init_tracing;
