/*!
 * Memory Module
 * Fixed-size pool allocation
 */

pub mod pool;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use pool::MemoryPool;
pub use traits::*;
pub use types::*;
