/*!
 * Allocator Limits and Constants
 *
 * Centralized location for defaults, thresholds, and environment variable names.
 */

// =============================================================================
// POOL DEFAULTS
// =============================================================================

/// Default pool capacity (1MB)
/// Used when no capacity is configured
pub const DEFAULT_POOL_CAPACITY: usize = 1024 * 1024;

/// Initial metadata arena capacity
/// Enough block records for typical workloads before the arena has to grow
pub const INITIAL_BLOCK_CAPACITY: usize = 64;

/// Smallest request the allocator accepts
/// Zero-length blocks would share a start address with their successor
pub const MIN_ALLOCATION: usize = 1;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Environment variable overriding the pool capacity in bytes
pub const ENV_POOL_CAPACITY: &str = "POOL_CAPACITY";

/// Environment variable enabling JSON trace output
pub const ENV_TRACE_JSON: &str = "POOL_TRACE_JSON";
