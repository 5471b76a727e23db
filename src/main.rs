/*!
 * Pool Allocator - Demo Entry Point
 *
 * Drives a pool through allocate, free, resize and deinit:
 * - Pool capacity from POOL_CAPACITY (default 1MB)
 * - JSON trace output with POOL_TRACE_JSON=1
 * - Final statistics printed as JSON on stdout
 */

use std::error::Error;
use tracing::{info, warn};

use pool_allocator::{init_tracing, MemoryPool, PoolConfig};

fn main() -> Result<(), Box<dyn Error>> {
    let config = PoolConfig::from_env()?;
    init_tracing(config.trace_json);

    info!(capacity = config.capacity, "Pool demo starting...");
    let pool = MemoryPool::with_capacity(config.capacity);

    let first = pool.allocate(100);
    let second = pool.allocate(200);
    info!(?first, ?second, "Allocated two blocks");

    pool.free(first);
    let reused = pool.allocate(50);
    info!(?reused, "First-fit reused the freed prefix");

    if let Some(address) = second {
        pool.write(address, 0, b"pool allocator")?;
        match pool.resize(second, 400) {
            Some(moved) => {
                let contents = pool.read(moved)?;
                info!(
                    from = address,
                    to = moved,
                    preserved = %String::from_utf8_lossy(&contents[..14]),
                    "Resized block"
                );
            }
            None => warn!(address, "Resize failed; original block kept"),
        }
    }

    // Misuse is reported, never fatal
    pool.free(None);
    pool.free(reused);
    pool.free(reused);

    pool.validate()?;
    let stats = pool.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    info!(
        fragmentation = stats.fragmentation(),
        usage = stats.usage_percentage(),
        "Pool demo complete"
    );

    pool.deinit();
    Ok(())
}
