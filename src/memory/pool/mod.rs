/*!
 * Memory Pool
 *
 * Fixed-size pool allocator over a single pre-reserved region.
 *
 * ## Allocation Policy
 *
 * - **First-fit**: the block chain is scanned in address order and the first
 *   free block large enough wins
 * - **Splitting**: an oversized block is cut into an allocated prefix of the
 *   requested size and a free remainder linked directly after it
 * - **Forward coalescing**: a freed block absorbs the free blocks that follow
 *   it; a free block in front of it is left alone
 * - **No growth**: the pool never expands, and live allocations never move
 *   except through `resize`
 *
 * ## Concurrency
 *
 * All pool state sits behind one `RwLock`. Allocation, free, resize and the
 * lifecycle calls hold the write lock for the whole operation; stats, block
 * snapshots and reads take the read lock. Guards release on every return path.
 */

mod access;
mod allocator;
mod chain;
mod region;
mod stats;

use super::types::{PoolError, PoolResult};
use crate::core::types::Size;
use chain::BlockChain;
use parking_lot::RwLock;
use region::PoolRegion;
use std::alloc::{handle_alloc_error, Layout};
use tracing::{error, info, instrument, warn};

/// Region plus the chain describing how it is divided
#[derive(Debug)]
pub(super) struct PoolState {
    region: PoolRegion,
    chain: BlockChain,
}

impl PoolState {
    fn reserve(capacity: Size) -> PoolResult<Self> {
        if capacity == 0 {
            return Err(PoolError::InvalidCapacity(capacity));
        }
        let region = PoolRegion::reserve(capacity)?;
        let chain = BlockChain::new(capacity)?;
        Ok(Self { region, chain })
    }
}

/// Fixed-size memory pool
///
/// One instance owns one pool. Share it between threads with `Arc` or plain
/// references; every method takes `&self`.
#[derive(Debug, Default)]
pub struct MemoryPool {
    state: RwLock<Option<PoolState>>,
}

impl MemoryPool {
    /// Create an uninitialized pool; call [`MemoryPool::init`] before use
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }

    /// Create and initialize a pool of `capacity` bytes
    ///
    /// # Panics
    ///
    /// Terminates through the allocation-failure handler when the region
    /// cannot be reserved, and panics on a zero capacity.
    pub fn with_capacity(capacity: Size) -> Self {
        match PoolState::reserve(capacity) {
            Ok(state) => {
                info!(capacity, "Memory pool initialized");
                Self {
                    state: RwLock::new(Some(state)),
                }
            }
            Err(e) => fatal(e),
        }
    }

    /// Create and initialize a pool, reporting reservation failure instead of aborting
    pub fn try_with_capacity(capacity: Size) -> PoolResult<Self> {
        let state = PoolState::reserve(capacity)?;
        info!(capacity, "Memory pool initialized");
        Ok(Self {
            state: RwLock::new(Some(state)),
        })
    }

    /// Initialize the pool with `capacity` bytes
    ///
    /// Fails with [`PoolError::AlreadyInitialized`] if the pool is live.
    /// Reservation failure is fatal, as with [`MemoryPool::with_capacity`].
    pub fn init(&self, capacity: Size) -> PoolResult<()> {
        match self.try_init(capacity) {
            Err(PoolError::AlreadyInitialized) => {
                warn!(capacity, "Pool already initialized, ignoring init");
                Err(PoolError::AlreadyInitialized)
            }
            Err(e) => fatal(e),
            Ok(()) => Ok(()),
        }
    }

    /// Initialize the pool, returning every failure to the caller
    #[instrument(level = "debug", skip(self))]
    pub fn try_init(&self, capacity: Size) -> PoolResult<()> {
        let mut state = self.state.write();
        if state.is_some() {
            return Err(PoolError::AlreadyInitialized);
        }
        *state = Some(PoolState::reserve(capacity)?);
        info!(capacity, "Memory pool initialized");
        Ok(())
    }

    /// Release the region and every block record, allocated or not
    ///
    /// The pool returns to its uninitialized state and may be initialized again.
    pub fn deinit(&self) {
        let mut state = self.state.write();
        match state.take() {
            Some(pool) => info!(
                capacity = pool.region.len(),
                blocks = pool.chain.len(),
                "Memory pool deinitialized"
            ),
            None => warn!("Deinit called on an uninitialized pool"),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    /// Pool capacity in bytes, 0 when uninitialized
    pub fn capacity(&self) -> Size {
        self.state
            .read()
            .as_ref()
            .map_or(0, |pool| pool.chain.capacity())
    }
}

/// Initialization failures the process cannot continue past
fn fatal(err: PoolError) -> ! {
    error!(error = %err, "Memory pool initialization failed");
    if let PoolError::ReservationFailed { requested } = err {
        if let Ok(layout) = Layout::array::<u8>(requested) {
            handle_alloc_error(layout);
        }
    }
    panic!("{}", err)
}
