/*!
 * Block Chain
 * Arena-backed singly linked chain of block metadata
 */

use super::super::types::{BlockInfo, PoolError, PoolResult};
use crate::core::limits::{INITIAL_BLOCK_CAPACITY, MIN_ALLOCATION};
use crate::core::types::{Address, BlockId, Size};
use ahash::RandomState;
use std::collections::HashMap;

/// Metadata for one contiguous extent of the pool
#[derive(Debug, Clone)]
pub(super) struct Block {
    pub address: Address,
    pub size: Size,
    pub free: bool,
    /// Next block in address order
    pub next: Option<BlockId>,
}

impl Block {
    fn info(&self) -> BlockInfo {
        BlockInfo {
            address: self.address,
            size: self.size,
            free: self.free,
        }
    }
}

/// Block records covering the pool from offset 0 to `capacity`
///
/// Records live in `slots`; `next` links are slot indices. Slots released by
/// coalescing go on `vacant` and are reused by later splits. `index` maps each
/// live block's start address to its slot.
#[derive(Debug)]
pub(super) struct BlockChain {
    slots: Vec<Block>,
    vacant: Vec<BlockId>,
    head: BlockId,
    index: HashMap<Address, BlockId, RandomState>,
    capacity: Size,
}

impl BlockChain {
    /// One free block spanning the whole pool
    pub fn new(capacity: Size) -> PoolResult<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve(INITIAL_BLOCK_CAPACITY)
            .map_err(|_| PoolError::ReservationFailed {
                requested: capacity,
            })?;
        slots.push(Block {
            address: 0,
            size: capacity,
            free: true,
            next: None,
        });

        let mut index = HashMap::with_hasher(RandomState::new());
        index
            .try_reserve(INITIAL_BLOCK_CAPACITY)
            .map_err(|_| PoolError::ReservationFailed {
                requested: capacity,
            })?;
        index.insert(0, 0);

        Ok(Self {
            slots,
            vacant: Vec::new(),
            head: 0,
            index,
            capacity,
        })
    }

    pub fn capacity(&self) -> Size {
        self.capacity
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.slots[id]
    }

    /// Slot of the block starting exactly at `address`
    pub fn lookup(&self, address: Address) -> Option<BlockId> {
        self.index.get(&address).copied()
    }

    /// Blocks in chain order
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            cursor: Some(self.head),
        }
    }

    /// First free block (in address order) of at least `size` bytes
    pub fn find_first_fit(&self, size: Size) -> Option<BlockId> {
        self.iter()
            .find(|(_, block)| block.free && block.size >= size)
            .map(|(id, _)| id)
    }

    /// First-fit allocation, splitting the chosen block when it is larger than `size`
    pub fn allocate(&mut self, size: Size) -> PoolResult<Address> {
        if size < MIN_ALLOCATION {
            return Err(PoolError::ZeroSize);
        }

        let id = match self.find_first_fit(size) {
            Some(id) => id,
            None => {
                let (free, largest_free) = self.free_totals();
                return Err(PoolError::OutOfMemory {
                    requested: size,
                    largest_free,
                    free,
                });
            }
        };

        if self.slots[id].size > size {
            self.split(id, size)?;
        }

        let block = &mut self.slots[id];
        block.free = false;
        Ok(block.address)
    }

    /// Cut `id` down to `size` bytes and link a free remainder directly after it
    ///
    /// Metadata storage is reserved before the chain is touched, so a failed
    /// reservation leaves the block exactly as it was.
    fn split(&mut self, id: BlockId, size: Size) -> PoolResult<()> {
        self.reserve_metadata(self.slots[id].address)?;

        let block = &self.slots[id];
        let remainder = Block {
            address: block.address + size,
            size: block.size - size,
            free: true,
            next: block.next,
        };
        let remainder_address = remainder.address;

        let remainder_id = match self.vacant.pop() {
            Some(slot) => {
                self.slots[slot] = remainder;
                slot
            }
            None => {
                self.slots.push(remainder);
                self.slots.len() - 1
            }
        };
        self.index.insert(remainder_address, remainder_id);

        let block = &mut self.slots[id];
        block.size = size;
        block.next = Some(remainder_id);
        Ok(())
    }

    /// Room for one more record in `slots` (unless a vacant slot exists) and in `index`
    fn reserve_metadata(&mut self, address: Address) -> PoolResult<()> {
        if metadata_fault() {
            return Err(PoolError::MetadataExhausted(address));
        }
        if self.vacant.is_empty() {
            self.slots
                .try_reserve(1)
                .map_err(|_| PoolError::MetadataExhausted(address))?;
        }
        self.index
            .try_reserve(1)
            .map_err(|_| PoolError::MetadataExhausted(address))?;
        Ok(())
    }

    /// Mark the block at `address` free and merge it with the free blocks after it
    ///
    /// Returns the size of the resulting free block.
    pub fn free(&mut self, address: Address) -> PoolResult<Size> {
        let id = self
            .lookup(address)
            .ok_or(PoolError::InvalidAddress(address))?;
        if self.slots[id].free {
            return Err(PoolError::DoubleFree(address));
        }

        self.slots[id].free = true;
        self.coalesce_forward(id);
        Ok(self.slots[id].size)
    }

    /// Absorb following free neighbours into `id`. Preceding blocks are never merged.
    fn coalesce_forward(&mut self, id: BlockId) {
        while let Some(next_id) = self.slots[id].next {
            let next = &self.slots[next_id];
            if !next.free {
                break;
            }
            let (next_address, next_size, next_next) = (next.address, next.size, next.next);

            let block = &mut self.slots[id];
            block.size += next_size;
            block.next = next_next;

            self.index.remove(&next_address);
            self.vacant.push(next_id);
        }
    }

    /// (total free bytes, largest free block)
    pub fn free_totals(&self) -> (Size, Size) {
        self.iter()
            .filter(|(_, block)| block.free)
            .fold((0, 0), |(total, largest), (_, block)| {
                (total + block.size, largest.max(block.size))
            })
    }

    pub fn snapshot(&self) -> Vec<BlockInfo> {
        self.iter().map(|(_, block)| block.info()).collect()
    }

    /// Number of live block records
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check the coverage invariant and index consistency
    pub fn validate(&self) -> PoolResult<()> {
        let corrupt = |msg: String| Err(PoolError::CorruptionDetected(msg));

        let mut expected = 0;
        let mut count = 0;
        for (id, block) in self.iter() {
            count += 1;
            if count > self.slots.len() {
                return corrupt("chain contains a cycle".to_string());
            }
            if block.address != expected {
                return corrupt(format!(
                    "block {} starts at 0x{:x}, expected 0x{:x}",
                    id, block.address, expected
                ));
            }
            if block.size == 0 {
                return corrupt(format!("block {} at 0x{:x} is empty", id, block.address));
            }
            if self.index.get(&block.address) != Some(&id) {
                return corrupt(format!(
                    "index does not map 0x{:x} to block {}",
                    block.address, id
                ));
            }
            expected += block.size;
        }

        if expected != self.capacity {
            return corrupt(format!(
                "blocks cover {} bytes of a {}-byte pool",
                expected, self.capacity
            ));
        }
        if self.index.len() != count {
            return corrupt(format!(
                "index tracks {} blocks, chain has {}",
                self.index.len(),
                count
            ));
        }
        Ok(())
    }
}

/// Iterator over `(slot, block)` pairs in chain order
pub(super) struct ChainIter<'a> {
    chain: &'a BlockChain,
    cursor: Option<BlockId>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (BlockId, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let block = &self.chain.slots[id];
        self.cursor = block.next;
        Some((id, block))
    }
}

#[cfg(not(test))]
fn metadata_fault() -> bool {
    false
}

#[cfg(test)]
thread_local! {
    static METADATA_FAULT: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

#[cfg(test)]
fn metadata_fault() -> bool {
    METADATA_FAULT.with(|fault| fault.get())
}

/// Make metadata reservation fail on the current thread
#[cfg(test)]
pub(super) fn set_metadata_fault(on: bool) {
    METADATA_FAULT.with(|fault| fault.set(on));
}
