use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

use derive_more::{Display, Error};

use crate::alloc::{AllocError, AllocPolicy, CapacityOverflowError, RawArray};
use crate::util::fatal::Fatal;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("every slot of the pool is in use")]
pub struct PoolExhaustedError;
impl Fatal for PoolExhaustedError {}

static NEXT_POOL_ID: AtomicUsize = AtomicUsize::new(0);

/// A handle to a slot handed out by a [`SlotPool`].
///
/// A handle can't be copied, and is consumed when the slot is freed.
#[derive(PartialEq, Eq)]
#[must_use = "a slot is only returned to its pool by freeing it"]
pub struct Slot {
    pool: usize,
    id: usize,
}

impl Slot {
    /// Returns the fixed position of this slot's memory within its pool.
    pub const fn id(&self) -> usize {
        self.id
    }
}

impl Debug for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.id)
    }
}

/// A fixed-capacity pool of equally sized, zero-initialized memory slots.
///
/// All slots live in one allocation made up front which is never moved, so a slot's memory stays
/// put until it is freed. Allocating and freeing are both `O(1)`: the ids of all slots are kept in
/// an order array, of which the first `len` are in use, and every slot records its own position in
/// that array so it can be swapped out of the used part when freed. The order of used slots is not
/// stable.
///
/// The pool isn't synchronized in any way, every mutation requires `&mut self`.
pub struct SlotPool {
    id: usize,
    mem: RawArray<u8>,
    order: RawArray<usize>,
    position: RawArray<usize>,
    slot_size: usize,
    index: usize,
}

impl SlotPool {
    /// Creates a pool of `slot_count` slots of `slot_size` bytes each.
    ///
    /// # Errors
    /// Fails if the total size overflows or an allocation is exhausted, and the policy is
    /// reporting. Nothing stays allocated in that case.
    pub fn new(slot_size: usize, slot_count: usize, policy: AllocPolicy) -> Result<SlotPool, AllocError> {
        let Some(total) = slot_size.checked_mul(slot_count) else {
            return policy.surface(CapacityOverflowError.into());
        };

        let pool = SlotPool {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            mem: RawArray::repeat_item(0, total, policy)?,
            order: RawArray::from_fn(slot_count, policy, |i| i)?,
            position: RawArray::from_fn(slot_count, policy, |i| i)?,
            slot_size,
            index: 0,
        };
        log::debug!("created pool of {} slots of {} bytes", slot_count, slot_size);
        Ok(pool)
    }

    pub const fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Returns the fixed number of slots in the pool.
    pub const fn capacity(&self) -> usize {
        self.order.size()
    }

    /// Returns the number of slots currently in use.
    pub const fn len(&self) -> usize {
        self.index
    }

    pub const fn is_empty(&self) -> bool {
        self.index == 0
    }

    pub const fn is_full(&self) -> bool {
        self.index == self.capacity()
    }

    /// Hands out a free slot. The pool never grows.
    ///
    /// Exhaustion isn't retried: a pool created with a strict policy terminates the process as
    /// soon as it runs out of slots.
    ///
    /// # Errors
    /// Fails if every slot is in use and the pool's policy is reporting.
    pub fn allocate(&mut self) -> Result<Slot, PoolExhaustedError> {
        if self.is_full() {
            log::debug!("pool of {} slots exhausted", self.capacity());
            return self.mem.policy().surface(PoolExhaustedError);
        }

        let id = self.order[self.index];
        self.position[id] = self.index;
        self.index += 1;
        Ok(Slot { pool: self.id, id })
    }

    /// Returns `slot` to the pool, making its memory available to the next allocation.
    ///
    /// # Panics
    /// In debug builds, panics if `slot` was handed out by a different pool.
    pub fn free(&mut self, slot: Slot) {
        let pos = self.position[self.check(&slot)];
        debug_assert!(
            pos < self.index && self.order[pos] == slot.id,
            "freeing slot {} which isn't in use",
            slot.id
        );

        self.index -= 1;
        let moved = self.order[self.index];
        self.order.swap(pos, self.index);
        self.position[moved] = pos;
        self.position[slot.id] = self.index;
    }

    /// Returns the memory of `slot`.
    ///
    /// # Panics
    /// In debug builds, panics if `slot` was handed out by a different pool.
    pub fn get(&self, slot: &Slot) -> &[u8] {
        let start = self.check(slot) * self.slot_size;
        &self.mem[start..start + self.slot_size]
    }

    /// Returns the memory of `slot` mutably.
    ///
    /// # Panics
    /// In debug builds, panics if `slot` was handed out by a different pool.
    pub fn get_mut(&mut self, slot: &Slot) -> &mut [u8] {
        let start = self.check(slot) * self.slot_size;
        &mut self.mem[start..start + self.slot_size]
    }

    fn check(&self, slot: &Slot) -> usize {
        debug_assert_eq!(slot.pool, self.id, "slot {} belongs to a different pool", slot.id);
        slot.id
    }
}

impl Debug for SlotPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotPool")
            .field("slot_size", &self.slot_size)
            .field("len", &self.index)
            .field("capacity", &self.capacity())
            .finish()
    }
}
