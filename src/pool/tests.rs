#![cfg(test)]

use std::collections::HashSet;

use super::*;
use crate::alloc::{AllocError, AllocPolicy, CapacityOverflowError};
#[allow(unused_imports)]
use crate::util::panic::assert_panics;
use crate::util::alloc::LimitedAlloc;

#[test]
fn test_allocate_until_exhausted() {
    let mut pool = SlotPool::new(16, 4, AllocPolicy::reporting()).expect("allocation should succeed");
    assert!(pool.is_empty());
    assert_eq!(pool.capacity(), 4);

    let slots: Vec<Slot> = (0..4)
        .map(|_| pool.allocate().expect("a free slot should be available"))
        .collect();
    assert!(pool.is_full());
    assert_eq!(pool.allocate(), Err(PoolExhaustedError), "The pool should never grow.");

    let ids: HashSet<usize> = slots.iter().map(Slot::id).collect();
    assert_eq!(ids.len(), 4, "Every slot should be distinct.");

    let mut slots = slots;
    let freed = slots.swap_remove(1);
    let freed_id = freed.id();
    pool.free(freed);
    assert_eq!(pool.len(), 3);

    let again = pool.allocate().expect("a freed slot should be reusable");
    assert_eq!(again.id(), freed_id, "The only free slot should be handed out again.");
    assert!(pool.is_full());
}

#[test]
fn test_slot_memory_is_stable() {
    let mut pool = SlotPool::new(8, 8, AllocPolicy::reporting()).expect("allocation should succeed");

    let mut slots = Vec::new();
    for i in 0..8_u8 {
        let slot = pool.allocate().expect("a free slot should be available");
        assert_eq!(pool.get(&slot), [0; 8], "Slots should start zeroed.");
        pool.get_mut(&slot).fill(i);
        slots.push(slot);
    }
    let addresses: Vec<*const u8> = slots.iter().map(|s| pool.get(s).as_ptr()).collect();

    // Free every other slot, shuffling the order array around the survivors.
    let (freed, slots): (Vec<Slot>, Vec<Slot>) = slots.into_iter().partition(|s| s.id() % 2 == 0);
    for slot in freed {
        pool.free(slot);
    }
    for _ in 0..4 {
        let slot = pool.allocate().expect("a free slot should be available");
        pool.get_mut(&slot).fill(0xff);
        pool.free(slot);
    }

    for slot in &slots {
        assert_eq!(pool.get(slot), [slot.id() as u8; 8], "Live slots shouldn't be touched.");
        assert_eq!(pool.get(slot).as_ptr(), addresses[slot.id()], "Live slots shouldn't move.");
    }
}

#[test]
fn test_free_keeps_positions_consistent() {
    let mut pool = SlotPool::new(1, 5, AllocPolicy::reporting()).expect("allocation should succeed");
    let mut slots: Vec<Slot> = (0..5).map(|_| pool.allocate().expect("slot")).collect();

    // Freeing from the front moves the last used slot into the gap each time, which must then be
    // freeable from its new position.
    while !slots.is_empty() {
        let slot = slots.remove(0);
        pool.free(slot);
        assert_eq!(pool.len(), slots.len());
    }
    assert!(pool.is_empty());

    let refilled: HashSet<usize> = (0..5).map(|_| pool.allocate().expect("slot").id()).collect();
    assert_eq!(refilled.len(), 5);
}

#[test]
fn test_zero_sized_slots() {
    let mut pool = SlotPool::new(0, 3, AllocPolicy::reporting()).expect("allocation should succeed");
    let slot = pool.allocate().expect("a free slot should be available");

    assert!(pool.get(&slot).is_empty());
    pool.free(slot);
}

#[test]
fn test_creation_failure() {
    assert_eq!(
        SlotPool::new(usize::MAX, 2, AllocPolicy::reporting()).map(|p| p.capacity()),
        Err(AllocError::CapacityOverflow(CapacityOverflowError))
    );

    // The slot memory and the order array succeed, the position table doesn't.
    let alloc = LimitedAlloc::leak(2);
    assert!(SlotPool::new(4, 4, alloc.reporting()).is_err());
    assert_eq!(alloc.live(), 0, "A failed pool shouldn't keep any of its allocations.");
}

#[cfg(debug_assertions)]
#[test]
fn test_foreign_slot() {
    let mut first = SlotPool::new(4, 2, AllocPolicy::reporting()).expect("allocation should succeed");
    let mut second = SlotPool::new(4, 2, AllocPolicy::reporting()).expect("allocation should succeed");
    let foreign = first.allocate().expect("a free slot should be available");

    assert_panics!({ second.get(&foreign); }, "Reading a foreign slot should be caught.");
    assert_panics!({ second.free(foreign); }, "Freeing a foreign slot should be caught.");
}
