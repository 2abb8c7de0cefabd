//! Fixed-capacity pool of shadow slots.
//!
//! A slot is one shadow-texture-array layer plus the matching entry in the
//! global light table. The pool is sized once at startup for the maximum
//! plausible concurrent light count; running out is a soft limit handled by
//! the caller, not an error.

/// Index of one shadow map layer / light table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShadowSlot(pub u32);

/// Free-list allocator over the fixed slot range `0..capacity`.
pub struct ShadowSlotPool {
    /// Free slot indices; popped from the back on acquire.
    free: Vec<u32>,
    capacity: u32,
}

impl ShadowSlotPool {
    pub fn new(capacity: u32) -> Self {
        // Reversed so the first acquire hands out slot 0.
        let free = (0..capacity).rev().collect();
        Self { free, capacity }
    }

    /// Takes a slot from the pool, or `None` when all are held.
    pub fn acquire(&mut self) -> Option<ShadowSlot> {
        self.free.pop().map(ShadowSlot)
    }

    /// Returns a slot to the pool.
    pub fn release(&mut self, slot: ShadowSlot) {
        debug_assert!(slot.0 < self.capacity, "slot {} out of range", slot.0);
        debug_assert!(
            !self.free.contains(&slot.0),
            "slot {} released twice",
            slot.0
        );
        self.free.push(slot.0);
    }

    /// Number of slots currently available.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of slots currently held by chunks.
    pub fn in_use(&self) -> usize {
        self.capacity as usize - self.free.len()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
