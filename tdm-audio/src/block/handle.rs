use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::constants::AudioBlock;

use super::pool::BlockPool;

/// Exclusive handle to a block borrowed from a [`BlockPool`].
///
/// A block is either free, held by exactly one `PooledBlock`, or in flight
/// to a single consumer; it is never shared between stages. Dropping the
/// handle returns the slot to its pool.
pub struct PooledBlock<'p> {
    pool: &'p BlockPool,
    slot: u8,
}

impl<'p> PooledBlock<'p> {
    /// Wrap a freshly claimed slot.
    ///
    /// The slot must have refcount 1 and no other handle may exist for it.
    pub(crate) fn new(pool: &'p BlockPool, slot: u8) -> Self {
        PooledBlock { pool, slot }
    }

    /// Pool slot index.
    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Pool this block belongs to.
    pub fn pool(&self) -> &'p BlockPool {
        self.pool
    }
}

impl Deref for PooledBlock<'_> {
    type Target = AudioBlock;

    fn deref(&self) -> &Self::Target {
        // SAFETY: this handle is the slot's only owner.
        unsafe { &*self.pool.data_ptr(self.slot) }
    }
}

impl DerefMut for PooledBlock<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: this handle is the slot's only owner.
        unsafe { &mut *self.pool.data_ptr(self.slot) }
    }
}

impl Drop for PooledBlock<'_> {
    fn drop(&mut self) {
        self.pool.release(self.slot);
    }
}

impl fmt::Debug for PooledBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBlock").field("slot", &self.slot).finish()
    }
}
