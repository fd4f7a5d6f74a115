use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::constants::{AudioBlock, AUDIO_BLOCK_SAMPLES, POOL_SIZE};

use super::handle::PooledBlock;

/// Bitmap value with every usable slot marked allocated.
const FULL: u32 = u32::MAX >> (32 - POOL_SIZE as u32);

/// Lock-free pool of fixed-size audio blocks.
///
/// An atomic bitmap tracks which slots are taken and a per-slot refcount
/// decides when a slot goes back to the free set. All operations are
/// lock-free and safe to call from interrupt context.
///
/// The pool is an ordinary value: the application owns one (usually in a
/// `static`) and hands `&BlockPool` to whatever captures or processes audio.
///
/// Slots only go back through [`PooledBlock`]'s `Drop`; there is no public
/// way to release a slot a handle still owns:
///
/// ```compile_fail
/// let pool = tdm_audio::block::BlockPool::new();
/// let block = pool.alloc().unwrap();
/// pool.release(block.slot());
/// ```
pub struct BlockPool {
    /// Bit N set means slot N is allocated.
    bitmap: AtomicU32,
    refcounts: [AtomicU8; POOL_SIZE],
    storage: UnsafeCell<[AudioBlock; POOL_SIZE]>,
}

// SAFETY: Shared state is atomic. A slot's storage is only reached through
// a handle that owns the slot exclusively (claimed via the bitmap CAS).
unsafe impl Sync for BlockPool {}

impl BlockPool {
    /// Create an empty pool.
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new() -> Self {
        const ZERO_REFCOUNT: AtomicU8 = AtomicU8::new(0);
        BlockPool {
            bitmap: AtomicU32::new(0),
            refcounts: [ZERO_REFCOUNT; POOL_SIZE],
            storage: UnsafeCell::new([[0; AUDIO_BLOCK_SAMPLES]; POOL_SIZE]),
        }
    }

    /// Claim a free slot. The block comes back zeroed with refcount 1, or
    /// `None` when the pool is exhausted.
    pub fn alloc(&self) -> Option<PooledBlock<'_>> {
        self.alloc_slot().map(|slot| PooledBlock::new(self, slot))
    }

    /// Claim `CH` blocks at once, or none at all.
    ///
    /// If any allocation fails the blocks already claimed for this call are
    /// released before returning, so pool occupancy is unchanged.
    pub fn alloc_set<const CH: usize>(&self) -> Option<[PooledBlock<'_>; CH]> {
        let mut slots = [0u8; CH];
        for i in 0..CH {
            match self.alloc_slot() {
                Some(slot) => slots[i] = slot,
                None => {
                    for &claimed in &slots[..i] {
                        self.release(claimed);
                    }
                    return None;
                }
            }
        }
        Some(slots.map(|slot| PooledBlock::new(self, slot)))
    }

    fn alloc_slot(&self) -> Option<u8> {
        loop {
            let bitmap = self.bitmap.load(Ordering::Acquire);
            let free = !bitmap & FULL;
            if free == 0 {
                return None;
            }
            let slot = free.trailing_zeros();
            let bit = 1u32 << slot;
            match self.bitmap.compare_exchange_weak(
                bitmap,
                bitmap | bit,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.refcounts[slot as usize].store(1, Ordering::Release);
                    // SAFETY: the CAS above made this slot ours alone.
                    unsafe {
                        (*self.storage.get())[slot as usize] = [0; AUDIO_BLOCK_SAMPLES];
                    }
                    return Some(slot as u8);
                }
                // Raced with an interrupt, retry.
                Err(_) => continue,
            }
        }
    }

    /// Drop one reference to `slot`; the slot is freed when the count hits zero.
    ///
    /// Only the owning handle's `Drop` and the rollback in `alloc_set` call this.
    pub(crate) fn release(&self, slot: u8) {
        debug_assert!((slot as usize) < POOL_SIZE);
        let old = self.refcounts[slot as usize].fetch_sub(1, Ordering::AcqRel);
        debug_assert!(old > 0, "release on slot with refcount 0");
        if old == 1 {
            let bit = 1u32 << (slot as u32);
            self.bitmap.fetch_and(!bit, Ordering::Release);
        }
    }

    /// Current reference count for a slot.
    pub(crate) fn refcount(&self, slot: u8) -> u8 {
        self.refcounts[slot as usize].load(Ordering::Acquire)
    }

    /// Pointer to a slot's samples.
    ///
    /// # Safety
    /// The slot must be allocated and the caller must hold the only handle to it.
    pub(crate) unsafe fn data_ptr(&self, slot: u8) -> *mut AudioBlock {
        unsafe { (*self.storage.get()).as_mut_ptr().add(slot as usize) }
    }

    /// Number of blocks currently handed out.
    pub fn allocated_count(&self) -> u32 {
        self.bitmap.load(Ordering::Acquire).count_ones()
    }

    /// Number of blocks still available.
    pub fn free_count(&self) -> u32 {
        POOL_SIZE as u32 - self.allocated_count()
    }
}

impl Default for BlockPool {
    fn default() -> Self {
        Self::new()
    }
}
