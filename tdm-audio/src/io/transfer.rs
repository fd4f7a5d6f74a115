//! Circular transfer buffers and the peripheral seam.
//!
//! The DMA engine walks a [`TransferBuffer`] in a loop and interrupts at the
//! half-way point and at the end. Software only ever touches the half the
//! engine is *not* on:
//!
//! ```text
//!        hardware on First          hardware on Second
//!      ┌──────────┬──────────┐    ┌──────────┬──────────┐
//!      │ ▶ DMA    │ software │    │ software │ ▶ DMA    │
//!      └──────────┴──────────┘    └──────────┴──────────┘
//!       frames 0..64  64..128
//! ```
//!
//! [`DmaHalf`] always names the half hardware currently owns; use
//! [`DmaHalf::idle`] to get the half that is safe to read or write.

use crate::constants::{AUDIO_BLOCK_SAMPLES, HALF_BLOCK_SAMPLES};

/// Which half of a transfer buffer the DMA engine is working in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaHalf {
    /// Frames `0..AUDIO_BLOCK_SAMPLES/2`.
    First,
    /// Frames `AUDIO_BLOCK_SAMPLES/2..AUDIO_BLOCK_SAMPLES`.
    Second,
}

/// Interrupt cause reported by event-driven transfer engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferEvent {
    /// The first half has been transferred.
    HalfComplete,
    /// The whole buffer has been transferred and the engine wrapped.
    FullComplete,
}

impl DmaHalf {
    /// The half software may touch while hardware is in `self`.
    #[inline]
    pub const fn idle(self) -> DmaHalf {
        match self {
            DmaHalf::First => DmaHalf::Second,
            DmaHalf::Second => DmaHalf::First,
        }
    }

    /// Locate the engine from its current address.
    ///
    /// `base` is the buffer start and `len_bytes` its full size. Addresses
    /// below the midpoint mean hardware is in the first half.
    #[inline]
    pub fn from_address(addr: usize, base: usize, len_bytes: usize) -> DmaHalf {
        if addr.wrapping_sub(base) < len_bytes / 2 {
            DmaHalf::First
        } else {
            DmaHalf::Second
        }
    }

    /// Where the engine is right after raising `event`.
    #[inline]
    pub const fn after(event: TransferEvent) -> DmaHalf {
        match event {
            TransferEvent::HalfComplete => DmaHalf::Second,
            TransferEvent::FullComplete => DmaHalf::First,
        }
    }

    /// First frame index of this half.
    #[inline]
    pub const fn frame_offset(self) -> usize {
        match self {
            DmaHalf::First => 0,
            DmaHalf::Second => HALF_BLOCK_SAMPLES,
        }
    }
}

/// One block period of interleaved `CH`-slot frames, cache-line aligned.
///
/// Alignment to 32 bytes keeps cache maintenance on this buffer from
/// touching neighbouring data.
#[repr(C, align(32))]
pub struct TransferBuffer<const CH: usize> {
    frames: [[u32; CH]; AUDIO_BLOCK_SAMPLES],
}

impl<const CH: usize> TransferBuffer<CH> {
    /// Buffer size in bytes.
    pub const BYTES: usize = AUDIO_BLOCK_SAMPLES * CH * 4;

    /// Buffer size in 32-bit words.
    pub const WORDS: usize = AUDIO_BLOCK_SAMPLES * CH;

    /// Silent buffer.
    pub const fn new() -> Self {
        TransferBuffer {
            frames: [[0; CH]; AUDIO_BLOCK_SAMPLES],
        }
    }

    pub fn half(&self, half: DmaHalf) -> &[[u32; CH]] {
        let start = half.frame_offset();
        &self.frames[start..start + HALF_BLOCK_SAMPLES]
    }

    pub fn half_mut(&mut self, half: DmaHalf) -> &mut [[u32; CH]] {
        let start = half.frame_offset();
        &mut self.frames[start..start + HALF_BLOCK_SAMPLES]
    }

    /// Flat word view of one half, for cache maintenance.
    pub fn half_words(&self, half: DmaHalf) -> &[u32] {
        self.half(half).as_flattened()
    }

    pub fn half_words_mut(&mut self, half: DmaHalf) -> &mut [u32] {
        self.half_mut(half).as_flattened_mut()
    }

    /// Flat word view of the whole buffer.
    pub fn words(&self) -> &[u32] {
        self.frames.as_flattened()
    }

    pub fn frames(&self) -> &[[u32; CH]; AUDIO_BLOCK_SAMPLES] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut [[u32; CH]; AUDIO_BLOCK_SAMPLES] {
        &mut self.frames
    }

    /// Start address handed to the transfer engine.
    pub fn base_address(&self) -> usize {
        self.frames.as_ptr() as usize
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u32 {
        self.frames.as_mut_ptr().cast()
    }
}

impl<const CH: usize> Default for TransferBuffer<CH> {
    fn default() -> Self {
        Self::new()
    }
}

/// Circular peripheral transfer (one DMA channel bound to the TDM FIFO).
///
/// Implementations own the register-level programming; this crate only
/// needs to arm the loop, ask where it is, and acknowledge interrupts.
pub trait TransferChannel {
    /// Start a circular transfer over `len_words` words at `start`, raising
    /// an interrupt at the half-way point and at the end of each pass.
    ///
    /// # Safety
    ///
    /// The region must stay valid, and must not move, until the transfer is
    /// stopped. Software may only touch the half the engine is not in.
    unsafe fn begin_transfer(&mut self, start: *mut u32, len_words: usize);

    /// Address the engine will access next.
    fn current_address(&self) -> usize;

    /// Acknowledge the pending half/full interrupt.
    fn clear_interrupt(&mut self);
}
