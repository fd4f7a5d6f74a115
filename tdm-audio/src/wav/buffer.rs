//! Lock-free double buffer between the audio interrupt and the file writer.
//!
//! The buffer holds two halves of `T` bytes each. The interrupt appends
//! samples to the hot half with [`push()`](StreamBuffer::push); when a half
//! fills up it is armed for flushing and the producer moves on to the other
//! half. The main loop picks up the armed half with
//! [`take_flush()`](StreamBuffer::take_flush).
//!
//! ```text
//!  write_pos 0 ──────────────► T ──────────────► 2T ─┐
//!           │  first half     │  second half     │   │ wraps to 0
//!           └─────────────────┴──────────────────┘ ◄─┘
//!  reaching T   arms FlushFirstHalf
//!  reaching 2T  arms FlushSecondHalf
//! ```
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`push()`](StreamBuffer::push) (the "producer").
//! - Only ONE context may call the flush side (the "consumer").
//! - The consumer must finish with an armed half before the producer fills
//!   the other one. Nothing detects a slow consumer; the half is simply
//!   overwritten while it is being written out.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use super::header::BitDepth;

/// Which half, if any, is ready to be written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FlushState {
    Idle = 0,
    FlushFirstHalf = 1,
    FlushSecondHalf = 2,
}

impl FlushState {
    fn from_u8(v: u8) -> FlushState {
        match v {
            1 => FlushState::FlushFirstHalf,
            2 => FlushState::FlushSecondHalf,
            _ => FlushState::Idle,
        }
    }
}

/// Two-half byte buffer fed one sample at a time.
///
/// `T` is the size of one half in bytes and must be a multiple of 4.
pub struct StreamBuffer<const T: usize> {
    data: UnsafeCell<[[u8; T]; 2]>,
    /// Next byte to write, `0..2T`. Producer only.
    write_pos: AtomicUsize,
    state: AtomicU8,
    armed: AtomicBool,
    wide: AtomicBool,
    samples: AtomicU32,
}

// SAFETY: the producer only writes bytes of the hot half at `write_pos` and
// the consumer only reads the half named by the flush state it took. The
// two halves are disjoint as long as the consumer keeps up (see the module
// contract). All cursors and flags are atomics.
unsafe impl<const T: usize> Sync for StreamBuffer<T> {}

impl<const T: usize> StreamBuffer<T> {
    /// Bytes in one half.
    pub const HALF_BYTES: usize = T;

    /// Empty, disarmed buffer.
    pub const fn new() -> Self {
        assert!(T > 0 && T % 4 == 0, "half size must be a non-zero multiple of 4 bytes");
        StreamBuffer {
            data: UnsafeCell::new([[0; T]; 2]),
            write_pos: AtomicUsize::new(0),
            state: AtomicU8::new(FlushState::Idle as u8),
            armed: AtomicBool::new(false),
            wide: AtomicBool::new(true),
            samples: AtomicU32::new(0),
        }
    }

    /// Rewind, clear the counters and start accepting samples of `depth`.
    ///
    /// Call from the consumer side while the producer is not pushing.
    pub fn arm(&self, depth: BitDepth) {
        self.armed.store(false, Ordering::Release);
        self.wide.store(depth == BitDepth::ThirtyTwo, Ordering::Relaxed);
        self.write_pos.store(0, Ordering::Relaxed);
        self.samples.store(0, Ordering::Relaxed);
        self.state.store(FlushState::Idle as u8, Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }

    /// Stop accepting samples.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Current sample width in bytes.
    pub fn sample_bytes(&self) -> usize {
        if self.wide.load(Ordering::Relaxed) {
            4
        } else {
            2
        }
    }

    /// Samples that fit in one half at the current width.
    pub fn half_samples(&self) -> usize {
        T / self.sample_bytes()
    }

    /// Append one sample (producer side). Returns `false` when disarmed.
    ///
    /// 16-bit recording keeps the low 16 bits of `sample`.
    pub fn push(&self, sample: i32) -> bool {
        if !self.armed.load(Ordering::Acquire) {
            return false;
        }
        let pos = self.write_pos.load(Ordering::Relaxed);
        let width = self.sample_bytes();

        let bytes = sample.to_le_bytes();
        // SAFETY: `pos..pos + width` lies in the hot half, which the
        // consumer is not reading under the module contract. 16-bit samples
        // take the two low bytes.
        unsafe {
            let dst = self.data.get().cast::<u8>().add(pos);
            core::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, width);
        }

        let mut next = pos + width;
        if next == T {
            self.state.store(FlushState::FlushFirstHalf as u8, Ordering::Release);
        }
        if next >= 2 * T {
            next = 0;
            self.state.store(FlushState::FlushSecondHalf as u8, Ordering::Release);
        }
        self.write_pos.store(next, Ordering::Relaxed);
        self.samples.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Samples pushed since the last [`arm()`](Self::arm).
    pub fn samples(&self) -> u32 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn flush_state(&self) -> FlushState {
        FlushState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Byte offset the next sample goes to.
    pub fn write_pos(&self) -> usize {
        self.write_pos.load(Ordering::Relaxed)
    }

    /// Take the armed half, if any (consumer side).
    ///
    /// The state goes back to `Idle` before `f` sees the bytes.
    pub fn take_flush<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let half = match FlushState::from_u8(self.state.swap(FlushState::Idle as u8, Ordering::AcqRel)) {
            FlushState::Idle => return None,
            FlushState::FlushFirstHalf => 0,
            FlushState::FlushSecondHalf => 1,
        };
        // SAFETY: the producer has moved on to the other half.
        let bytes = unsafe { &(*self.data.get())[half] };
        Some(f(bytes))
    }

    /// The partly filled hot half, from its start up to the write cursor.
    ///
    /// Only meaningful once the producer has stopped; returns an empty
    /// slice while armed.
    pub fn tail(&self) -> &[u8] {
        if self.is_armed() {
            return &[];
        }
        let pos = self.write_pos();
        let (half, len) = if pos < T { (0, pos) } else { (1, pos - T) };
        // SAFETY: disarmed, so no producer writes are in flight.
        unsafe { &(&(*self.data.get())[half])[..len] }
    }
}

impl<const T: usize> Default for StreamBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
