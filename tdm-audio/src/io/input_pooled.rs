//! Pool-owned TDM capture.
//!
//! [`PooledInput`] fills a working set of `CH` pool blocks, one per channel,
//! from the receive transfer buffer. The main loop calls
//! [`update()`](PooledInput::update) once per block period to exchange a full
//! set for a fresh one and hand the full set downstream.
//!
//! ## Exchange protocol
//!
//! ```text
//! main loop                          interrupt
//! ─────────                          ─────────
//! alloc_set::<CH>()   (no guard)
//! ┌ GateGuard ─────────────┐
//! │ swap working set/offset│ ◄─ masked ─ isr() may not run here
//! └────────────────────────┘
//! transmit + release  (no guard)     isr() fills new set
//! ```
//!
//! The set is replaced as a whole or not at all. If the pool cannot supply
//! all `CH` blocks, the blocks already claimed are returned and the current
//! working set stays where it is.
//!
//! # Safety Contract
//!
//! - Only ONE interrupt context may call [`isr()`](PooledInput::isr).
//! - Every gate passed to [`update()`](PooledInput::update) must mask that
//!   interrupt.
//! - Both entry points take `&self`, so the capture can live in a `static`.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::block::{BlockPool, PooledBlock};
use crate::constants::{AudioBlock, AUDIO_BLOCK_SAMPLES, HALF_BLOCK_SAMPLES};

use super::cache::CacheMaintenance;
use super::gate::{GateGuard, InterruptGate};
use super::interleave::{deinterleave, ChannelOrder};
use super::transfer::{DmaHalf, TransferBuffer};

/// Downstream consumer of completed capture blocks.
pub trait BlockSink<const CH: usize> {
    /// Take one channel of a completed block set.
    fn transmit(&mut self, channel: usize, block: &AudioBlock);

    /// All `CH` channels of the set have been transmitted.
    fn finish(&mut self) {}
}

/// What [`PooledInput::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateOutcome {
    /// A full set went to the sink and a fresh set took its place.
    Transmitted,
    /// There was no working set; the fresh set was installed.
    Installed,
    /// The working set is still filling; the fresh set went back to the pool.
    Discarded,
    /// The pool could not supply a full set; nothing changed.
    Starved,
}

/// State the interrupt fills and the main loop swaps.
struct Capture<'p, const CH: usize> {
    working: Option<[PooledBlock<'p>; CH]>,
    /// Samples filled so far in the working set: 0, half or a full block.
    offset: usize,
}

/// Capture side backed by a [`BlockPool`].
pub struct PooledInput<'p, const CH: usize> {
    pool: &'p BlockPool,
    capture: UnsafeCell<Capture<'p, CH>>,
    order: ChannelOrder<CH>,
    starved: AtomicU32,
}

// SAFETY: `capture` is touched by the single `isr` context and by `update`
// only while a gate that masks that context is held. Everything else is
// atomic or read-only.
unsafe impl<const CH: usize> Sync for PooledInput<'_, CH> {}

impl<'p, const CH: usize> PooledInput<'p, CH> {
    pub const fn new(pool: &'p BlockPool, order: ChannelOrder<CH>) -> Self {
        PooledInput {
            pool,
            capture: UnsafeCell::new(Capture {
                working: None,
                offset: 0,
            }),
            order,
            starved: AtomicU32::new(0),
        }
    }

    /// Interrupt side: invalidate the completed half, then copy it into
    /// the working set.
    ///
    /// Does nothing without a working set or once it is full; a full set
    /// waits for `update()`.
    ///
    /// # Safety
    ///
    /// Must be called from one interrupt context only, and that interrupt
    /// must be masked by every gate handed to [`update`](Self::update).
    pub unsafe fn isr<K: CacheMaintenance>(
        &self,
        rx: &mut TransferBuffer<CH>,
        active: DmaHalf,
        cache: &mut K,
    ) {
        // SAFETY: `update` cannot hold the capture while this interrupt runs.
        let capture = unsafe { &mut *self.capture.get() };
        let Some(working) = capture.working.as_mut() else {
            return;
        };
        if capture.offset + HALF_BLOCK_SAMPLES > AUDIO_BLOCK_SAMPLES {
            return;
        }
        let idle = active.idle();
        cache.invalidate(rx.half_words_mut(idle));
        let mut blocks = working.each_mut().map(|b| &mut **b);
        deinterleave(rx.half(idle), &mut blocks, capture.offset, &self.order);
        capture.offset += HALF_BLOCK_SAMPLES;
    }

    /// Main-loop side: exchange the working set.
    ///
    /// Allocation, transmission and release all happen outside the
    /// critical section; only the set/offset swap runs under `gate`.
    pub fn update<G, S>(&self, gate: &mut G, sink: &mut S) -> UpdateOutcome
    where
        G: InterruptGate,
        S: BlockSink<CH>,
    {
        let Some(fresh) = self.pool.alloc_set::<CH>() else {
            self.starved.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "capture starved: {=u32} blocks free, {=usize} needed",
                self.pool.free_count(),
                CH
            );
            return UpdateOutcome::Starved;
        };

        let (leftover, outcome) = {
            let _guard = GateGuard::new(gate);
            // SAFETY: the gate holds `isr` off until the guard drops.
            let capture = unsafe { &mut *self.capture.get() };
            if capture.offset >= AUDIO_BLOCK_SAMPLES {
                capture.offset = 0;
                (capture.working.replace(fresh), UpdateOutcome::Transmitted)
            } else if capture.working.is_none() {
                capture.working = Some(fresh);
                capture.offset = 0;
                (None, UpdateOutcome::Installed)
            } else {
                (Some(fresh), UpdateOutcome::Discarded)
            }
        };

        if outcome == UpdateOutcome::Transmitted {
            if let Some(filled) = leftover.as_ref() {
                for (channel, block) in filled.iter().enumerate() {
                    sink.transmit(channel, block);
                }
                sink.finish();
            }
        }
        // `leftover` drops here and its blocks return to the pool.
        outcome
    }

    /// Whether a working set is installed.
    pub fn has_working_blocks(&mut self) -> bool {
        self.capture.get_mut().working.is_some()
    }

    /// Samples filled so far in the working set.
    pub fn block_offset(&mut self) -> usize {
        self.capture.get_mut().offset
    }

    /// Pool slots of the working set, channel order.
    pub fn working_slots(&mut self) -> Option<[u8; CH]> {
        self.capture
            .get_mut()
            .working
            .as_ref()
            .map(|set| set.each_ref().map(|b| b.slot()))
    }

    /// Number of updates that found the pool too empty to refresh.
    pub fn starved(&self) -> u32 {
        self.starved.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::Cell;
    use std::vec::Vec;

    use super::*;
    use crate::constants::POOL_SIZE;
    use crate::io::cache::tests::RecordingCache;
    use crate::io::cache::NoCache;
    use crate::io::gate::tests::CountingGate;

    #[derive(Default)]
    struct RecordingSink {
        blocks: Vec<(usize, AudioBlock)>,
        finished: u32,
    }

    impl BlockSink<4> for RecordingSink {
        fn transmit(&mut self, channel: usize, block: &AudioBlock) {
            self.blocks.push((channel, *block));
        }

        fn finish(&mut self) {
            self.finished += 1;
        }
    }

    fn rx_pattern() -> TransferBuffer<4> {
        let mut rx = TransferBuffer::<4>::new();
        for (i, frame) in rx.frames_mut().iter_mut().enumerate() {
            *frame = core::array::from_fn(|slot| (slot * 1000 + i) as u32);
        }
        rx
    }

    fn service(input: &PooledInput<'_, 4>, rx: &mut TransferBuffer<4>, active: DmaHalf) {
        // SAFETY: tests are the only interrupt context.
        unsafe { input.isr(rx, active, &mut NoCache) }
    }

    #[test]
    fn first_update_installs() {
        let pool = BlockPool::new();
        let mut input = PooledInput::<4>::new(&pool, ChannelOrder::identity());
        let (mut gate, mut sink) = (CountingGate::default(), RecordingSink::default());

        assert!(!input.has_working_blocks());
        assert_eq!(input.update(&mut gate, &mut sink), UpdateOutcome::Installed);
        assert!(input.has_working_blocks());
        assert_eq!(pool.allocated_count(), 4);
        assert!(sink.blocks.is_empty());
        assert_eq!((gate.masks, gate.unmasks), (1, 1));
    }

    #[test]
    fn isr_without_working_set_is_noop() {
        let pool = BlockPool::new();
        let mut input = PooledInput::<4>::new(&pool, ChannelOrder::identity());
        let mut cache = RecordingCache::default();
        // SAFETY: single test context.
        unsafe { input.isr(&mut rx_pattern(), DmaHalf::Second, &mut cache) };
        assert_eq!(input.block_offset(), 0);
        assert_eq!(cache.invalidate_calls, 0);
    }

    #[test]
    fn isr_fills_then_stops_at_full_block() {
        let pool = BlockPool::new();
        let mut input = PooledInput::<4>::new(&pool, ChannelOrder::identity());
        let (mut gate, mut sink) = (CountingGate::default(), RecordingSink::default());
        input.update(&mut gate, &mut sink);

        let mut rx = rx_pattern();
        service(&input, &mut rx, DmaHalf::Second);
        assert_eq!(input.block_offset(), HALF_BLOCK_SAMPLES);
        service(&input, &mut rx, DmaHalf::First);
        assert_eq!(input.block_offset(), AUDIO_BLOCK_SAMPLES);
        service(&input, &mut rx, DmaHalf::Second);
        assert_eq!(input.block_offset(), AUDIO_BLOCK_SAMPLES);
    }

    #[test]
    fn isr_invalidates_each_half_before_reading() {
        let pool = BlockPool::new();
        let input = PooledInput::<4>::new(&pool, ChannelOrder::identity());
        let (mut gate, mut sink) = (CountingGate::default(), RecordingSink::default());
        input.update(&mut gate, &mut sink);

        let mut rx = rx_pattern();
        let mut cache = RecordingCache::default();
        // SAFETY: single test context.
        unsafe {
            input.isr(&mut rx, DmaHalf::Second, &mut cache);
            input.isr(&mut rx, DmaHalf::First, &mut cache);
            // Full set: nothing is read, so nothing is invalidated.
            input.isr(&mut rx, DmaHalf::Second, &mut cache);
        }
        assert_eq!(cache.invalidate_calls, 2);
        assert_eq!(cache.invalidated, 2 * HALF_BLOCK_SAMPLES * 4);
        assert_eq!(cache.flush_calls, 0);
    }

    #[test]
    fn full_set_is_transmitted_and_replaced() {
        let pool = BlockPool::new();
        let mut input = PooledInput::<4>::new(&pool, ChannelOrder::identity());
        let (mut gate, mut sink) = (CountingGate::default(), RecordingSink::default());
        input.update(&mut gate, &mut sink);
        let old_slots = input.working_slots().unwrap();

        let mut rx = rx_pattern();
        service(&input, &mut rx, DmaHalf::Second);
        service(&input, &mut rx, DmaHalf::First);

        assert_eq!(input.update(&mut gate, &mut sink), UpdateOutcome::Transmitted);
        assert_eq!(input.block_offset(), 0);
        assert_ne!(input.working_slots().unwrap(), old_slots);
        // Old set released after transmission.
        assert_eq!(pool.allocated_count(), 4);

        assert_eq!(sink.finished, 1);
        assert_eq!(sink.blocks.len(), 4);
        for (ch, block) in &sink.blocks {
            for (i, &s) in block.iter().enumerate() {
                assert_eq!(s, (ch * 1000 + i) as i32);
            }
        }
    }

    #[test]
    fn partial_set_keeps_filling() {
        let pool = BlockPool::new();
        let mut input = PooledInput::<4>::new(&pool, ChannelOrder::identity());
        let (mut gate, mut sink) = (CountingGate::default(), RecordingSink::default());
        input.update(&mut gate, &mut sink);
        let slots = input.working_slots();
        service(&input, &mut rx_pattern(), DmaHalf::Second);

        assert_eq!(input.update(&mut gate, &mut sink), UpdateOutcome::Discarded);
        assert_eq!(input.working_slots(), slots);
        assert_eq!(input.block_offset(), HALF_BLOCK_SAMPLES);
        assert_eq!(pool.allocated_count(), 4);
        assert!(sink.blocks.is_empty());
    }

    #[test]
    fn starvation_changes_nothing() {
        let pool = BlockPool::new();
        let mut input = PooledInput::<4>::new(&pool, ChannelOrder::identity());
        let (mut gate, mut sink) = (CountingGate::default(), RecordingSink::default());
        input.update(&mut gate, &mut sink);
        let mut rx = rx_pattern();
        service(&input, &mut rx, DmaHalf::Second);
        service(&input, &mut rx, DmaHalf::First);
        let slots = input.working_slots();

        // Leave only two free blocks; a refresh needs four.
        let hog = pool.alloc_set::<{ POOL_SIZE - 6 }>().unwrap();
        assert_eq!(pool.free_count(), 2);
        let masks_before = gate.masks;

        assert_eq!(input.update(&mut gate, &mut sink), UpdateOutcome::Starved);
        assert_eq!(pool.free_count(), 2);
        assert_eq!(input.working_slots(), slots);
        assert_eq!(input.block_offset(), AUDIO_BLOCK_SAMPLES);
        assert_eq!(input.starved(), 1);
        assert_eq!(gate.masks, masks_before);
        assert!(sink.blocks.is_empty());

        drop(hog);
        assert_eq!(input.update(&mut gate, &mut sink), UpdateOutcome::Transmitted);
        assert_eq!(sink.finished, 1);
    }

    /// Gate whose state the sink can observe.
    struct FlagGate<'a>(&'a Cell<bool>);

    // SAFETY: host tests drive both sides from one thread.
    unsafe impl InterruptGate for FlagGate<'_> {
        fn mask(&mut self) {
            self.0.set(true);
        }

        fn unmask(&mut self) {
            self.0.set(false);
        }
    }

    struct GateWatchSink<'a> {
        held: &'a Cell<bool>,
        masked_transmits: u32,
    }

    impl BlockSink<4> for GateWatchSink<'_> {
        fn transmit(&mut self, _channel: usize, _block: &AudioBlock) {
            if self.held.get() {
                self.masked_transmits += 1;
            }
        }
    }

    #[test]
    fn transmit_runs_with_interrupt_unmasked() {
        let pool = BlockPool::new();
        let input = PooledInput::<4>::new(&pool, ChannelOrder::identity());
        let held = Cell::new(false);
        let mut gate = FlagGate(&held);
        let mut sink = GateWatchSink { held: &held, masked_transmits: 0 };

        input.update(&mut gate, &mut sink);
        let mut rx = rx_pattern();
        service(&input, &mut rx, DmaHalf::Second);
        service(&input, &mut rx, DmaHalf::First);
        assert_eq!(input.update(&mut gate, &mut sink), UpdateOutcome::Transmitted);
        assert_eq!(sink.masked_transmits, 0);
        assert!(!held.get());
    }

    static SHARED_POOL: BlockPool = BlockPool::new();
    static SHARED_INPUT: PooledInput<'static, 4> =
        PooledInput::new(&SHARED_POOL, ChannelOrder::identity());

    #[test]
    fn capture_lives_in_a_static() {
        let (mut gate, mut sink) = (CountingGate::default(), RecordingSink::default());
        let mut rx = rx_pattern();

        assert_eq!(SHARED_INPUT.update(&mut gate, &mut sink), UpdateOutcome::Installed);
        service(&SHARED_INPUT, &mut rx, DmaHalf::Second);
        service(&SHARED_INPUT, &mut rx, DmaHalf::First);
        assert_eq!(SHARED_INPUT.update(&mut gate, &mut sink), UpdateOutcome::Transmitted);
        assert_eq!(sink.blocks[3].1[AUDIO_BLOCK_SAMPLES - 1], 3000 + AUDIO_BLOCK_SAMPLES as i32 - 1);
        assert_eq!(SHARED_POOL.allocated_count(), 4);
    }
}
