//! Fixed-capacity multi-channel block ring.
//!
//! [`BufferQueue`] holds `C` block slots for each of `CH` channels in one
//! contiguous region. All channels share the same cursors, so a published
//! slot always carries one block per channel.
//!
//! ```text
//!            read_pos          write_pos
//!               │                  │
//! ch0   [ blk ][ blk ][ blk ]  ...  C slots
//! ch1   [ blk ][ blk ][ blk ]
//! ...
//! ```
//!
//! ## Start-up latency
//!
//! A new queue already has `C - 1` zeroed slots published, so the consumer
//! reads silence while the producer fills its first real block. With the
//! default `C = 3` the first produced block is read after two silent ones.
//!
//! ## Overrun
//!
//! Publishing into a full queue discards the oldest published slot (latest
//! wins). The event is counted in [`overruns()`](BufferQueue::overruns) but
//! nothing else is signalled.

use crate::constants::{AudioBlock, AUDIO_BLOCK_SAMPLES, BUFFER_QUEUE_SIZE};

use super::input_pooled::BlockSink;

/// Ring of `C` block slots for each of `CH` channels.
pub struct BufferQueue<const CH: usize, const C: usize = BUFFER_QUEUE_SIZE> {
    storage: [[AudioBlock; C]; CH],
    write_pos: usize,
    read_pos: usize,
    available: usize,
    overruns: u32,
}

impl<const CH: usize, const C: usize> BufferQueue<CH, C> {
    /// Zeroed queue with `C - 1` slots already published.
    pub const fn new() -> Self {
        assert!(C >= 2, "buffer queue needs at least 2 slots");
        BufferQueue {
            storage: [[[0; AUDIO_BLOCK_SAMPLES]; C]; CH],
            write_pos: C - 1,
            read_pos: 0,
            available: C - 1,
            overruns: 0,
        }
    }

    /// Make the write slot readable and move on to the next one.
    ///
    /// If that leaves more than `C` slots published, the oldest one is
    /// consumed on the spot.
    pub fn publish(&mut self) {
        self.write_pos = (self.write_pos + 1) % C;
        self.available += 1;
        if self.available > C {
            self.overruns = self.overruns.wrapping_add(1);
            self.consume();
        }
    }

    /// Release the read slot. Does nothing if no slot is published.
    pub fn consume(&mut self) {
        if self.available == 0 {
            return;
        }
        self.read_pos = (self.read_pos + 1) % C;
        self.available -= 1;
    }

    /// Number of published, not yet consumed slots.
    pub fn available(&self) -> usize {
        self.available
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// How many times a publish had to discard the oldest slot.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Block of `channel` at the read cursor.
    pub fn read_block(&self, channel: usize) -> &AudioBlock {
        &self.storage[channel][self.read_pos]
    }

    /// Block of `channel` at the write cursor.
    pub fn write_block(&mut self, channel: usize) -> &mut AudioBlock {
        &mut self.storage[channel][self.write_pos]
    }

    /// One block per channel at the read cursor.
    pub fn read_blocks(&self) -> [&AudioBlock; CH] {
        let r = self.read_pos;
        core::array::from_fn(|ch| &self.storage[ch][r])
    }

    /// One block per channel at the write cursor.
    pub fn write_blocks(&mut self) -> [&mut AudioBlock; CH] {
        let w = self.write_pos;
        self.storage.each_mut().map(|slots| &mut slots[w])
    }
}

impl<const CH: usize, const C: usize> Default for BufferQueue<CH, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool-owned capture can feed a queue directly: each channel is copied
/// into the write slot and the slot is published once all have arrived.
impl<const CH: usize, const C: usize> BlockSink<CH> for BufferQueue<CH, C> {
    fn transmit(&mut self, channel: usize, block: &AudioBlock) {
        self.write_block(channel).copy_from_slice(block);
    }

    fn finish(&mut self) {
        self.publish();
    }
}
