//! Frame interleave/deinterleave between per-channel blocks and TDM frames.
//!
//! ## Transfer buffer format
//!
//! One frame is `CH` consecutive 32-bit words, one per TDM slot:
//!
//! ```text
//! frame i:  [ slot0 | slot1 | slot2 | slot3 ]
//!              │       │       │       │
//!              └─ order.channel_for_slot(n) picks the block
//! ```
//!
//! Samples move as raw 32-bit words; no scaling or sign conversion beyond
//! reinterpreting `i32` as `u32` and back.

use core::fmt;

use crate::constants::AudioBlock;

/// Mapping from TDM slot to logical channel.
///
/// Entry `n` names the channel whose samples travel in slot `n`. Set once at
/// start-up to match how the codec routes its ADC/DAC pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOrder<const CH: usize> {
    slots: [usize; CH],
}

/// Rejected channel order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OrderError {
    /// A slot names a channel that does not exist.
    OutOfRange { slot: usize, channel: usize },
    /// Two slots name the same channel.
    Duplicate { channel: usize },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::OutOfRange { slot, channel } => {
                write!(f, "slot {slot} maps to missing channel {channel}")
            }
            OrderError::Duplicate { channel } => {
                write!(f, "channel {channel} mapped to more than one slot")
            }
        }
    }
}

impl<const CH: usize> ChannelOrder<CH> {
    /// Slot `n` carries channel `n`.
    pub const fn identity() -> Self {
        let mut slots = [0usize; CH];
        let mut i = 0;
        while i < CH {
            slots[i] = i;
            i += 1;
        }
        ChannelOrder { slots }
    }

    /// Left/right swapped inside every slot pair (1, 0, 3, 2, ...).
    /// An odd trailing slot keeps its own channel.
    pub const fn swapped_pairs() -> Self {
        let mut slots = [0usize; CH];
        let mut i = 0;
        while i < CH {
            let partner = i ^ 1;
            slots[i] = if partner < CH { partner } else { i };
            i += 1;
        }
        ChannelOrder { slots }
    }

    /// Build from an explicit table; it must be a permutation of `0..CH`.
    pub fn new(slots: [usize; CH]) -> Result<Self, OrderError> {
        let mut seen = [false; CH];
        for (slot, &channel) in slots.iter().enumerate() {
            if channel >= CH {
                return Err(OrderError::OutOfRange { slot, channel });
            }
            if seen[channel] {
                return Err(OrderError::Duplicate { channel });
            }
            seen[channel] = true;
        }
        Ok(ChannelOrder { slots })
    }

    /// Channel carried in `slot`.
    #[inline]
    pub fn channel_for_slot(&self, slot: usize) -> usize {
        self.slots[slot]
    }
}

impl<const CH: usize> Default for ChannelOrder<CH> {
    fn default() -> Self {
        Self::identity()
    }
}

/// Write `dest.len()` frames taken from `blocks` starting at sample `offset`.
///
/// # Panics
///
/// Panics if `offset + dest.len()` exceeds the block length.
pub fn interleave<const CH: usize>(
    dest: &mut [[u32; CH]],
    blocks: &[&AudioBlock; CH],
    offset: usize,
    order: &ChannelOrder<CH>,
) {
    for (i, frame) in dest.iter_mut().enumerate() {
        for (slot, word) in frame.iter_mut().enumerate() {
            *word = blocks[order.channel_for_slot(slot)][offset + i] as u32;
        }
    }
}

/// Split `src` frames into `blocks` starting at sample `offset`.
///
/// # Panics
///
/// Panics if `offset + src.len()` exceeds the block length.
pub fn deinterleave<const CH: usize>(
    src: &[[u32; CH]],
    blocks: &mut [&mut AudioBlock; CH],
    offset: usize,
    order: &ChannelOrder<CH>,
) {
    for (i, frame) in src.iter().enumerate() {
        for (slot, &word) in frame.iter().enumerate() {
            blocks[order.channel_for_slot(slot)][offset + i] = word as i32;
        }
    }
}

/// Fill frames with digital silence.
pub fn silence<const CH: usize>(dest: &mut [[u32; CH]]) {
    dest.fill([0; CH]);
}
