//! Queue-fed TDM output.
//!
//! [`TdmOutput`] owns the output [`BufferQueue`] and refills whichever
//! transfer-buffer half hardware is not reading. Each queued block spans
//! both halves: the first half of the block goes out on one refill, the
//! second half on the next.
//!
//! ```text
//! BufferQueue (read slot)          TransferBuffer (TX)
//! ┌──────────────┐                 ┌───────────┬───────────┐
//! │ ch0  0..128  ├──interleave────►│ frames    │ frames    │──DMA──► TDM FIFO
//! │ ch1  0..128  │  samples 0..64 ─┤ 0..64     │ 64..128   │
//! │ ...          │  samples 64..128┴───────────┴───────────┘
//! └──────────────┘
//! ```
//!
//! Once the second half of a block has been written the read slot is spent;
//! [`fill`](TdmOutput::fill) reports that so the caller can run the block
//! update.

use crate::constants::BUFFER_QUEUE_SIZE;

use super::buffer_queue::BufferQueue;
use super::interleave::{interleave, ChannelOrder};
use super::transfer::{DmaHalf, TransferBuffer};

/// Transmit side of the pipeline.
pub struct TdmOutput<const CH: usize, const C: usize = BUFFER_QUEUE_SIZE> {
    queue: BufferQueue<CH, C>,
    order: ChannelOrder<CH>,
}

impl<const CH: usize, const C: usize> TdmOutput<CH, C> {
    pub const fn new(order: ChannelOrder<CH>) -> Self {
        TdmOutput {
            queue: BufferQueue::new(),
            order,
        }
    }

    /// Refill the half hardware is not in (`active` is where it is).
    ///
    /// Returns `true` when this refill used the second half of the current
    /// read block, i.e. the block has been handed to hardware completely.
    pub fn fill(&mut self, tx: &mut TransferBuffer<CH>, active: DmaHalf) -> bool {
        let idle = active.idle();
        let blocks = self.queue.read_blocks();
        interleave(tx.half_mut(idle), &blocks, idle.frame_offset(), &self.order);
        idle == DmaHalf::Second
    }

    pub fn queue(&self) -> &BufferQueue<CH, C> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut BufferQueue<CH, C> {
        &mut self.queue
    }

    pub fn order(&self) -> &ChannelOrder<CH> {
        &self.order
    }
}
