//! Queue-fed TDM input.
//!
//! [`TdmInput`] drains the receive half hardware has just finished into the
//! input [`BufferQueue`]'s write slot. A block is complete after both halves
//! have landed; it is published on the second one.
//!
//! ```text
//! TDM FIFO ──DMA──► TransferBuffer (RX) ──deinterleave──► BufferQueue (write slot)
//!                   [ first | second ]                     publish after second
//! ```

use crate::constants::BUFFER_QUEUE_SIZE;

use super::buffer_queue::BufferQueue;
use super::interleave::{deinterleave, ChannelOrder};
use super::transfer::{DmaHalf, TransferBuffer};

/// Receive side of the pipeline.
pub struct TdmInput<const CH: usize, const C: usize = BUFFER_QUEUE_SIZE> {
    queue: BufferQueue<CH, C>,
    order: ChannelOrder<CH>,
}

impl<const CH: usize, const C: usize> TdmInput<CH, C> {
    pub const fn new(order: ChannelOrder<CH>) -> Self {
        TdmInput {
            queue: BufferQueue::new(),
            order,
        }
    }

    /// Copy the completed half (the one hardware is not in) into the write
    /// slot. Returns `true` when that completed a block and it was published.
    pub fn drain(&mut self, rx: &TransferBuffer<CH>, active: DmaHalf) -> bool {
        let idle = active.idle();
        let mut blocks = self.queue.write_blocks();
        deinterleave(rx.half(idle), &mut blocks, idle.frame_offset(), &self.order);
        if idle == DmaHalf::Second {
            self.queue.publish();
            true
        } else {
            false
        }
    }

    pub fn queue(&self) -> &BufferQueue<CH, C> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut BufferQueue<CH, C> {
        &mut self.queue
    }
}
