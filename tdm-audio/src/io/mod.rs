//! Real-time data movement between the TDM peripheral and application code.
//!
//! ## Components
//!
//! | Type | Context | Description |
//! |------|---------|-------------|
//! | [`BufferQueue`] | ISR ↔ ISR | Multi-channel block ring, discard-oldest on overrun |
//! | [`TdmOutput`] | TX ISR | Interleaves queued blocks into the idle TX half |
//! | [`TdmInput`] | RX ISR | De-interleaves the completed RX half into a queue |
//! | [`PooledInput`] | RX ISR + main loop | Pool-owned capture with all-or-nothing exchange |
//!
//! ## Seams
//!
//! - [`TransferChannel`]: circular DMA transfer with half/full interrupts
//! - [`CacheMaintenance`]: data-cache flush/invalidate around DMA
//! - [`InterruptGate`] / [`GateGuard`]: scoped interrupt masking
//!
//! ## Transfer Buffer Layout
//!
//! Each [`TransferBuffer`] holds one block period: `AUDIO_BLOCK_SAMPLES`
//! frames of `CH` 32-bit slots, split into two halves of 64 frames. The
//! DMA engine interrupts at the half-way point and at the wrap; software
//! services whichever half the engine has left.

pub mod buffer_queue;
pub mod cache;
pub mod gate;
pub mod input_pooled;
pub mod input_tdm;
pub mod interleave;
pub mod output_tdm;
pub mod transfer;

pub use buffer_queue::BufferQueue;
pub use cache::{CacheMaintenance, NoCache};
#[cfg(feature = "cortex-m")]
pub use cache::ScbCache;
pub use gate::{CriticalSectionGate, GateGuard, InterruptGate};
pub use input_pooled::{BlockSink, PooledInput, UpdateOutcome};
pub use input_tdm::TdmInput;
pub use interleave::{ChannelOrder, OrderError};
pub use output_tdm::TdmOutput;
pub use transfer::{DmaHalf, TransferBuffer, TransferChannel, TransferEvent};
