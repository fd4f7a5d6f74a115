//! Transfer-completion handling: the one context object behind both DMA
//! interrupts.
//!
//! [`Pipeline`] owns the TX and RX transfer buffers, the output and input
//! queues, the user's [`AudioProcessor`] and the cache maintenance policy.
//! The application creates it once (usually in a `static` guarded by its
//! interrupt framework) and routes both transfer interrupts to it.
//!
//! ## Per-notification work
//!
//! | Event | TX interrupt | RX interrupt |
//! |-------|--------------|--------------|
//! | hardware entered Second | interleave samples 0..64 into First, flush | invalidate + deinterleave First |
//! | hardware wrapped to First | interleave samples 64..128 into Second, flush, **block update** | invalidate + deinterleave Second, publish |
//!
//! ## Block update
//!
//! Runs once per block, right after the last half of the current output
//! block has been handed to hardware:
//!
//! 1. consume the spent output slot
//! 2. `processor.process(input read slot, output write slot)`
//! 3. consume the input slot
//! 4. publish the output slot
//!
//! The processor runs in interrupt context and must finish inside one
//! half-block period. Overrunning that is not detected.
//!
//! ## Usage
//!
//! ```ignore
//! static PIPELINE: Mutex<RefCell<Option<Pipeline<Passthrough, ScbCache>>>> = ...;
//!
//! // init
//! let mut p = Pipeline::new(Passthrough, ScbCache::new(scb), ChannelOrder::identity());
//! unsafe { p.start(&mut codec, &mut tx_dma, &mut rx_dma)? };
//!
//! // TX DMA interrupt
//! p.on_tx_interrupt(&mut tx_dma);
//! // RX DMA interrupt
//! p.on_rx_interrupt(&mut rx_dma);
//! ```

use crate::constants::{AudioBlock, BUFFER_QUEUE_SIZE, CHANNELS};
use crate::control::AudioControl;
use crate::io::interleave::silence;
use crate::io::{
    CacheMaintenance, ChannelOrder, DmaHalf, NoCache, TdmInput, TdmOutput, TransferBuffer,
    TransferChannel,
};

/// Block-at-a-time transform from input channels to output channels.
///
/// Called from interrupt context: no blocking, no allocation, bounded time.
pub trait AudioProcessor<const CH: usize> {
    fn process(&mut self, inputs: &[&AudioBlock; CH], outputs: &mut [&mut AudioBlock; CH]);
}

impl<F, const CH: usize> AudioProcessor<CH> for F
where
    F: FnMut(&[&AudioBlock; CH], &mut [&mut AudioBlock; CH]),
{
    fn process(&mut self, inputs: &[&AudioBlock; CH], outputs: &mut [&mut AudioBlock; CH]) {
        self(inputs, outputs)
    }
}

/// Copies every input channel to the matching output channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl<const CH: usize> AudioProcessor<CH> for Passthrough {
    fn process(&mut self, inputs: &[&AudioBlock; CH], outputs: &mut [&mut AudioBlock; CH]) {
        for (out, inp) in outputs.iter_mut().zip(inputs) {
            out.copy_from_slice(*inp);
        }
    }
}

/// Full-duplex TDM streaming context.
pub struct Pipeline<P, K = NoCache, const CH: usize = CHANNELS, const C: usize = BUFFER_QUEUE_SIZE>
{
    tx: TransferBuffer<CH>,
    rx: TransferBuffer<CH>,
    output: TdmOutput<CH, C>,
    input: TdmInput<CH, C>,
    processor: P,
    cache: K,
    blocks: u32,
}

impl<P, K, const CH: usize, const C: usize> Pipeline<P, K, CH, C> {
    /// Idle pipeline with silent buffers and pre-filled queues.
    pub const fn new(processor: P, cache: K, order: ChannelOrder<CH>) -> Self {
        Pipeline {
            tx: TransferBuffer::new(),
            rx: TransferBuffer::new(),
            output: TdmOutput::new(order),
            input: TdmInput::new(order),
            processor,
            cache,
            blocks: 0,
        }
    }

    /// Number of block updates run so far.
    pub fn blocks_processed(&self) -> u32 {
        self.blocks
    }

    /// Captured blocks dropped because the processor fell behind.
    pub fn input_overruns(&self) -> u32 {
        self.input.queue().overruns()
    }

    /// Output blocks dropped because hardware fell behind.
    pub fn output_overruns(&self) -> u32 {
        self.output.queue().overruns()
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    pub fn tx_buffer(&self) -> &TransferBuffer<CH> {
        &self.tx
    }

    pub fn rx_buffer(&self) -> &TransferBuffer<CH> {
        &self.rx
    }

    #[cfg(test)]
    pub(crate) fn rx_buffer_mut(&mut self) -> &mut TransferBuffer<CH> {
        &mut self.rx
    }
}

impl<P, K, const CH: usize, const C: usize> Pipeline<P, K, CH, C>
where
    P: AudioProcessor<CH>,
    K: CacheMaintenance,
{
    /// Configure the codec, then arm both circular transfers.
    ///
    /// If the codec fails to configure, its error is returned and no
    /// transfer is started.
    ///
    /// # Safety
    ///
    /// The pipeline must not move or be dropped while the transfers run,
    /// since the DMA engines hold the addresses of its buffers.
    pub unsafe fn start<A, T, R>(
        &mut self,
        codec: &mut A,
        tx: &mut T,
        rx: &mut R,
    ) -> Result<(), A::Error>
    where
        A: AudioControl,
        T: TransferChannel,
        R: TransferChannel,
    {
        if let Err(e) = codec.enable() {
            #[cfg(feature = "defmt")]
            defmt::error!("codec configuration failed, transfers not started");
            return Err(e);
        }

        silence(self.tx.frames_mut());
        self.cache.flush(self.tx.words());
        let words = TransferBuffer::<CH>::WORDS;
        // SAFETY: both buffers live as long as `self`, which the caller pins.
        unsafe {
            rx.begin_transfer(self.rx.as_mut_ptr(), words);
            tx.begin_transfer(self.tx.as_mut_ptr(), words);
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "pipeline started: {=usize} channels, {=usize} words per buffer",
            CH,
            words
        );
        Ok(())
    }

    /// TX half/full interrupt entry. Returns `true` if a block update ran.
    pub fn on_tx_interrupt<T: TransferChannel>(&mut self, dma: &mut T) -> bool {
        let active = DmaHalf::from_address(
            dma.current_address(),
            self.tx.base_address(),
            TransferBuffer::<CH>::BYTES,
        );
        dma.clear_interrupt();
        self.service_tx(active)
    }

    /// RX half/full interrupt entry. Returns `true` if a captured block
    /// was published.
    pub fn on_rx_interrupt<R: TransferChannel>(&mut self, dma: &mut R) -> bool {
        let active = DmaHalf::from_address(
            dma.current_address(),
            self.rx.base_address(),
            TransferBuffer::<CH>::BYTES,
        );
        dma.clear_interrupt();
        self.service_rx(active)
    }

    /// Refill the TX half hardware is not in and run the block update once
    /// the current output block is fully handed over.
    pub fn service_tx(&mut self, active: DmaHalf) -> bool {
        let block_done = self.output.fill(&mut self.tx, active);
        self.cache.flush(self.tx.half_words(active.idle()));
        if block_done {
            self.update_block();
        }
        block_done
    }

    /// Drain the RX half hardware has just finished.
    pub fn service_rx(&mut self, active: DmaHalf) -> bool {
        self.cache.invalidate(self.rx.half_words_mut(active.idle()));
        self.input.drain(&self.rx, active)
    }

    fn update_block(&mut self) {
        self.output.queue_mut().consume();
        {
            let inputs = self.input.queue().read_blocks();
            let mut outputs = self.output.queue_mut().write_blocks();
            self.processor.process(&inputs, &mut outputs);
        }
        self.input.queue_mut().consume();
        self.output.queue_mut().publish();
        self.blocks = self.blocks.wrapping_add(1);
    }
}
