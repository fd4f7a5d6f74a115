//! # tdm-audio
//!
//! A `no_std`, zero-allocation multi-channel audio streaming crate for the
//! [Teensy 4.x](https://www.pjrc.com/teensy/) (i.MX RT1062, Cortex-M7) and an
//! AK4619VN codec on a TDM serial link. Four 32-bit slots per frame stream in
//! and out through circular DMA buffers, a block-at-a-time processor runs
//! between them, and the result can be recorded to a WAV file on an SD card.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`block`] | Fixed-size audio block pool with RAII handles |
//! | I/O | [`io`] | Transfer buffers, interleaving, block queues, pool capture |
//! | Handler | [`pipeline`] | DMA interrupt servicing and the per-block processor call |
//! | Trait | [`control`] | `AudioControl` codec seam |
//! | Codec | [`codec`] | AK4619VN driver (feature-gated) |
//! | Recording | [`wav`] | Double-buffered streaming WAV writer |
//!
//! ## Quick start
//!
//! ```ignore
//! use tdm_audio::codec::Ak4619;
//! use tdm_audio::io::{ChannelOrder, NoCache};
//! use tdm_audio::pipeline::{Passthrough, Pipeline};
//!
//! static mut PIPELINE: Pipeline<Passthrough> =
//!     Pipeline::new(Passthrough, NoCache, ChannelOrder::identity());
//!
//! let mut codec = Ak4619::new(i2c, delay);
//! unsafe { PIPELINE.start(&mut codec, &mut tx_dma, &mut rx_dma)? };
//!
//! // TX DMA half/full interrupt:
//! PIPELINE.on_tx_interrupt(&mut tx_dma);
//! // RX DMA half/full interrupt:
//! PIPELINE.on_rx_interrupt(&mut rx_dma);
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `ak4619` | yes | AK4619VN codec driver (requires `embedded-hal`) |
//! | `defmt` | no | `defmt` logging and `defmt::Format` on public types |
//! | `sdmmc` | no | [`wav::Storage`] for `embedded-sdmmc` directories |
//! | `cortex-m` | no | D-cache maintenance through the Cortex-M SCB |
//!
//! ## Audio parameters
//!
//! - **Block size:** 128 samples ([`constants::AUDIO_BLOCK_SAMPLES`])
//! - **Channels:** 4 TDM slots ([`constants::CHANNELS`])
//! - **Sample rate:** 192 kHz ([`constants::SAMPLE_RATE`])
//! - **Sample format:** `i32`, MSB-aligned in a 32-bit slot
//! - **Block pool:** 32 blocks ([`constants::POOL_SIZE`])

#![no_std]

pub mod constants;
pub mod block;
pub mod control;
pub mod io;
pub mod pipeline;
pub mod wav;

#[cfg(feature = "ak4619")]
pub mod codec;
