/// Number of samples per channel in one audio block.
pub const AUDIO_BLOCK_SAMPLES: usize = 128;

/// Number of TDM slots carried by the serial audio interface.
pub const CHANNELS: usize = 4;

/// Frame rate of the TDM link in Hz.
pub const SAMPLE_RATE: u32 = 192_000;

/// Width of one TDM slot on the wire.
pub const BIT_DEPTH: u16 = 32;

/// Number of audio blocks in a [`BlockPool`](crate::block::BlockPool).
pub const POOL_SIZE: usize = 32;

/// Slots per channel in a [`BufferQueue`](crate::io::BufferQueue).
pub const BUFFER_QUEUE_SIZE: usize = 3;

/// Frames per transfer-buffer half (one interrupt's worth of work).
pub const HALF_BLOCK_SAMPLES: usize = AUDIO_BLOCK_SAMPLES / 2;

pub const SAMPLE_16_MAX: i32 = i16::MAX as i32;
pub const SAMPLE_16_MIN: i32 = i16::MIN as i32;
pub const SAMPLE_24_MAX: i32 = 0x007F_FFFF;
pub const SAMPLE_24_MIN: i32 = -0x0080_0000;
pub const SAMPLE_32_MAX: i32 = i32::MAX;
pub const SAMPLE_32_MIN: i32 = i32::MIN;

/// One signed sample, MSB-aligned in a 32-bit slot.
pub type Sample = i32;

/// One channel's worth of samples for a single block period.
pub type AudioBlock = [Sample; AUDIO_BLOCK_SAMPLES];

const _: () = assert!(AUDIO_BLOCK_SAMPLES % 2 == 0);
const _: () = assert!(POOL_SIZE <= 32, "pool bitmap is a single u32");
const _: () = assert!(BUFFER_QUEUE_SIZE >= 2);
