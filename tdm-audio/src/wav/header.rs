//! Canonical 44-byte PCM WAV header.
//!
//! ```text
//! offset  size  field
//! ──────  ────  ─────────────────────────────
//!      0     4  "RIFF"
//!      4     4  file size - 8  (36 + payload)
//!      8     4  "WAVE"
//!     12     4  "fmt "
//!     16     4  16             (fmt chunk size)
//!     20     2  1              (PCM)
//!     22     2  channels
//!     24     4  sample rate
//!     28     4  byte rate
//!     32     2  block align
//!     34     2  bits per sample
//!     36     4  "data"
//!     40     4  payload bytes
//! ```
//!
//! All multi-byte fields are little-endian.

use core::fmt;

const RIFF: [u8; 4] = *b"RIFF";
const WAVE: [u8; 4] = *b"WAVE";
const FMT: [u8; 4] = *b"fmt ";
const DATA: [u8; 4] = *b"data";

const FMT_CHUNK_SIZE: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// Bytes between the end of the RIFF size field and the payload.
const HEADER_OVERHEAD: u32 = 36;

/// Stored sample width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitDepth {
    /// `i32` samples truncated to their low 16 bits.
    Sixteen,
    /// `i32` samples stored unchanged.
    ThirtyTwo,
}

impl BitDepth {
    pub const fn bits(self) -> u16 {
        match self {
            BitDepth::Sixteen => 16,
            BitDepth::ThirtyTwo => 32,
        }
    }

    pub const fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    pub const fn from_bits(bits: u16) -> Option<BitDepth> {
        match bits {
            16 => Some(BitDepth::Sixteen),
            32 => Some(BitDepth::ThirtyTwo),
            _ => None,
        }
    }
}

/// Recording format, fixed for the lifetime of a writer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavConfig {
    pub channels: u16,
    pub sample_rate: u32,
    pub bit_depth: BitDepth,
}

impl Default for WavConfig {
    /// Matches the TDM stream: 4 channels, 192 kHz, 32-bit.
    fn default() -> Self {
        WavConfig {
            channels: crate::constants::CHANNELS as u16,
            sample_rate: crate::constants::SAMPLE_RATE,
            bit_depth: BitDepth::ThirtyTwo,
        }
    }
}

/// Reason a byte slice is not a header this crate can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// Fewer than [`WavHeader::LEN`] bytes.
    Truncated,
    /// A chunk ID is not where the canonical layout puts it.
    BadMagic,
    /// Not 16-byte-fmt PCM.
    UnsupportedFormat,
    UnsupportedBitDepth(u16),
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::Truncated => f.write_str("header shorter than 44 bytes"),
            HeaderError::BadMagic => f.write_str("missing RIFF/WAVE/fmt/data chunk ID"),
            HeaderError::UnsupportedFormat => f.write_str("not a plain PCM header"),
            HeaderError::UnsupportedBitDepth(bits) => write!(f, "unsupported bit depth {bits}"),
        }
    }
}

/// In-memory header. Only the payload size changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavHeader {
    config: WavConfig,
    data_size: u32,
}

impl WavHeader {
    pub const LEN: usize = 44;

    /// Header for `config` with an empty payload.
    pub const fn new(config: &WavConfig) -> Self {
        WavHeader {
            config: *config,
            data_size: 0,
        }
    }

    pub fn config(&self) -> &WavConfig {
        &self.config
    }

    /// Bytes per frame across all channels.
    pub fn frame_bytes(&self) -> u32 {
        self.config.channels as u32 * self.config.bit_depth.bytes() as u32
    }

    /// The 16-bit block-align field; saturates for frames wider than it holds.
    pub fn block_align(&self) -> u16 {
        u16::try_from(self.frame_bytes()).unwrap_or(u16::MAX)
    }

    pub fn byte_rate(&self) -> u32 {
        self.config.sample_rate.saturating_mul(self.frame_bytes())
    }

    /// Size the payload for `frames` complete frames.
    pub fn set_frames(&mut self, frames: u32) {
        self.data_size = frames.saturating_mul(self.frame_bytes());
    }

    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// RIFF chunk size, the total file length minus 8.
    pub fn file_size(&self) -> u32 {
        HEADER_OVERHEAD.saturating_add(self.data_size)
    }

    pub fn frames(&self) -> u32 {
        match self.frame_bytes() {
            0 => 0,
            align => self.data_size / align,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..4].copy_from_slice(&RIFF);
        out[4..8].copy_from_slice(&self.file_size().to_le_bytes());
        out[8..12].copy_from_slice(&WAVE);
        out[12..16].copy_from_slice(&FMT);
        out[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        out[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        out[22..24].copy_from_slice(&self.config.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.config.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        out[34..36].copy_from_slice(&self.config.bit_depth.bits().to_le_bytes());
        out[36..40].copy_from_slice(&DATA);
        out[40..44].copy_from_slice(&self.data_size.to_le_bytes());
        out
    }

    /// Read back a header in the canonical layout.
    pub fn parse(bytes: &[u8]) -> Result<WavHeader, HeaderError> {
        let bytes: &[u8; Self::LEN] = bytes
            .get(..Self::LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or(HeaderError::Truncated)?;

        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        if bytes[0..4] != RIFF || bytes[8..12] != WAVE || bytes[12..16] != FMT || bytes[36..40] != DATA {
            return Err(HeaderError::BadMagic);
        }
        if u32_at(16) != FMT_CHUNK_SIZE || u16_at(20) != FORMAT_PCM {
            return Err(HeaderError::UnsupportedFormat);
        }
        let bits = u16_at(34);
        let bit_depth = BitDepth::from_bits(bits).ok_or(HeaderError::UnsupportedBitDepth(bits))?;

        Ok(WavHeader {
            config: WavConfig {
                channels: u16_at(22),
                sample_rate: u32_at(24),
                bit_depth,
            },
            data_size: u32_at(40),
        })
    }
}
