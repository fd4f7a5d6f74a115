//! WAV recording to block storage.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`StreamBuffer`] | lock-free two-half byte buffer, filled from the audio interrupt |
//! | [`WavWriter`] | opens the file, writes armed halves, completes the header |
//! | [`WavHeader`] | 44-byte canonical PCM header |
//! | [`Storage`] / [`StorageFile`] | filesystem seam (`embedded-sdmmc` with the `sdmmc` feature) |
//!
//! ```ignore
//! static BUF: StreamBuffer<16384> = StreamBuffer::new();
//!
//! let mut writer = WavWriter::new(&BUF, root_dir);
//! writer.initialize(WavConfig::default());
//! writer.open_file("TAKE01.WAV")?;
//!
//! // audio interrupt, once per sample per channel:
//! BUF.push(sample);
//!
//! // main loop:
//! writer.poll_flush()?;
//!
//! // done:
//! writer.flush_tail()?;
//! writer.finalize()?;
//! ```

mod buffer;
mod header;
mod storage;
mod writer;

pub use buffer::{FlushState, StreamBuffer};
pub use header::{BitDepth, HeaderError, WavConfig, WavHeader};
pub use storage::{Storage, StorageFile};
pub use writer::{WavError, WavWriter};

#[cfg(test)]
pub(crate) use storage::tests::MemStorage;
