//! Streaming WAV recorder.
//!
//! The writer splits its work between two contexts that share one
//! [`StreamBuffer`]:
//!
//! | Context | Call | Work |
//! |---------|------|------|
//! | Audio interrupt | [`push_sample()`](WavWriter::push_sample) or `StreamBuffer::push` | copy one sample, arm a half when full |
//! | Main loop | [`poll_flush()`](WavWriter::poll_flush) | write the armed half to storage |
//! | Main loop | [`finalize()`](WavWriter::finalize) | rewrite the header and close |
//!
//! `poll_flush()` has to run more often than once per half-buffer period
//! (`T / bytes_per_sample / channels / sample_rate` seconds), otherwise the
//! producer overwrites the half before it reaches storage.
//!
//! `finalize()` on its own drops whatever is still sitting in the buffer,
//! while the header still counts those samples. Call
//! [`flush_tail()`](WavWriter::flush_tail) first to keep them. Samples of
//! an unfinished last frame are never counted, and `flush_tail()` leaves
//! them out of the file.

use core::fmt;

use super::buffer::StreamBuffer;
use super::header::{WavConfig, WavHeader};
use super::storage::{Storage, StorageFile};

/// Writer error, generic over the storage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WavError<E> {
    /// [`WavWriter::initialize`] has not been called.
    NotInitialized,
    /// A file is already open.
    AlreadyRecording,
    /// No file is open.
    NotRecording,
    Storage(E),
}

impl<E: fmt::Debug> fmt::Display for WavError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WavError::NotInitialized => f.write_str("writer not initialized"),
            WavError::AlreadyRecording => f.write_str("a recording is already open"),
            WavError::NotRecording => f.write_str("no recording is open"),
            WavError::Storage(e) => write!(f, "storage error: {e:?}"),
        }
    }
}

/// Records interleaved `i32` samples into a WAV file on `S`.
pub struct WavWriter<'b, S: Storage, const T: usize> {
    buffer: &'b StreamBuffer<T>,
    storage: S,
    header: Option<WavHeader>,
    /// Open file and the header it was started with.
    file: Option<(S::File, WavHeader)>,
}

impl<'b, S: Storage, const T: usize> WavWriter<'b, S, T> {
    pub fn new(buffer: &'b StreamBuffer<T>, storage: S) -> Self {
        WavWriter {
            buffer,
            storage,
            header: None,
            file: None,
        }
    }

    /// Fix the recording format. Takes effect at the next `open_file`; a
    /// recording already open keeps the format it started with.
    pub fn initialize(&mut self, config: WavConfig) {
        self.header = Some(WavHeader::new(&config));
    }

    /// Replace `name` with a new recording and start accepting samples.
    ///
    /// The header is written with an empty payload and completed by
    /// [`finalize()`](Self::finalize).
    pub fn open_file(&mut self, name: &str) -> Result<(), WavError<S::Error>> {
        let header = self.header.ok_or(WavError::NotInitialized)?;
        if self.file.is_some() {
            return Err(WavError::AlreadyRecording);
        }

        if self.storage.exists(name).map_err(WavError::Storage)? {
            self.storage.remove(name).map_err(WavError::Storage)?;
        }
        let mut file = self.storage.create(name).map_err(WavError::Storage)?;
        file.write_all(&header.to_bytes()).map_err(WavError::Storage)?;

        self.file = Some((file, header));
        self.buffer.arm(header.config().bit_depth);

        #[cfg(feature = "defmt")]
        defmt::info!("recording to {=str}: {}", name, header.config());
        Ok(())
    }

    /// Record one sample. Call once per channel per frame, in channel order.
    ///
    /// Ignored unless a file is open.
    #[inline]
    pub fn push_sample(&self, sample: i32) {
        self.buffer.push(sample);
    }

    /// Write the armed half, if any. Returns whether anything was written.
    pub fn poll_flush(&mut self) -> Result<bool, WavError<S::Error>> {
        let Some((file, _)) = self.file.as_mut() else {
            return Ok(false);
        };
        match self.buffer.take_flush(|bytes| file.write_all(bytes)) {
            None => Ok(false),
            Some(result) => result.map(|()| true).map_err(WavError::Storage),
        }
    }

    /// Stop intake and write everything still buffered: an armed half first,
    /// then the partly filled hot half, up to the last whole frame.
    ///
    /// Follow with [`finalize()`](Self::finalize).
    pub fn flush_tail(&mut self) -> Result<(), WavError<S::Error>> {
        let channels = match self.file.as_ref() {
            Some((_, header)) => (header.config().channels as u32).max(1),
            None => return Err(WavError::NotRecording),
        };
        self.buffer.disarm();
        self.poll_flush()?;

        // A partial frame that already went out with a half stays there.
        let partial = (self.buffer.samples() % channels) as usize * self.buffer.sample_bytes();
        let tail = self.buffer.tail();
        let whole = &tail[..tail.len().saturating_sub(partial)];
        if let Some((file, _)) = self.file.as_mut() {
            file.write_all(whole).map_err(WavError::Storage)?;
        }
        Ok(())
    }

    /// Stop intake, complete the header and close the file.
    ///
    /// The payload size covers every whole frame pushed since `open_file`.
    /// Returns the final header. A second call fails with
    /// [`WavError::NotRecording`] and touches nothing.
    pub fn finalize(&mut self) -> Result<WavHeader, WavError<S::Error>> {
        let (mut file, mut header) = self.file.take().ok_or(WavError::NotRecording)?;
        self.buffer.disarm();

        let channels = (header.config().channels as u32).max(1);
        header.set_frames(self.buffer.samples() / channels);

        file.seek_to(0).map_err(WavError::Storage)?;
        file.write_all(&header.to_bytes()).map_err(WavError::Storage)?;
        file.close().map_err(WavError::Storage)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "recording closed: {=u32} frames, {=u32} bytes",
            header.frames(),
            header.data_size()
        );
        Ok(header)
    }

    pub fn is_recording(&self) -> bool {
        self.file.is_some()
    }

    pub fn buffer(&self) -> &'b StreamBuffer<T> {
        self.buffer
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage. Any open file is dropped without finalizing.
    pub fn release(self) -> S {
        self.storage
    }
}
