//! Data-cache maintenance around DMA buffers.
//!
//! On a core with a data cache the CPU and the DMA engine see different
//! copies of a buffer unless software intervenes:
//!
//! | Direction | Before | Call |
//! |-----------|--------|------|
//! | CPU → DMA (transmit) | DMA reads the half | [`flush`](CacheMaintenance::flush) |
//! | DMA → CPU (receive) | CPU reads the half | [`invalidate`](CacheMaintenance::invalidate) |

/// Cache operations over a word region.
pub trait CacheMaintenance {
    /// Write dirty lines covering `words` back to memory and drop them.
    fn flush(&mut self, words: &[u32]);

    /// Discard lines covering `words` so the next read goes to memory.
    fn invalidate(&mut self, words: &mut [u32]);
}

/// For buffers in non-cacheable memory or cores without a data cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl CacheMaintenance for NoCache {
    #[inline]
    fn flush(&mut self, _words: &[u32]) {}

    #[inline]
    fn invalidate(&mut self, _words: &mut [u32]) {}
}

/// Cortex-M7 L1 data cache through the system control block.
#[cfg(feature = "cortex-m")]
pub struct ScbCache {
    scb: cortex_m::peripheral::SCB,
}

#[cfg(feature = "cortex-m")]
impl ScbCache {
    pub fn new(scb: cortex_m::peripheral::SCB) -> Self {
        ScbCache { scb }
    }

    /// Give the SCB back.
    pub fn release(self) -> cortex_m::peripheral::SCB {
        self.scb
    }
}

#[cfg(feature = "cortex-m")]
impl CacheMaintenance for ScbCache {
    fn flush(&mut self, words: &[u32]) {
        self.scb.clean_invalidate_dcache_by_slice(words);
    }

    fn invalidate(&mut self, words: &mut [u32]) {
        // SAFETY: transfer-buffer halves are whole, 32-byte aligned cache
        // lines, so no unrelated data shares a discarded line.
        unsafe { self.scb.invalidate_dcache_by_slice(words) }
    }
}
