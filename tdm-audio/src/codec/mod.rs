//! AK4619VN audio codec driver module.
//!
//! Four-channel TDM codec (two stereo ADCs, two stereo DACs) controlled over
//! I2C. The driver brings the codec up in the frame format the TDM transfer
//! path expects and exposes runtime gain control.
//!
//! # Feature gate
//!
//! This module is available when the `ak4619` feature is enabled (on by default).

pub(crate) mod registers;
mod ak4619;

pub use ak4619::{
    Ak4619, AudioFormat, ClockMode, CodecConfig, CodecError, DacChannel, DacSource, DataLength,
    InputMode, MicGain, Power, SlotStart,
};
