//! AK4619VN register addresses and bitfield definitions.
//!
//! Register addresses are 8-bit and every register holds one byte. Writes
//! are `[register, value]`; reads set the address pointer and then read,
//! with the address auto-incrementing across consecutive registers.

// A few registers (ADC digital volume, filters, de-emphasis) are listed for
// completeness and for register dumps but are not driven by the codec driver.
#![allow(dead_code)]

// ── I2C addresses ──────────────────────────────────────────────────────────

/// Default I2C address (CAD pin low).
pub const I2C_ADDR: u8 = 0x10;

/// Alternate I2C address (CAD pin high).
pub const I2C_ADDR_ALT: u8 = 0x12;

// ── Power and interface ────────────────────────────────────────────────────

/// Power management.
/// - Bit 5: PMAD2
/// - Bit 4: PMAD1
/// - Bit 2: PMDA2
/// - Bit 1: PMDA1
/// - Bit 0: RSTN (0 = reset, 1 = running)
pub const PWRMGM: u8 = 0x00;

/// Audio interface format.
/// - Bits 7:2: TDM, DCF[2:0], DSL[1:0]
/// - Bit  1  : BCKP (BICK edge)
/// - Bit  0  : SDOPH (SDOUT fast mode)
pub const AUDFORM1: u8 = 0x01;

/// Word and slot lengths.
/// - Bit  4  : SLEN (slot start: LRCK edge or slot length)
/// - Bits 3:2: DIDL (SDIN data length)
/// - Bits 1:0: DODL (SDOUT data length)
pub const AUDFORM2: u8 = 0x02;

/// System clock: MCLK ratio and sample-rate range, bits 2:0.
pub const SYSCLKSET: u8 = 0x03;

// ── Analog input ───────────────────────────────────────────────────────────

/// MIC amplifier gain, ADC1. Bits 7:4 left, bits 3:0 right.
pub const MICGAIN1: u8 = 0x04;

/// MIC amplifier gain, ADC2. Bits 7:4 left, bits 3:0 right.
pub const MICGAIN2: u8 = 0x05;

pub const ADC1LVOL: u8 = 0x06;
pub const ADC1RVOL: u8 = 0x07;
pub const ADC2LVOL: u8 = 0x08;
pub const ADC2RVOL: u8 = 0x09;
pub const ADCFILT: u8 = 0x0A;

/// ADC analog input mode, two bits per channel:
/// 1L bits 7:6, 1R bits 5:4, 2L bits 3:2, 2R bits 1:0.
pub const ADCAIN: u8 = 0x0B;

pub const RESERVED: u8 = 0x0C;

/// ADC soft mute and DC-cut HPF.
/// - Bit 7: ATSPAD (volume transition time)
/// - Bit 6: AD2MUTE
/// - Bit 5: AD1MUTE
/// - Bit 2: AD1HPFN (1 = HPF off)
/// - Bit 1: AD2HPFN (1 = HPF off)
pub const ADCMUTEHPF: u8 = 0x0D;

// ── DAC ────────────────────────────────────────────────────────────────────

/// DAC digital volume. 0x00 = +12 dB, 0x18 = 0 dB, 0.5 dB per step,
/// 0xFF = mute.
pub const DAC1LVOL: u8 = 0x0E;
pub const DAC1RVOL: u8 = 0x0F;
pub const DAC2LVOL: u8 = 0x10;
pub const DAC2RVOL: u8 = 0x11;

/// DAC input select. Bits 3:2 DAC2 source, bits 1:0 DAC1 source.
pub const DACDIN: u8 = 0x12;

pub const DACDEEM: u8 = 0x13;
pub const DACMUTFLT: u8 = 0x14;

/// Number of registers from `PWRMGM` through `DACMUTFLT`.
pub const REGISTER_COUNT: usize = 21;

// ── Bitfields ──────────────────────────────────────────────────────────────

pub const PWRMGM_RSTN: u8 = 1 << 0;
pub const PWRMGM_PMDA1: u8 = 1 << 1;
pub const PWRMGM_PMDA2: u8 = 1 << 2;
pub const PWRMGM_PMAD1: u8 = 1 << 4;
pub const PWRMGM_PMAD2: u8 = 1 << 5;

pub const ADCMUTEHPF_ATSPAD: u8 = 1 << 7;
pub const ADCMUTEHPF_AD2MUTE: u8 = 1 << 6;
pub const ADCMUTEHPF_AD1MUTE: u8 = 1 << 5;
pub const ADCMUTEHPF_AD1HPFN: u8 = 1 << 2;
pub const ADCMUTEHPF_AD2HPFN: u8 = 1 << 1;

/// DAC volume code for 0 dB.
pub const DAC_VOL_0DB: u8 = 0x18;

/// DAC volume code for mute.
pub const DAC_VOL_MUTE: u8 = 0xFF;

/// Highest MIC gain step (+27 dB).
pub const MIC_GAIN_MAX: u8 = 0x0B;
