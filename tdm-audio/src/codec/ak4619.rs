//! AK4619VN four-channel codec driver.
//!
//! Two ADC pairs and two DAC pairs behind a TDM serial interface, configured
//! over I2C. The driver is generic over any [`embedded_hal::i2c::I2c`] and
//! [`embedded_hal::delay::DelayNs`] implementation.
//!
//! Configuration must happen with the codec held in reset;
//! [`configure()`](Ak4619::configure) asserts reset, programs every setting
//! from a [`CodecConfig`] and then releases it.
//!
//! # Example
//!
//! ```ignore
//! let mut codec = Ak4619::new(i2c, delay);
//! codec.enable()?;                                     // TDM128, 192 kHz, 0 dB
//! codec.adjust_mic_gain([true; 4], 2)?;                // +6 dB on every input
//! codec.set_dac_volume(DacChannel::Dac2Both, 0x30)?;   // -12 dB on DAC2
//! ```

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::registers as reg;
use crate::control::AudioControl;

// ── Public enums ───────────────────────────────────────────────────────────

/// Serial audio interface format (AUDFORM1 bits 7:2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioFormat {
    I2sStereo,
    MsbStereo,
    PcmShort16,
    PcmShort24,
    PcmShort32,
    PcmLong16,
    PcmLong24,
    PcmLong32,
    Tdm128I2s32,
    Tdm128Msb32,
    Tdm256I2s32,
    Tdm256Msb32,
}

impl AudioFormat {
    /// TDM, DCF[2:0], DSL[1:0] field value.
    pub const fn bits(self) -> u8 {
        match self {
            AudioFormat::I2sStereo => 0x00,
            AudioFormat::MsbStereo => 0x14,
            AudioFormat::PcmShort16 => 0x3A,
            AudioFormat::PcmShort24 => 0x38,
            AudioFormat::PcmShort32 => 0x3B,
            AudioFormat::PcmLong16 => 0x3E,
            AudioFormat::PcmLong24 => 0x3C,
            AudioFormat::PcmLong32 => 0x3F,
            AudioFormat::Tdm128I2s32 | AudioFormat::Tdm256I2s32 => 0x2B,
            AudioFormat::Tdm128Msb32 | AudioFormat::Tdm256Msb32 => 0x3F,
        }
    }
}

/// Where a slot starts (AUDFORM2 bit 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotStart {
    /// Aligned to the LRCK edge.
    LrClock = 0,
    /// Aligned to the slot length.
    SlotLength = 1,
}

/// Sample word length inside a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataLength {
    Bits24 = 0,
    Bits20 = 1,
    Bits16 = 2,
    /// Only valid for the SDIN (DAC) direction.
    Bits32 = 3,
}

/// MCLK ratio and sample-rate range (SYSCLKSET).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockMode {
    /// 256fs, 8 kHz to 48 kHz.
    Fs256Up48k = 0,
    /// 256fs, 96 kHz.
    Fs256At96k = 1,
    /// 384fs, 8 kHz to 48 kHz.
    Fs384Up48k = 2,
    /// 512fs, 8 kHz to 48 kHz.
    Fs512Up48k = 3,
    /// 128fs, 192 kHz. BICK must be 128fs.
    Fs128At192k = 4,
}

/// MIC amplifier gain, 3 dB per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MicGain {
    Neg6dB = 0,
    Neg3dB = 1,
    Zero = 2,
    Pos3dB = 3,
    Pos6dB = 4,
    Pos9dB = 5,
    Pos12dB = 6,
    Pos15dB = 7,
    Pos18dB = 8,
    Pos21dB = 9,
    Pos24dB = 10,
    Pos27dB = 11,
}

impl MicGain {
    const STEPS: [MicGain; 12] = [
        MicGain::Neg6dB,
        MicGain::Neg3dB,
        MicGain::Zero,
        MicGain::Pos3dB,
        MicGain::Pos6dB,
        MicGain::Pos9dB,
        MicGain::Pos12dB,
        MicGain::Pos15dB,
        MicGain::Pos18dB,
        MicGain::Pos21dB,
        MicGain::Pos24dB,
        MicGain::Pos27dB,
    ];

    /// Gain for a register nibble, saturating above the top step.
    pub fn from_step(step: u8) -> MicGain {
        Self::STEPS[step.min(reg::MIC_GAIN_MAX) as usize]
    }

    /// Move by `delta` steps, clamped to the valid range.
    pub fn offset(self, delta: i8) -> MicGain {
        let step = (self as i16 + delta as i16).clamp(0, reg::MIC_GAIN_MAX as i16);
        Self::from_step(step as u8)
    }
}

/// ADC analog input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputMode {
    Differential = 0,
    SingleEnded1 = 1,
    /// Also selects pseudo-differential input on this channel.
    SingleEnded2 = 2,
}

/// Source feeding a DAC pair (DACDIN).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacSource {
    Sdin1 = 0,
    Sdin2 = 1,
    /// Loop back ADC data from SDOUT1.
    Sdout1 = 2,
    /// Loop back ADC data from SDOUT2.
    Sdout2 = 3,
}

/// DAC volume target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacChannel {
    Dac1Both,
    Dac2Both,
    Dac1Left,
    Dac1Right,
    Dac2Left,
    Dac2Right,
}

impl DacChannel {
    /// Volume registers addressed by this target.
    pub const fn registers(self) -> &'static [u8] {
        match self {
            DacChannel::Dac1Both => &[reg::DAC1LVOL, reg::DAC1RVOL],
            DacChannel::Dac2Both => &[reg::DAC2LVOL, reg::DAC2RVOL],
            DacChannel::Dac1Left => &[reg::DAC1LVOL],
            DacChannel::Dac1Right => &[reg::DAC1RVOL],
            DacChannel::Dac2Left => &[reg::DAC2LVOL],
            DacChannel::Dac2Right => &[reg::DAC2RVOL],
        }
    }
}

/// Which converters are powered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Power {
    pub adc2: bool,
    pub adc1: bool,
    pub dac2: bool,
    pub dac1: bool,
}

impl Power {
    pub const ALL: Power = Power { adc2: true, adc1: true, dac2: true, dac1: true };
    pub const OFF: Power = Power { adc2: false, adc1: false, dac2: false, dac1: false };

    const fn bits(self) -> u8 {
        (self.adc2 as u8) << 5 | (self.adc1 as u8) << 4 | (self.dac2 as u8) << 2 | (self.dac1 as u8) << 1
    }
}

/// Complete start-up configuration.
///
/// `Default` is 4-slot TDM128 (I2S framing, 32-bit SDIN, 24-bit SDOUT) at
/// 192 kHz, all inputs single-ended at 0 dB, both DACs at 0 dB fed from
/// SDIN1/SDIN2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecConfig {
    pub power: Power,
    pub format: AudioFormat,
    pub bick_rising: bool,
    pub sdout_fast: bool,
    pub slot_start: SlotStart,
    /// SDIN (DAC) word length.
    pub input_length: DataLength,
    /// SDOUT (ADC) word length. 32 bits is not supported by the codec.
    pub output_length: DataLength,
    pub clock: ClockMode,
    /// ADC1 L, ADC1 R, ADC2 L, ADC2 R.
    pub mic_gain: [MicGain; 4],
    /// DAC1 and DAC2 volume codes, applied to both channels of each pair.
    pub dac_volume: [u8; 2],
    /// ADC1 L, ADC1 R, ADC2 L, ADC2 R.
    pub inputs: [InputMode; 4],
    pub dac1_source: DacSource,
    pub dac2_source: DacSource,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            power: Power::ALL,
            format: AudioFormat::Tdm128I2s32,
            bick_rising: false,
            sdout_fast: false,
            slot_start: SlotStart::SlotLength,
            input_length: DataLength::Bits32,
            output_length: DataLength::Bits24,
            clock: ClockMode::Fs128At192k,
            mic_gain: [MicGain::Zero; 4],
            dac_volume: [reg::DAC_VOL_0DB; 2],
            inputs: [InputMode::SingleEnded1; 4],
            dac1_source: DacSource::Sdin1,
            dac2_source: DacSource::Sdin2,
        }
    }
}

/// Codec driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError<E> {
    /// The I2C transaction failed.
    Bus(E),
    /// SDOUT cannot carry 32-bit words.
    UnsupportedDataLength,
}

impl<E: fmt::Debug> fmt::Display for CodecError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Bus(e) => write!(f, "codec bus error: {e:?}"),
            CodecError::UnsupportedDataLength => f.write_str("32-bit SDOUT data length is not supported"),
        }
    }
}

// ── Driver struct ──────────────────────────────────────────────────────────

/// AK4619VN codec driver.
///
/// Holds the configuration applied by [`AudioControl::enable`]. The delay
/// provider is used for the settle time after reset is released.
pub struct Ak4619<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    config: CodecConfig,
}

type Result<T, E> = core::result::Result<T, CodecError<E>>;

impl<I2C, D> Ak4619<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub const DEFAULT_ADDRESS: u8 = reg::I2C_ADDR;
    pub const ALT_ADDRESS: u8 = reg::I2C_ADDR_ALT;

    /// Driver at the default address (0x10) with the default configuration.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::new_with_address(i2c, delay, Self::DEFAULT_ADDRESS)
    }

    pub fn new_with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            config: CodecConfig::default(),
        }
    }

    /// Replace the configuration used by [`AudioControl::enable`].
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Give back the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    // ── Low-level I2C helpers ──────────────────────────────────────────

    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(CodecError::Bus)
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut val = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut val)
            .map_err(CodecError::Bus)?;
        Ok(val[0])
    }

    /// Read consecutive registers starting at `start`.
    pub fn read_registers(&mut self, start: u8, out: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c
            .write_read(self.address, &[start], out)
            .map_err(CodecError::Bus)
    }

    fn modify(&mut self, register: u8, value: u8, mask: u8) -> Result<u8, I2C::Error> {
        let current = self.read_register(register)?;
        let new_val = (current & !mask) | (value & mask);
        self.write_register(register, new_val)?;
        Ok(new_val)
    }

    // ── Bring-up ───────────────────────────────────────────────────────

    /// Program every setting in `config`.
    ///
    /// Reset is asserted first and released last; any bus failure aborts
    /// the sequence with the codec left in reset.
    pub fn configure(&mut self, config: &CodecConfig) -> Result<(), I2C::Error> {
        if config.output_length == DataLength::Bits32 {
            return Err(CodecError::UnsupportedDataLength);
        }

        self.set_reset(true)?;
        self.set_power(config.power)?;
        self.set_format(config.format, config.bick_rising, config.sdout_fast)?;
        self.set_slot_length(config.slot_start, config.input_length, config.output_length)?;
        self.set_clock(config.clock)?;
        self.set_mic_gain(config.mic_gain)?;
        self.set_dac_volume(DacChannel::Dac1Both, config.dac_volume[0])?;
        self.set_dac_volume(DacChannel::Dac2Both, config.dac_volume[1])?;
        self.set_inputs(config.inputs)?;
        self.set_dac_sources(config.dac2_source, config.dac1_source)?;
        self.set_reset(false)?;
        self.delay.delay_ms(1);

        #[cfg(feature = "defmt")]
        defmt::info!("AK4619 configured: {}", config);
        Ok(())
    }

    /// Hold (`true`) or release (`false`) the digital core reset.
    pub fn set_reset(&mut self, reset: bool) -> Result<(), I2C::Error> {
        let value = if reset { 0 } else { reg::PWRMGM_RSTN };
        self.modify(reg::PWRMGM, value, reg::PWRMGM_RSTN).map(|_| ())
    }

    /// Power converters on or off. The reset bit is left as it is.
    pub fn set_power(&mut self, power: Power) -> Result<(), I2C::Error> {
        self.modify(reg::PWRMGM, power.bits(), !reg::PWRMGM_RSTN).map(|_| ())
    }

    pub fn set_format(
        &mut self,
        format: AudioFormat,
        bick_rising: bool,
        sdout_fast: bool,
    ) -> Result<(), I2C::Error> {
        let value = format.bits() << 2 | (bick_rising as u8) << 1 | sdout_fast as u8;
        self.write_register(reg::AUDFORM1, value)
    }

    pub fn set_slot_length(
        &mut self,
        slot: SlotStart,
        input: DataLength,
        output: DataLength,
    ) -> Result<(), I2C::Error> {
        if output == DataLength::Bits32 {
            return Err(CodecError::UnsupportedDataLength);
        }
        let value = (slot as u8) << 4 | (input as u8) << 2 | output as u8;
        self.write_register(reg::AUDFORM2, value)
    }

    pub fn set_clock(&mut self, clock: ClockMode) -> Result<(), I2C::Error> {
        self.write_register(reg::SYSCLKSET, clock as u8)
    }

    // ── Input gain ─────────────────────────────────────────────────────

    /// Set all four MIC gains (ADC1 L, ADC1 R, ADC2 L, ADC2 R).
    pub fn set_mic_gain(&mut self, gains: [MicGain; 4]) -> Result<(), I2C::Error> {
        let [l1, r1, l2, r2] = gains.map(|g| g as u8);
        self.write_register(reg::MICGAIN1, l1 << 4 | r1)?;
        self.write_register(reg::MICGAIN2, l2 << 4 | r2)
    }

    /// Current MIC gains as stored in the codec.
    pub fn mic_gain(&mut self) -> Result<[MicGain; 4], I2C::Error> {
        let mut regs = [0u8; 2];
        self.read_registers(reg::MICGAIN1, &mut regs)?;
        Ok([
            MicGain::from_step(regs[0] >> 4),
            MicGain::from_step(regs[0] & 0x0F),
            MicGain::from_step(regs[1] >> 4),
            MicGain::from_step(regs[1] & 0x0F),
        ])
    }

    /// Move the selected MIC gains by `steps` (3 dB each), clamped to the
    /// valid range.
    pub fn adjust_mic_gain(&mut self, select: [bool; 4], steps: i8) -> Result<(), I2C::Error> {
        let mut gains = self.mic_gain()?;
        for (gain, &on) in gains.iter_mut().zip(&select) {
            if on {
                *gain = gain.offset(steps);
            }
        }
        self.set_mic_gain(gains)
    }

    /// Analog input mode for ADC1 L, ADC1 R, ADC2 L, ADC2 R.
    pub fn set_inputs(&mut self, modes: [InputMode; 4]) -> Result<(), I2C::Error> {
        let [l1, r1, l2, r2] = modes.map(|m| m as u8);
        self.write_register(reg::ADCAIN, l1 << 6 | r1 << 4 | l2 << 2 | r2)
    }

    /// ADC soft mute and DC-cut filters.
    pub fn mute_adc_hpf(
        &mut self,
        slow_transition: bool,
        adc2_mute: bool,
        adc1_mute: bool,
        adc1_hpf_off: bool,
        adc2_hpf_off: bool,
    ) -> Result<(), I2C::Error> {
        let mut value = 0;
        if slow_transition {
            value |= reg::ADCMUTEHPF_ATSPAD;
        }
        if adc2_mute {
            value |= reg::ADCMUTEHPF_AD2MUTE;
        }
        if adc1_mute {
            value |= reg::ADCMUTEHPF_AD1MUTE;
        }
        if adc1_hpf_off {
            value |= reg::ADCMUTEHPF_AD1HPFN;
        }
        if adc2_hpf_off {
            value |= reg::ADCMUTEHPF_AD2HPFN;
        }
        self.write_register(reg::ADCMUTEHPF, value)
    }

    // ── Output ─────────────────────────────────────────────────────────

    /// Set a DAC volume code (0x00 = +12 dB, 0x18 = 0 dB, 0xFF = mute).
    pub fn set_dac_volume(&mut self, channel: DacChannel, value: u8) -> Result<(), I2C::Error> {
        for &register in channel.registers() {
            self.write_register(register, value)?;
        }
        Ok(())
    }

    /// Shift a DAC volume code by `delta` half-dB steps (positive is
    /// quieter), saturating at 0x00 and 0xFF.
    pub fn adjust_dac_volume(&mut self, channel: DacChannel, delta: i16) -> Result<(), I2C::Error> {
        for &register in channel.registers() {
            let current = self.read_register(register)?;
            let value = (current as i16).saturating_add(delta).clamp(0, 0xFF) as u8;
            self.write_register(register, value)?;
        }
        Ok(())
    }

    pub fn set_dac_sources(&mut self, dac2: DacSource, dac1: DacSource) -> Result<(), I2C::Error> {
        self.write_register(reg::DACDIN, (dac2 as u8) << 2 | dac1 as u8)
    }

    /// Read back every control register, `PWRMGM` through `DACMUTFLT`.
    pub fn dump_registers(&mut self) -> Result<[u8; reg::REGISTER_COUNT], I2C::Error> {
        let mut regs = [0u8; reg::REGISTER_COUNT];
        self.read_registers(reg::PWRMGM, &mut regs)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("AK4619 registers: {=[u8]:#x}", &regs[..]);
        Ok(regs)
    }

    /// Volume code for a linear level; 0.5 dB steps around 0 dB, mute at
    /// or below zero, +12 dB at most.
    fn volume_code(level: f32) -> u8 {
        if level <= 0.0 {
            return reg::DAC_VOL_MUTE;
        }
        let db = 20.0 * libm::log10f(level);
        let steps = libm::roundf(-db * 2.0) + reg::DAC_VOL_0DB as f32;
        steps.clamp(0.0, (reg::DAC_VOL_MUTE - 1) as f32) as u8
    }
}

// ── AudioControl trait impl ────────────────────────────────────────────────

impl<I2C, D> AudioControl for Ak4619<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = CodecError<I2C::Error>;

    fn enable(&mut self) -> Result<(), I2C::Error> {
        let config = self.config;
        self.configure(&config)
    }

    /// Hold the codec in reset with every converter powered down.
    fn disable(&mut self) -> Result<(), I2C::Error> {
        self.set_reset(true)?;
        self.set_power(Power::OFF)
    }

    /// Both DAC pairs to the same level.
    fn volume(&mut self, level: f32) -> Result<(), I2C::Error> {
        let code = Self::volume_code(level);
        self.set_dac_volume(DacChannel::Dac1Both, code)?;
        self.set_dac_volume(DacChannel::Dac2Both, code)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{self, ErrorType, Operation};

    // ── Mock I2C with register file ───────────────────────────────────

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockError;

    impl i2c::Error for MockError {
        fn kind(&self) -> i2c::ErrorKind {
            i2c::ErrorKind::Other
        }
    }

    /// Byte-wide register file with a chronological write log.
    struct MockI2c {
        regs: [u8; 32],
        log: [(u8, u8); 64],
        log_count: usize,
        /// Fail every transaction once this many writes have been logged.
        fail_after: Option<usize>,
        last_addr: u8,
    }

    impl MockI2c {
        fn new() -> Self {
            Self {
                regs: [0; 32],
                log: [(0, 0); 64],
                log_count: 0,
                fail_after: None,
                last_addr: 0,
            }
        }

        fn write_at(&self, idx: usize) -> (u8, u8) {
            self.log[idx]
        }

        fn failing(&self) -> bool {
            matches!(self.fail_after, Some(n) if self.log_count >= n)
        }
    }

    impl ErrorType for MockI2c {
        type Error = MockError;
    }

    impl I2c for MockI2c {
        fn read(&mut self, _addr: u8, _buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
            Ok(())
        }

        fn write(&mut self, addr: u8, bytes: &[u8]) -> core::result::Result<(), Self::Error> {
            if self.failing() {
                return Err(MockError);
            }
            self.last_addr = addr;
            if let [register, value] = *bytes {
                self.regs[register as usize] = value;
                self.log[self.log_count] = (register, value);
                self.log_count += 1;
            }
            Ok(())
        }

        fn write_read(
            &mut self,
            addr: u8,
            wr: &[u8],
            rd: &mut [u8],
        ) -> core::result::Result<(), Self::Error> {
            if self.failing() {
                return Err(MockError);
            }
            self.last_addr = addr;
            let start = wr[0] as usize;
            for (i, byte) in rd.iter_mut().enumerate() {
                *byte = self.regs[start + i];
            }
            Ok(())
        }

        fn transaction(
            &mut self,
            _addr: u8,
            _ops: &mut [Operation<'_>],
        ) -> core::result::Result<(), Self::Error> {
            Ok(())
        }
    }

    // ── Mock delay (no-op) ────────────────────────────────────────────

    struct MockDelay;

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    // ── Helpers ───────────────────────────────────────────────────────

    fn make_codec() -> Ak4619<MockI2c, MockDelay> {
        Ak4619::new(MockI2c::new(), MockDelay)
    }

    fn enabled_codec() -> Ak4619<MockI2c, MockDelay> {
        let mut c = make_codec();
        c.enable().unwrap();
        c
    }

    // ── Bring-up tests ────────────────────────────────────────────────

    #[test]
    fn enable_writes_default_sequence() {
        let mut codec = make_codec();
        codec.enable().unwrap();
        let (i2c, _) = codec.release();

        assert_eq!(i2c.log_count, 14);
        assert_eq!(i2c.last_addr, 0x10);
        assert_eq!(i2c.write_at(0), (reg::PWRMGM, 0x00));
        assert_eq!(i2c.write_at(1), (reg::PWRMGM, 0x36));
        assert_eq!(i2c.write_at(2), (reg::AUDFORM1, 0xAC));
        assert_eq!(i2c.write_at(3), (reg::AUDFORM2, 0x1C));
        assert_eq!(i2c.write_at(4), (reg::SYSCLKSET, 0x04));
        assert_eq!(i2c.write_at(5), (reg::MICGAIN1, 0x22));
        assert_eq!(i2c.write_at(6), (reg::MICGAIN2, 0x22));
        assert_eq!(i2c.write_at(7), (reg::DAC1LVOL, 0x18));
        assert_eq!(i2c.write_at(10), (reg::DAC2RVOL, 0x18));
        assert_eq!(i2c.write_at(11), (reg::ADCAIN, 0x55));
        assert_eq!(i2c.write_at(12), (reg::DACDIN, 0x04));
        assert_eq!(i2c.write_at(13), (reg::PWRMGM, 0x37));
    }

    #[test]
    fn alternate_address_is_used() {
        let mut codec = Ak4619::new_with_address(MockI2c::new(), MockDelay, reg::I2C_ADDR_ALT);
        codec.set_clock(ClockMode::Fs256Up48k).unwrap();
        let (i2c, _) = codec.release();
        assert_eq!(i2c.last_addr, 0x12);
    }

    #[test]
    fn bus_failure_aborts_configuration() {
        let mut i2c = MockI2c::new();
        i2c.fail_after = Some(3);
        let mut codec = Ak4619::new(i2c, MockDelay);
        assert_eq!(codec.enable(), Err(CodecError::Bus(MockError)));
        let (i2c, _) = codec.release();
        assert_eq!(i2c.log_count, 3);
        // Reset never released.
        assert_eq!(i2c.regs[reg::PWRMGM as usize] & reg::PWRMGM_RSTN, 0);
    }

    #[test]
    fn thirty_two_bit_output_rejected_before_bus_traffic() {
        let config = CodecConfig {
            output_length: DataLength::Bits32,
            ..CodecConfig::default()
        };
        let mut codec = make_codec().with_config(config);
        assert_eq!(codec.enable(), Err(CodecError::UnsupportedDataLength));
        let (i2c, _) = codec.release();
        assert_eq!(i2c.log_count, 0);
    }

    #[test]
    fn power_preserves_reset_bit() {
        let mut codec = enabled_codec();
        codec
            .set_power(Power { adc2: false, adc1: true, dac2: false, dac1: true })
            .unwrap();
        assert_eq!(codec.read_register(reg::PWRMGM).unwrap(), 0x13);
    }

    #[test]
    fn disable_resets_and_powers_down() {
        let mut codec = enabled_codec();
        codec.disable().unwrap();
        assert_eq!(codec.read_register(reg::PWRMGM).unwrap(), 0x00);
    }

    // ── Gain tests ────────────────────────────────────────────────────

    #[test]
    fn mic_gain_nibbles() {
        let mut codec = make_codec();
        codec
            .set_mic_gain([MicGain::Pos27dB, MicGain::Neg6dB, MicGain::Pos6dB, MicGain::Zero])
            .unwrap();
        let (i2c, _) = codec.release();
        assert_eq!(i2c.regs[reg::MICGAIN1 as usize], 0xB0);
        assert_eq!(i2c.regs[reg::MICGAIN2 as usize], 0x42);
    }

    #[test]
    fn adjust_mic_gain_clamps_selected_channels() {
        let mut codec = enabled_codec();
        codec.adjust_mic_gain([true, false, true, false], 20).unwrap();
        assert_eq!(
            codec.mic_gain().unwrap(),
            [MicGain::Pos27dB, MicGain::Zero, MicGain::Pos27dB, MicGain::Zero]
        );
        codec.adjust_mic_gain([true, true, false, false], -5).unwrap();
        assert_eq!(
            codec.mic_gain().unwrap(),
            [MicGain::Pos12dB, MicGain::Neg6dB, MicGain::Pos27dB, MicGain::Zero]
        );
    }

    #[test]
    fn dac_volume_single_channel() {
        let mut codec = enabled_codec();
        codec.set_dac_volume(DacChannel::Dac2Left, 0x48).unwrap();
        assert_eq!(codec.read_register(reg::DAC2LVOL).unwrap(), 0x48);
        assert_eq!(codec.read_register(reg::DAC2RVOL).unwrap(), 0x18);
    }

    #[test]
    fn adjust_dac_volume_saturates() {
        let mut codec = enabled_codec();
        codec.adjust_dac_volume(DacChannel::Dac1Both, -100).unwrap();
        assert_eq!(codec.read_register(reg::DAC1LVOL).unwrap(), 0x00);
        assert_eq!(codec.read_register(reg::DAC1RVOL).unwrap(), 0x00);

        codec.adjust_dac_volume(DacChannel::Dac2Right, 300).unwrap();
        assert_eq!(codec.read_register(reg::DAC2RVOL).unwrap(), 0xFF);
        assert_eq!(codec.read_register(reg::DAC2LVOL).unwrap(), 0x18);

        codec.adjust_dac_volume(DacChannel::Dac2Left, 0x18).unwrap();
        assert_eq!(codec.read_register(reg::DAC2LVOL).unwrap(), 0x30);
    }

    #[test]
    fn volume_maps_level_to_half_db_steps() {
        let mut codec = enabled_codec();
        codec.volume(1.0).unwrap();
        assert_eq!(codec.read_register(reg::DAC1LVOL).unwrap(), 0x18);
        // 0.5 is -6.02 dB, twelve half-dB steps.
        codec.volume(0.5).unwrap();
        assert_eq!(codec.read_register(reg::DAC2RVOL).unwrap(), 0x24);
        codec.volume(10.0).unwrap();
        assert_eq!(codec.read_register(reg::DAC1RVOL).unwrap(), 0x00);
        codec.volume(0.0).unwrap();
        assert_eq!(codec.read_register(reg::DAC2LVOL).unwrap(), 0xFF);
    }

    #[test]
    fn mute_via_trait_default() {
        let mut codec = enabled_codec();
        codec.mute().unwrap();
        assert_eq!(codec.read_register(reg::DAC1LVOL).unwrap(), reg::DAC_VOL_MUTE);
    }

    #[test]
    fn adc_mute_hpf_bits() {
        let mut codec = make_codec();
        codec.mute_adc_hpf(true, false, true, true, false).unwrap();
        assert_eq!(codec.read_register(reg::ADCMUTEHPF).unwrap(), 0xA4);
    }

    #[test]
    fn dump_reads_all_registers() {
        let codec = enabled_codec();
        let (mut i2c, delay) = codec.release();
        i2c.regs[reg::DACMUTFLT as usize] = 0x5A;
        let mut codec = Ak4619::new(i2c, delay);
        let regs = codec.dump_registers().unwrap();
        assert_eq!(regs[reg::PWRMGM as usize], 0x37);
        assert_eq!(regs[reg::DACDIN as usize], 0x04);
        assert_eq!(regs[reg::DACMUTFLT as usize], 0x5A);
    }

    #[test]
    fn format_codes_shared_between_tdm_widths() {
        assert_eq!(AudioFormat::Tdm128I2s32.bits(), AudioFormat::Tdm256I2s32.bits());
        assert_eq!(AudioFormat::Tdm256Msb32.bits(), AudioFormat::PcmLong32.bits());
    }
}
