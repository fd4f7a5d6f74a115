//! Codec control seam.
//!
//! The pipeline configures the codec exactly once, before any transfer is
//! armed, through [`AudioControl::enable`]. A failure there is terminal:
//! [`Pipeline::start`](crate::pipeline::Pipeline::start) returns it and
//! leaves the peripheral idle.

/// Runtime control of an audio component (usually the codec).
pub trait AudioControl {
    /// Bus or device error.
    type Error;

    /// Bring the device up: timing, sample format per direction and gains.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Put the device into its lowest-power state.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Set the output level (0.0 = silent, 1.0 = unity).
    fn volume(&mut self, level: f32) -> Result<(), Self::Error>;

    /// Silence the output.
    fn mute(&mut self) -> Result<(), Self::Error> {
        self.volume(0.0)
    }
}

impl<T: AudioControl + ?Sized> AudioControl for &mut T {
    type Error = T::Error;

    fn enable(&mut self) -> Result<(), Self::Error> {
        (**self).enable()
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        (**self).disable()
    }

    fn volume(&mut self, level: f32) -> Result<(), Self::Error> {
        (**self).volume(level)
    }

    fn mute(&mut self) -> Result<(), Self::Error> {
        (**self).mute()
    }
}
