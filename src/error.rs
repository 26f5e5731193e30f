//! Error types for boundary validation and configuration loading.
//!
//! Unsupported MIDI traffic and operations on notes that are not sounding are
//! not errors; they are dropped where they occur. The variants here describe
//! caller contract violations (a producer sent something it never should) and
//! configuration problems.

/// Errors raised at the edges of the voice core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Waveform name is not one of sine, square, sawtooth, triangle.
    #[error("unknown waveform: {0}")]
    InvalidWaveform(String),

    /// MIDI note numbers are 7-bit.
    #[error("note {0} is outside the MIDI range 0-127")]
    NoteOutOfRange(u8),

    /// A controller, velocity, or config value was non-finite or out of range.
    #[error("{name} value {value} is out of range")]
    ValueOutOfRange {
        /// Which parameter was rejected.
        name: &'static str,
        /// The offending value.
        value: f32,
    },

    /// Config file contents could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for the voice core.
pub type Result<T> = std::result::Result<T, Error>;

/// Reject non-finite values and values outside `min..=max`.
pub(crate) fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<f32> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Error::ValueOutOfRange { name, value })
    }
}
