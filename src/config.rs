//! Runtime configuration for the voice core, reference engine, and MIDI input.
//!
//! Every field has a default, so a config file only needs the values it wants
//! to change:
//!
//! ```toml
//! waveform = "sawtooth"
//! detune_amount = 2.0
//! sticky_pitch_bend = true
//! midi_port_filter = "Keystation"
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::Waveform,
    error::{check_range, Result},
};

/// Longest accepted stop fade, in seconds.
pub const MAX_RELEASE_SECONDS: f32 = 10.0;
/// Largest pitch-wheel scaling (±48 semitones at full bend).
pub const MAX_DETUNE_AMOUNT: f32 = 48.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Initial gain for note-ons that arrive without a velocity.
    pub default_velocity: f32,
    /// Pitch-wheel scaling: full bend = `detune_amount * 100` cents.
    pub detune_amount: f32,
    pub sticky_pitch_bend: bool,
    pub waveform: Waveform,
    /// Fade applied by the reference engine when a voice is stopped.
    pub release_seconds: f32,
    pub vibrato_hz: f32,
    /// Vibrato depth at full mod wheel.
    pub vibrato_depth_cents: f32,
    /// Capacity of the producer → audio thread event queue.
    pub queue_capacity: usize,
    pub midi_client_name: String,
    /// Only connect MIDI inputs whose port name contains this text.
    pub midi_port_filter: Option<String>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            default_velocity: 0.2,
            detune_amount: 1.0,
            sticky_pitch_bend: false,
            waveform: Waveform::Sine,
            release_seconds: 0.05,
            vibrato_hz: 5.5,
            vibrato_depth_cents: 50.0,
            queue_capacity: 256,
            midi_client_name: "keybed".to_string(),
            midi_port_filter: None,
        }
    }
}

impl SynthConfig {
    /// Reject values the voice core or engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        check_range("default_velocity", self.default_velocity, 0.0, 1.0)?;
        check_range("detune_amount", self.detune_amount, 0.0, MAX_DETUNE_AMOUNT)?;
        check_range("release_seconds", self.release_seconds, 0.0, MAX_RELEASE_SECONDS)?;
        check_range("vibrato_hz", self.vibrato_hz, 0.0, 100.0)?;
        check_range("vibrato_depth_cents", self.vibrato_depth_cents, 0.0, 1200.0)?;
        if self.queue_capacity == 0 {
            return Err(crate::Error::ValueOutOfRange {
                name: "queue_capacity",
                value: 0.0,
            });
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl SynthConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SynthConfig =
            toml::from_str(text).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
