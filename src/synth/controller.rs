//! Continuous controller state: pitch bend detune, waveform selection, and
//! the modulation wheel.
//!
//! This is pure bookkeeping. Applying a new detune to sounding voices is the
//! voice manager's job; the methods here only report when that is needed.

use crate::{
    config::{SynthConfig, MAX_DETUNE_AMOUNT},
    dsp::oscillator::Waveform,
    error::{check_range, Result},
};

/// Cents per unit of detune amount at full bend.
pub const CENTS_PER_SEMITONE: f32 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    detune: f32,
    detune_amount: f32,
    sticky_pitch_bend: bool,
    waveform: Waveform,
    modulation: f32,
}

impl ControllerState {
    pub fn new(detune_amount: f32, sticky_pitch_bend: bool, waveform: Waveform) -> Result<Self> {
        Ok(Self {
            detune: 0.0,
            detune_amount: check_range("detune amount", detune_amount, 0.0, MAX_DETUNE_AMOUNT)?,
            sticky_pitch_bend,
            waveform,
            modulation: 0.0,
        })
    }

    pub fn from_config(config: &SynthConfig) -> Result<Self> {
        Self::new(
            config.detune_amount,
            config.sticky_pitch_bend,
            config.waveform,
        )
    }

    /// Set detune from a bipolar bend position (-1.0 ..= 1.0). Returns the new detune in cents.
    pub fn bend(&mut self, bipolar: f32) -> Result<f32> {
        let bipolar = check_range("pitch bend", bipolar, -1.0, 1.0)?;
        self.detune = bipolar * self.detune_amount * CENTS_PER_SEMITONE;
        Ok(self.detune)
    }

    /// The pitch control returned to center. Returns true if detune was reset.
    ///
    /// With sticky bend enabled the last bend is kept.
    pub fn release(&mut self) -> bool {
        if self.sticky_pitch_bend {
            return false;
        }
        self.detune = 0.0;
        true
    }

    /// Only affects future bends; the detune currently applied is left as-is.
    pub fn set_detune_amount(&mut self, amount: f32) -> Result<()> {
        self.detune_amount = check_range("detune amount", amount, 0.0, MAX_DETUNE_AMOUNT)?;
        Ok(())
    }

    /// Returns true if turning sticky bend off reset the detune. Re-sending
    /// the current setting changes nothing.
    pub fn set_sticky_pitch_bend(&mut self, enabled: bool) -> bool {
        let was_sticky = self.sticky_pitch_bend;
        self.sticky_pitch_bend = enabled;
        was_sticky && !enabled && self.release()
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn set_modulation(&mut self, value: f32) -> Result<f32> {
        self.modulation = check_range("mod wheel", value, 0.0, 1.0)?;
        Ok(self.modulation)
    }

    /// Current detune in cents.
    pub fn detune(&self) -> f32 {
        self.detune
    }

    pub fn detune_amount(&self) -> f32 {
        self.detune_amount
    }

    pub fn sticky_pitch_bend(&self) -> bool {
        self.sticky_pitch_bend
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn modulation(&self) -> f32 {
        self.modulation
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            detune: 0.0,
            detune_amount: 1.0,
            sticky_pitch_bend: false,
            waveform: Waveform::Sine,
            modulation: 0.0,
        }
    }
}
