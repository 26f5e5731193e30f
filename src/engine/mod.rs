//! The synthesis engine boundary.
//!
//! The voice core never touches audio directly. It drives an implementation
//! of [`SynthesisEngine`] that owns oscillators, gains, and the audio clock,
//! and refers to each sounding voice only through an opaque [`VoiceHandle`].
//! Handles carry a generation so a handle to a voice that has since ended is
//! inert, even if its slot was reused for a newer voice.

pub mod allocator;
pub mod block;

pub use allocator::SlotArena;
pub use block::BlockEngine;

use crate::dsp::oscillator::Waveform;

/// Opaque reference to one engine voice (oscillator + gain pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle {
    index: u32,
    generation: u32,
}

impl VoiceHandle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Everything an engine needs to start a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Base pitch in Hz, before detune.
    pub frequency: f32,
    /// Detune in cents (100 cents = 1 semitone).
    pub detune_cents: f32,
    pub waveform: Waveform,
    /// Initial gain, 0.0 - 1.0.
    pub gain: f32,
}

/// Audio backend driven by the voice manager.
///
/// `stop` only requests a release. When the voice has actually gone silent
/// the engine reports its handle through [`SynthesisEngine::poll_ended`].
/// Every operation on a stale handle must be a no-op.
pub trait SynthesisEngine {
    fn create_voice(&mut self, params: VoiceParams) -> VoiceHandle;

    fn set_detune(&mut self, voice: VoiceHandle, cents: f32);

    fn stop(&mut self, voice: VoiceHandle);

    /// Normalized modulation wheel position. What it modulates is up to the engine.
    fn set_modulation(&mut self, _value: f32) {
        // Default: no modulation target
    }

    /// Next voice that finished on its own or after a stop, if any.
    fn poll_ended(&mut self) -> Option<VoiceHandle> {
        None
    }
}

/// Allow boxed engines to be used as engines (for dynamic dispatch)
impl<E: SynthesisEngine + ?Sized> SynthesisEngine for Box<E> {
    fn create_voice(&mut self, params: VoiceParams) -> VoiceHandle {
        (**self).create_voice(params)
    }

    fn set_detune(&mut self, voice: VoiceHandle, cents: f32) {
        (**self).set_detune(voice, cents)
    }

    fn stop(&mut self, voice: VoiceHandle) {
        (**self).stop(voice)
    }

    fn set_modulation(&mut self, value: f32) {
        (**self).set_modulation(value)
    }

    fn poll_ended(&mut self) -> Option<VoiceHandle> {
        (**self).poll_ended()
    }
}
