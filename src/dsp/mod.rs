//! Low-level DSP primitives used by the reference engine.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! directly inside engine voices.

/// Linear release fade applied when a voice is stopped.
pub mod envelope;
/// Oscillator waveforms and the phase-accumulating oscillator.
pub mod oscillator;

pub use envelope::{RampStage, ReleaseRamp};
pub use oscillator::{OscillatorBlock, Waveform};
