//! MIDI decoding and per-note voice lifecycle for playable synthesizers.
//!
//! ```text
//! raw bytes → io::midi::decode → SynthMessage → EventBus → VoiceManager → SynthesisEngine
//! ```
//!
//! The voice core is engine-agnostic: [`synth::VoiceManager`] drives any
//! [`engine::SynthesisEngine`]. [`engine::BlockEngine`] is a small reference
//! engine for offline rendering and the `keybed` binary.

pub mod config;
pub mod dsp;
pub mod engine; // Synthesis engine boundary and reference engine
pub mod error;
pub mod io;
pub mod synth; // Semantic events, dispatch, and voice management

pub use config::SynthConfig;
pub use error::{Error, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
