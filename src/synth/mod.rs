// Purpose: semantic events, their dispatch, and per-note voice lifecycle
// This layer sits between the MIDI decoder and the synthesis engine

pub mod bus;
pub mod controller;
pub mod manager;
pub mod message;
pub mod voice;

pub use bus::{EventBus, SubscriptionId};
pub use controller::ControllerState;
pub use manager::{voice_bus, VoiceManager};
pub use message::{EventKind, MessageReceiver, SynthMessage};
pub use voice::{NoteSet, Voice};
