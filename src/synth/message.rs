#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::dsp::oscillator::Waveform;

/// Semantic events flowing from producers (MIDI input, UI) to the voice core.
///
/// The first six variants are what the MIDI decoder emits. The rest only come
/// from the composition root: an explicit pitch-release signal, a panic, and
/// controller settings that must reach the single owner of voice state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { channel: u8, note: u8, velocity: f32 },
    NoteOff { channel: u8, note: u8 },
    /// Unipolar 0..=1; recentered to bipolar before it reaches the manager.
    PitchWheel { value: f32 },
    ModWheel { value: f32 },
    SustainOn { channel: u8 },
    SustainOff { channel: u8 },
    /// The physical pitch control was let go and returned to center.
    PitchRelease,
    AllNotesOff,
    SetWaveform(Waveform),
    SetDetuneAmount(f32),
    SetStickyPitchBend(bool),
}

/// Channel types a bus subscriber can register against, one per message variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    NoteOn,
    NoteOff,
    PitchWheel,
    ModWheel,
    SustainOn,
    SustainOff,
    PitchRelease,
    AllNotesOff,
    SetWaveform,
    SetDetuneAmount,
    SetStickyPitchBend,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        EventKind::NoteOn,
        EventKind::NoteOff,
        EventKind::PitchWheel,
        EventKind::ModWheel,
        EventKind::SustainOn,
        EventKind::SustainOff,
        EventKind::PitchRelease,
        EventKind::AllNotesOff,
        EventKind::SetWaveform,
        EventKind::SetDetuneAmount,
        EventKind::SetStickyPitchBend,
    ];
}

impl SynthMessage {
    pub fn kind(&self) -> EventKind {
        match self {
            SynthMessage::NoteOn { .. } => EventKind::NoteOn,
            SynthMessage::NoteOff { .. } => EventKind::NoteOff,
            SynthMessage::PitchWheel { .. } => EventKind::PitchWheel,
            SynthMessage::ModWheel { .. } => EventKind::ModWheel,
            SynthMessage::SustainOn { .. } => EventKind::SustainOn,
            SynthMessage::SustainOff { .. } => EventKind::SustainOff,
            SynthMessage::PitchRelease => EventKind::PitchRelease,
            SynthMessage::AllNotesOff => EventKind::AllNotesOff,
            SynthMessage::SetWaveform(_) => EventKind::SetWaveform,
            SynthMessage::SetDetuneAmount(_) => EventKind::SetDetuneAmount,
            SynthMessage::SetStickyPitchBend(_) => EventKind::SetStickyPitchBend,
        }
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Plain queues work as receivers too (tests, offline rendering).
impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
