use crate::{dsp::oscillator::Waveform, engine::VoiceHandle};

/// Voice manager's record of one sounding note.
///
/// The audio resources behind `handle` belong to the engine; this only tracks
/// which engine voice currently speaks for `note`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    note: u8,
    handle: VoiceHandle,
    gain: f32,
    waveform: Waveform,
}

impl Voice {
    pub fn new(note: u8, handle: VoiceHandle, gain: f32, waveform: Waveform) -> Self {
        Self {
            note,
            handle,
            gain,
            waveform,
        }
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn handle(&self) -> VoiceHandle {
        self.handle
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}

/// Set of MIDI notes packed into a single `u128`, one bit per note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteSet(u128);

impl NoteSet {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Returns true if the note was not already present.
    pub fn insert(&mut self, note: u8) -> bool {
        let bit = Self::bit(note);
        let added = self.0 & bit == 0;
        self.0 |= bit;
        added
    }

    /// Returns true if the note was present.
    pub fn remove(&mut self, note: u8) -> bool {
        let bit = Self::bit(note);
        let present = self.0 & bit != 0;
        self.0 &= !bit;
        present
    }

    pub fn contains(&self, note: u8) -> bool {
        self.0 & Self::bit(note) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Take every note out of the set, leaving it empty.
    pub fn take(&mut self) -> NoteSet {
        std::mem::take(self)
    }

    /// Notes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> {
        let bits = self.0;
        (0..128u8).filter(move |note| bits & (1u128 << note) != 0)
    }

    #[inline]
    fn bit(note: u8) -> u128 {
        1u128 << (note & 0x7F)
    }
}
