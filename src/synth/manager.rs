//! Note lifecycle and live controller application.
//!
//! The manager owns the note → voice table, the set of notes held only by the
//! sustain pedal, and the controller state. It is the single consumer of
//! semantic events; producers reach it through [`VoiceManager::handle`] or
//! an [`EventBus`] built with [`voice_bus`].
//!
//! # Lifecycle
//!
//! ```text
//!                  note_on                 note_off (pedal up)
//!   (silent) ─────────────────→ Held ─────────────────────────→ stopped
//!       ↑                        │                                 ↑
//!       │ ended                  │ note_off (pedal down)           │ sustain_off
//!       │                        ↓                                 │
//!       └─────────────────── Sustained ────────────────────────────┘
//! ```
//!
//! A note has at most one voice. Pressing a sounding note force-stops the old
//! voice first, pedal or not. Stopping removes the note from the table at
//! once; the engine's later "ended" report for that handle then finds nothing
//! to clear. Ended reports are matched by handle, not by note, so a late
//! report for a retriggered note cannot remove its newer voice.

use crate::{
    config::SynthConfig,
    dsp::oscillator::Waveform,
    engine::{SynthesisEngine, VoiceHandle, VoiceParams},
    error::{check_range, Error, Result},
    io::converter::{midi_note_to_freq, to_bipolar},
    synth::{
        bus::EventBus,
        controller::ControllerState,
        message::{EventKind, SynthMessage},
        voice::{NoteSet, Voice},
    },
};

/// Number of addressable MIDI notes.
pub const NOTE_COUNT: usize = 128;

pub struct VoiceManager<E: SynthesisEngine> {
    engine: E,
    voices: [Option<Voice>; NOTE_COUNT],
    active_count: usize,
    sustained: NoteSet,
    sustain_active: bool,
    controls: ControllerState,
    default_velocity: f32,
}

impl<E: SynthesisEngine> VoiceManager<E> {
    pub fn new(engine: E, config: &SynthConfig) -> Result<Self> {
        config.validate()?;
        let controls = ControllerState::from_config(config)?;
        Ok(Self::with_controls(engine, controls, config.default_velocity))
    }

    pub fn with_controls(engine: E, controls: ControllerState, default_velocity: f32) -> Self {
        Self {
            engine,
            voices: [None; NOTE_COUNT],
            active_count: 0,
            sustained: NoteSet::new(),
            sustain_active: false,
            controls,
            default_velocity,
        }
    }

    /// Start a voice for `note`, replacing any voice already sounding it.
    ///
    /// `velocity` becomes the voice's initial gain; `None` uses the configured default.
    pub fn note_on(&mut self, note: u8, velocity: Option<f32>) -> Result<VoiceHandle> {
        let note = check_note(note)?;
        let gain = match velocity {
            Some(v) => check_range("velocity", v, 0.0, 1.0)?,
            None => self.default_velocity,
        };

        if self.voices[note as usize].is_some() {
            tracing::debug!(note, "retrigger, force-stopping previous voice");
            self.stop_voice(note);
        }

        let waveform = self.controls.waveform();
        let handle = self.engine.create_voice(VoiceParams {
            frequency: midi_note_to_freq(note),
            detune_cents: self.controls.detune(),
            waveform,
            gain,
        });

        self.voices[note as usize] = Some(Voice::new(note, handle, gain, waveform));
        self.active_count += 1;
        tracing::debug!(note, ?handle, gain, %waveform, "voice started");
        Ok(handle)
    }

    /// Release `note`, or defer the release while the sustain pedal is down.
    pub fn note_off(&mut self, note: u8) -> Result<()> {
        let note = check_note(note)?;
        if self.voices[note as usize].is_none() {
            return Ok(());
        }

        if self.sustain_active {
            if self.sustained.insert(note) {
                tracing::debug!(note, "release deferred by sustain");
            }
        } else {
            self.stop_voice(note);
        }
        Ok(())
    }

    /// Pedal down. Only releases that happen from now on are deferred.
    pub fn sustain_on(&mut self) {
        self.sustain_active = true;
    }

    /// Pedal up: stop every voice whose release was deferred.
    pub fn sustain_off(&mut self) {
        self.sustain_active = false;
        let deferred = self.sustained.take();
        for note in deferred.iter() {
            self.stop_voice(note);
        }
        if !deferred.is_empty() {
            tracing::debug!(released = deferred.len(), "sustain flushed");
        }
    }

    /// Bend to a bipolar position (-1.0 ..= 1.0) and retune every sounding voice.
    pub fn pitch_wheel(&mut self, bipolar: f32) -> Result<()> {
        self.controls.bend(bipolar)?;
        self.apply_detune();
        Ok(())
    }

    /// Pitch control returned to center. Recenters unless sticky bend is on.
    pub fn pitch_release(&mut self) {
        if self.controls.release() {
            self.apply_detune();
        }
    }

    pub fn set_detune_amount(&mut self, amount: f32) -> Result<()> {
        self.controls.set_detune_amount(amount)
    }

    /// Turning sticky bend off recenters like a pitch release.
    pub fn set_sticky_pitch_bend(&mut self, enabled: bool) {
        if self.controls.set_sticky_pitch_bend(enabled) {
            self.apply_detune();
        }
    }

    /// Select the waveform for voices started from now on, by name.
    pub fn set_waveform(&mut self, name: &str) -> Result<()> {
        self.set_waveform_kind(name.parse()?);
        Ok(())
    }

    pub fn set_waveform_kind(&mut self, waveform: Waveform) {
        self.controls.set_waveform(waveform);
    }

    pub fn mod_wheel(&mut self, value: f32) -> Result<()> {
        let value = self.controls.set_modulation(value)?;
        self.engine.set_modulation(value);
        Ok(())
    }

    /// Stop every voice immediately, sustained or not. Pedal state is kept.
    pub fn all_notes_off(&mut self) {
        for note in 0..NOTE_COUNT as u8 {
            self.stop_voice(note);
        }
        self.sustained.clear();
    }

    /// Completion callback: the engine voice behind `handle` has gone silent.
    ///
    /// Returns false when the handle no longer belongs to any note (already
    /// stopped, or superseded by a retrigger).
    pub fn on_voice_ended(&mut self, handle: VoiceHandle) -> bool {
        let Some(note) = self
            .voices
            .iter()
            .flatten()
            .find(|voice| voice.handle() == handle)
            .map(Voice::note)
        else {
            return false;
        };

        self.voices[note as usize] = None;
        self.active_count -= 1;
        self.sustained.remove(note);
        tracing::debug!(note, ?handle, "voice ended");
        true
    }

    /// Drain the engine's ended reports. Returns how many cleared a note.
    pub fn collect_ended(&mut self) -> usize {
        let mut cleared = 0;
        while let Some(handle) = self.engine.poll_ended() {
            if self.on_voice_ended(handle) {
                cleared += 1;
            }
        }
        cleared
    }

    /// Apply one semantic event. Pitch wheel values arrive unipolar and are
    /// recentered here. The MIDI channel is not used for routing.
    pub fn handle(&mut self, message: SynthMessage) -> Result<()> {
        match message {
            SynthMessage::NoteOn { note, velocity, .. } => {
                self.note_on(note, Some(velocity))?;
            }
            SynthMessage::NoteOff { note, .. } => self.note_off(note)?,
            SynthMessage::PitchWheel { value } => {
                let value = check_range("pitch wheel", value, 0.0, 1.0)?;
                self.pitch_wheel(to_bipolar(value))?;
            }
            SynthMessage::ModWheel { value } => self.mod_wheel(value)?,
            SynthMessage::SustainOn { .. } => self.sustain_on(),
            SynthMessage::SustainOff { .. } => self.sustain_off(),
            SynthMessage::PitchRelease => self.pitch_release(),
            SynthMessage::AllNotesOff => self.all_notes_off(),
            SynthMessage::SetWaveform(waveform) => self.set_waveform_kind(waveform),
            SynthMessage::SetDetuneAmount(amount) => self.set_detune_amount(amount)?,
            SynthMessage::SetStickyPitchBend(enabled) => self.set_sticky_pitch_bend(enabled),
        }
        Ok(())
    }

    pub fn is_active(&self, note: u8) -> bool {
        self.voice(note).is_some()
    }

    pub fn voice(&self, note: u8) -> Option<&Voice> {
        self.voices.get(note as usize).and_then(Option::as_ref)
    }

    /// Sounding voices in ascending note order.
    pub fn active_voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter().flatten()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Notes released while the pedal was down and still sounding.
    pub fn sustained_notes(&self) -> &NoteSet {
        &self.sustained
    }

    pub fn is_sustained(&self, note: u8) -> bool {
        note < NOTE_COUNT as u8 && self.sustained.contains(note)
    }

    pub fn sustain_active(&self) -> bool {
        self.sustain_active
    }

    pub fn controls(&self) -> &ControllerState {
        &self.controls
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn stop_voice(&mut self, note: u8) {
        if let Some(voice) = self.voices[note as usize].take() {
            self.engine.stop(voice.handle());
            self.active_count -= 1;
            self.sustained.remove(note);
            tracing::debug!(note, handle = ?voice.handle(), "voice stopped");
        }
    }

    fn apply_detune(&mut self) {
        let cents = self.controls.detune();
        for voice in self.voices.iter().flatten() {
            self.engine.set_detune(voice.handle(), cents);
        }
    }
}

fn check_note(note: u8) -> Result<u8> {
    if (note as usize) < NOTE_COUNT {
        Ok(note)
    } else {
        Err(Error::NoteOutOfRange(note))
    }
}

/// Bus with every event kind routed to [`VoiceManager::handle`].
pub fn voice_bus<E: SynthesisEngine + 'static>() -> EventBus<VoiceManager<E>> {
    let mut bus = EventBus::new();
    for kind in EventKind::ALL {
        bus.subscribe(kind, |manager: &mut VoiceManager<E>, message| {
            manager.handle(*message)
        });
    }
    bus
}
