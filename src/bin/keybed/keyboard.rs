//! Computer keyboard as a note and controller source.
//!
//! Two rows of letter keys form a piano octave and a bit (A = C, W = C#, ...,
//! K = C one octave up). Key presses are translated into the same
//! `SynthMessage`s the MIDI decoder produces.
//!
//! Terminals that report key releases get normal press/release behavior.
//! Elsewhere a second press of the same key releases the note.

use std::{collections::HashMap, io::stdout, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, supports_keyboard_enhancement},
};

use keybed::{
    config::MAX_DETUNE_AMOUNT, dsp::oscillator::Waveform, io::converter::from_bipolar,
    synth::SynthMessage, SynthConfig,
};

use super::app::{send, EventSender};

/// Letter keys in semitone order starting from the base note.
const NOTE_KEYS: [char; 15] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k', 'o', 'l',
];

const BEND_STEP: f32 = 0.25;
const MOD_STEP: f32 = 0.25;
const DEFAULT_BASE_NOTE: u8 = 60;
const MAX_BASE_NOTE: u8 = 127 - (NOTE_KEYS.len() as u8 - 1);

const HELP: &str = "\
keys  a w s e d f t g y h u j k o l   play notes
      z / x                           octave down / up
      space                           sustain pedal toggle
      left / right                    pitch bend down / up
      down                            release pitch bend
      m                               mod wheel step
      1 2 3 4                         sine square sawtooth triangle
      p                               sticky pitch bend toggle
      [ / ]                           pitch bend range -/+ 1 semitone
      esc                             quit";

/// Keyboard → message translation state.
pub struct KeyMap {
    base_note: u8,
    sounding: HashMap<char, u8>,
    sustain: bool,
    bend: f32,
    modulation: f32,
    sticky: bool,
    detune_amount: f32,
    release_events: bool,
    quit: bool,
}

impl KeyMap {
    /// Sticky bend and bend range start from `config`, matching the voice manager.
    pub fn new(release_events: bool, config: &SynthConfig) -> Self {
        Self {
            base_note: DEFAULT_BASE_NOTE,
            sounding: HashMap::new(),
            sustain: false,
            bend: 0.0,
            modulation: 0.0,
            sticky: config.sticky_pitch_bend,
            detune_amount: config.detune_amount,
            release_events,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Translate one key event into zero or more messages.
    pub fn handle(&mut self, key: KeyEvent) -> Vec<SynthMessage> {
        if key.kind == KeyEventKind::Repeat {
            return Vec::new();
        }
        if key.kind == KeyEventKind::Release {
            return match key.code {
                KeyCode::Char(c) => self.release_note(c.to_ascii_lowercase()).into_iter().collect(),
                _ => Vec::new(),
            };
        }

        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            KeyCode::Char(c) => self.press_char(c.to_ascii_lowercase()),
            KeyCode::Left => self.bend_by(-BEND_STEP),
            KeyCode::Right => self.bend_by(BEND_STEP),
            KeyCode::Down => {
                self.bend = 0.0;
                vec![SynthMessage::PitchRelease]
            }
            _ => Vec::new(),
        }
    }

    fn press_char(&mut self, c: char) -> Vec<SynthMessage> {
        if let Some(offset) = NOTE_KEYS.iter().position(|&k| k == c) {
            if !self.release_events && self.sounding.contains_key(&c) {
                return self.release_note(c).into_iter().collect();
            }
            // A press while already held (lost release) retriggers
            let note = self.base_note + offset as u8;
            self.sounding.insert(c, note);
            return vec![SynthMessage::NoteOn {
                channel: 0,
                note,
                velocity: 0.5,
            }];
        }

        match c {
            'z' => self.shift_octave(-12),
            'x' => self.shift_octave(12),
            ' ' => {
                self.sustain = !self.sustain;
                vec![if self.sustain {
                    SynthMessage::SustainOn { channel: 0 }
                } else {
                    SynthMessage::SustainOff { channel: 0 }
                }]
            }
            'm' => {
                self.modulation = if self.modulation >= 1.0 {
                    0.0
                } else {
                    (self.modulation + MOD_STEP).min(1.0)
                };
                vec![SynthMessage::ModWheel {
                    value: self.modulation,
                }]
            }
            '1'..='4' => {
                let index = c as usize - '1' as usize;
                vec![SynthMessage::SetWaveform(Waveform::ALL[index])]
            }
            'p' => {
                self.sticky = !self.sticky;
                vec![SynthMessage::SetStickyPitchBend(self.sticky)]
            }
            '[' => self.change_range(-1.0),
            ']' => self.change_range(1.0),
            _ => Vec::new(),
        }
    }

    fn release_note(&mut self, c: char) -> Option<SynthMessage> {
        self.sounding
            .remove(&c)
            .map(|note| SynthMessage::NoteOff { channel: 0, note })
    }

    fn shift_octave(&mut self, semitones: i16) -> Vec<SynthMessage> {
        let base = (self.base_note as i16 + semitones).clamp(0, MAX_BASE_NOTE as i16);
        self.base_note = base as u8;
        Vec::new()
    }

    fn bend_by(&mut self, step: f32) -> Vec<SynthMessage> {
        self.bend = (self.bend + step).clamp(-1.0, 1.0);
        vec![SynthMessage::PitchWheel {
            value: from_bipolar(self.bend),
        }]
    }

    fn change_range(&mut self, step: f32) -> Vec<SynthMessage> {
        self.detune_amount = (self.detune_amount + step).clamp(0.0, MAX_DETUNE_AMOUNT);
        vec![SynthMessage::SetDetuneAmount(self.detune_amount)]
    }

    fn quit(&mut self) -> Vec<SynthMessage> {
        self.quit = true;
        vec![SynthMessage::AllNotesOff]
    }
}

/// Terminal event loop feeding the event queue.
pub struct KeyboardInput {
    tx: EventSender,
    config: SynthConfig,
}

impl KeyboardInput {
    pub fn new(tx: EventSender, config: &SynthConfig) -> Self {
        Self {
            tx,
            config: config.clone(),
        }
    }

    pub fn run(self) -> EyreResult<()> {
        println!("{HELP}\n");

        let release_events = supports_keyboard_enhancement().unwrap_or(false);
        terminal::enable_raw_mode()?;
        if release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            tracing::info!("terminal does not report key releases, press a note key again to release");
        }

        let result = self.event_loop(KeyMap::new(release_events, &self.config));

        if release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        result
    }

    fn event_loop(&self, mut keys: KeyMap) -> EyreResult<()> {
        while !keys.should_quit() {
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    for message in keys.handle(key) {
                        send(&self.tx, message);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    fn keymap(release_events: bool) -> KeyMap {
        KeyMap::new(release_events, &SynthConfig::default())
    }

    #[test]
    fn press_and_release_play_a_note() {
        let mut keys = keymap(true);
        assert_eq!(
            keys.handle(press(KeyCode::Char('a'))),
            vec![SynthMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 0.5
            }]
        );
        assert_eq!(
            keys.handle(release(KeyCode::Char('a'))),
            vec![SynthMessage::NoteOff {
                channel: 0,
                note: 60
            }]
        );
    }

    #[test]
    fn second_press_releases_without_release_events() {
        let mut keys = keymap(false);
        keys.handle(press(KeyCode::Char('k')));
        assert_eq!(
            keys.handle(press(KeyCode::Char('k'))),
            vec![SynthMessage::NoteOff {
                channel: 0,
                note: 72
            }]
        );
    }

    #[test]
    fn release_uses_note_from_press_time() {
        let mut keys = keymap(true);
        keys.handle(press(KeyCode::Char('a')));
        keys.handle(press(KeyCode::Char('x')));
        assert_eq!(
            keys.handle(release(KeyCode::Char('a'))),
            vec![SynthMessage::NoteOff {
                channel: 0,
                note: 60
            }]
        );
    }

    #[test]
    fn space_toggles_sustain() {
        let mut keys = keymap(true);
        assert_eq!(
            keys.handle(press(KeyCode::Char(' '))),
            vec![SynthMessage::SustainOn { channel: 0 }]
        );
        assert_eq!(
            keys.handle(press(KeyCode::Char(' '))),
            vec![SynthMessage::SustainOff { channel: 0 }]
        );
    }

    #[test]
    fn arrows_bend_and_release() {
        let mut keys = keymap(true);
        assert_eq!(
            keys.handle(press(KeyCode::Right)),
            vec![SynthMessage::PitchWheel { value: 0.625 }]
        );
        assert_eq!(
            keys.handle(press(KeyCode::Down)),
            vec![SynthMessage::PitchRelease]
        );
        for _ in 0..8 {
            keys.handle(press(KeyCode::Left));
        }
        assert_eq!(
            keys.handle(press(KeyCode::Left)),
            vec![SynthMessage::PitchWheel { value: 0.0 }]
        );
    }

    #[test]
    fn octave_shift_is_clamped() {
        let mut keys = keymap(true);
        for _ in 0..20 {
            keys.handle(press(KeyCode::Char('x')));
        }
        match keys.handle(press(KeyCode::Char('l'))).as_slice() {
            [SynthMessage::NoteOn { note, .. }] => assert_eq!(*note, 127),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn number_keys_pick_waveforms() {
        let mut keys = keymap(true);
        assert_eq!(
            keys.handle(press(KeyCode::Char('3'))),
            vec![SynthMessage::SetWaveform(Waveform::Sawtooth)]
        );
    }

    #[test]
    fn escape_quits_with_panic() {
        let mut keys = keymap(true);
        assert_eq!(keys.handle(press(KeyCode::Esc)), vec![SynthMessage::AllNotesOff]);
        assert!(keys.should_quit());
    }

    #[test]
    fn toggles_start_from_config() {
        let config = SynthConfig {
            sticky_pitch_bend: true,
            detune_amount: 12.0,
            ..SynthConfig::default()
        };
        let mut keys = KeyMap::new(true, &config);
        assert_eq!(
            keys.handle(press(KeyCode::Char('p'))),
            vec![SynthMessage::SetStickyPitchBend(false)]
        );
        assert_eq!(
            keys.handle(press(KeyCode::Char(']'))),
            vec![SynthMessage::SetDetuneAmount(13.0)]
        );
    }

    #[test]
    fn bend_range_clamps_to_config_limit() {
        let config = SynthConfig {
            detune_amount: MAX_DETUNE_AMOUNT,
            ..SynthConfig::default()
        };
        let mut keys = KeyMap::new(true, &config);
        assert_eq!(
            keys.handle(press(KeyCode::Char(']'))),
            vec![SynthMessage::SetDetuneAmount(MAX_DETUNE_AMOUNT)]
        );
        assert_eq!(
            keys.handle(press(KeyCode::Char('['))),
            vec![SynthMessage::SetDetuneAmount(MAX_DETUNE_AMOUNT - 1.0)]
        );
    }
}
