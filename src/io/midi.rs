//! Raw three-byte MIDI messages → semantic [`SynthMessage`]s.
//!
//! Decoding is stateless: every message stands alone, there is no running
//! status and nothing is remembered between calls. Anything the voice core
//! has no use for (system messages, aftertouch, program change, unmapped
//! controllers) decodes to `None` and is dropped without complaint.

use crate::{
    io::converter::{normalize_data_byte, normalize_pitch_wheel},
    synth::message::SynthMessage,
};

/// Controller number of the modulation wheel (coarse).
pub const CC_MOD_WHEEL: u8 = 0x01;
/// Controller number of the sustain (damper) pedal.
pub const CC_SUSTAIN: u8 = 0x40;

/// Number of MIDI channels folded into each status nibble.
pub const CHANNELS: u8 = 16;

/// Channel voice commands the decoder understands, by status base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MidiStatus {
    NoteOff = 0x80,
    NoteOn = 0x90,
    ControlChange = 0xB0,
    PitchWheel = 0xE0,
}

impl MidiStatus {
    /// Lowest status byte accepted.
    pub const FIRST: u8 = MidiStatus::NoteOff as u8;
    /// One past the highest status byte accepted (pitch wheel, channel 16).
    pub const END: u8 = MidiStatus::PitchWheel as u8 + CHANNELS;

    fn from_command(command: u8) -> Option<Self> {
        match command {
            0x80 => Some(MidiStatus::NoteOff),
            0x90 => Some(MidiStatus::NoteOn),
            0xB0 => Some(MidiStatus::ControlChange),
            0xE0 => Some(MidiStatus::PitchWheel),
            _ => None,
        }
    }
}

/// Split a status byte into (command, channel).
#[inline]
pub fn split_status(status: u8) -> (u8, u8) {
    let channel = status % CHANNELS;
    (status - channel, channel)
}

/// Decode one three-byte MIDI message.
///
/// - Note on with velocity 0 is a note off.
/// - Velocity and controller values are scaled by 1/255.
/// - Pitch wheel data is combined low byte first and scaled by 1/65535.
/// - Sustain counts as pressed for any non-zero value.
pub fn decode(bytes: &[u8; 3]) -> Option<SynthMessage> {
    let [status, data1, data2] = *bytes;
    if !(MidiStatus::FIRST..MidiStatus::END).contains(&status) {
        return None;
    }

    let (command, channel) = split_status(status);
    let event = match MidiStatus::from_command(command)? {
        MidiStatus::NoteOn | MidiStatus::NoteOff => {
            let velocity = normalize_data_byte(data2);
            if command == MidiStatus::NoteOn as u8 && velocity != 0.0 {
                SynthMessage::NoteOn {
                    channel,
                    note: data1,
                    velocity,
                }
            } else {
                SynthMessage::NoteOff {
                    channel,
                    note: data1,
                }
            }
        }
        MidiStatus::PitchWheel => SynthMessage::PitchWheel {
            value: normalize_pitch_wheel(data1, data2),
        },
        MidiStatus::ControlChange => match data1 {
            CC_MOD_WHEEL => SynthMessage::ModWheel {
                value: normalize_data_byte(data2),
            },
            CC_SUSTAIN if data2 != 0 => SynthMessage::SustainOn { channel },
            CC_SUSTAIN => SynthMessage::SustainOff { channel },
            _ => return None,
        },
    };

    tracing::trace!(?bytes, ?event, "decoded MIDI message");
    Some(event)
}

/// Decode a message of arbitrary length as delivered by a MIDI driver.
///
/// Only three-byte messages can carry an event the core understands.
pub fn decode_bytes(bytes: &[u8]) -> Option<SynthMessage> {
    let triplet: &[u8; 3] = bytes.try_into().ok()?;
    decode(triplet)
}
