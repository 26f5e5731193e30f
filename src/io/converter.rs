//! Numeric contracts between raw MIDI data and the voice core.
//!
//! Data bytes are scaled against the full byte range (`/ 255`) and the pitch
//! wheel pair against the full 16-bit range (`/ 65535`). Both scales are part
//! of the wire contract that downstream detune and gain mappings rely on, so
//! they are kept exactly as-is rather than rescaled to 7 and 14 bits.

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Scale a data byte (velocity, controller value) into `0.0..=1.0`.
#[inline]
pub fn normalize_data_byte(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Combine the two pitch wheel data bytes, low byte first.
#[inline]
pub fn normalize_pitch_wheel(lsb: u8, msb: u8) -> f32 {
    (lsb as f32 + msb as f32 * 256.0) / 65535.0
}

/// Recenter a unipolar `0..=1` control value to `-1..=1`.
#[inline]
pub fn to_bipolar(value: f32) -> f32 {
    value * 2.0 - 1.0
}

/// Inverse of [`to_bipolar`], used by producers that think in bend direction.
#[inline]
pub fn from_bipolar(value: f32) -> f32 {
    (value + 1.0) * 0.5
}

/// Frequency multiplier for a detune in cents: 2^(cents/1200)
#[inline]
pub fn detune_to_ratio(cents: f32) -> f32 {
    if cents == 0.0 {
        1.0
    } else {
        2.0_f32.powf(cents / 1200.0)
    }
}
