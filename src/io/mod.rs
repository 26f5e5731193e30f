// Purpose - external interfaces: MIDI wire format, device input, numeric conversions

pub mod converter;
pub mod input;
pub mod midi;
