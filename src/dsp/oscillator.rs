use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/*
Oscillator Waveforms
====================

The four shapes a voice can be created with. The waveform is fixed when a
voice starts; changing the selection only affects voices started afterwards.

  Sine      fundamental only, smooth
  Square    odd harmonics, 1/n falloff, hollow
  Sawtooth  all harmonics, 1/n falloff, bright
  Triangle  odd harmonics, 1/n^2 falloff, soft

Phase runs 0.0 → 1.0 and wraps. Each sample advances it by freq / sample_rate.
These are naive (non band-limited) shapes; aliasing at high notes is accepted.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// Evaluate the waveform at `phase` (0.0 - 1.0).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * std::f32::consts::TAU).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Waveform::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidWaveform(s.to_string()))
    }
}

/// Phase-accumulating oscillator for a single voice.
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    /// Produce one sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = self.waveform.sample(self.phase);
        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();
        out
    }

    /// Fill `out` at a constant frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let frequency = 440.0;
        let mut osc = OscillatorBlock::new(Waveform::Sine);

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, frequency, sample_rate);

        let sample_index = 12;
        let expected = (TAU * frequency * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn shapes_stay_in_unit_range() {
        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0f32; 512];
            osc.render(&mut buffer, 1234.5, 48_000.0);
            assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)), "{waveform}");
        }
    }

    #[test]
    fn parses_supported_names() {
        assert_eq!("sine".parse::<Waveform>().unwrap(), Waveform::Sine);
        assert_eq!("Square".parse::<Waveform>().unwrap(), Waveform::Square);
        assert_eq!("sawtooth".parse::<Waveform>().unwrap(), Waveform::Sawtooth);
        assert_eq!(" triangle ".parse::<Waveform>().unwrap(), Waveform::Triangle);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "noise".parse::<Waveform>().unwrap_err();
        assert!(matches!(err, Error::InvalidWaveform(name) if name == "noise"));
        assert!("".parse::<Waveform>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        for waveform in Waveform::ALL {
            assert_eq!(waveform.to_string().parse::<Waveform>().unwrap(), waveform);
        }
    }
}
