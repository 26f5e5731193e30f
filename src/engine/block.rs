//! Block-rendering reference engine.
//!
//! Each voice is an [`OscillatorBlock`] times a fixed gain, multiplied by a
//! [`ReleaseRamp`] once stopped. Voices are mixed to mono. The modulation
//! wheel drives a shared vibrato LFO whose depth scales with the wheel.

use std::collections::VecDeque;

use crate::{
    config::SynthConfig,
    dsp::{envelope::ReleaseRamp, oscillator::OscillatorBlock},
    engine::{SlotArena, SynthesisEngine, VoiceHandle, VoiceParams},
    io::converter::detune_to_ratio,
};

struct EngineVoice {
    osc: OscillatorBlock,
    frequency: f32,
    detune_ratio: f32,
    gain: f32,
    ramp: ReleaseRamp,
}

pub struct BlockEngine {
    sample_rate: f32,
    release_seconds: f32,
    vibrato_hz: f32,
    vibrato_depth_cents: f32,
    modulation: f32,
    lfo_phase: f32,
    voices: SlotArena<EngineVoice>,
    ended: VecDeque<VoiceHandle>,
}

impl BlockEngine {
    pub fn new(sample_rate: f32, config: &SynthConfig) -> Self {
        Self {
            sample_rate,
            release_seconds: config.release_seconds,
            vibrato_hz: config.vibrato_hz,
            vibrato_depth_cents: config.vibrato_depth_cents,
            modulation: 0.0,
            lfo_phase: 0.0,
            voices: SlotArena::with_capacity(32),
            ended: VecDeque::with_capacity(32),
        }
    }

    /// Mix all live voices into `out`, then retire voices whose fade finished.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        if self.voices.is_empty() {
            return;
        }

        let lfo_step = self.vibrato_hz / self.sample_rate;
        let depth = self.vibrato_depth_cents * self.modulation;

        for sample in out.iter_mut() {
            let vibrato = if depth > 0.0 {
                detune_to_ratio(depth * (self.lfo_phase * std::f32::consts::TAU).sin())
            } else {
                1.0
            };
            self.lfo_phase = (self.lfo_phase + lfo_step).fract();

            for (_, voice) in self.voices.iter_mut() {
                let freq = voice.frequency * voice.detune_ratio * vibrato;
                let level = voice.ramp.next_level();
                *sample += voice.osc.next_sample(freq, self.sample_rate) * voice.gain * level;
            }
        }

        let ended = &mut self.ended;
        self.voices.remove_where(
            |voice| voice.ramp.is_finished(),
            |handle, _| ended.push_back(handle),
        );
    }

    pub fn live_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn is_live(&self, voice: VoiceHandle) -> bool {
        self.voices.contains(voice)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl SynthesisEngine for BlockEngine {
    fn create_voice(&mut self, params: VoiceParams) -> VoiceHandle {
        self.voices.insert(EngineVoice {
            osc: OscillatorBlock::new(params.waveform),
            frequency: params.frequency,
            detune_ratio: detune_to_ratio(params.detune_cents),
            gain: params.gain,
            ramp: ReleaseRamp::new(),
        })
    }

    fn set_detune(&mut self, voice: VoiceHandle, cents: f32) {
        if let Some(voice) = self.voices.get_mut(voice) {
            voice.detune_ratio = detune_to_ratio(cents);
        }
    }

    fn stop(&mut self, voice: VoiceHandle) {
        if let Some(voice) = self.voices.get_mut(voice) {
            voice.ramp.trigger(self.release_seconds, self.sample_rate);
        }
    }

    fn set_modulation(&mut self, value: f32) {
        self.modulation = value.clamp(0.0, 1.0);
    }

    fn poll_ended(&mut self) -> Option<VoiceHandle> {
        self.ended.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Waveform;

    fn params(frequency: f32) -> VoiceParams {
        VoiceParams {
            frequency,
            detune_cents: 0.0,
            waveform: Waveform::Square,
            gain: 0.2,
        }
    }

    fn engine() -> BlockEngine {
        let config = SynthConfig {
            release_seconds: 0.001,
            ..SynthConfig::default()
        };
        BlockEngine::new(48_000.0, &config)
    }

    #[test]
    fn renders_silence_with_no_voices() {
        let mut engine = engine();
        let mut buffer = vec![1.0f32; 128];
        engine.render(&mut buffer);
        assert!(buffer.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn voice_output_is_scaled_by_gain() {
        let mut engine = engine();
        engine.create_voice(params(440.0));

        let mut buffer = vec![0.0f32; 256];
        engine.render(&mut buffer);
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!((peak - 0.2).abs() < 1e-6, "peak {peak}");
    }

    #[test]
    fn stopped_voice_fades_then_reports_ended() {
        let mut engine = engine();
        let handle = engine.create_voice(params(440.0));
        engine.stop(handle);
        assert_eq!(engine.poll_ended(), None);

        let mut buffer = vec![0.0f32; 128]; // longer than the 48-sample fade
        engine.render(&mut buffer);

        assert_eq!(engine.poll_ended(), Some(handle));
        assert_eq!(engine.poll_ended(), None);
        assert!(!engine.is_live(handle));
        assert_eq!(*buffer.last().unwrap(), 0.0);
    }

    #[test]
    fn stale_handles_are_inert() {
        let mut engine = engine();
        let old = engine.create_voice(params(440.0));
        engine.stop(old);
        let mut buffer = vec![0.0f32; 128];
        engine.render(&mut buffer);
        engine.poll_ended();

        let new = engine.create_voice(params(220.0));
        engine.stop(old);
        engine.set_detune(old, 100.0);
        engine.render(&mut buffer);

        assert!(engine.is_live(new));
        assert_eq!(engine.poll_ended(), None);
    }

    #[test]
    fn detune_shifts_pitch() {
        let mut plain = engine();
        let mut bent = engine();
        plain.create_voice(params(100.0));
        let handle = bent.create_voice(params(100.0));
        bent.set_detune(handle, 1200.0);

        // 100 ms: ~20 sign flips at 100 Hz, ~40 an octave up.
        let mut a = vec![0.0f32; 4800];
        let mut b = vec![0.0f32; 4800];
        plain.render(&mut a);
        bent.render(&mut b);
        let flips = |buf: &[f32]| buf.windows(2).filter(|w| w[0] != w[1]).count() as i64;
        assert!((flips(&b) - 2 * flips(&a)).abs() <= 2, "{} vs {}", flips(&b), flips(&a));
    }
}
