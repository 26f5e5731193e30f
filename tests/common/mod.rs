//! Recording engine shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use keybed::engine::{SynthesisEngine, VoiceHandle, VoiceParams};

#[derive(Debug, Clone, Copy)]
pub struct MockVoice {
    pub params: VoiceParams,
    pub detune: f32,
    pub stopped: bool,
}

/// Engine that keeps every voice until told to finish it.
#[derive(Default)]
pub struct MockEngine {
    next: u32,
    pub voices: HashMap<VoiceHandle, MockVoice>,
    pub minted: Vec<VoiceHandle>,
    ended: VecDeque<VoiceHandle>,
    pub modulation: f32,
}

impl MockEngine {
    /// Simulate the audio side finishing a voice (natural end or end of fade).
    pub fn finish(&mut self, handle: VoiceHandle) {
        if self.voices.remove(&handle).is_some() {
            self.ended.push_back(handle);
        }
    }

    /// Finish every voice that has been asked to stop.
    pub fn finish_stopped(&mut self) {
        let stopped: Vec<_> = self
            .voices
            .iter()
            .filter(|(_, v)| v.stopped)
            .map(|(h, _)| *h)
            .collect();
        for handle in stopped {
            self.finish(handle);
        }
    }

    /// Voices that exist and have not been asked to stop.
    pub fn sounding(&self) -> usize {
        self.voices.values().filter(|v| !v.stopped).count()
    }

    pub fn voice(&self, handle: VoiceHandle) -> Option<&MockVoice> {
        self.voices.get(&handle)
    }
}

impl SynthesisEngine for MockEngine {
    fn create_voice(&mut self, params: VoiceParams) -> VoiceHandle {
        let handle = VoiceHandle::new(self.next, 0);
        self.next += 1;
        self.minted.push(handle);
        self.voices.insert(
            handle,
            MockVoice {
                params,
                detune: params.detune_cents,
                stopped: false,
            },
        );
        handle
    }

    fn set_detune(&mut self, voice: VoiceHandle, cents: f32) {
        if let Some(v) = self.voices.get_mut(&voice) {
            v.detune = cents;
        }
    }

    fn stop(&mut self, voice: VoiceHandle) {
        if let Some(v) = self.voices.get_mut(&voice) {
            v.stopped = true;
        }
    }

    fn set_modulation(&mut self, value: f32) {
        self.modulation = value;
    }

    fn poll_ended(&mut self) -> Option<VoiceHandle> {
        self.ended.pop_front()
    }
}
