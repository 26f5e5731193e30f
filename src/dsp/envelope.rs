/*
Release Ramp
============

Voices in this crate have no attack/decay shaping: a voice sounds at its
initial gain from the moment it is created. What they do need is a short fade
when stopped, otherwise cutting a running oscillator clicks.

  Level
    1.0 ──────────────┐
                      │╲
                      │ ╲
    0.0 ──────────────┼──╲────→ Time
                     stop  finished

The ramp is linear. At trigger time we snapshot the current level and the
total number of samples for the fade, then interpolate so the last sample is
exactly 0.0. A finished ramp is what tells the engine the voice has ended.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStage {
    Holding,   // Gate high, level = 1
    Releasing, // Fading toward 0
    Finished,  // Reached 0, voice can be freed
}

pub struct ReleaseRamp {
    stage: RampStage,
    level: f32,

    // Release bookkeeping (pre-calculated at trigger for precision)
    start_level: f32,
    total_samples: u32,
    elapsed_samples: u32,
}

impl ReleaseRamp {
    pub fn new() -> Self {
        Self {
            stage: RampStage::Holding,
            level: 1.0,
            start_level: 1.0,
            total_samples: 1,
            elapsed_samples: 0,
        }
    }

    /// Begin fading from the current level. Repeated triggers are ignored.
    pub fn trigger(&mut self, release_seconds: f32, sample_rate: f32) {
        if self.stage != RampStage::Holding {
            return;
        }

        self.start_level = self.level;
        self.total_samples = (release_seconds * sample_rate).round().max(1.0) as u32;
        self.elapsed_samples = 0;
        self.stage = RampStage::Releasing;
    }

    /// Advance by one sample and return the gain multiplier for it.
    #[inline]
    pub fn next_level(&mut self) -> f32 {
        if self.stage == RampStage::Releasing {
            self.elapsed_samples += 1;
            if self.elapsed_samples >= self.total_samples {
                self.level = 0.0;
                self.stage = RampStage::Finished;
            } else {
                let t = self.elapsed_samples as f32 / self.total_samples as f32;
                self.level = self.start_level * (1.0 - t);
            }
        }
        self.level
    }

    pub fn stage(&self) -> RampStage {
        self.stage
    }

    pub fn is_finished(&self) -> bool {
        self.stage == RampStage::Finished
    }
}

impl Default for ReleaseRamp {
    fn default() -> Self {
        Self::new()
    }
}
