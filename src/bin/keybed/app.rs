//! Keybed - composition root
//!
//! Wires producers (MIDI input, computer keyboard) to the single consumer
//! (voice manager inside the audio callback) through one rtrb queue.

use std::sync::{Arc, Mutex};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};

use keybed::{
    engine::BlockEngine,
    io::input::MidiInputs,
    synth::{voice_bus, SynthMessage, VoiceManager},
    SynthConfig, MAX_BLOCK_SIZE,
};

use super::keyboard::KeyboardInput;

/// Shared sending side of the event queue.
pub type EventSender = Arc<Mutex<Producer<SynthMessage>>>;

/// Push onto the queue, dropping the event if the audio thread is behind.
pub fn send(tx: &EventSender, message: SynthMessage) {
    let Ok(mut producer) = tx.lock() else {
        return;
    };
    if producer.push(message).is_err() {
        tracing::warn!(?message, "event queue full, dropping");
    }
}

/// Main application builder
pub struct Keybed {
    config: SynthConfig,
    midi: bool,
}

impl Keybed {
    pub fn new(config: SynthConfig) -> Self {
        Self { config, midi: true }
    }

    /// Enable or disable MIDI device input
    pub fn midi(mut self, enabled: bool) -> Self {
        self.midi = enabled;
        self
    }

    /// Run until the keyboard producer quits
    pub fn run(self) -> EyreResult<()> {
        // Set up audio
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        tracing::info!(sample_rate, channels, "audio output");

        let (tx, mut rx) = RingBuffer::<SynthMessage>::new(self.config.queue_capacity);
        let tx: EventSender = Arc::new(Mutex::new(tx));

        // Everything below is owned by the audio callback
        let engine = BlockEngine::new(sample_rate, &self.config);
        let mut manager = VoiceManager::new(engine, &self.config)?;
        let mut bus = voice_bus::<BlockEngine>();
        let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                bus.drain(&mut manager, &mut rx);

                let total_frames = data.len() / channels;
                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let out = &mut block[..frames];
                    manager.engine_mut().render(out);
                    manager.collect_ended();

                    // Copy to output (mono to all channels)
                    let offset = frames_written * channels;
                    for (i, &s) in out.iter().enumerate() {
                        for ch in 0..channels {
                            data[offset + i * channels + ch] = s;
                        }
                    }
                    frames_written += frames;
                }
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        let inputs = if self.midi {
            let midi_tx = tx.clone();
            MidiInputs::open(&self.config, move |message| send(&midi_tx, message))
        } else {
            MidiInputs::disconnected()
        };
        if inputs.is_connected() {
            tracing::info!(ports = ?inputs.port_names(), "listening for MIDI");
        } else {
            tracing::info!("playing from the computer keyboard only");
        }

        let result = KeyboardInput::new(tx, &self.config).run();

        inputs.close();
        drop(stream);
        result
    }
}
