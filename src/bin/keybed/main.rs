//! keybed - play the voice core from MIDI hardware and the computer keyboard
//!
//! Run with: cargo run -- --help

mod app;
mod keyboard;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use keybed::{io::input::list_ports, SynthConfig};
use tracing_subscriber::EnvFilter;

use app::Keybed;

/// Realtime MIDI synth voice core.
#[derive(Parser, Debug)]
#[command(name = "keybed")]
#[command(about = "Play MIDI and keyboard input through the keybed voice core")]
#[command(version)]
struct Args {
    /// TOML config file (all fields optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial waveform: sine, square, sawtooth, triangle
    #[arg(long)]
    waveform: Option<String>,

    /// Pitch wheel range in semitones at full bend
    #[arg(long)]
    detune_amount: Option<f32>,

    /// Keep the last pitch bend when the wheel is released
    #[arg(long)]
    sticky: bool,

    /// Only connect MIDI inputs whose name contains this text
    #[arg(long)]
    port: Option<String>,

    /// Skip MIDI input entirely
    #[arg(long)]
    no_midi: bool,

    /// Print available MIDI input ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Args {
    fn resolve_config(&self) -> EyreResult<SynthConfig> {
        let mut config = match &self.config {
            Some(path) => SynthConfig::load(path)
                .wrap_err_with(|| format!("failed to load {}", path.display()))?,
            None => SynthConfig::default(),
        };

        if let Some(name) = &self.waveform {
            config.waveform = name.parse()?;
        }
        if let Some(amount) = self.detune_amount {
            config.detune_amount = amount;
        }
        if self.sticky {
            config.sticky_pitch_bend = true;
        }
        if let Some(port) = &self.port {
            config.midi_port_filter = Some(port.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;

    if args.list_ports {
        let ports = list_ports(&config.midi_client_name);
        if ports.is_empty() {
            println!("No MIDI input ports found");
        }
        for (index, name) in ports.iter().enumerate() {
            println!("{index}: {name}");
        }
        return Ok(());
    }

    Keybed::new(config).midi(!args.no_midi).run()
}
