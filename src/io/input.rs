//! MIDI device acquisition.
//!
//! Inputs are opened once at startup. Any failure along the way (no MIDI
//! subsystem, permission denied, no ports, a port refusing to connect) is
//! logged and otherwise swallowed: the caller gets a [`MidiInputs`] with fewer
//! or zero connections and keeps running on its other producers.

use std::sync::Arc;

use midir::{Ignore, MidiInput, MidiInputConnection};

use crate::{config::SynthConfig, io::midi::decode_bytes, synth::message::SynthMessage};

type EventSink = Arc<dyn Fn(SynthMessage) + Send + Sync>;

/// Live MIDI input connections. Dropping this closes them.
pub struct MidiInputs {
    connections: Vec<MidiInputConnection<()>>,
    port_names: Vec<String>,
}

impl MidiInputs {
    /// Handle with no connections (MIDI unavailable or not wanted).
    pub fn disconnected() -> Self {
        Self {
            connections: Vec::new(),
            port_names: Vec::new(),
        }
    }

    /// Connect every input port matching the config's port filter.
    ///
    /// Decoded events are handed to `sink` on the driver's callback thread.
    pub fn open<F>(config: &SynthConfig, sink: F) -> Self
    where
        F: Fn(SynthMessage) + Send + Sync + 'static,
    {
        let sink: EventSink = Arc::new(sink);
        let client = config.midi_client_name.as_str();

        let names = list_ports(client);
        let selected = select_ports(&names, config.midi_port_filter.as_deref());
        if selected.is_empty() {
            tracing::info!(available = names.len(), "no MIDI input connected, continuing without MIDI");
            return Self::disconnected();
        }

        let mut inputs = Self::disconnected();
        for index in selected {
            match connect_port(client, index, sink.clone()) {
                Some(connection) => {
                    tracing::info!(port = %names[index], "MIDI input connected");
                    inputs.connections.push(connection);
                    inputs.port_names.push(names[index].clone());
                }
                None => tracing::warn!(port = %names[index], "MIDI input unavailable, skipping"),
            }
        }
        inputs
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    pub fn port_names(&self) -> &[String] {
        &self.port_names
    }

    pub fn close(self) {
        for connection in self.connections {
            connection.close();
        }
    }
}

/// Names of the available MIDI input ports. Empty if MIDI is unavailable.
pub fn list_ports(client_name: &str) -> Vec<String> {
    let midi_in = match MidiInput::new(client_name) {
        Ok(midi_in) => midi_in,
        Err(error) => {
            tracing::warn!(%error, "MIDI subsystem unavailable");
            return Vec::new();
        }
    };

    midi_in
        .ports()
        .iter()
        .map(|port| {
            midi_in
                .port_name(port)
                .unwrap_or_else(|_| "<unnamed port>".to_string())
        })
        .collect()
}

/// Indices of the ports whose name contains `filter` (all ports if `None`).
pub fn select_ports(names: &[String], filter: Option<&str>) -> Vec<usize> {
    let filter = filter.map(str::to_lowercase);
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| match &filter {
            Some(filter) => name.to_lowercase().contains(filter.as_str()),
            None => true,
        })
        .map(|(index, _)| index)
        .collect()
}

// midir consumes the client on connect, so each port gets its own client.
fn connect_port(client_name: &str, index: usize, sink: EventSink) -> Option<MidiInputConnection<()>> {
    let mut midi_in = MidiInput::new(client_name).ok()?;
    midi_in.ignore(Ignore::All);
    let port = midi_in.ports().into_iter().nth(index)?;

    midi_in
        .connect(
            &port,
            "keybed-input",
            move |_stamp, message, _| {
                if let Some(event) = decode_bytes(message) {
                    sink(event);
                }
            },
            (),
        )
        .map_err(|error| tracing::warn!(%error, "MIDI connect failed"))
        .ok()
}
