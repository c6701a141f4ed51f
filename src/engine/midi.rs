//! MIDI input for monosynth.
//!
//! Connects a midir input port to a [`Controller`]. Messages are parsed and
//! dispatched on midir's callback thread, which is a control-side thread.

use anyhow::{anyhow, Result};
use midir::{MidiInput, MidiInputConnection};
use tracing::{debug, info};

use super::Controller;

const CLIENT_NAME: &str = "monosynth";

/// An open MIDI input connection feeding a [`Controller`]
pub struct MidiListener {
    connection: MidiInputConnection<Controller>,
    port_name: String,
}

impl MidiListener {
    /// Connect to the first port whose name contains `port_name`, or the
    /// first available port.
    pub fn connect(port_name: Option<&str>, controller: Controller) -> Result<Self> {
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        let ports = midi_in.ports();

        if ports.is_empty() {
            return Err(anyhow!("No MIDI input ports available"));
        }

        let port = match port_name {
            Some(name) => ports
                .iter()
                .find(|p| {
                    midi_in
                        .port_name(p)
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| anyhow!("MIDI port '{}' not found", name))?
                .clone(),
            None => ports[0].clone(),
        };

        let port_name = midi_in.port_name(&port)?;
        let connection = midi_in
            .connect(
                &port,
                "monosynth-input",
                |_stamp, message, controller: &mut Controller| {
                    match controller.handle_midi(message) {
                        Ok(Some(event)) => debug!(%event, "midi"),
                        Ok(None) => {}
                        Err(err) => debug!(%err, "ignoring malformed MIDI message"),
                    }
                },
                controller,
            )
            .map_err(|err| anyhow!("failed to connect to MIDI port '{}': {}", port_name, err))?;

        info!(port = %port_name, "MIDI input connected");

        Ok(Self {
            connection,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Close the port and hand back the controller
    pub fn close(self) -> Controller {
        let (_midi_in, controller) = self.connection.close();
        controller
    }
}

/// List available MIDI input ports.
pub fn list_input_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    let ports = midi_in.ports();

    let names: Vec<String> = ports
        .iter()
        .filter_map(|p| midi_in.port_name(p).ok())
        .collect();

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_input_ports() {
        // MIDI support varies by machine; only check it doesn't panic
        let _ = list_input_ports();
    }
}
