use crossbeam::channel::Sender;
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::error::{Error, Result};

const CLIENT_NAME: &str = "midiscope";

pub const DEFAULT_VIRTUAL_NAME: &str = "midiscope";

pub type InputConnection = MidiInputConnection<()>;

pub fn input_port_names() -> Result<Vec<String>> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// Index of the port named exactly `wanted`, else of the first port whose
/// name contains it, ignoring case.
pub fn find_port(names: &[String], wanted: &str) -> Option<usize> {
    names.iter().position(|name| name == wanted).or_else(|| {
        let wanted = wanted.to_lowercase();
        names
            .iter()
            .position(|name| name.to_lowercase().contains(&wanted))
    })
}

/// Connects to an input port; received bytes are sent over `tx`. Returns the
/// connection and the full port name.
pub fn connect_input(wanted: &str, tx: Sender<Vec<u8>>) -> Result<(InputConnection, String)> {
    let mut midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in.ignore(Ignore::None);

    let ports = midi_in.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|port| midi_in.port_name(port).unwrap_or_default())
        .collect();
    let index = find_port(&names, wanted).ok_or_else(|| Error::PortNotFound(wanted.to_string()))?;

    let connection = midi_in.connect(
        &ports[index],
        "midiscope-input",
        move |_, bytes, _| {
            let _ = tx.send(bytes.to_vec());
        },
        (),
    )?;
    Ok((connection, names[index].clone()))
}

#[cfg(unix)]
pub fn create_virtual_input(name: &str, tx: Sender<Vec<u8>>) -> Result<InputConnection> {
    use midir::os::unix::VirtualInput;

    let mut midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in.ignore(Ignore::None);
    let connection = midi_in.create_virtual(
        name,
        move |_, bytes, _| {
            let _ = tx.send(bytes.to_vec());
        },
        (),
    )?;
    Ok(connection)
}

#[cfg(not(unix))]
pub fn create_virtual_input(_name: &str, _tx: Sender<Vec<u8>>) -> Result<InputConnection> {
    Err(Error::VirtualUnsupported)
}

pub fn open_output(wanted: &str) -> Result<(MidiOutputConnection, String)> {
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let ports = midi_out.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|port| midi_out.port_name(port).unwrap_or_default())
        .collect();
    let index = find_port(&names, wanted).ok_or_else(|| Error::PortNotFound(wanted.to_string()))?;

    let connection = midi_out.connect(&ports[index], "midiscope-pass-through")?;
    Ok((connection, names[index].clone()))
}
