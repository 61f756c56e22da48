use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI init error: {0}")]
    MidiInit(String),

    #[error("Couldn't find MIDI port \"{0}\"")]
    PortNotFound(String),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("Couldn't find file \"{}\"", .0.display())]
    FileNotFound(PathBuf),

    #[error("Virtual MIDI ports are not supported on this platform")]
    VirtualUnsupported,

    #[error("Script error: {0}")]
    Script(#[from] mlua::Error),
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiInit(e.to_string())
    }
}

impl From<midir::PortInfoError> for Error {
    fn from(e: midir::PortInfoError) -> Self {
        Error::MidiPort(e.to_string())
    }
}

impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::MidiPort(e.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for Error {
    fn from(e: midir::ConnectError<T>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
