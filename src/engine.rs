use std::io::{self, Write};
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::transport::{self, InputConnection};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    Idle,
    Disconnected(String),
    Connect(String),
}

#[derive(Debug, Clone, Default)]
pub struct InputWatch {
    pub wanted: Option<String>,
    pub connected: Option<String>,
}

impl InputWatch {
    pub fn poll(&self, available: &[String]) -> WatchAction {
        match (&self.connected, &self.wanted) {
            (Some(name), _) if !available.contains(name) => WatchAction::Disconnected(name.clone()),
            (None, Some(wanted)) => WatchAction::Connect(wanted.clone()),
            _ => WatchAction::Idle,
        }
    }
}

pub struct Engine<W: Write> {
    monitor: Monitor<W>,
    watch: InputWatch,
    connection: Option<InputConnection>,
    /// Virtual ports can't disappear and are never polled.
    virtual_port: bool,
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl<W: Write> Engine<W> {
    pub fn new(
        monitor: Monitor<W>,
        watch: InputWatch,
        connection: Option<InputConnection>,
        virtual_port: bool,
        channel: (Sender<Vec<u8>>, Receiver<Vec<u8>>),
    ) -> Self {
        let (tx, rx) = channel;
        Self {
            monitor,
            watch,
            connection,
            virtual_port,
            tx,
            rx,
        }
    }

    pub fn process(&mut self, bytes: &[u8]) -> Result<()> {
        self.monitor.process(bytes)
    }

    pub fn into_output(self) -> W {
        self.monitor.into_inner()
    }

    pub fn run(mut self) -> Result<()> {
        if self.connection.is_none() && self.watch.wanted.is_none() {
            warn!("no MIDI input port selected");
        }

        loop {
            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(bytes) => match self.process(&bytes) {
                    Ok(()) => {}
                    Err(Error::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                        debug!("output closed");
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                },
                Err(RecvTimeoutError::Timeout) => self.poll_input(),
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
    }

    fn poll_input(&mut self) {
        if self.virtual_port {
            return;
        }

        let available = match transport::input_port_names() {
            Ok(names) => names,
            Err(e) => {
                debug!("{e}");
                return;
            }
        };

        match self.watch.poll(&available) {
            WatchAction::Idle => {}
            WatchAction::Disconnected(name) => {
                warn!("MIDI input port \"{name}\" got disconnected, waiting");
                self.connection = None;
                self.watch.connected = None;
            }
            WatchAction::Connect(wanted) => {
                if let Ok((connection, name)) = transport::connect_input(&wanted, self.tx.clone()) {
                    info!("Connected to MIDI input port \"{name}\"");
                    self.connection = Some(connection);
                    self.watch.connected = Some(name);
                }
            }
        }
    }
}
