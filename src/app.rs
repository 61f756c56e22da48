use std::io::Write;
use std::path::Path;

use crossbeam::channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use crate::command::{CommandKind, Executor, InterpreterState, Invocation};
use crate::engine::{Engine, InputWatch};
use crate::error::Result;
use crate::filter::FilterEngine;
use crate::monitor::Monitor;
use crate::render::Renderer;
use crate::scripting::LuaRuntime;
use crate::settings::Settings;
use crate::sink::{PassThrough, SysExFile};
use crate::transport::{self, DEFAULT_VIRTUAL_NAME, InputConnection};

pub struct App {
    channel: (Sender<Vec<u8>>, Receiver<Vec<u8>>),
    watch: InputWatch,
    connection: Option<InputConnection>,
    virtual_port: bool,
    pass_through: Option<PassThrough>,
    script: Option<LuaRuntime>,
    sysex_file: Option<SysExFile>,
    quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            channel: crossbeam::channel::unbounded(),
            watch: InputWatch::default(),
            connection: None,
            virtual_port: false,
            pass_through: None,
            script: None,
            sysex_file: None,
            quit: false,
        }
    }

    /// Set by `list`: the process exits once the commands are interpreted.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn into_engine<W: Write>(self, state: &InterpreterState, out: W) -> Engine<W> {
        let settings = &state.settings;
        let sysex_file = self.sysex_file.is_some();

        let mut monitor = Monitor::new(
            FilterEngine::new(&state.filters, settings),
            Renderer::new(settings, sysex_file),
            settings,
            out,
        );
        if let Some(pass_through) = self.pass_through {
            monitor.add_sink(Box::new(pass_through));
        }
        if let Some(mut script) = self.script {
            let untimed = Settings {
                timestamps: false,
                ..settings.clone()
            };
            script.set_renderer(Renderer::new(&untimed, sysex_file));
            monitor.add_sink(Box::new(script));
        }
        if let Some(file) = self.sysex_file {
            monitor.add_sink(Box::new(file));
        }

        Engine::new(
            monitor,
            self.watch,
            self.connection,
            self.virtual_port,
            self.channel,
        )
    }

    fn list(&mut self) -> Result<()> {
        for name in transport::input_port_names()? {
            println!("{name}");
        }
        self.quit = true;
        Ok(())
    }

    fn open_device(&mut self, name: &str) {
        self.connection = None;
        self.virtual_port = false;
        self.watch = InputWatch {
            wanted: Some(name.to_string()),
            connected: None,
        };

        match transport::connect_input(name, self.channel.0.clone()) {
            Ok((connection, full_name)) => {
                info!("Connected to MIDI input port \"{full_name}\"");
                self.connection = Some(connection);
                self.watch.connected = Some(full_name);
            }
            Err(e) => warn!("{e}, waiting"),
        }
    }

    fn open_virtual(&mut self, name: Option<&str>) -> Result<()> {
        let name = name.unwrap_or(DEFAULT_VIRTUAL_NAME);
        self.connection = None;
        self.watch = InputWatch::default();

        let connection = transport::create_virtual_input(name, self.channel.0.clone())?;
        info!("Created virtual MIDI input port \"{name}\"");
        self.connection = Some(connection);
        self.virtual_port = true;
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for App {
    fn execute(&mut self, invocation: &Invocation) -> Result<()> {
        match (invocation.kind(), invocation.opt(0)) {
            (CommandKind::List, _) => self.list()?,
            (CommandKind::Device, Some(name)) => self.open_device(name),
            (CommandKind::Virtual, name) => self.open_virtual(name)?,
            (CommandKind::PassThrough, Some(name)) => {
                self.pass_through = Some(PassThrough::open(name)?);
            }
            (CommandKind::SystemExclusiveFile, Some(path)) => {
                self.sysex_file = Some(SysExFile::create(Path::new(path))?);
            }
            (CommandKind::Lua, Some(code)) => {
                self.script = Some(LuaRuntime::new(code, "lua")?);
            }
            (CommandKind::LuaFile, Some(path)) => {
                self.script = Some(LuaRuntime::from_file(Path::new(path))?);
            }
            (kind, _) => debug!(?kind, "nothing to execute"),
        }
        Ok(())
    }
}
