use std::fs;
use std::path::Path;

use mlua::{Function, Lua, Table};

use crate::error::{Error, Result};
use crate::filter::Classification;
use crate::message::Message;
use crate::render::Renderer;
use crate::settings::Settings;
use crate::sink::MessageSink;

/// Runs a Lua chunk for every filtered message, with the message exposed as
/// the global table `MIDI`.
pub struct LuaRuntime {
    lua: Lua,
    hook: Function,
    renderer: Renderer,
}

impl LuaRuntime {
    pub fn new(code: &str, name: &str) -> Result<Self> {
        let lua = Lua::new();
        let hook = lua.load(code).set_name(name).into_function()?;
        Ok(Self {
            lua,
            hook,
            renderer: Renderer::new(&Settings::default(), false),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let code = fs::read_to_string(path)?;
        Self::new(&code, &path.display().to_string())
    }

    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.renderer = renderer;
    }

    fn message_table(&self, message: &Message, display: &Classification) -> mlua::Result<Table> {
        let midi = self.lua.create_table()?;
        midi.set("raw", message.to_bytes())?;
        midi.set("kind", message.kind_name())?;
        midi.set("channel", message.channel().unwrap_or(0))?;

        match *message {
            Message::NoteOn { note, velocity, .. } | Message::NoteOff { note, velocity, .. } => {
                midi.set("note", note)?;
                midi.set("velocity", velocity)?;
            }
            Message::PolyPressure { note, value, .. } => {
                midi.set("note", note)?;
                midi.set("pressure", value)?;
            }
            Message::Controller { number, value, .. } => {
                midi.set("controller", number)?;
                midi.set("value", value)?;
            }
            Message::ProgramChange { program, .. } => midi.set("program", program)?,
            Message::ChannelPressure { value, .. } => midi.set("pressure", value)?,
            Message::PitchBend { value, .. } => midi.set("bend", value)?,
            Message::SysEx(ref payload) => midi.set("data", payload.clone())?,
            Message::QuarterFrame { sequence, value } => {
                midi.set("sequence", sequence)?;
                midi.set("value", value)?;
            }
            Message::SongPosition(position) => midi.set("position", position)?,
            Message::SongSelect(song) => midi.set("song", song)?,
            Message::Clock
            | Message::Start
            | Message::Continue
            | Message::Stop
            | Message::ActiveSensing
            | Message::Reset
            | Message::TuneRequest => {}
        }

        if let Some(rpn) = display.parameter {
            midi.set("parameter", rpn.parameter)?;
            midi.set("parameter_value", rpn.value)?;
            midi.set("nrpn", rpn.is_nrpn)?;
        }
        midi.set("text", self.renderer.render(message, display).join("\n"))?;
        Ok(midi)
    }
}

impl MessageSink for LuaRuntime {
    fn handle(&mut self, message: &Message, display: &Classification) -> Result<()> {
        let midi = self.message_table(message, display)?;
        self.lua.globals().set("MIDI", midi)?;
        self.hook.call::<()>(())?;
        Ok(())
    }
}
