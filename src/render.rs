use chrono::{Local, NaiveTime, Timelike};

use crate::filter::Classification;
use crate::message::Message;
use crate::numeric::{self, Radix};
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct Renderer {
    radix: Radix,
    note_numbers: bool,
    octave_middle_c: i32,
    timestamps: bool,
    /// SysEx is written to a capture file and only summarized.
    sysex_file: bool,
}

impl Renderer {
    pub fn new(settings: &Settings, sysex_file: bool) -> Self {
        Self {
            radix: settings.radix,
            note_numbers: settings.note_numbers,
            octave_middle_c: settings.octave_middle_c,
            timestamps: settings.timestamps,
            sysex_file,
        }
    }

    pub fn render(&self, message: &Message, display: &Classification) -> Vec<String> {
        let mut lines = self.lines(message, display);
        if self.timestamps {
            let prefix = timestamp(Local::now().time());
            for line in &mut lines {
                line.insert_str(0, &prefix);
            }
        }
        lines
    }

    fn lines(&self, message: &Message, display: &Classification) -> Vec<String> {
        let line = match *message {
            Message::NoteOn { channel, note, velocity } | Message::NoteOff { channel, note, velocity } => {
                let keyword = if message.is_note_on() { "note-on" } else { "note-off" };
                self.channel_line(channel, &format!(
                    "{keyword:<16}{} {:>3}",
                    self.note(note),
                    self.byte(velocity)
                ))
            }
            Message::PolyPressure { channel, note, value } => self.channel_line(
                channel,
                &format!("poly-pressure   {} {:>3}", self.note(note), self.byte(value)),
            ),
            Message::Controller { channel, number, value } => {
                return self.controller_lines(channel, number, value, display);
            }
            Message::ProgramChange { channel, program } => {
                self.channel_line(channel, &format!("program-change   {:>7}", self.byte(program)))
            }
            Message::ChannelPressure { channel, value } => {
                self.channel_line(channel, &format!("channel-pressure {:>7}", self.byte(value)))
            }
            Message::PitchBend { channel, value } => {
                self.channel_line(channel, &format!("pitch-bend       {:>7}", self.word(value)))
            }
            Message::SysEx(ref payload) => self.sysex(payload),
            Message::QuarterFrame { sequence, value } => {
                format!("time-code {:>2} {}", self.byte(sequence), self.byte(value))
            }
            Message::SongPosition(position) => format!("song-position {:>5}", self.word(position)),
            Message::SongSelect(song) => format!("song-select {:>3}", self.byte(song)),
            Message::Clock
            | Message::Start
            | Message::Continue
            | Message::Stop
            | Message::ActiveSensing
            | Message::Reset
            | Message::TuneRequest => message.kind_name().to_string(),
        };
        vec![line]
    }

    fn controller_lines(
        &self,
        channel: u8,
        number: u8,
        value: u8,
        display: &Classification,
    ) -> Vec<String> {
        let mut lines = Vec::new();

        if display.display_control_change {
            match display.fourteen_bit {
                Some(event) if display.display_control_change_14bit => lines.push(self.channel_line(
                    channel,
                    &format!(
                        "cc14             {:>3} {:>5}",
                        self.byte(event.controller),
                        self.word(event.value)
                    ),
                )),
                _ => lines.push(self.channel_line(
                    channel,
                    &format!("control-change   {:>3}   {:>3}", self.byte(number), self.byte(value)),
                )),
            }
        }

        if let Some(rpn) = display.parameter {
            let keyword = if display.display_nrpn {
                Some("nrpn")
            } else if display.display_rpn {
                Some("rpn")
            } else {
                None
            };
            if let Some(keyword) = keyword {
                lines.push(self.channel_line(
                    channel,
                    &format!(
                        "{keyword:<15}{:>5} {:>5}",
                        self.word(rpn.parameter),
                        self.word(rpn.value)
                    ),
                ));
            }
        }

        lines
    }

    fn sysex(&self, payload: &[u8]) -> String {
        if self.sysex_file {
            return format!("system-exclusive-file {} bytes", payload.len() + 2);
        }

        let mut line = String::from("system-exclusive");
        if self.radix == Radix::Decimal {
            line.push_str(" hex");
        }
        for &b in payload {
            line.push(' ');
            line.push_str(&numeric::format_7bit_hex(b));
        }
        if self.radix == Radix::Decimal {
            line.push_str(" dec");
        }
        line
    }

    fn channel_line(&self, channel: u8, body: &str) -> String {
        format!("channel {:>2}   {body}", self.byte(channel))
    }

    fn note(&self, note: u8) -> String {
        let text = if self.note_numbers {
            self.byte(note)
        } else {
            numeric::note_name(note, self.octave_middle_c)
        };
        format!("{text:>4}")
    }

    fn byte(&self, value: u8) -> String {
        numeric::format_7bit(value, self.radix)
    }

    fn word(&self, value: u16) -> String {
        numeric::format_14bit(value, self.radix)
    }
}

pub fn timestamp(time: NaiveTime) -> String {
    format!(
        "{:02}:{:02}:{:02}.{:03}   ",
        time.hour(),
        time.minute(),
        time.second(),
        time.nanosecond() / 1_000_000 % 1000
    )
}
