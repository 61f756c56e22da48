/// A decoded MIDI message. Channels are 1-16.
///
/// A note-on with velocity 0 stays a `NoteOn` so that [`Message::to_bytes`]
/// reproduces the wire bytes, but [`Message::is_note_off`] treats it as a
/// note-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    PolyPressure { channel: u8, note: u8, value: u8 },
    Controller { channel: u8, number: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, value: u8 },
    PitchBend { channel: u8, value: u16 },
    Clock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    Reset,
    /// Payload between the F0 and F7 framing bytes.
    SysEx(Vec<u8>),
    QuarterFrame { sequence: u8, value: u8 },
    SongPosition(u16),
    SongSelect(u8),
    TuneRequest,
}

impl Message {
    /// Decodes one complete message. Returns `None` for running-status data,
    /// truncated messages and undefined status bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 {
            return None;
        }

        let data_byte = |i: usize| data.get(i).map(|b| b & 0x7f);
        let channel = (status & 0x0f) + 1;

        let message = match status & 0xf0 {
            0x80 => Message::NoteOff {
                channel,
                note: data_byte(0)?,
                velocity: data_byte(1)?,
            },
            0x90 => Message::NoteOn {
                channel,
                note: data_byte(0)?,
                velocity: data_byte(1)?,
            },
            0xa0 => Message::PolyPressure {
                channel,
                note: data_byte(0)?,
                value: data_byte(1)?,
            },
            0xb0 => Message::Controller {
                channel,
                number: data_byte(0)?,
                value: data_byte(1)?,
            },
            0xc0 => Message::ProgramChange {
                channel,
                program: data_byte(0)?,
            },
            0xd0 => Message::ChannelPressure {
                channel,
                value: data_byte(0)?,
            },
            0xe0 => Message::PitchBend {
                channel,
                value: combine_14bit(data_byte(0)?, data_byte(1)?),
            },
            _ => match status {
                0xf0 => {
                    let payload = data.strip_suffix(&[0xf7u8]).unwrap_or(data);
                    Message::SysEx(payload.to_vec())
                }
                0xf1 => {
                    let b = data_byte(0)?;
                    Message::QuarterFrame {
                        sequence: b >> 4,
                        value: b & 0x0f,
                    }
                }
                0xf2 => Message::SongPosition(combine_14bit(data_byte(0)?, data_byte(1)?)),
                0xf3 => Message::SongSelect(data_byte(0)?),
                0xf6 => Message::TuneRequest,
                0xf8 => Message::Clock,
                0xfa => Message::Start,
                0xfb => Message::Continue,
                0xfc => Message::Stop,
                0xfe => Message::ActiveSensing,
                0xff => Message::Reset,
                _ => return None,
            },
        };

        Some(message)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let status = |kind: u8, channel: u8| kind | (channel.saturating_sub(1) & 0x0f);
        match *self {
            Message::NoteOff { channel, note, velocity } => vec![status(0x80, channel), note, velocity],
            Message::NoteOn { channel, note, velocity } => vec![status(0x90, channel), note, velocity],
            Message::PolyPressure { channel, note, value } => vec![status(0xa0, channel), note, value],
            Message::Controller { channel, number, value } => vec![status(0xb0, channel), number, value],
            Message::ProgramChange { channel, program } => vec![status(0xc0, channel), program],
            Message::ChannelPressure { channel, value } => vec![status(0xd0, channel), value],
            Message::PitchBend { channel, value } => {
                let (lsb, msb) = split_14bit(value);
                vec![status(0xe0, channel), lsb, msb]
            }
            Message::SysEx(ref payload) => {
                let mut bytes = Vec::with_capacity(payload.len() + 2);
                bytes.push(0xf0);
                bytes.extend_from_slice(payload);
                bytes.push(0xf7);
                bytes
            }
            Message::QuarterFrame { sequence, value } => vec![0xf1, (sequence << 4) | (value & 0x0f)],
            Message::SongPosition(position) => {
                let (lsb, msb) = split_14bit(position);
                vec![0xf2, lsb, msb]
            }
            Message::SongSelect(song) => vec![0xf3, song],
            Message::TuneRequest => vec![0xf6],
            Message::Clock => vec![0xf8],
            Message::Start => vec![0xfa],
            Message::Continue => vec![0xfb],
            Message::Stop => vec![0xfc],
            Message::ActiveSensing => vec![0xfe],
            Message::Reset => vec![0xff],
        }
    }

    pub fn channel(&self) -> Option<u8> {
        match *self {
            Message::NoteOn { channel, .. }
            | Message::NoteOff { channel, .. }
            | Message::PolyPressure { channel, .. }
            | Message::Controller { channel, .. }
            | Message::ProgramChange { channel, .. }
            | Message::ChannelPressure { channel, .. }
            | Message::PitchBend { channel, .. } => Some(channel),
            _ => None,
        }
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self, Message::NoteOn { velocity, .. } if *velocity > 0)
    }

    pub fn is_note_off(&self) -> bool {
        match self {
            Message::NoteOff { .. } => true,
            Message::NoteOn { velocity, .. } => *velocity == 0,
            _ => false,
        }
    }

    pub fn is_system_realtime(&self) -> bool {
        matches!(
            self,
            Message::Clock
                | Message::Start
                | Message::Continue
                | Message::Stop
                | Message::ActiveSensing
                | Message::Reset
        )
    }

    pub fn is_system_common(&self) -> bool {
        matches!(
            self,
            Message::SysEx(_)
                | Message::QuarterFrame { .. }
                | Message::SongPosition(_)
                | Message::SongSelect(_)
                | Message::TuneRequest
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Message::NoteOn { .. } if self.is_note_off() => "note-off",
            Message::NoteOn { .. } => "note-on",
            Message::NoteOff { .. } => "note-off",
            Message::PolyPressure { .. } => "poly-pressure",
            Message::Controller { .. } => "control-change",
            Message::ProgramChange { .. } => "program-change",
            Message::ChannelPressure { .. } => "channel-pressure",
            Message::PitchBend { .. } => "pitch-bend",
            Message::Clock => "midi-clock",
            Message::Start => "start",
            Message::Continue => "continue",
            Message::Stop => "stop",
            Message::ActiveSensing => "active-sensing",
            Message::Reset => "reset",
            Message::SysEx(_) => "system-exclusive",
            Message::QuarterFrame { .. } => "time-code",
            Message::SongPosition(_) => "song-position",
            Message::SongSelect(_) => "song-select",
            Message::TuneRequest => "tune-request",
        }
    }
}

fn combine_14bit(lsb: u8, msb: u8) -> u16 {
    (u16::from(msb) << 7) | u16::from(lsb)
}

fn split_14bit(value: u16) -> (u8, u8) {
    ((value & 0x7f) as u8, ((value >> 7) & 0x7f) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_channel_voice() {
        assert_eq!(
            Message::decode(&[0x90, 60, 100]),
            Some(Message::NoteOn { channel: 1, note: 60, velocity: 100 })
        );
        assert_eq!(
            Message::decode(&[0xbf, 7, 64]),
            Some(Message::Controller { channel: 16, number: 7, value: 64 })
        );
        assert_eq!(
            Message::decode(&[0xe0, 0x00, 0x40]),
            Some(Message::PitchBend { channel: 1, value: 8192 })
        );
    }

    #[test]
    fn test_zero_velocity_note_on_is_note_off() {
        let msg = Message::decode(&[0x91, 60, 0]).unwrap();
        assert!(msg.is_note_off());
        assert!(!msg.is_note_on());
        assert_eq!(msg.kind_name(), "note-off");
        assert_eq!(msg.to_bytes(), vec![0x91, 60, 0]);
    }

    #[test]
    fn test_decode_system() {
        assert_eq!(
            Message::decode(&[0xf0, 0x7e, 0x01, 0xf7]),
            Some(Message::SysEx(vec![0x7e, 0x01]))
        );
        assert_eq!(
            Message::decode(&[0xf1, 0x35]),
            Some(Message::QuarterFrame { sequence: 3, value: 5 })
        );
        assert_eq!(Message::decode(&[0xf2, 0x01, 0x01]), Some(Message::SongPosition(129)));
        assert_eq!(Message::decode(&[0xff]), Some(Message::Reset));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(Message::decode(&[]), None);
        assert_eq!(Message::decode(&[0x40, 0x10]), None);
        assert_eq!(Message::decode(&[0x90, 60]), None);
        assert_eq!(Message::decode(&[0xf4]), None);
        assert_eq!(Message::decode(&[0xfd]), None);
    }

    #[test]
    fn test_wire_bytes_survive_decoding() {
        let samples: [&[u8]; 8] = [
            &[0x83, 10, 20],
            &[0xa2, 61, 5],
            &[0xc4, 12],
            &[0xd5, 99],
            &[0xe6, 0x7f, 0x7f],
            &[0xf0, 0x41, 0x10, 0xf7],
            &[0xf2, 0x10, 0x02],
            &[0xf3, 4],
        ];
        for bytes in samples {
            assert_eq!(Message::decode(bytes).unwrap().to_bytes(), bytes);
        }
    }
}
