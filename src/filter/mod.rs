pub mod controller_table;
pub mod fourteen_bit;
pub mod rpn;

pub use controller_table::ControllerTable;
pub use fourteen_bit::FourteenBitEvent;
pub use rpn::{RpnAssembler, RpnMessage};

use crate::command::{CommandKind, Invocation};
use crate::message::Message;
use crate::numeric;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Channel scope for the filters that follow; 0 matches any channel.
    Channel(u8),
    Voice,
    Note,
    NoteOn(Option<u8>),
    NoteOff(Option<u8>),
    PolyPressure(Option<u8>),
    ControlChange(Option<u8>),
    ControlChange14Bit(Option<u8>),
    Nrpn { full: bool, parameter: Option<u16> },
    Rpn { full: bool, parameter: Option<u16> },
    ProgramChange(Option<u8>),
    ChannelPressure,
    PitchBend,
    SystemRealtime,
    Clock,
    Start,
    Stop,
    Continue,
    ActiveSensing,
    Reset,
    SystemCommon,
    SystemExclusive,
    TimeCode,
    SongPosition,
    SongSelect,
    TuneRequest,
}

impl Filter {
    /// Returns `None` for commands that don't filter messages.
    pub fn compile(invocation: &Invocation, octave_middle_c: i32) -> Option<Self> {
        let radix = invocation.radix;
        let opt = invocation.opt(0);
        let byte = opt.map(|v| numeric::parse_7bit(v, radix));
        let note = opt.map(|v| numeric::parse_note(v, radix, octave_middle_c));
        let parameter = opt.map(|v| numeric::parse_14bit(v, radix));

        let filter = match invocation.kind() {
            CommandKind::Channel => Filter::Channel(byte.unwrap_or(0)),
            CommandKind::Voice => Filter::Voice,
            CommandKind::Note => Filter::Note,
            CommandKind::NoteOn => Filter::NoteOn(note),
            CommandKind::NoteOff => Filter::NoteOff(note),
            CommandKind::PolyPressure => Filter::PolyPressure(note),
            CommandKind::ControlChange => Filter::ControlChange(byte),
            CommandKind::ControlChange14Bit => Filter::ControlChange14Bit(byte),
            CommandKind::Nrpn => Filter::Nrpn { full: false, parameter },
            CommandKind::NrpnFull => Filter::Nrpn { full: true, parameter },
            CommandKind::Rpn => Filter::Rpn { full: false, parameter },
            CommandKind::RpnFull => Filter::Rpn { full: true, parameter },
            CommandKind::ProgramChange => Filter::ProgramChange(byte),
            CommandKind::ChannelPressure => Filter::ChannelPressure,
            CommandKind::PitchBend => Filter::PitchBend,
            CommandKind::SystemRealtime => Filter::SystemRealtime,
            CommandKind::Clock => Filter::Clock,
            CommandKind::Start => Filter::Start,
            CommandKind::Stop => Filter::Stop,
            CommandKind::Continue => Filter::Continue,
            CommandKind::ActiveSensing => Filter::ActiveSensing,
            CommandKind::Reset => Filter::Reset,
            CommandKind::SystemCommon => Filter::SystemCommon,
            CommandKind::SystemExclusive | CommandKind::SystemExclusiveFile => {
                Filter::SystemExclusive
            }
            CommandKind::TimeCode => Filter::TimeCode,
            CommandKind::SongPosition => Filter::SongPosition,
            CommandKind::SongSelect => Filter::SongSelect,
            CommandKind::TuneRequest => Filter::TuneRequest,
            _ => return None,
        };
        Some(filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub filtered: bool,
    pub channel: u8,
    pub display_control_change: bool,
    pub display_control_change_14bit: bool,
    pub display_nrpn: bool,
    pub display_rpn: bool,
    /// 14-bit value assembled while classifying this message.
    pub fourteen_bit: Option<FourteenBitEvent>,
    /// RPN/NRPN completed by this message.
    pub parameter: Option<RpnMessage>,
}

impl Classification {
    fn pass_all() -> Self {
        Self {
            filtered: true,
            display_control_change: true,
            ..Self::rejected()
        }
    }

    fn rejected() -> Self {
        Self {
            filtered: false,
            channel: 0,
            display_control_change: false,
            display_control_change_14bit: false,
            display_nrpn: false,
            display_rpn: false,
            fourteen_bit: None,
            parameter: None,
        }
    }
}

/// Assembler results for the message being classified, so each assembler
/// observes a message at most once however many filters consult it.
struct Pass<'a> {
    controllers: &'a mut ControllerTable,
    rpn: &'a mut RpnAssembler,
    fourteen_bit: Option<Option<FourteenBitEvent>>,
    parameter: Option<Option<RpnMessage>>,
}

impl Pass<'_> {
    fn fourteen_bit(&mut self, channel: u8, number: u8, value: u8) -> Option<FourteenBitEvent> {
        if self.fourteen_bit.is_none() {
            self.fourteen_bit = Some(fourteen_bit::observe(self.controllers, channel, number, value));
        }
        self.fourteen_bit.flatten()
    }

    fn parameter(&mut self, channel: u8, number: u8, value: u8) -> Option<RpnMessage> {
        if self.parameter.is_none() {
            self.parameter = Some(self.rpn.observe(channel, number, value));
        }
        self.parameter.flatten()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    filters: Vec<Filter>,
    controllers: ControllerTable,
    rpn: RpnAssembler,
}

impl FilterEngine {
    /// Compiles the filter invocations in declaration order. Note names are
    /// resolved with the final octave for middle C.
    pub fn new(invocations: &[Invocation], settings: &Settings) -> Self {
        Self::from_filters(
            invocations
                .iter()
                .filter_map(|inv| Filter::compile(inv, settings.octave_middle_c))
                .collect(),
        )
    }

    fn from_filters(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            controllers: ControllerTable::new(),
            rpn: RpnAssembler::new(),
        }
    }

    pub fn classify(&mut self, message: &Message) -> Classification {
        if self.filters.is_empty() {
            return Classification::pass_all();
        }

        let mut result = Classification::rejected();
        let mut pass = Pass {
            controllers: &mut self.controllers,
            rpn: &mut self.rpn,
            fourteen_bit: None,
            parameter: None,
        };
        for filter in &self.filters {
            apply(*filter, message, &mut result, &mut pass);
        }
        result.fourteen_bit = pass.fourteen_bit.flatten();
        result.parameter = pass.parameter.flatten();
        result
    }
}

fn apply(filter: Filter, message: &Message, result: &mut Classification, pass: &mut Pass<'_>) {
    let in_scope = result.channel == 0 || message.channel() == Some(result.channel);
    let optional = |wanted: Option<u8>, actual: u8| wanted.is_none_or(|w| w == actual);

    let matched = match filter {
        Filter::Channel(channel) => {
            result.channel = channel;
            false
        }
        Filter::Voice => in_scope && message.channel().is_some(),
        Filter::Note => in_scope && (message.is_note_on() || message.is_note_off()),
        Filter::NoteOn(wanted) => {
            in_scope
                && message.is_note_on()
                && matches!(*message, Message::NoteOn { note, .. } if optional(wanted, note))
        }
        Filter::NoteOff(wanted) => {
            in_scope
                && message.is_note_off()
                && matches!(
                    *message,
                    Message::NoteOn { note, .. } | Message::NoteOff { note, .. } if optional(wanted, note)
                )
        }
        Filter::PolyPressure(wanted) => {
            in_scope && matches!(*message, Message::PolyPressure { note, .. } if optional(wanted, note))
        }
        Filter::ControlChange(wanted) => {
            let show = in_scope
                && matches!(*message, Message::Controller { number, .. } if optional(wanted, number));
            result.display_control_change |= show;
            show
        }
        Filter::ControlChange14Bit(wanted) => match *message {
            Message::Controller { channel, number, value } if in_scope && number < 64 => {
                let show = pass
                    .fourteen_bit(channel, number, value)
                    .is_some_and(|event| optional(wanted, number) || optional(wanted, event.controller));
                result.display_control_change_14bit |= show;
                result.display_control_change |= show;
                show
            }
            _ => false,
        },
        Filter::Nrpn { full, parameter } | Filter::Rpn { full, parameter } => match *message {
            Message::Controller { channel, number, value } if in_scope => {
                let nrpn = matches!(filter, Filter::Nrpn { .. });
                let show = pass.parameter(channel, number, value).is_some_and(|rpn| {
                    rpn.is_nrpn == nrpn
                        && (!full || rpn.uses_both_msb_and_lsb)
                        && parameter.is_none_or(|p| p == rpn.parameter)
                });
                if nrpn {
                    result.display_nrpn |= show;
                } else {
                    result.display_rpn |= show;
                }
                show
            }
            _ => false,
        },
        Filter::ProgramChange(wanted) => {
            in_scope
                && matches!(*message, Message::ProgramChange { program, .. } if optional(wanted, program))
        }
        Filter::ChannelPressure => in_scope && matches!(message, Message::ChannelPressure { .. }),
        Filter::PitchBend => in_scope && matches!(message, Message::PitchBend { .. }),
        Filter::SystemRealtime => message.is_system_realtime(),
        Filter::Clock => matches!(message, Message::Clock),
        Filter::Start => matches!(message, Message::Start),
        Filter::Stop => matches!(message, Message::Stop),
        Filter::Continue => matches!(message, Message::Continue),
        Filter::ActiveSensing => matches!(message, Message::ActiveSensing),
        Filter::Reset => matches!(message, Message::Reset),
        Filter::SystemCommon => message.is_system_common(),
        Filter::SystemExclusive => matches!(message, Message::SysEx(_)),
        Filter::TimeCode => matches!(message, Message::QuarterFrame { .. }),
        Filter::SongPosition => matches!(message, Message::SongPosition(_)),
        Filter::SongSelect => matches!(message, Message::SongSelect(_)),
        Filter::TuneRequest => matches!(message, Message::TuneRequest),
    };

    result.filtered |= matched;
}
