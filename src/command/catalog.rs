use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    List,
    Device,
    Virtual,
    PassThrough,
    ProgramFile,
    Decimal,
    Hexadecimal,
    Channel,
    Timestamp,
    NoteNumbers,
    OctaveMiddleC,
    Voice,
    Note,
    NoteOn,
    NoteOff,
    PolyPressure,
    ControlChange,
    ControlChange14Bit,
    Nrpn,
    NrpnFull,
    Rpn,
    RpnFull,
    ProgramChange,
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
    SystemExclusiveFile,
    TimeCode,
    SongPosition,
    SongSelect,
    TuneRequest,
    Quiet,
    RawDump,
    Lua,
    LuaFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Takes effect the moment it is read, never becomes pending.
    Config,
    Setting,
    ProgramFile,
    Filter,
    Action,
}

impl CommandKind {
    pub fn class(self) -> CommandClass {
        use CommandKind::*;
        match self {
            Decimal | Hexadecimal => CommandClass::Config,
            Timestamp | NoteNumbers | OctaveMiddleC | Quiet | RawDump => CommandClass::Setting,
            ProgramFile => CommandClass::ProgramFile,
            List | Device | Virtual | PassThrough | SystemExclusiveFile | Lua | LuaFile => {
                CommandClass::Action
            }
            Channel | Voice | Note | NoteOn | NoteOff | PolyPressure | ControlChange
            | ControlChange14Bit | Nrpn | NrpnFull | Rpn | RpnFull | ProgramChange
            | ChannelPressure | PitchBend | SystemRealtime | Clock | Start | Stop | Continue
            | ActiveSensing | Reset | SystemCommon | SystemExclusive | TimeCode | SongPosition
            | SongSelect | TuneRequest => CommandClass::Filter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// Collects up to `max` options, ending early at the next command or at
    /// the end of the token batch.
    Variable { max: usize },
}

#[derive(Debug)]
pub struct Command {
    pub mnemonic: &'static str,
    pub alias: &'static str,
    pub kind: CommandKind,
    pub arity: Arity,
    pub options: &'static str,
    pub description: &'static str,
}

const OPTIONAL: Arity = Arity::Variable { max: 1 };

macro_rules! command {
    ($mnemonic:literal, $alias:literal, $kind:ident, $arity:expr, $options:literal, $description:literal) => {
        Command {
            mnemonic: $mnemonic,
            alias: $alias,
            kind: CommandKind::$kind,
            arity: $arity,
            options: $options,
            description: $description,
        }
    };
}

pub static CATALOG: &[Command] = &[
    command!("dev", "device", Device, Arity::Fixed(1), "name", "Set the name of the MIDI input port"),
    command!("virt", "virtual", Virtual, OPTIONAL, "(name)", "Use virtual MIDI port with optional name (Linux/macOS)"),
    command!("pass", "pass-through", PassThrough, Arity::Fixed(1), "name", "Set name of MIDI output port for MIDI pass-through"),
    command!("list", "", List, Arity::Fixed(0), "", "Lists the MIDI input ports"),
    command!("file", "", ProgramFile, Arity::Fixed(1), "path", "Loads commands from the specified program file"),
    command!("dec", "decimal", Decimal, Arity::Fixed(0), "", "Interpret the next numbers as decimals by default"),
    command!("hex", "hexadecimal", Hexadecimal, Arity::Fixed(0), "", "Interpret the next numbers as hexadecimals by default"),
    command!("ch", "channel", Channel, Arity::Fixed(1), "number", "Set MIDI channel for the commands (0-16), defaults to 0"),
    command!("ts", "timestamp", Timestamp, Arity::Fixed(0), "", "Output a timestamp for each received MIDI message"),
    command!("nn", "note-numbers", NoteNumbers, Arity::Fixed(0), "", "Output notes as numbers instead of names"),
    command!("omc", "octave-middle-c", OctaveMiddleC, Arity::Fixed(1), "number", "Set octave for middle C, defaults to 3"),
    command!("voice", "", Voice, Arity::Fixed(0), "", "Show all Channel Voice messages"),
    command!("note", "", Note, Arity::Fixed(0), "", "Show all Note messages"),
    command!("on", "note-on", NoteOn, OPTIONAL, "(note)", "Show Note On, optionally for note (0-127)"),
    command!("off", "note-off", NoteOff, OPTIONAL, "(note)", "Show Note Off, optionally for note (0-127)"),
    command!("pp", "poly-pressure", PolyPressure, OPTIONAL, "(note)", "Show Poly Pressure, optionally for note (0-127)"),
    command!("cc", "control-change", ControlChange, OPTIONAL, "(number)", "Show Control Change, optionally for controller (0-127)"),
    command!("cc14", "control-change-14", ControlChange14Bit, OPTIONAL, "(number)", "Show 14-bit CC, optionally for controller (0-63)"),
    command!("nrpn", "", Nrpn, OPTIONAL, "(number)", "Show NRPN, optionally for parameter (0-16383)"),
    command!("nrpnf", "nrpn-full", NrpnFull, OPTIONAL, "(number)", "Show full NRPN (MSB+LSB), optionally for parameter (0-16383)"),
    command!("rpn", "", Rpn, OPTIONAL, "(number)", "Show RPN, optionally for parameter (0-16383)"),
    command!("rpnf", "rpn-full", RpnFull, OPTIONAL, "(number)", "Show full RPN (MSB+LSB), optionally for parameter (0-16383)"),
    command!("pc", "program-change", ProgramChange, OPTIONAL, "(number)", "Show Program Change, optionally for program (0-127)"),
    command!("cp", "channel-pressure", ChannelPressure, Arity::Fixed(0), "", "Show Channel Pressure"),
    command!("pb", "pitch-bend", PitchBend, Arity::Fixed(0), "", "Show Pitch Bend"),
    command!("sr", "system-realtime", SystemRealtime, Arity::Fixed(0), "", "Show all System Real-Time messages"),
    command!("clock", "", Clock, Arity::Fixed(0), "", "Show Timing Clock"),
    command!("start", "", Start, Arity::Fixed(0), "", "Show Start"),
    command!("stop", "", Stop, Arity::Fixed(0), "", "Show Stop"),
    command!("cont", "continue", Continue, Arity::Fixed(0), "", "Show Continue"),
    command!("as", "active-sensing", ActiveSensing, Arity::Fixed(0), "", "Show Active Sensing"),
    command!("rst", "reset", Reset, Arity::Fixed(0), "", "Show Reset"),
    command!("sc", "system-common", SystemCommon, Arity::Fixed(0), "", "Show all System Common messages"),
    command!("syx", "system-exclusive", SystemExclusive, Arity::Fixed(0), "", "Show System Exclusive"),
    command!("syf", "system-exclusive-file", SystemExclusiveFile, Arity::Fixed(1), "path", "Store SysEx into a .syx file"),
    command!("tc", "time-code", TimeCode, Arity::Fixed(0), "", "Show MIDI Time Code Quarter Frame"),
    command!("spp", "song-position", SongPosition, Arity::Fixed(0), "", "Show Song Position Pointer"),
    command!("ss", "song-select", SongSelect, Arity::Fixed(0), "", "Show Song Select"),
    command!("tun", "tune-request", TuneRequest, Arity::Fixed(0), "", "Show Tune Request"),
    command!("q", "quiet", Quiet, Arity::Fixed(0), "", "Don't show the received messages on standard output"),
    command!("dump", "", RawDump, Arity::Fixed(0), "", "Dump the received messages 1:1 on standard output"),
    command!("lua", "", Lua, Arity::Fixed(1), "code", "Execute this Lua script for each received MIDI message"),
    command!("luaf", "lua-file", LuaFile, Arity::Fixed(1), "path", "Execute the Lua script in this file for each message"),
];

/// Case-insensitive exact match on mnemonic or long alias.
pub fn find(token: &str) -> Option<&'static Command> {
    CATALOG.iter().find(|cmd| {
        cmd.mnemonic.eq_ignore_ascii_case(token)
            || (!cmd.alias.is_empty() && cmd.alias.eq_ignore_ascii_case(token))
    })
}

pub fn usage(program: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usage: {program} [ commands ] [ programfile ] [ -- ]");
    let _ = writeln!(out);
    let _ = writeln!(out, "Commands:");
    for cmd in CATALOG {
        let _ = writeln!(out, "  {:<5} {:<9}  {}", cmd.mnemonic, cmd.options, cmd.description);
    }
    let _ = writeln!(out, "  -h  or  --help   Print Help (this message) and exit");
    let _ = writeln!(out, "  --version        Print version information and exit");
    let _ = writeln!(out, "  --               Read commands from standard input until it's closed");
    let _ = writeln!(out);
    let _ = writeln!(out, "Alternatively, you can use the following long versions of the commands:");

    let mut line = String::from(" ");
    for alias in CATALOG.iter().map(|cmd| cmd.alias).filter(|a| !a.is_empty()) {
        if line.len() + alias.len() + 1 >= 80 {
            let _ = writeln!(out, "{line}");
            line = String::from(" ");
        }
        line.push(' ');
        line.push_str(alias);
    }
    let _ = writeln!(out, "{line}");
    let _ = writeln!(out);

    out.push_str(
        "By default, numbers are interpreted in the decimal system, this can be changed\n\
         to hexadecimal by sending the \"hex\" command. Additionally, by suffixing a\n\
         number with \"M\" or \"H\", it will be interpreted as a decimal or hexadecimal\n\
         respectively.\n\n\
         The MIDI device name doesn't have to be an exact match. If the exact name\n\
         can't be found, the first port that contains the provided text, irrespective\n\
         of case, is used.\n\n\
         Where notes can be provided as arguments, they can also be written as note\n\
         names, by default from C-2 to G8 which corresponds to note numbers 0 to 127.\n\
         By setting the octave for middle C, the note name range can be changed.\n\
         Sharps can be added by using the \"#\" symbol after the note letter, and flats\n\
         by using the letter \"b\".\n\n\
         The Lua script given to \"lua\" or \"lua-file\" sees the received message in\n\
         the global table MIDI.\n",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_mnemonic_and_alias() {
        assert_eq!(find("cc").map(|c| c.kind), Some(CommandKind::ControlChange));
        assert_eq!(find("control-change").map(|c| c.kind), Some(CommandKind::ControlChange));
        assert_eq!(find("CC14").map(|c| c.kind), Some(CommandKind::ControlChange14Bit));
        assert_eq!(find("Note-On").map(|c| c.kind), Some(CommandKind::NoteOn));
    }

    #[test]
    fn test_find_rejects_unknown_and_empty() {
        assert!(find("").is_none());
        assert!(find("64").is_none());
        assert!(find("c").is_none());
    }

    #[test]
    fn test_mnemonics_and_aliases_are_unique() {
        let mut names: Vec<String> = CATALOG
            .iter()
            .flat_map(|c| [c.mnemonic, c.alias])
            .filter(|n| !n.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_config_commands_have_no_options() {
        for cmd in CATALOG.iter().filter(|c| c.kind.class() == CommandClass::Config) {
            assert_eq!(cmd.arity, Arity::Fixed(0));
        }
    }

    #[test]
    fn test_usage_lists_every_command() {
        let text = usage("midiscope");
        for cmd in CATALOG {
            assert!(text.contains(cmd.description), "{}", cmd.mnemonic);
        }
    }
}
