use std::fs;
use std::mem;
use std::path::Path;

use tracing::{debug, error, warn};

use super::catalog::{self, Arity, Command, CommandClass, CommandKind};
use crate::error::{Error, Result};
use crate::numeric::{self, Radix};
use crate::settings::Settings;

/// Token that tells the caller to keep reading commands from stdin.
pub const STDIN_MARKER: &str = "--";

const MAX_FILE_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: &'static Command,
    pub opts: Vec<String>,
    /// Default radix in effect when the last option was read.
    pub radix: Radix,
}

impl Invocation {
    pub fn new(command: &'static Command, radix: Radix) -> Self {
        Self {
            command,
            opts: Vec::new(),
            radix,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.command.kind
    }

    pub fn opt(&self, index: usize) -> Option<&str> {
        self.opts.get(index).map(String::as_str)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.command.arity, Arity::Variable { .. })
    }

    fn is_complete(&self) -> bool {
        match self.command.arity {
            Arity::Fixed(n) => self.opts.len() >= n,
            Arity::Variable { max } => self.opts.len() >= max,
        }
    }

    fn push(&mut self, token: &str, radix: Radix) {
        self.opts.push(token.to_string());
        self.radix = radix;
    }
}

#[derive(Debug, Default)]
pub enum Pending {
    #[default]
    Idle,
    Collecting(Invocation),
}

pub trait Executor {
    fn execute(&mut self, invocation: &Invocation) -> Result<()>;
}

pub struct IgnoreActions;

impl Executor for IgnoreActions {
    fn execute(&mut self, invocation: &Invocation) -> Result<()> {
        debug!(command = invocation.command.mnemonic, "skipping action");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InterpreterState {
    pub pending: Pending,
    pub settings: Settings,
    /// Filter commands in declaration order; they stay active for the run.
    pub filters: Vec<Invocation>,
    /// Set when a command failed; the process should exit with an error.
    pub failed: bool,
    file_depth: usize,
}

impl InterpreterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interprets one batch of tokens. A variable-arity command still pending
    /// at the end of the batch is executed; an incomplete fixed-arity command
    /// stays pending and is never executed unless later tokens complete it.
    pub fn interpret<I, S, E>(&mut self, tokens: I, executor: &mut E)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        E: Executor + ?Sized,
    {
        for token in tokens {
            self.feed(token.as_ref(), executor);
        }
        self.finish_variable(executor);
    }

    pub fn interpret_line<E: Executor + ?Sized>(&mut self, line: &str, executor: &mut E) {
        self.interpret(tokenize_line(line), executor);
    }

    pub fn load_file<E: Executor + ?Sized>(&mut self, path: &Path, executor: &mut E) -> Result<()> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        if self.file_depth >= MAX_FILE_DEPTH {
            warn!(path = %path.display(), "program files nested too deeply, skipping");
            return Ok(());
        }

        let contents = fs::read_to_string(path)?;
        let tokens: Vec<String> = contents.lines().flat_map(tokenize_line).collect();
        debug!(path = %path.display(), tokens = tokens.len(), "loading program file");

        self.file_depth += 1;
        self.interpret(tokens, executor);
        self.file_depth -= 1;
        Ok(())
    }

    fn feed<E: Executor + ?Sized>(&mut self, token: &str, executor: &mut E) {
        if token == STDIN_MARKER {
            return;
        }

        if let Some(command) = catalog::find(token) {
            match command.kind {
                CommandKind::Decimal => self.settings.radix = Radix::Decimal,
                CommandKind::Hexadecimal => self.settings.radix = Radix::Hexadecimal,
                _ => {
                    self.finish_variable(executor);
                    self.pending = Pending::Collecting(Invocation::new(command, self.settings.radix));
                }
            }
        } else {
            let radix = self.settings.radix;
            if let Pending::Collecting(invocation) = &mut self.pending {
                invocation.push(token, radix);
            } else {
                let path = Path::new(token);
                if path.is_file() {
                    if let Err(e) = self.load_file(path, executor) {
                        self.fail(e);
                    }
                } else {
                    debug!(token, "ignoring unknown token");
                }
            }
        }

        if matches!(&self.pending, Pending::Collecting(inv) if inv.is_complete()) {
            self.finish(executor);
        }
    }

    fn finish_variable<E: Executor + ?Sized>(&mut self, executor: &mut E) {
        if matches!(&self.pending, Pending::Collecting(inv) if inv.is_variable()) {
            self.finish(executor);
        }
    }

    fn finish<E: Executor + ?Sized>(&mut self, executor: &mut E) {
        if let Pending::Collecting(invocation) = mem::take(&mut self.pending) {
            self.execute(invocation, executor);
        }
    }

    fn execute<E: Executor + ?Sized>(&mut self, invocation: Invocation, executor: &mut E) {
        match invocation.kind().class() {
            CommandClass::Config => {}
            CommandClass::Setting => self.apply_setting(&invocation),
            CommandClass::ProgramFile => {
                if let Some(path) = invocation.opt(0)
                    && let Err(e) = self.load_file(Path::new(path), executor)
                {
                    self.fail(e);
                }
            }
            CommandClass::Filter => self.filters.push(invocation),
            CommandClass::Action => match executor.execute(&invocation) {
                Ok(()) => {
                    if invocation.kind() == CommandKind::SystemExclusiveFile {
                        self.filters.push(invocation);
                    }
                }
                Err(e) => self.fail(e),
            },
        }
    }

    fn apply_setting(&mut self, invocation: &Invocation) {
        match invocation.kind() {
            CommandKind::Timestamp => self.settings.timestamps = true,
            CommandKind::NoteNumbers => self.settings.note_numbers = true,
            CommandKind::Quiet => self.settings.quiet = true,
            CommandKind::RawDump => self.settings.raw_dump = true,
            CommandKind::OctaveMiddleC => {
                if let Some(value) = invocation.opt(0) {
                    self.settings.octave_middle_c =
                        i32::from(numeric::parse_7bit(value, invocation.radix));
                }
            }
            _ => {}
        }
    }

    fn fail(&mut self, e: Error) {
        error!("{e}");
        self.failed = true;
    }
}

pub fn interpret_tokens<I, S>(tokens: I) -> InterpreterState
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut state = InterpreterState::new();
    state.interpret(tokens, &mut IgnoreActions);
    state
}

/// Splits a command line on whitespace. Double quotes group words and are
/// stripped; lines starting with `#` are comments.
pub fn tokenize_line(line: &str) -> Vec<String> {
    if line.trim_start().starts_with('#') {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in line.chars() {
        if c == '"' {
            quoted = !quoted;
            current.push(c);
        } else if c.is_whitespace() && !quoted {
            if !current.is_empty() {
                tokens.push(mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .map(|token| token.trim_matches('"').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Default)]
    struct Recorder {
        executed: Vec<(CommandKind, Vec<String>)>,
        fail_with: Option<CommandKind>,
    }

    impl Executor for Recorder {
        fn execute(&mut self, invocation: &Invocation) -> Result<()> {
            if self.fail_with == Some(invocation.kind()) {
                return Err(Error::PortNotFound(invocation.opts.join(" ")));
            }
            self.executed.push((invocation.kind(), invocation.opts.clone()));
            Ok(())
        }
    }

    fn filter_kinds(state: &InterpreterState) -> Vec<(CommandKind, Vec<String>)> {
        state
            .filters
            .iter()
            .map(|inv| (inv.kind(), inv.opts.clone()))
            .collect()
    }

    #[test]
    fn test_variable_arity_takes_single_option() {
        let state = interpret_tokens(["cc", "7", "64"]);
        assert_eq!(
            filter_kinds(&state),
            vec![(CommandKind::ControlChange, vec!["7".to_string()])]
        );
        assert!(matches!(state.pending, Pending::Idle));
    }

    #[test]
    fn test_variable_arity_ends_at_next_command() {
        let state = interpret_tokens(["cc", "on"]);
        assert_eq!(
            filter_kinds(&state),
            vec![
                (CommandKind::ControlChange, vec![]),
                (CommandKind::NoteOn, vec![]),
            ]
        );
    }

    #[test]
    fn test_fixed_arity_underrun_is_never_executed() {
        let mut recorder = Recorder::default();
        let mut state = InterpreterState::new();
        state.interpret(["on", "dev"], &mut recorder);

        assert!(recorder.executed.is_empty());
        assert!(matches!(
            &state.pending,
            Pending::Collecting(inv) if inv.kind() == CommandKind::Device
        ));
        assert_eq!(filter_kinds(&state), vec![(CommandKind::NoteOn, vec![])]);
        assert!(!state.failed);
    }

    #[test]
    fn test_pending_fixed_arity_completes_in_later_batch() {
        let mut recorder = Recorder::default();
        let mut state = InterpreterState::new();
        state.interpret_line("dev", &mut recorder);
        state.interpret_line("\"My Port\"", &mut recorder);

        assert_eq!(
            recorder.executed,
            vec![(CommandKind::Device, vec!["My Port".to_string()])]
        );
    }

    #[test]
    fn test_radix_toggle_does_not_disturb_pending() {
        let mut recorder = Recorder::default();
        let mut state = InterpreterState::new();
        state.interpret(["pass", "hex", "out"], &mut recorder);

        assert_eq!(
            recorder.executed,
            vec![(CommandKind::PassThrough, vec!["out".to_string()])]
        );
        assert_eq!(state.settings.radix, Radix::Hexadecimal);
    }

    #[test]
    fn test_invocation_captures_radix() {
        let state = interpret_tokens(["ch", "10", "hex", "cc", "10", "dec"]);
        assert_eq!(state.filters[0].radix, Radix::Decimal);
        assert_eq!(state.filters[1].radix, Radix::Hexadecimal);
        assert_eq!(state.settings.radix, Radix::Decimal);
    }

    #[test]
    fn test_stdin_marker_is_skipped() {
        let state = interpret_tokens(["ch", "--", "3"]);
        assert_eq!(
            filter_kinds(&state),
            vec![(CommandKind::Channel, vec!["3".to_string()])]
        );
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let state = interpret_tokens(["bogus", "note", "nonsense"]);
        assert_eq!(filter_kinds(&state), vec![(CommandKind::Note, vec![])]);
        assert!(!state.failed);
    }

    #[test]
    fn test_settings_commands() {
        let state = interpret_tokens(["ts", "nn", "omc", "4", "q", "dump"]);
        assert!(state.settings.timestamps);
        assert!(state.settings.note_numbers);
        assert!(state.settings.quiet);
        assert!(state.settings.raw_dump);
        assert_eq!(state.settings.octave_middle_c, 4);
        assert!(state.filters.is_empty());
    }

    #[test]
    fn test_program_file_as_bare_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# monitor channel 2 notes").unwrap();
        writeln!(file, "ch 2").unwrap();
        writeln!(file, "on C3").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let state = interpret_tokens([path.as_str(), "pb"]);
        assert_eq!(
            filter_kinds(&state),
            vec![
                (CommandKind::Channel, vec!["2".to_string()]),
                (CommandKind::NoteOn, vec!["C3".to_string()]),
                (CommandKind::PitchBend, vec![]),
            ]
        );
    }

    #[test]
    fn test_program_file_command() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cc14 7").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let state = interpret_tokens(["file", path.as_str()]);
        assert_eq!(
            filter_kinds(&state),
            vec![(CommandKind::ControlChange14Bit, vec!["7".to_string()])]
        );
        assert!(!state.failed);
    }

    #[test]
    fn test_self_including_program_file_stops_nesting() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        writeln!(file, "on").unwrap();
        writeln!(file, "file {path}").unwrap();

        let state = interpret_tokens(["file", path.as_str()]);
        assert!(!state.failed);
        assert_eq!(state.filters.len(), MAX_FILE_DEPTH);
        assert!(state.filters.iter().all(|inv| inv.kind() == CommandKind::NoteOn));
        assert!(matches!(state.pending, Pending::Idle));
        assert_eq!(state.file_depth, 0);
    }

    #[test]
    fn test_missing_program_file_fails() {
        let state = interpret_tokens(["file", "/nonexistent/midiscope/program.txt"]);
        assert!(state.failed);
        assert!(state.filters.is_empty());
    }

    #[test]
    fn test_actions_go_to_executor() {
        let mut recorder = Recorder::default();
        let mut state = InterpreterState::new();
        state.interpret(["list", "virt", "cc", "lua", "print(1)"], &mut recorder);

        assert_eq!(
            recorder.executed,
            vec![
                (CommandKind::List, vec![]),
                (CommandKind::Virtual, vec![]),
                (CommandKind::Lua, vec!["print(1)".to_string()]),
            ]
        );
        assert_eq!(filter_kinds(&state), vec![(CommandKind::ControlChange, vec![])]);
    }

    #[test]
    fn test_sysex_file_becomes_filter_only_on_success() {
        let mut recorder = Recorder::default();
        let mut state = InterpreterState::new();
        state.interpret(["syf", "dump.syx"], &mut recorder);
        assert_eq!(state.filters.len(), 1);

        let mut failing = Recorder {
            fail_with: Some(CommandKind::SystemExclusiveFile),
            ..Recorder::default()
        };
        let mut state = InterpreterState::new();
        state.interpret(["syf", "dump.syx"], &mut failing);
        assert!(state.filters.is_empty());
        assert!(state.failed);
    }

    #[test]
    fn test_tokenize_line() {
        assert_eq!(tokenize_line("  ch 1   on  "), vec!["ch", "1", "on"]);
        assert_eq!(
            tokenize_line("dev \"IAC Driver Bus 1\" cc"),
            vec!["dev", "IAC Driver Bus 1", "cc"]
        );
        assert!(tokenize_line("# comment cc 7").is_empty());
        assert!(tokenize_line("").is_empty());
    }

    #[test]
    fn test_tokenize_line_keeps_inner_quotes() {
        assert_eq!(tokenize_line("lua a\"b c\"d"), vec!["lua", "a\"b c\"d"]);
        assert_eq!(tokenize_line("\"x y\"z"), vec!["x y\"z"]);
    }
}
