use std::io::Write;

use midiscope::command::IgnoreActions;
use midiscope::{FilterEngine, InterpreterState, Monitor, Renderer, interpret_tokens};

fn monitor_for(state: &InterpreterState) -> Monitor<Vec<u8>> {
    Monitor::new(
        FilterEngine::new(&state.filters, &state.settings),
        Renderer::new(&state.settings, false),
        &state.settings,
        Vec::new(),
    )
}

fn feed(state: &InterpreterState, messages: &[&[u8]]) -> Vec<String> {
    let mut monitor = monitor_for(state);
    for bytes in messages {
        monitor.process(bytes).unwrap();
    }
    String::from_utf8(monitor.into_inner())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_channel_scoped_notes() {
    let state = interpret_tokens(["ch", "1", "note-on"]);
    let lines = feed(&state, &[&[0x90, 60, 100], &[0x91, 60, 100], &[0x80, 60, 0]]);
    assert_eq!(lines, vec!["channel  1   note-on           C3 100"]);
}

#[test]
fn test_unfiltered_stream() {
    let state = interpret_tokens(Vec::<String>::new());
    let lines = feed(
        &state,
        &[&[0xb0, 7, 100], &[0xf8], &[0xf0, 0x43, 0x10, 0xf7], &[0xf3, 2]],
    );
    assert_eq!(
        lines,
        vec![
            "channel  1   control-change     7   100",
            "midi-clock",
            "system-exclusive hex 43 10 dec",
            "song-select   2",
        ]
    );
}

#[test]
fn test_fourteen_bit_controllers_in_hex() {
    let state = interpret_tokens(["hex", "cc14", "07"]);
    let lines = feed(&state, &[&[0xb0, 0x07, 0x40], &[0xb0, 0x27, 0x01], &[0xb0, 0x08, 0x40]]);
    assert_eq!(
        lines,
        vec![
            "channel 01   cc14              07  2000",
            "channel 01   cc14              07  2001",
        ]
    );
}

#[test]
fn test_nrpn_with_control_changes() {
    let state = interpret_tokens(["cc", "nrpnf"]);
    let lines = feed(
        &state,
        &[&[0xb2, 99, 0], &[0xb2, 98, 3], &[0xb2, 6, 1], &[0xb2, 38, 2]],
    );
    assert_eq!(
        lines,
        vec![
            "channel  3   control-change    99     0",
            "channel  3   control-change    98     3",
            "channel  3   control-change     6     1",
            "channel  3   control-change    38     2",
            "channel  3   nrpn               3   130",
        ]
    );
}

#[test]
fn test_program_file_and_stdin_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# only bends and program changes").unwrap();
    writeln!(file, "nn pb").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let mut state = InterpreterState::new();
    state.interpret([path.as_str(), "--"], &mut IgnoreActions);
    state.interpret_line("pc 5", &mut IgnoreActions);
    state.interpret_line("on", &mut IgnoreActions);
    assert!(!state.failed);

    let lines = feed(
        &state,
        &[&[0xe0, 0, 0x40], &[0xc0, 5], &[0xc0, 6], &[0x90, 64, 1]],
    );
    assert_eq!(
        lines,
        vec![
            "channel  1   pitch-bend          8192",
            "channel  1   program-change         5",
            "channel  1   note-on           64   1",
        ]
    );
}

#[test]
fn test_identical_histories_produce_identical_output() {
    let history: &[&[u8]] = &[&[0xb0, 1, 64], &[0xb0, 33, 5], &[0xb0, 101, 0], &[0xb0, 100, 0], &[0xb0, 6, 2]];
    let state = interpret_tokens(["cc14", "rpn"]);
    assert_eq!(feed(&state, history), feed(&state, history));
}
