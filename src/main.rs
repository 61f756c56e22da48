use std::io::{self, BufRead};
use std::process::ExitCode;

use midiscope::{App, InterpreterState, STDIN_MARKER, usage};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();

    let program = env!("CARGO_PKG_NAME");
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        print!("{}", usage(program));
        return ExitCode::SUCCESS;
    }
    if args.iter().any(|a| a == "--version") {
        println!("{program} {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let mut app = App::new();
    let mut state = InterpreterState::new();
    state.interpret(&args, &mut app);

    if args.iter().any(|a| a == STDIN_MARKER) {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => state.interpret_line(&line, &mut app),
                Err(e) => {
                    error!("{e}");
                    break;
                }
            }
        }
    }

    if state.failed {
        return ExitCode::FAILURE;
    }
    if app.quit_requested() {
        return ExitCode::SUCCESS;
    }

    match app.into_engine(&state, io::stdout()).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
