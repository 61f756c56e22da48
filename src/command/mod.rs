pub mod catalog;
pub mod interpreter;

pub use catalog::{Arity, CATALOG, Command, CommandClass, CommandKind};
pub use interpreter::{
    Executor, IgnoreActions, InterpreterState, Invocation, Pending, STDIN_MARKER,
    interpret_tokens, tokenize_line,
};
