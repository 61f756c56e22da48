pub mod app;
pub mod command;
pub mod engine;
pub mod error;
pub mod filter;
pub mod message;
pub mod monitor;
pub mod numeric;
pub mod render;
pub mod scripting;
pub mod settings;
pub mod sink;
pub mod transport;

pub use app::App;
pub use command::catalog::usage;
pub use command::{InterpreterState, STDIN_MARKER, interpret_tokens};
pub use engine::Engine;
pub use error::{Error, Result};
pub use filter::{Classification, FilterEngine};
pub use message::Message;
pub use monitor::Monitor;
pub use render::Renderer;
pub use settings::Settings;
