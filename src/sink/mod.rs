mod pass_through;
mod sysex_file;

pub use pass_through::PassThrough;
pub use sysex_file::SysExFile;

use crate::error::Result;
use crate::filter::Classification;
use crate::message::Message;

pub trait MessageSink {
    fn handle(&mut self, message: &Message, display: &Classification) -> Result<()>;
}

