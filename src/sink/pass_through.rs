use midir::MidiOutputConnection;
use tracing::info;

use super::MessageSink;
use crate::error::Result;
use crate::filter::Classification;
use crate::message::Message;
use crate::transport;

pub struct PassThrough {
    connection: MidiOutputConnection,
}

impl PassThrough {
    pub fn open(name: &str) -> Result<Self> {
        let (connection, port_name) = transport::open_output(name)?;
        info!(port = %port_name, "passing messages through");
        Ok(Self { connection })
    }
}

impl MessageSink for PassThrough {
    fn handle(&mut self, message: &Message, _display: &Classification) -> Result<()> {
        self.connection.send(&message.to_bytes())?;
        Ok(())
    }
}
