use std::io::Write;

use tracing::{debug, warn};

use crate::error::Result;
use crate::filter::FilterEngine;
use crate::message::Message;
use crate::render::Renderer;
use crate::settings::Settings;
use crate::sink::MessageSink;

pub struct Monitor<W: Write> {
    filters: FilterEngine,
    renderer: Renderer,
    sinks: Vec<Box<dyn MessageSink>>,
    quiet: bool,
    raw_dump: bool,
    out: W,
}

impl<W: Write> Monitor<W> {
    pub fn new(filters: FilterEngine, renderer: Renderer, settings: &Settings, out: W) -> Self {
        Self {
            filters,
            renderer,
            sinks: Vec::new(),
            quiet: settings.quiet,
            raw_dump: settings.raw_dump,
            out,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn MessageSink>) {
        self.sinks.push(sink);
    }

    /// Processes the bytes of one received message. Only a failure to write
    /// to the output is returned; sink failures are logged.
    pub fn process(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(message) = Message::decode(bytes) else {
            debug!(?bytes, "skipping undecodable message");
            return Ok(());
        };

        let display = self.filters.classify(&message);
        if !display.filtered {
            return Ok(());
        }

        for sink in &mut self.sinks {
            if let Err(e) = sink.handle(&message, &display) {
                warn!("{e}");
            }
        }

        if self.quiet {
            return Ok(());
        }
        if self.raw_dump {
            self.out.write_all(bytes)?;
        } else {
            for line in self.renderer.render(&message, &display) {
                writeln!(self.out, "{line}")?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::interpret_tokens;
    use crate::filter::Classification;
    use std::sync::{Arc, Mutex};

    fn monitor(tokens: &[&str]) -> Monitor<Vec<u8>> {
        let state = interpret_tokens(tokens);
        Monitor::new(
            FilterEngine::new(&state.filters, &state.settings),
            Renderer::new(&state.settings, false),
            &state.settings,
            Vec::new(),
        )
    }

    fn output(monitor: Monitor<Vec<u8>>) -> String {
        String::from_utf8(monitor.into_inner()).unwrap()
    }

    struct Counter(Arc<Mutex<Vec<Message>>>);

    impl MessageSink for Counter {
        fn handle(&mut self, message: &Message, _display: &Classification) -> Result<()> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[test]
    fn test_renders_filtered_messages() {
        let mut monitor = monitor(&["on"]);
        monitor.process(&[0x90, 60, 100]).unwrap();
        monitor.process(&[0x80, 60, 0]).unwrap();
        assert_eq!(output(monitor), "channel  1   note-on           C3 100\n");
    }

    #[test]
    fn test_undecodable_bytes_are_skipped() {
        let mut monitor = monitor(&[]);
        monitor.process(&[0x90, 60]).unwrap();
        monitor.process(&[]).unwrap();
        assert_eq!(output(monitor), "");
    }

    #[test]
    fn test_raw_dump() {
        let mut monitor = monitor(&["dump", "clock"]);
        monitor.process(&[0xf8]).unwrap();
        monitor.process(&[0xfa]).unwrap();
        assert_eq!(monitor.into_inner(), vec![0xf8]);
    }

    #[test]
    fn test_quiet_still_feeds_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut monitor = monitor(&["q", "pc"]);
        monitor.add_sink(Box::new(Counter(seen.clone())));

        monitor.process(&[0xc0, 5]).unwrap();
        monitor.process(&[0xf8]).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Message::ProgramChange { channel: 1, program: 5 }]);
        assert_eq!(output(monitor), "");
    }

    #[test]
    fn test_rpn_burst() {
        let mut monitor = monitor(&["rpn"]);
        for bytes in [[0xb0u8, 101, 0], [0xb0, 100, 5], [0xb0, 6, 10], [0xb0, 38, 20]] {
            monitor.process(&bytes).unwrap();
        }
        assert_eq!(
            output(monitor),
            "channel  1   rpn                5  1280\n\
             channel  1   rpn                5  1300\n"
        );
    }
}
