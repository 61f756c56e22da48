use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::MessageSink;
use crate::error::Result;
use crate::filter::Classification;
use crate::message::Message;

pub struct SysExFile {
    path: PathBuf,
    file: File,
}

impl SysExFile {
    /// Truncates `path` if it exists.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }
}

impl MessageSink for SysExFile {
    fn handle(&mut self, message: &Message, _display: &Classification) -> Result<()> {
        if let Message::SysEx(_) = message {
            let bytes = message.to_bytes();
            self.file.write_all(&bytes)?;
            self.file.flush()?;
            debug!(path = %self.path.display(), bytes = bytes.len(), "stored sysex");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterEngine;

    #[test]
    fn test_only_sysex_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.syx");
        let mut sink = SysExFile::create(&path).unwrap();
        let display = FilterEngine::default().classify(&Message::Clock);

        sink.handle(&Message::SysEx(vec![0x7e, 0x7f]), &display).unwrap();
        sink.handle(&Message::Clock, &display).unwrap();
        sink.handle(&Message::SysEx(vec![0x01]), &display).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, vec![0xf0, 0x7e, 0x7f, 0xf7, 0xf0, 0x01, 0xf7]);
    }

    #[test]
    fn test_create_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("capture.syx");
        assert!(SysExFile::create(&path).is_err());
    }
}
