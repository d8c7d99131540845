//! Raw PCM sink on standard output, for piping into other tools.

use std::io::{self, Write};

use super::{AudioSink, Endian, SinkFlags};
use crate::Result;

/// Writes raw sample bytes to standard output.
///
/// Honors any requested endianness; the relay has already produced the byte
/// stream the consumer asked for.
pub struct StdoutSink {
    out: io::Stdout,
}

impl StdoutSink {
    /// Create a stdout sink.
    pub fn new() -> Self {
        StdoutSink { out: io::stdout() }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for StdoutSink {
    fn open(&mut self, _endian: Endian, _rate: u32, _buffer_bytes: &mut usize) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.lock().write_all(bytes)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.lock().flush()?;
        Ok(())
    }

    fn flags(&self) -> SinkFlags {
        SinkFlags::USES_STDOUT
    }

    fn description(&self) -> &'static str {
        "raw PCM on standard output"
    }
}
