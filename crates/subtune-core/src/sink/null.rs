//! Sink that discards everything, for throughput tests and benchmarks.

use super::{AudioSink, Endian, SinkFlags};
use crate::Result;

/// Discards all written bytes, counting them for curiosity's sake.
#[derive(Debug, Default)]
pub struct NullSink {
    bytes_discarded: u64,
}

impl NullSink {
    /// Create a null sink.
    pub fn new() -> Self {
        NullSink::default()
    }

    /// Total bytes swallowed so far.
    pub fn bytes_discarded(&self) -> u64 {
        self.bytes_discarded
    }
}

impl AudioSink for NullSink {
    fn open(&mut self, _endian: Endian, _rate: u32, _buffer_bytes: &mut usize) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes_discarded += bytes.len() as u64;
        Ok(())
    }

    fn flags(&self) -> SinkFlags {
        SinkFlags::empty()
    }

    fn description(&self) -> &'static str {
        "discard all output"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_counts_bytes() {
        let mut sink = NullSink::new();
        let mut buffer_bytes = 8192;
        sink.open(Endian::Native, 44100, &mut buffer_bytes).unwrap();
        sink.write(&[0; 128]).unwrap();
        sink.write(&[0; 64]).unwrap();
        assert_eq!(sink.bytes_discarded(), 192);
    }
}
