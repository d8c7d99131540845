//! WAV file sink backed by hound.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use super::{AudioSink, Endian, SinkFlags};
use crate::buffer::CHANNELS;
use crate::{PlayerError, Result};

/// Output path used when the caller does not pick one.
pub const DEFAULT_OUTPUT_PATH: &str = "subtune-out.wav";

/// Writes relayed samples into a 16-bit PCM WAV file.
///
/// WAV data is little-endian by definition, so a big-endian request (or a
/// native request on a big-endian host) is rejected at open time instead of
/// producing a byte-swapped file.
pub struct WavSink {
    path: PathBuf,
    writer: Option<WavWriter<BufWriter<File>>>,
}

impl WavSink {
    /// Create a WAV sink that will write to `path` once opened.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        WavSink {
            path: path.as_ref().to_path_buf(),
            writer: None,
        }
    }
}

impl AudioSink for WavSink {
    fn open(&mut self, endian: Endian, rate: u32, _buffer_bytes: &mut usize) -> Result<()> {
        match endian {
            Endian::Little => {}
            Endian::Native if Endian::host() == Endian::Little => {}
            other => {
                return Err(PlayerError::SinkRejected(format!(
                    "WAV output requires little-endian samples, not {other}"
                )));
            }
        }

        let spec = WavSpec {
            channels: CHANNELS as u16,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(&self.path, spec)
            .map_err(|e| PlayerError::SinkRejected(e.to_string()))?;
        self.writer = Some(writer);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| PlayerError::Sink("WAV sink written before open".into()))?;

        for pair in bytes.chunks_exact(2) {
            let sample = i16::from_le_bytes([pair[0], pair[1]]);
            writer
                .write_sample(sample)
                .map_err(|e| PlayerError::Sink(e.to_string()))?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer
                .finalize()
                .map_err(|e| PlayerError::Sink(e.to_string()))?;
        }
        Ok(())
    }

    fn flags(&self) -> SinkFlags {
        SinkFlags::empty()
    }

    fn description(&self) -> &'static str {
        "WAV file writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_sink_rejects_big_endian() {
        let mut sink = WavSink::new("unused.wav");
        let mut buffer_bytes = 8192;
        match sink.open(Endian::Big, 44100, &mut buffer_bytes) {
            Err(PlayerError::SinkRejected(_)) => {}
            other => panic!("expected SinkRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_wav_sink_roundtrip() {
        let dir = std::env::temp_dir().join("subtune-wav-sink-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.wav");

        let mut sink = WavSink::new(&path);
        let mut buffer_bytes = 8192;
        sink.open(Endian::Little, 44100, &mut buffer_bytes).unwrap();
        sink.write(&[0x34, 0x12, 0xCD, 0xAB]).unwrap();
        sink.close().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0x1234, 0xABCDu16 as i16]);

        std::fs::remove_file(&path).ok();
    }
}
