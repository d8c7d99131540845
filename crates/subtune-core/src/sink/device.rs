//! System audio device sink backed by rodio.

use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use super::{AudioSink, Endian, SinkFlags};
use crate::buffer::CHANNELS;
use crate::{PlayerError, Result};

/// Queue depth (in appended buffers) above which writes block.
const MAX_QUEUED_BUFFERS: usize = 4;

/// Backoff while waiting for the device queue to drain.
const QUEUE_BACKOFF: Duration = Duration::from_millis(2);

/// Plays relayed samples on the default system audio device.
///
/// Samples reach rodio as native-endian `i16`, so only `native` (or the
/// host's own byte order) is accepted. Writes block while the device queue is
/// full; that blocking stalls the engine's tick loop, which is the intended
/// flow control.
pub struct DeviceSink {
    stream: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    rate: u32,
}

impl DeviceSink {
    /// Create a device sink; the device itself is grabbed at open time.
    pub fn new() -> Self {
        DeviceSink {
            stream: None,
            sink: None,
            rate: 0,
        }
    }
}

impl Default for DeviceSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for DeviceSink {
    fn open(&mut self, endian: Endian, rate: u32, _buffer_bytes: &mut usize) -> Result<()> {
        if endian != Endian::Native && endian != Endian::host() {
            return Err(PlayerError::SinkRejected(format!(
                "audio device requires native-endian samples, not {endian}"
            )));
        }

        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| PlayerError::SinkRejected(format!("failed to open audio stream: {e}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| PlayerError::SinkRejected(format!("failed to create audio sink: {e}")))?;

        self.stream = Some((stream, handle));
        self.sink = Some(sink);
        self.rate = rate;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| PlayerError::Sink("audio device written before open".into()))?;

        let samples: Vec<i16> = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_ne_bytes([pair[0], pair[1]]))
            .collect();

        while sink.len() > MAX_QUEUED_BUFFERS {
            std::thread::sleep(QUEUE_BACKOFF);
        }
        sink.append(SamplesBuffer::new(CHANNELS as u16, self.rate, samples));
        Ok(())
    }

    fn pause(&mut self, paused: bool) {
        if let Some(sink) = &self.sink {
            if paused {
                sink.pause();
            } else {
                sink.play();
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            sink.sleep_until_end();
        }
        self.stream = None;
        Ok(())
    }

    fn flags(&self) -> SinkFlags {
        SinkFlags::empty()
    }

    fn description(&self) -> &'static str {
        "system audio device"
    }
}
