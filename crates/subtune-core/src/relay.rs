//! Endian-aware forwarding of filled sample buffers to a sink.
//!
//! The relay is the drain side of the engine's sample buffer: it corrects
//! byte order when the sink's required endianness differs from the host's,
//! writes exactly the filled frames, and hands the buffer back empty.

use crate::buffer::SampleBuffer;
use crate::sink::{AudioSink, Endian};
use crate::Result;

/// Drains filled sample buffers into a sink, swapping byte order if needed.
#[derive(Debug)]
pub struct BufferRelay {
    endian: Endian,
    /// Reused serialization buffer; sized on first forward.
    scratch: Vec<u8>,
}

impl BufferRelay {
    /// Create a relay targeting the given endianness.
    pub fn new(endian: Endian) -> Self {
        BufferRelay {
            endian,
            scratch: Vec::new(),
        }
    }

    /// Endianness this relay emits.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Forward a filled (or partially filled) buffer to the sink.
    ///
    /// Swaps every 16-bit sample in place when the target endianness differs
    /// from the host's, writes `frames * 2 channels * 2 bytes` — never the
    /// unused capacity — and resets the write cursor so the engine can keep
    /// filling the buffer. Sample order is preserved; only the byte order
    /// within each sample changes. The sink write may block on device IO,
    /// which is the intended flow control.
    pub fn forward(&mut self, buffer: &mut SampleBuffer, sink: &mut dyn AudioSink) -> Result<()> {
        if self.endian.needs_swap() {
            for sample in buffer.samples_mut() {
                *sample = sample.swap_bytes();
            }
        }

        self.scratch.clear();
        self.scratch.reserve(buffer.samples().len() * 2);
        for &sample in buffer.samples() {
            self.scratch.extend_from_slice(&sample.to_ne_bytes());
        }

        sink.write(&self.scratch)?;
        buffer.reset();
        Ok(())
    }
}
