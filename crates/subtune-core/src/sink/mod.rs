//! Output sink abstraction and registry.
//!
//! A sink is where relayed sample bytes end up: standard output, a WAV file,
//! the system audio device, or nowhere at all. One implementation per sink
//! kind; the CLI selects one by name at startup and the session holds it
//! boxed for its whole lifetime.

mod null;
mod stdout;

#[cfg(feature = "export-wav")]
mod wav;

#[cfg(feature = "streaming")]
mod device;

pub use null::NullSink;
pub use stdout::StdoutSink;

#[cfg(feature = "export-wav")]
pub use wav::WavSink;

#[cfg(feature = "streaming")]
pub use device::DeviceSink;

use crate::{PlayerError, Result};

/// Sink selected when the configuration names none.
pub const DEFAULT_SINK: &str = "stdout";

/// Byte order of the 16-bit samples a sink consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
    /// Whatever the host uses; never swapped.
    #[default]
    Native,
}

impl Endian {
    /// The host machine's byte order.
    pub fn host() -> Endian {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// True when emitting this byte order on this host requires swapping.
    pub fn needs_swap(self) -> bool {
        match self {
            Endian::Native => false,
            other => other != Endian::host(),
        }
    }

    /// Short name used in configuration and status output.
    pub fn as_str(self) -> &'static str {
        match self {
            Endian::Big => "big",
            Endian::Little => "little",
            Endian::Native => "native",
        }
    }
}

impl std::fmt::Display for Endian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags::bitflags! {
    /// Capability flags a sink declares at registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SinkFlags: u32 {
        /// The sink writes its payload to standard output; frontends should
        /// default to quiet terminal reporting.
        const USES_STDOUT = 1;
    }
}

/// Polymorphic output sink.
///
/// Only [`AudioSink::open`], [`AudioSink::write`] and
/// [`AudioSink::description`] are mandatory; the remaining hooks default to
/// no-ops for sinks that have no use for them.
pub trait AudioSink {
    /// Prepare the sink.
    ///
    /// `buffer_bytes` arrives holding the proposed sample buffer size; a sink
    /// with its own preference overwrites it before returning.
    fn open(&mut self, endian: Endian, rate: u32, buffer_bytes: &mut usize) -> Result<()>;

    /// Write raw sample bytes. May block on device IO; that blocking is the
    /// session's flow control.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Playback skipped to another subsong.
    fn skip(&mut self, _subsong: usize) {}

    /// Playback paused or resumed.
    fn pause(&mut self, _paused: bool) {}

    /// One scheduling step elapsed.
    fn step(&mut self) {}

    /// A hardware IO event, for sinks that consume register streams.
    fn io(&mut self, _cycles: u64, _addr: u32, _val: u8) {}

    /// Flush and release the sink.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Capability flags.
    fn flags(&self) -> SinkFlags {
        SinkFlags::empty()
    }

    /// One-line human-readable description.
    fn description(&self) -> &'static str;
}

impl std::fmt::Debug for dyn AudioSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSink")
            .field("description", &self.description())
            .finish()
    }
}

/// Name and description of a registered sink, for `-o list` style output.
#[derive(Debug, Clone, Copy)]
pub struct SinkInfo {
    /// Registry name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
}

/// All sinks compiled into this build.
pub fn available() -> Vec<SinkInfo> {
    let mut sinks = vec![
        SinkInfo {
            name: "stdout",
            description: "raw PCM on standard output",
        },
        SinkInfo {
            name: "null",
            description: "discard all output",
        },
    ];

    #[cfg(feature = "export-wav")]
    sinks.push(SinkInfo {
        name: "wav",
        description: "WAV file writer",
    });

    #[cfg(feature = "streaming")]
    sinks.push(SinkInfo {
        name: "device",
        description: "system audio device",
    });

    sinks
}

/// Look a sink up by registry name.
///
/// # Errors
/// [`PlayerError::UnknownSink`] when no sink with that name is compiled in;
/// frontends treat this as fatal.
pub fn by_name(name: &str) -> Result<Box<dyn AudioSink>> {
    match name {
        "stdout" => Ok(Box::new(StdoutSink::new())),
        "null" => Ok(Box::new(NullSink::new())),

        #[cfg(feature = "export-wav")]
        "wav" => Ok(Box::new(WavSink::new(wav::DEFAULT_OUTPUT_PATH))),

        #[cfg(feature = "streaming")]
        "device" => Ok(Box::new(DeviceSink::new())),

        _ => Err(PlayerError::UnknownSink(name.to_string())),
    }
}
