//! Deterministic subsong sequencing and sample relay for chiptune playback.
//!
//! Multi-track chiptune sources expose a fixed set of subsongs; this crate
//! decides which one plays next. It provides:
//!
//! - Seeded shuffle playlists that are reproducible from their seed
//! - A sequencer state machine over Linear/Shuffle/Random play modes with
//!   loop support and inclusive start/stop bounds
//! - A playback session binding the sequencer to a sound engine and an
//!   output sink, with timeout-aware elapsed-time display
//! - An endian-correcting relay that forwards filled sample buffers to the
//!   sink without disturbing sample framing
//!
//! Sound generation itself stays outside: any engine implementing
//! [`SoundEngine`] can drive a session through the [`EngineCallbacks`]
//! delegate it is handed.
//!
//! # Crate feature flags
//! - `export-wav` (default): WAV file sink via hound
//! - `streaming` (optional): system audio device sink via rodio
//!
//! # Quick start
//! ```no_run
//! use subtune::{PlayMode, PlaybackSession, SessionConfig, sink};
//!
//! # fn demo<E: subtune::SoundEngine>(mut engine: E) -> subtune::Result<()> {
//! let config = SessionConfig {
//!     mode: PlayMode::Shuffle,
//!     loop_enabled: true,
//!     ..Default::default()
//! };
//! let sink = sink::by_name(sink::DEFAULT_SINK)?;
//! let mut session = PlaybackSession::open(&mut engine, sink, config)?;
//!
//! while engine.step(&mut session)? {
//!     // engine keeps ticking; callbacks do the sequencing
//! }
//! session.close()
//! # }
//! ```

#![warn(missing_docs)]

mod error;
pub use error::{PlayerError, Result};

pub mod buffer;
pub mod engine;
pub mod playlist;
pub mod relay;
pub mod sequencer;
pub mod session;
pub mod sink;

pub use buffer::{SampleBuffer, DEFAULT_BUFFER_BYTES};
pub use engine::{
    BoundaryDecision, EngineCallbacks, PlaybackTuning, SongCollection, SoundEngine, SubsongInfo,
};
pub use relay::BufferRelay;
pub use sequencer::{PlayMode, Sequencer, SequencerState, SubsongRange};
pub use session::{DisplayTime, PlaybackSession, SessionConfig};
pub use sink::{AudioSink, Endian, SinkFlags};

/// Standard output sample rate (44.1 kHz CD quality).
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default terminal refresh delay in milliseconds.
pub const DEFAULT_REFRESH_DELAY_MS: u64 = 33;
