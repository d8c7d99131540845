//! Playback session: binds the sequencer to an engine and a sink.
//!
//! The session is the glue the frontend sees. It snapshots the engine's song
//! collection, opens the sink, seeds and initializes the sequencer, and then
//! serves as the [`EngineCallbacks`] delegate while the engine's tick loop
//! runs. All sequencing state lives here rather than in process-wide
//! variables, so multiple sessions can coexist and tests can drive one
//! directly.

use crate::buffer::{SampleBuffer, DEFAULT_BUFFER_BYTES};
use crate::engine::{
    BoundaryDecision, EngineCallbacks, PlaybackTuning, SongCollection, SoundEngine,
};
use crate::relay::BufferRelay;
use crate::sequencer::{PlayMode, Sequencer, SequencerState, SubsongRange};
use crate::sink::{AudioSink, Endian};
use crate::{PlayerError, Result, DEFAULT_SAMPLE_RATE};

/// Everything the configuration layer decides before a session starts.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Subsong ordering policy.
    pub mode: PlayMode,
    /// Restart from the configured start once the sequence ends.
    pub loop_enabled: bool,
    /// Shuffle/random seed; `None` derives one from time and pid.
    pub seed: Option<u64>,
    /// Byte order delivered to the sink.
    pub endian: Endian,
    /// Output sample rate in Hz.
    pub rate: u32,
    /// Requested subsong range, clamped at open time.
    pub range: SubsongRange,
    /// Timeout/gap/fadeout policy forwarded to the engine.
    pub tuning: PlaybackTuning,
    /// Output filter name, resolved by the engine.
    pub filter_type: String,
    /// Proposed sample buffer size in bytes; sinks may adjust it.
    pub buffer_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            mode: PlayMode::Linear,
            loop_enabled: false,
            seed: None,
            endian: Endian::Native,
            rate: DEFAULT_SAMPLE_RATE,
            range: SubsongRange::default(),
            tuning: PlaybackTuning::default(),
            filter_type: "none".to_string(),
            buffer_bytes: DEFAULT_BUFFER_BYTES,
        }
    }
}

/// Played/total time split into minutes and seconds, for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTime {
    /// Minutes played in the current subsong.
    pub played_min: u64,
    /// Seconds-within-minute played.
    pub played_sec: u64,
    /// Total minutes of the current subsong (or of the timeout budget).
    pub total_min: u64,
    /// Total seconds-within-minute.
    pub total_sec: u64,
}

/// An open playback session over one engine and one sink.
pub struct PlaybackSession {
    sequencer: Sequencer,
    collection: SongCollection,
    relay: BufferRelay,
    sink: Box<dyn AudioSink>,
    clock_rate: u64,
    subsong_timeout: u64,
}

impl PlaybackSession {
    /// Open a session: configure the engine and sink, pick the first subsong
    /// and initialize the engine for it.
    ///
    /// # Errors
    /// * [`PlayerError::NoSubsongs`] when the engine's collection is empty.
    /// * [`PlayerError::UnknownFilter`] / sink open failures propagate; both
    ///   are fatal at the frontend.
    pub fn open<E: SoundEngine>(
        engine: &mut E,
        mut sink: Box<dyn AudioSink>,
        config: SessionConfig,
    ) -> Result<Self> {
        let collection = engine.collection().clone();
        let songs = collection.songs();
        if songs == 0 {
            return Err(PlayerError::NoSubsongs);
        }

        let mut buffer_bytes = config.buffer_bytes;
        sink.open(config.endian, config.rate, &mut buffer_bytes)?;

        engine.set_sample_rate(config.rate);
        engine.set_filter(&config.filter_type)?;
        engine.set_tuning(config.tuning);
        engine.attach_buffer(SampleBuffer::new(buffer_bytes));

        let seed = config.seed.unwrap_or_else(entropy_seed);
        let mut sequencer =
            Sequencer::new(config.mode, config.loop_enabled, seed, config.range, songs);
        sequencer.setup_playmode(&collection);
        let first = sequencer.current().ok_or(PlayerError::NoSubsongs)?;

        engine.reinitialize(first)?;
        sink.skip(first);

        Ok(PlaybackSession {
            sequencer,
            collection,
            relay: BufferRelay::new(config.endian),
            sink,
            clock_rate: engine.clock_rate().max(1),
            subsong_timeout: config.tuning.subsong_timeout,
        })
    }

    /// Close the session, flushing and releasing the sink.
    pub fn close(mut self) -> Result<()> {
        self.sink.close()
    }

    /// Currently selected subsong, if the sequence is still running.
    pub fn current_subsong(&self) -> Option<usize> {
        self.sequencer.current()
    }

    /// Sequencer phase.
    pub fn state(&self) -> SequencerState {
        self.sequencer.state()
    }

    /// Seed the live shuffle playlist was built from.
    pub fn seed(&self) -> u64 {
        self.sequencer.seed()
    }

    /// Snapshot of the engine's song collection.
    pub fn collection(&self) -> &SongCollection {
        &self.collection
    }

    /// User skip to the next subsong. Same rules as a natural end-of-subsong;
    /// returns `None` once the sequence is complete.
    pub fn skip_forward<E: SoundEngine>(&mut self, engine: &mut E) -> Result<Option<usize>> {
        match EngineCallbacks::on_subsong_boundary(self) {
            BoundaryDecision::Continue(next) => {
                engine.reinitialize(next)?;
                Ok(Some(next))
            }
            BoundaryDecision::Complete => Ok(None),
        }
    }

    /// User skip to the previous subsong.
    ///
    /// A linear sequence already at its first subsong stays put. In Random
    /// mode this is a fresh draw, not history.
    pub fn skip_backward<E: SoundEngine>(&mut self, engine: &mut E) -> Result<Option<usize>> {
        let Some(prev) = self.sequencer.advance_backward() else {
            return Ok(self.sequencer.current());
        };
        self.sequencer.select(prev);
        engine.reinitialize(prev)?;
        self.sink.skip(prev);
        Ok(Some(prev))
    }

    /// Convert engine-reported elapsed ticks into a played/total display.
    ///
    /// A subsong with unknown length shows the configured subsong timeout as
    /// its total. Pure and read-only.
    pub fn display_time(&self, elapsed_ticks: u64) -> DisplayTime {
        let played = elapsed_ticks / self.clock_rate;

        let total = self
            .current_subsong()
            .and_then(|subsong| self.collection.duration_secs(subsong))
            .map(|secs| secs as u64)
            .filter(|&secs| secs > 0)
            .unwrap_or(self.subsong_timeout);

        DisplayTime {
            played_min: played / 60,
            played_sec: played % 60,
            total_min: total / 60,
            total_sec: total % 60,
        }
    }
}

impl EngineCallbacks for PlaybackSession {
    fn on_io(&mut self, cycles: u64, addr: u32, val: u8) {
        self.sink.io(cycles, addr, val);
    }

    fn on_buffer_full(&mut self, buffer: &mut SampleBuffer) -> Result<()> {
        self.relay.forward(buffer, self.sink.as_mut())
    }

    fn on_subsong_boundary(&mut self) -> BoundaryDecision {
        let decision = self.sequencer.on_subsong_boundary(&self.collection);
        if let BoundaryDecision::Continue(next) = decision {
            self.sink.skip(next);
        }
        decision
    }
}

/// Session seed when the configuration does not pin one.
fn entropy_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs() ^ u64::from(std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SubsongInfo;
    use crate::sink::SinkFlags;

    /// Minimal engine stub: enough state for open() and the accessors.
    struct StubEngine {
        collection: SongCollection,
        reinits: Vec<usize>,
    }

    impl StubEngine {
        fn new(songs: usize) -> Self {
            let mut subsongs = vec![
                SubsongInfo {
                    duration_secs: Some(90.0)
                };
                songs
            ];
            if let Some(last) = subsongs.last_mut() {
                last.duration_secs = None;
            }
            StubEngine {
                collection: SongCollection {
                    subsongs,
                    default_subsong: 1,
                },
                reinits: Vec::new(),
            }
        }
    }

    impl SoundEngine for StubEngine {
        fn collection(&self) -> &SongCollection {
            &self.collection
        }

        fn clock_rate(&self) -> u64 {
            1000
        }

        fn elapsed_ticks(&self) -> u64 {
            0
        }

        fn set_sample_rate(&mut self, _rate: u32) {}

        fn set_filter(&mut self, filter_type: &str) -> Result<()> {
            match filter_type {
                "none" => Ok(()),
                other => Err(PlayerError::UnknownFilter(other.to_string())),
            }
        }

        fn set_channel_mute(&mut self, _channel: usize, _mute: bool) {}

        fn set_tuning(&mut self, _tuning: PlaybackTuning) {}

        fn attach_buffer(&mut self, _buffer: SampleBuffer) {}

        fn reinitialize(&mut self, subsong: usize) -> Result<()> {
            self.reinits.push(subsong);
            Ok(())
        }

        fn step(&mut self, _callbacks: &mut dyn EngineCallbacks) -> Result<bool> {
            Ok(true)
        }
    }

    /// Sink that records skip notifications.
    #[derive(Default)]
    struct SkipSink {
        skips: Vec<usize>,
    }

    impl AudioSink for SkipSink {
        fn open(&mut self, _endian: Endian, _rate: u32, _buffer_bytes: &mut usize) -> Result<()> {
            Ok(())
        }

        fn write(&mut self, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }

        fn skip(&mut self, subsong: usize) {
            self.skips.push(subsong);
        }

        fn flags(&self) -> SinkFlags {
            SinkFlags::empty()
        }

        fn description(&self) -> &'static str {
            "skip recorder"
        }
    }

    fn config(range: SubsongRange) -> SessionConfig {
        SessionConfig {
            seed: Some(11),
            range,
            ..Default::default()
        }
    }

    #[test]
    fn test_open_initializes_engine_and_notifies_sink() {
        let mut engine = StubEngine::new(5);
        let session = PlaybackSession::open(
            &mut engine,
            Box::new(SkipSink::default()),
            config(SubsongRange { start: 2, stop: -1 }),
        )
        .unwrap();

        assert_eq!(session.current_subsong(), Some(2));
        assert_eq!(engine.reinits, vec![2]);
    }

    #[test]
    fn test_open_rejects_empty_collection() {
        let mut engine = StubEngine::new(0);
        let result = PlaybackSession::open(
            &mut engine,
            Box::new(SkipSink::default()),
            config(SubsongRange::default()),
        );
        assert!(matches!(result, Err(PlayerError::NoSubsongs)));
    }

    #[test]
    fn test_open_rejects_unknown_filter() {
        let mut engine = StubEngine::new(3);
        let mut cfg = config(SubsongRange::default());
        cfg.filter_type = "tube-warmth".to_string();
        let result = PlaybackSession::open(&mut engine, Box::new(SkipSink::default()), cfg);
        assert!(matches!(result, Err(PlayerError::UnknownFilter(_))));
    }

    #[test]
    fn test_skip_forward_reinitializes_engine() {
        let mut engine = StubEngine::new(4);
        let mut session = PlaybackSession::open(
            &mut engine,
            Box::new(SkipSink::default()),
            config(SubsongRange::default()),
        )
        .unwrap();

        assert_eq!(session.skip_forward(&mut engine).unwrap(), Some(1));
        assert_eq!(session.skip_forward(&mut engine).unwrap(), Some(2));
        assert_eq!(engine.reinits, vec![0, 1, 2]);
    }

    #[test]
    fn test_skip_backward_at_front_is_a_noop() {
        let mut engine = StubEngine::new(4);
        let mut session = PlaybackSession::open(
            &mut engine,
            Box::new(SkipSink::default()),
            config(SubsongRange::default()),
        )
        .unwrap();

        assert_eq!(session.skip_backward(&mut engine).unwrap(), Some(0));
        assert_eq!(engine.reinits, vec![0], "no reinit for a refused skip");
    }

    #[test]
    fn test_display_time_uses_known_length() {
        let mut engine = StubEngine::new(3);
        let session = PlaybackSession::open(
            &mut engine,
            Box::new(SkipSink::default()),
            config(SubsongRange::default()),
        )
        .unwrap();

        // clock_rate is 1000 ticks/s; 75 seconds played of a 90 second song.
        let time = session.display_time(75_000);
        assert_eq!(
            time,
            DisplayTime {
                played_min: 1,
                played_sec: 15,
                total_min: 1,
                total_sec: 30,
            }
        );
    }

    #[test]
    fn test_display_time_falls_back_to_timeout() {
        let mut engine = StubEngine::new(3);
        // Last subsong has no known duration.
        let session = PlaybackSession::open(
            &mut engine,
            Box::new(SkipSink::default()),
            config(SubsongRange { start: 2, stop: -1 }),
        )
        .unwrap();

        let time = session.display_time(0);
        assert_eq!(time.total_min, 2);
        assert_eq!(time.total_sec, 0, "unknown length shows the subsong timeout");
    }
}
