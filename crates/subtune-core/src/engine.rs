//! Collaborator interfaces for the external sound engine.
//!
//! The sequencing core does not own the tick loop. The engine drives time
//! forward and synchronously invokes the narrow [`EngineCallbacks`] delegate
//! for every hardware-visible IO event, every filled sample buffer and every
//! subsong boundary, all on the engine's own thread. The boundary callback
//! answers with a [`BoundaryDecision`] telling the engine whether to
//! reinitialize for another subsong or halt its loop.

use crate::buffer::SampleBuffer;
use crate::Result;

/// Per-subsong metadata as reported by the sound engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsongInfo {
    /// Known playing time in seconds; `None` when the source does not say.
    pub duration_secs: Option<f32>,
}

/// Immutable description of the loaded song collection.
///
/// Owned by the engine; the session clones a snapshot at open time and never
/// mutates it.
#[derive(Debug, Clone)]
pub struct SongCollection {
    /// One entry per subsong.
    pub subsongs: Vec<SubsongInfo>,
    /// Subsong the source wants played first (1-based, as sources count).
    pub default_subsong: usize,
}

impl SongCollection {
    /// Number of subsongs in the collection.
    pub fn songs(&self) -> usize {
        self.subsongs.len()
    }

    /// Known duration of a subsong, if the source declares one.
    pub fn duration_secs(&self, subsong: usize) -> Option<f32> {
        self.subsongs.get(subsong).and_then(|info| info.duration_secs)
    }
}

/// Timeout and spacing policy the engine enforces while ticking.
///
/// These are engine-side measurements: the core never watches the clock
/// itself, it only reacts to the boundary callback the engine fires when one
/// of the limits is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTuning {
    /// Maximum seconds a subsong plays before forced advancement.
    pub subsong_timeout: u64,
    /// Seconds of continuous near-silence after which a subsong counts as over.
    pub silence_timeout: u64,
    /// Seconds of pause inserted between consecutive subsongs.
    pub subsong_gap: u64,
    /// Seconds over which a subsong is faded before it ends.
    pub fadeout: u64,
}

impl Default for PlaybackTuning {
    fn default() -> Self {
        PlaybackTuning {
            subsong_timeout: 2 * 60,
            silence_timeout: 2,
            subsong_gap: 2,
            fadeout: 3,
        }
    }
}

/// Verdict of the subsong-boundary callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryDecision {
    /// Reinitialize for this subsong (0-based) and keep ticking.
    Continue(usize),
    /// The sequence is complete; halt the tick loop.
    Complete,
}

/// Delegate interface the sequencing core hands to the engine's step loop.
///
/// Implemented by [`crate::session::PlaybackSession`]. All callbacks run
/// synchronously on the engine's thread; none may block indefinitely, though
/// [`EngineCallbacks::on_buffer_full`] may perform a blocking device write.
/// That write is the sole backpressure mechanism: a slow sink stalls the tick
/// loop by design.
pub trait EngineCallbacks {
    /// A hardware-visible register/cycle event occurred.
    fn on_io(&mut self, cycles: u64, addr: u32, val: u8);

    /// The engine's sample buffer reached capacity (or a subsong is ending
    /// with a partial buffer outstanding).
    ///
    /// The implementation drains the buffer and resets its write cursor
    /// before returning; the engine resumes filling at frame zero.
    fn on_buffer_full(&mut self, buffer: &mut SampleBuffer) -> Result<()>;

    /// The current subsong hit a timeout, went silent, or naturally ended.
    ///
    /// On [`BoundaryDecision::Continue`] the engine must reinitialize itself
    /// for the returned subsong before generating further samples.
    fn on_subsong_boundary(&mut self) -> BoundaryDecision;
}

/// Interface the sequencing core expects from a sound-generation engine.
pub trait SoundEngine {
    /// The loaded song collection. Immutable for the session's lifetime.
    fn collection(&self) -> &SongCollection;

    /// Sample-clock rate in ticks per second.
    fn clock_rate(&self) -> u64;

    /// Ticks elapsed within the current subsong.
    fn elapsed_ticks(&self) -> u64;

    /// Select the output sample rate.
    fn set_sample_rate(&mut self, rate: u32);

    /// Select the output filter by name.
    ///
    /// # Errors
    /// [`crate::PlayerError::UnknownFilter`] for names the engine does not
    /// recognize; callers treat this as fatal.
    fn set_filter(&mut self, filter_type: &str) -> Result<()>;

    /// Mute or unmute one generator channel.
    fn set_channel_mute(&mut self, channel: usize, mute: bool);

    /// Apply the timeout/gap/fadeout policy.
    fn set_tuning(&mut self, tuning: PlaybackTuning);

    /// Hand the engine the sample buffer it fills between callbacks.
    ///
    /// The engine owns the buffer from here on; it is only lent back to the
    /// core for the duration of [`EngineCallbacks::on_buffer_full`].
    fn attach_buffer(&mut self, buffer: SampleBuffer);

    /// Restart generation at the given subsong (0-based, in range).
    fn reinitialize(&mut self, subsong: usize) -> Result<()>;

    /// Drive time forward by one scheduling quantum, invoking callbacks as
    /// buffers fill and boundaries are reached.
    ///
    /// Returns `Ok(false)` once a boundary callback answered
    /// [`BoundaryDecision::Complete`]; the caller stops stepping then.
    fn step(&mut self, callbacks: &mut dyn EngineCallbacks) -> Result<bool>;
}
