//! Built-in demo tone engine.
//!
//! A small square-wave generator implementing [`SoundEngine`] so the binary
//! can exercise the sequencing core without an external sound engine, the
//! same way a replayer CLI falls back to a demo player when no file is
//! given. Four detuned voices per subsong, per-subsong pitch and length,
//! gap insertion, fadeout, and silence/subsong timeout enforcement.

use subtune::{
    EngineCallbacks, PlaybackTuning, PlayerError, Result, SampleBuffer, SongCollection,
    SoundEngine, SubsongInfo,
};

/// Sample-clock rate of the demo engine, in ticks per second.
pub const TONE_CLOCK: u64 = 2_000_000;

/// Generator voices per subsong.
pub const VOICES: usize = 4;

/// Mix amplitude below which a frame counts as silent.
const SILENCE_FLOOR: f32 = 0.004;

/// Per-voice frequency ratios over the subsong's base pitch.
const VOICE_RATIOS: [f32; VOICES] = [1.0, 1.5, 2.0, 3.0];

/// Output filter applied to the voice mix.
enum Filter {
    None,
    /// One-pole smoothing, takes the edge off raw squares.
    Lowpass { z: f32 },
}

/// Demo square-wave engine with `songs` subsongs of varying pitch and length.
pub struct ToneEngine {
    collection: SongCollection,
    tuning: PlaybackTuning,
    sample_rate: u32,
    buffer: Option<SampleBuffer>,
    filter: Filter,
    mute: [bool; VOICES],
    current: usize,
    phase: [f32; VOICES],
    freq: [f32; VOICES],
    samples_in_subsong: u64,
    silent_run: u64,
    ticks: u64,
    tick_acc: u64,
    halted: bool,
    pending_io: Vec<(u64, u32, u8)>,
}

impl ToneEngine {
    /// Create an engine with `songs` subsongs.
    ///
    /// Lengths cycle through 4-7 seconds; every fifth subsong reports no
    /// length at all, which exercises the timeout fallback.
    pub fn new(songs: usize) -> Self {
        let subsongs = (0..songs)
            .map(|index| SubsongInfo {
                duration_secs: if index % 5 == 4 {
                    None
                } else {
                    Some(4.0 + (index % 4) as f32)
                },
            })
            .collect();

        ToneEngine {
            collection: SongCollection {
                subsongs,
                default_subsong: 1,
            },
            tuning: PlaybackTuning::default(),
            sample_rate: subtune::DEFAULT_SAMPLE_RATE,
            buffer: None,
            filter: Filter::None,
            mute: [false; VOICES],
            current: 0,
            phase: [0.0; VOICES],
            freq: [0.0; VOICES],
            samples_in_subsong: 0,
            silent_run: 0,
            ticks: 0,
            tick_acc: 0,
            halted: false,
            pending_io: Vec::new(),
        }
    }

    /// Seconds played in the current subsong.
    fn elapsed_secs(&self) -> f32 {
        self.samples_in_subsong as f32 / self.sample_rate as f32
    }

    /// The current subsong is past its allotted time or went silent.
    fn subsong_over(&self) -> bool {
        let elapsed = self.elapsed_secs();
        if elapsed >= self.tuning.subsong_timeout as f32 {
            return true;
        }
        if let Some(length) = self.collection.duration_secs(self.current) {
            if elapsed >= length + self.tuning.subsong_gap as f32 {
                return true;
            }
        }
        self.silent_run >= self.tuning.silence_timeout * u64::from(self.sample_rate)
    }

    /// Generate one stereo frame and advance the clocks.
    fn next_frame(&mut self) -> (i16, i16) {
        let elapsed = self.elapsed_secs();
        let length = self.collection.duration_secs(self.current);
        let in_gap = length.is_some_and(|len| elapsed >= len);

        let mut mix = 0.0f32;
        if !in_gap {
            let rate = self.sample_rate as f32;
            for voice in 0..VOICES {
                let level = if self.phase[voice] < 0.5 { 0.2 } else { -0.2 };
                if !self.mute[voice] {
                    mix += level;
                }
                self.phase[voice] = (self.phase[voice] + self.freq[voice] / rate).fract();
            }

            if let Some(len) = length {
                let fade = self.tuning.fadeout as f32;
                if fade > 0.0 && elapsed > len - fade {
                    mix *= ((len - elapsed) / fade).clamp(0.0, 1.0);
                }
            }
        }

        if let Filter::Lowpass { z } = &mut self.filter {
            *z += 0.3 * (mix - *z);
            mix = *z;
        }

        if in_gap || mix.abs() < SILENCE_FLOOR {
            self.silent_run += 1;
        } else {
            self.silent_run = 0;
        }

        self.samples_in_subsong += 1;
        self.tick_acc += TONE_CLOCK;
        self.ticks += self.tick_acc / u64::from(self.sample_rate);
        self.tick_acc %= u64::from(self.sample_rate);

        let sample = (mix.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        (sample, sample)
    }
}

impl SoundEngine for ToneEngine {
    fn collection(&self) -> &SongCollection {
        &self.collection
    }

    fn clock_rate(&self) -> u64 {
        TONE_CLOCK
    }

    fn elapsed_ticks(&self) -> u64 {
        self.ticks
    }

    fn set_sample_rate(&mut self, rate: u32) {
        self.sample_rate = rate.max(1);
    }

    fn set_filter(&mut self, filter_type: &str) -> Result<()> {
        self.filter = match filter_type {
            "none" => Filter::None,
            "lowpass" => Filter::Lowpass { z: 0.0 },
            other => return Err(PlayerError::UnknownFilter(other.to_string())),
        };
        Ok(())
    }

    fn set_channel_mute(&mut self, channel: usize, mute: bool) {
        if let Some(slot) = self.mute.get_mut(channel) {
            *slot = mute;
        }
    }

    fn set_tuning(&mut self, tuning: PlaybackTuning) {
        self.tuning = tuning;
    }

    fn attach_buffer(&mut self, buffer: SampleBuffer) {
        self.buffer = Some(buffer);
    }

    fn reinitialize(&mut self, subsong: usize) -> Result<()> {
        if subsong >= self.collection.songs() {
            return Err(PlayerError::Engine(format!(
                "subsong {subsong} out of range"
            )));
        }

        self.current = subsong;
        self.phase = [0.0; VOICES];
        self.samples_in_subsong = 0;
        self.silent_run = 0;
        self.ticks = 0;
        self.tick_acc = 0;

        // Chromatic base pitch per subsong, voices stacked above it.
        let base = 110.0 * 2.0f32.powf((subsong % 12) as f32 / 12.0);
        for (voice, ratio) in VOICE_RATIOS.iter().enumerate() {
            self.freq[voice] = base * ratio;
            let period = (TONE_CLOCK as f32 / self.freq[voice]) as u32;
            self.pending_io
                .push((self.ticks, 0xA0 + voice as u32, (period & 0xFF) as u8));
        }
        Ok(())
    }

    fn step(&mut self, callbacks: &mut dyn EngineCallbacks) -> Result<bool> {
        if self.halted {
            return Ok(false);
        }

        let mut buffer = self
            .buffer
            .take()
            .ok_or_else(|| PlayerError::Engine("no sample buffer attached".into()))?;

        for (cycles, addr, val) in self.pending_io.drain(..) {
            callbacks.on_io(cycles, addr, val);
        }

        while !buffer.is_full() {
            if self.subsong_over() {
                if !buffer.is_empty() {
                    callbacks.on_buffer_full(&mut buffer)?;
                }
                self.buffer = Some(buffer);

                return match callbacks.on_subsong_boundary() {
                    subtune::BoundaryDecision::Continue(next) => {
                        self.reinitialize(next)?;
                        Ok(true)
                    }
                    subtune::BoundaryDecision::Complete => {
                        self.halted = true;
                        Ok(false)
                    }
                };
            }

            let (left, right) = self.next_frame();
            buffer.push_frame(left, right);
        }

        callbacks.on_buffer_full(&mut buffer)?;
        self.buffer = Some(buffer);
        Ok(true)
    }
}
