//! Option storage and rc-file parsing.
//!
//! Options come from three places, later sources overriding earlier ones:
//! the system rc file, the user rc file, then command-line flags. An rc file
//! holds one `key value` pair per line; `#` starts a comment. Unrecognized
//! keys are ignored so newer rc files keep working with older builds.

use std::fs;
use std::path::{Path, PathBuf};

use subtune::{Endian, PlayMode, DEFAULT_REFRESH_DELAY_MS, DEFAULT_SAMPLE_RATE};

/// System-wide rc file.
pub const SYSTEM_RC: &str = "/etc/subtunerc";

/// User rc file name, resolved against `$HOME`.
pub const USER_RC: &str = ".subtunerc";

/// The flat option set exposed to rc files and flags.
#[derive(Debug, Clone)]
pub struct Options {
    /// Byte order delivered to the sink.
    pub endian: Endian,
    /// Fadeout duration in seconds.
    pub fadeout: u64,
    /// Output filter name, resolved by the engine.
    pub filter_type: String,
    /// Restart the sequence once it completes.
    pub loop_enabled: bool,
    /// Output sink registry name.
    pub output_sink: String,
    /// Sample rate in Hz.
    pub rate: u32,
    /// Terminal refresh delay in milliseconds.
    pub refresh_delay_ms: u64,
    /// Seconds of near-silence that end a subsong.
    pub silence_timeout: u64,
    /// Seconds of pause between subsongs.
    pub subsong_gap: u64,
    /// Maximum seconds a subsong plays.
    pub subsong_timeout: u64,
    /// Terminal verbosity; 0 is silent.
    pub verbosity: i64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            endian: Endian::Native,
            fadeout: 3,
            filter_type: "lowpass".to_string(),
            loop_enabled: false,
            output_sink: subtune::sink::DEFAULT_SINK.to_string(),
            rate: DEFAULT_SAMPLE_RATE,
            refresh_delay_ms: DEFAULT_REFRESH_DELAY_MS,
            silence_timeout: 2,
            subsong_gap: 2,
            subsong_timeout: 2 * 60,
            verbosity: 3,
        }
    }
}

impl Options {
    /// Path of the user rc file, if a home directory is known.
    pub fn user_rc_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| Path::new(&home).join(USER_RC))
    }

    /// Merge an rc file into these options. A missing file is not an error.
    pub fn parse_file(&mut self, path: &Path) {
        if let Ok(text) = fs::read_to_string(path) {
            self.parse_str(&text);
        }
    }

    /// Merge rc-file text into these options.
    pub fn parse_str(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
                continue;
            };
            self.set(key, value);
        }
    }

    /// Apply one named option. Unknown keys and unparsable values are
    /// silently ignored, matching rc-file semantics.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "endian" => {
                if let Some(endian) = parse_endian(value) {
                    self.endian = endian;
                }
            }
            "fadeout" => parse_into(&mut self.fadeout, value),
            "filter_type" => self.filter_type = value.to_string(),
            "loop" => {
                if let Ok(flag) = value.parse::<i64>() {
                    self.loop_enabled = flag != 0;
                }
            }
            "output_sink" => self.output_sink = value.to_string(),
            "rate" => parse_into(&mut self.rate, value),
            "refresh_delay" => parse_into(&mut self.refresh_delay_ms, value),
            "silence_timeout" => parse_into(&mut self.silence_timeout, value),
            "subsong_gap" => parse_into(&mut self.subsong_gap, value),
            "subsong_timeout" => parse_into(&mut self.subsong_timeout, value),
            "verbosity" => parse_into(&mut self.verbosity, value),
            _ => {}
        }
    }

    /// Translate into the core's session configuration.
    pub fn session_config(
        &self,
        mode: PlayMode,
        seed: Option<u64>,
        range: subtune::SubsongRange,
    ) -> subtune::SessionConfig {
        subtune::SessionConfig {
            mode,
            loop_enabled: self.loop_enabled,
            seed,
            endian: self.endian,
            rate: self.rate,
            range,
            tuning: subtune::PlaybackTuning {
                subsong_timeout: self.subsong_timeout,
                silence_timeout: self.silence_timeout,
                subsong_gap: self.subsong_gap,
                fadeout: self.fadeout,
            },
            filter_type: self.filter_type.clone(),
            buffer_bytes: subtune::DEFAULT_BUFFER_BYTES,
        }
    }
}

/// Parse an endian name or single-letter abbreviation.
pub fn parse_endian(value: &str) -> Option<Endian> {
    match value.to_ascii_lowercase().as_str() {
        "b" | "big" => Some(Endian::Big),
        "l" | "little" => Some(Endian::Little),
        "n" | "native" => Some(Endian::Native),
        _ => None,
    }
}

fn parse_into<T: std::str::FromStr>(slot: &mut T, value: &str) {
    if let Ok(parsed) = value.parse() {
        *slot = parsed;
    }
}
