//! Command-line argument parsing.
//!
//! Short flags in the traditional player style, applied on top of whatever
//! the rc files already set. Positional arguments select the subsong range
//! (1-based, stop inclusive).

use subtune::PlayMode;

use crate::config::{parse_endian, Options};

/// Number of mutable generator channels addressed by `-1` through `-4`.
pub const MUTE_CHANNELS: usize = 4;

/// Demo engine subsong count when `-n` is not given.
pub const DEFAULT_DEMO_SONGS: usize = 8;

/// Everything parsing decides beyond the flat [`Options`].
#[derive(Debug, Default)]
pub struct ParsedArgs {
    /// Print usage and exit; `failed` selects the exit code.
    pub show_help: bool,
    /// Parsing hit an error; help goes to stderr and the exit code is 1.
    pub failed: bool,
    /// Print the version and exit.
    pub show_version: bool,
    /// Subsong ordering policy (flags `-z` / `-Z`).
    pub mode: PlayMode,
    /// Channels to mute at startup, toggled by `-1`..`-4`.
    pub mute: [bool; MUTE_CHANNELS],
    /// Shuffle/random seed override (`-s`), for reproducible runs.
    pub seed: Option<u64>,
    /// Demo engine subsong count (`-n`).
    pub songs: usize,
    /// First subsong to play, 0-based, `-1` when unset.
    pub start: i64,
    /// Last subsong to play, 0-based, `-1` when unset.
    pub stop: i64,
}

impl ParsedArgs {
    fn new() -> Self {
        ParsedArgs {
            songs: DEFAULT_DEMO_SONGS,
            start: -1,
            stop: -1,
            ..Default::default()
        }
    }
}

/// Parse flags into `options`, returning the extra decisions.
///
/// `-c <file>` merges an rc file at its position in the argument list, so
/// later flags still win over it.
pub fn parse<I>(args: I, options: &mut Options) -> ParsedArgs
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = ParsedArgs::new();
    let mut failed = false;
    let mut positionals: Vec<String> = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-1" | "-2" | "-3" | "-4" => {
                let channel = arg.as_bytes()[1] as usize - b'1' as usize;
                parsed.mute[channel] ^= true;
            }
            "-c" => {
                if let Some(path) = take_value(&mut iter, &arg, &mut failed) {
                    options.parse_file(std::path::Path::new(&path));
                }
            }
            "-E" => {
                if let Some(value) = take_value(&mut iter, &arg, &mut failed) {
                    match parse_endian(&value) {
                        Some(endian) => options.endian = endian,
                        None => {
                            eprintln!("\"{value}\" is not a valid endian");
                            failed = true;
                        }
                    }
                }
            }
            "-f" => {
                let value = take_value(&mut iter, &arg, &mut failed);
                set_number(&mut options.fadeout, value, &mut failed);
            }
            "-g" => {
                let value = take_value(&mut iter, &arg, &mut failed);
                set_number(&mut options.subsong_gap, value, &mut failed);
            }
            "-h" => parsed.show_help = true,
            "-H" => {
                if let Some(value) = take_value(&mut iter, &arg, &mut failed) {
                    options.filter_type = value;
                }
            }
            "-l" => options.loop_enabled = true,
            "-n" => {
                let value = take_value(&mut iter, &arg, &mut failed);
                set_number(&mut parsed.songs, value, &mut failed);
            }
            "-o" => {
                if let Some(value) = take_value(&mut iter, &arg, &mut failed) {
                    options.output_sink = value;
                }
            }
            "-q" => options.verbosity -= 1,
            "-r" => {
                let value = take_value(&mut iter, &arg, &mut failed);
                set_number(&mut options.rate, value, &mut failed);
            }
            "-R" => {
                let value = take_value(&mut iter, &arg, &mut failed);
                set_number(&mut options.refresh_delay_ms, value, &mut failed);
            }
            "-s" => {
                let value = take_value(&mut iter, &arg, &mut failed);
                let mut seed = 0u64;
                set_number(&mut seed, value, &mut failed);
                parsed.seed = Some(seed);
            }
            "-t" => {
                let value = take_value(&mut iter, &arg, &mut failed);
                set_number(&mut options.subsong_timeout, value, &mut failed);
            }
            "-T" => {
                let value = take_value(&mut iter, &arg, &mut failed);
                set_number(&mut options.silence_timeout, value, &mut failed);
            }
            "-v" => options.verbosity += 1,
            "-V" => parsed.show_version = true,
            "-z" => parsed.mode = PlayMode::Shuffle,
            "-Z" => parsed.mode = PlayMode::Random,
            _ if arg.starts_with('-') && arg.len() > 1 => {
                eprintln!("unknown flag: {arg}");
                failed = true;
            }
            _ => positionals.push(arg),
        }
    }

    // Positionals are 1-based on the command line, 0-based internally.
    if let Some(start) = positionals.first() {
        match start.parse::<i64>() {
            Ok(subsong) => parsed.start = subsong - 1,
            Err(_) => {
                eprintln!("\"{start}\" is not a subsong number");
                failed = true;
            }
        }
    }
    if let Some(stop) = positionals.get(1) {
        match stop.parse::<i64>() {
            Ok(subsong) => parsed.stop = subsong - 1,
            Err(_) => {
                eprintln!("\"{stop}\" is not a subsong number");
                failed = true;
            }
        }
    }
    if positionals.len() > 2 {
        eprintln!("too many arguments");
        failed = true;
    }

    parsed.failed = failed;
    parsed
}

fn take_value<I>(iter: &mut I, flag: &str, failed: &mut bool) -> Option<String>
where
    I: Iterator<Item = String>,
{
    match iter.next() {
        Some(value) => Some(value),
        None => {
            eprintln!("option {flag} requires an argument");
            *failed = true;
            None
        }
    }
}

fn set_number<T: std::str::FromStr>(slot: &mut T, value: Option<String>, failed: &mut bool) {
    let Some(value) = value else { return };
    match value.parse() {
        Ok(number) => *slot = number,
        Err(_) => {
            eprintln!("\"{value}\" is not a valid number");
            *failed = true;
        }
    }
}

/// Print usage to stderr (on error) or stdout.
pub fn print_usage(options: &Options) {
    eprintln!(
        "Usage: subtune [option(s)] [start_at_subsong [stop_at_subsong]]\n\
         \n\
         Available options are:\n\
         \x20 -E        endian, b == big, l == little, n == native ({endian})\n\
         \x20 -c        read an additional rc file\n\
         \x20 -f        set fadeout ({fadeout} seconds)\n\
         \x20 -g        set subsong gap ({gap} seconds)\n\
         \x20 -h        display this help and exit\n\
         \x20 -H        set output filter type ({filter})\n\
         \x20 -l        loop mode\n\
         \x20 -n        number of demo subsongs ({songs})\n\
         \x20 -o        select output sink ({sink})\n\
         \x20           'list' shows available sinks\n\
         \x20 -q        reduce verbosity\n\
         \x20 -r        set samplerate ({rate}Hz)\n\
         \x20 -R        set refresh delay ({refresh} milliseconds)\n\
         \x20 -s        set shuffle/random seed\n\
         \x20 -t        set subsong timeout ({timeout} seconds)\n\
         \x20 -T        set silence timeout ({silence} seconds)\n\
         \x20 -v        increase verbosity\n\
         \x20 -V        print version and exit\n\
         \x20 -z        play subsongs in shuffle mode\n\
         \x20 -Z        play subsongs in random mode (repetitions possible)\n\
         \x20 -1 to -4  mute a channel on startup",
        endian = options.endian,
        fadeout = options.fadeout,
        gap = options.subsong_gap,
        filter = options.filter_type,
        songs = DEFAULT_DEMO_SONGS,
        sink = options.output_sink,
        rate = options.rate,
        refresh = options.refresh_delay_ms,
        timeout = options.subsong_timeout,
        silence = options.silence_timeout,
    );
}
