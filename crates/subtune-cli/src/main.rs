//! Command-line subsong sequencer.
//!
//! Reads rc files and flags, selects an output sink, binds the built-in demo
//! tone engine to a playback session and drives it until the sequence
//! completes. PCM goes wherever the selected sink points; status output
//! stays on the terminal (and shuts up automatically when the sink claims
//! standard output).

mod args;
mod config;
mod tone;

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use subtune::sink;
use subtune::{PlaybackSession, SequencerState, SinkFlags, SoundEngine, SubsongRange};

use config::Options;
use tone::ToneEngine;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("subtune: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let mut options = Options::default();
    options.parse_file(Path::new(config::SYSTEM_RC));
    if let Some(user_rc) = Options::user_rc_path() {
        options.parse_file(&user_rc);
    }

    let parsed = args::parse(std::env::args().skip(1), &mut options);
    if parsed.failed {
        args::print_usage(&options);
        return Ok(1);
    }
    if parsed.show_help {
        args::print_usage(&options);
        return Ok(0);
    }
    if parsed.show_version {
        println!("subtune {}", env!("CARGO_PKG_VERSION"));
        return Ok(0);
    }
    if options.output_sink == "list" {
        for info in sink::available() {
            println!("{:8} - {}", info.name, info.description);
        }
        return Ok(0);
    }

    let sink = sink::by_name(&options.output_sink)?;
    if sink.flags().contains(SinkFlags::USES_STDOUT) {
        options.verbosity = 0;
    }

    let mut engine = ToneEngine::new(parsed.songs);
    for (channel, &mute) in parsed.mute.iter().enumerate() {
        engine.set_channel_mute(channel, mute);
    }

    let session_config = options.session_config(
        parsed.mode,
        parsed.seed,
        SubsongRange {
            start: parsed.start,
            stop: parsed.stop,
        },
    );
    let mut session = PlaybackSession::open(&mut engine, sink, session_config)
        .context("could not open playback session")?;

    if options.verbosity > 0 {
        println!(
            "subtunes: {}   output: {}   endian: {}",
            session.collection().songs(),
            options.output_sink,
            options.endian,
        );
    }

    let refresh = Duration::from_millis(options.refresh_delay_ms);
    let mut last_status: Option<Instant> = None;

    while engine.step(&mut session)? {
        if options.verbosity > 1
            && last_status.is_none_or(|last| last.elapsed() >= refresh)
        {
            let time = session.display_time(engine.elapsed_ticks());
            let subsong = session.current_subsong().map_or(0, |s| s + 1);
            print!(
                "\rsubsong {subsong:3}/{:<3}  {:02}:{:02}/{:02}:{:02}",
                session.collection().songs(),
                time.played_min,
                time.played_sec,
                time.total_min,
                time.total_sec,
            );
            std::io::stdout().flush().ok();
            last_status = Some(Instant::now());
        }
    }

    if options.verbosity > 1 {
        println!();
    }
    if options.verbosity > 0 && session.state() == SequencerState::Stopped {
        println!("sequence complete");
    }

    session.close()?;
    Ok(0)
}
