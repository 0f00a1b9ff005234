//! Drum machine with a scripted harmonica line on top.
//!
//! ```text
//! cargo run --example drum_machine                         # live, default groove
//! cargo run --example drum_machine -- groove.cfg           # live, custom config
//! cargo run --example drum_machine -- --bounce out.wav 8   # offline, 8 seconds
//! ```

use std::error::Error;
use std::sync::Arc;
use synthbox::control::KEY_COUNT;
use synthbox::{
    bounce, write_wav, Controller, InstrumentBank, Keyboard, NoteRegistry, PlaybackClock, SynthConfig,
    SynthEngine,
};
use tracing_subscriber::EnvFilter;

// Keys held per beat, -1 for silence
const MELODY: [i32; 8] = [0, 4, 7, 12, 7, 4, 0, -1];
const BOUNCE_SAMPLE_RATE: u32 = 44_100;

fn melody_keys(playback_time: f64, tempo: f64) -> [bool; KEY_COUNT] {
    let beat = (playback_time * tempo / 60.0) as usize;
    let mut pressed = [false; KEY_COUNT];
    let key = MELODY[beat % MELODY.len()];
    if key >= 0 {
        pressed[key as usize] = true;
    }
    pressed
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("--bounce") {
        let path = args.get(1).map(String::as_str).unwrap_or("drum_machine.wav");
        let seconds: f64 = args.get(2).map(|s| s.parse::<f64>()).transpose()?.unwrap_or(8.0);
        let config = SynthConfig::default();

        let bank = InstrumentBank::new();
        let registry = Arc::new(NoteRegistry::with_headroom(config.headroom));
        let clock = Arc::new(PlaybackClock::new(config.sample_rate.unwrap_or(BOUNCE_SAMPLE_RATE)));
        let mut controller = Controller::new(
            config.build_sequencer(&bank)?,
            Keyboard::new(bank.get(config.lead)),
            Arc::clone(&registry),
            Arc::clone(&clock),
        );

        let samples = bounce(&mut controller, &clock, seconds);
        write_wav(path, &samples, clock.sample_rate())?;
        println!("Bounced {:.1}s of drums to {}", seconds, path);
        return Ok(());
    }

    let config = match args.first() {
        Some(path) => SynthConfig::load(path)?,
        None => SynthConfig::default(),
    };
    let tempo = config.tempo;
    let control_rate = config.control_rate;

    let mut engine = SynthEngine::new(config)?;
    let mut controller = engine.controller()?;

    for channel in controller.sequencer().channels() {
        println!("{:<12} {}", channel.instrument.name, channel.pattern());
    }

    engine.start()?;

    let mut last_report = 0.0;
    controller.run(control_rate, |stats| {
        if stats.wall_time - last_report >= 1.0 {
            last_report = stats.wall_time;
            println!(
                "Notes: {} Step: {:>2} Wall Time: {:.2} Playback Time: {:.2} Latency: {:.3}",
                stats.notes, stats.step, stats.wall_time, stats.playback_time, stats.latency
            );
        }
        Some(melody_keys(stats.playback_time, tempo))
    });

    engine.stop();
    Ok(())
}
