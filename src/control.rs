use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::clock::PlaybackClock;
use crate::instrument::Instrument;
use crate::registry::NoteRegistry;
use crate::sequencer::Sequencer;

pub const KEY_COUNT: usize = 16;
/// Note index of the lowest key.
pub const KEY_NOTE_OFFSET: i32 = 64;

/// Maps a row of 16 keys onto notes of a lead instrument.
#[derive(Debug, Clone)]
pub struct Keyboard {
    lead: Arc<Instrument>,
}

impl Keyboard {
    pub fn new(lead: Arc<Instrument>) -> Self {
        Keyboard { lead }
    }

    pub fn lead(&self) -> &Arc<Instrument> {
        &self.lead
    }

    /// Press or release every key to match `pressed`. Keys past [`KEY_COUNT`] are ignored.
    pub fn apply(&self, registry: &NoteRegistry, pressed: &[bool], time: f64) {
        for (key, &down) in pressed.iter().take(KEY_COUNT).enumerate() {
            let index = KEY_NOTE_OFFSET + key as i32;
            if down {
                registry.note_on(&self.lead, index, time);
            } else {
                registry.note_off(&self.lead, index, time);
            }
        }
    }
}

/// Snapshot for an on-screen display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub notes: usize,
    pub step: usize,
    pub playback_time: f64,
    pub wall_time: f64,
    /// Wall clock minus playback clock.
    pub latency: f64,
}

/// The control context: drives the sequencer and the keyboard against the
/// shared registry, stamping every event with the playback clock.
pub struct Controller {
    sequencer: Sequencer,
    keyboard: Keyboard,
    registry: Arc<NoteRegistry>,
    clock: Arc<PlaybackClock>,
    started: Instant,
}

impl Controller {
    pub fn new(
        sequencer: Sequencer,
        keyboard: Keyboard,
        registry: Arc<NoteRegistry>,
        clock: Arc<PlaybackClock>,
    ) -> Self {
        Controller {
            sequencer,
            keyboard,
            registry,
            clock,
            started: Instant::now(),
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn registry(&self) -> &Arc<NoteRegistry> {
        &self.registry
    }

    /// Advance the sequencer by `elapsed` seconds and queue whatever it triggered.
    pub fn tick(&mut self, elapsed: f64) -> usize {
        let retired = self.registry.take_retired();
        if retired > 0 {
            tracing::debug!(retired, remaining = self.registry.len(), "notes retired");
        }

        let count = self.sequencer.update(elapsed);
        if count == 0 {
            return 0;
        }

        let now = self.clock.now();
        let notes = self.sequencer.take_triggered().into_iter().map(|n| n.starting_at(now));
        let added = self.registry.add_batch(notes);
        tracing::debug!(added, step = self.sequencer.current_step(), time = now, "sequencer triggered");
        added
    }

    pub fn apply_keys(&self, pressed: &[bool]) {
        self.keyboard.apply(&self.registry, pressed, self.clock.now());
    }

    pub fn stats(&self) -> Stats {
        let playback_time = self.clock.now();
        let wall_time = self.started.elapsed().as_secs_f64();
        Stats {
            notes: self.registry.len(),
            step: self.sequencer.current_step(),
            playback_time,
            wall_time,
            latency: wall_time - playback_time,
        }
    }

    /// Fixed-rate control loop.
    ///
    /// Each tick polls `keys` with the current stats; the loop runs until it
    /// returns `None`.
    pub fn run<F>(&mut self, rate_hz: f64, mut keys: F)
    where
        F: FnMut(&Stats) -> Option<[bool; KEY_COUNT]>,
    {
        let period = Duration::from_secs_f64(1.0 / rate_hz.max(1.0));
        let mut last = Instant::now();
        tracing::info!(rate_hz, "control loop started");

        loop {
            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f64();
            last = now;

            self.tick(elapsed);
            let stats = self.stats();
            match keys(&stats) {
                Some(pressed) => self.apply_keys(&pressed),
                None => break,
            }

            let spent = now.elapsed();
            if spent < period {
                std::thread::sleep(period - spent);
            }
        }

        tracing::info!("control loop stopped");
    }
}
