use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::instrument::Instrument;
use crate::note::Note;

/// Scales the summed voices down so overlapping notes rarely clip.
pub const DEFAULT_HEADROOM: f64 = 0.2;

/// The set of currently sounding notes.
///
/// Shared between the render context (the audio callback) and the control
/// context (sequencer and keyboard). A single mutex covers every add, release
/// and render, so a note is never seen half-added and never mixed twice.
#[derive(Debug)]
pub struct NoteRegistry {
    notes: Mutex<Vec<Note>>,
    headroom: f64,
    retired: AtomicUsize,
}

impl NoteRegistry {
    pub fn new() -> Self {
        Self::with_headroom(DEFAULT_HEADROOM)
    }

    pub fn with_headroom(headroom: f64) -> Self {
        NoteRegistry {
            notes: Mutex::new(Vec::with_capacity(64)),
            headroom,
            retired: AtomicUsize::new(0),
        }
    }

    pub fn headroom(&self) -> f64 {
        self.headroom
    }

    // Poisoned locks are recovered so the render path never panics.
    fn lock(&self) -> MutexGuard<'_, Vec<Note>> {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, note: Note) {
        self.lock().push(note);
    }

    /// Push a whole batch of triggered notes under one lock.
    pub fn add_batch<I: IntoIterator<Item = Note>>(&self, notes: I) -> usize {
        let mut guard = self.lock();
        let before = guard.len();
        guard.extend(notes);
        guard.len() - before
    }

    /// Start `index` on `instrument`, or restart it if it is still releasing.
    /// A note that is already held is left alone. Only keyed notes are
    /// matched, so sequencer hits on the same instrument are never touched.
    pub fn note_on(&self, instrument: &Arc<Instrument>, index: i32, time: f64) {
        let mut notes = self.lock();
        match notes.iter_mut().find(|n| n.keyed && n.plays(instrument, index)) {
            Some(note) => {
                if note.is_released() {
                    note.retrigger(time);
                }
            }
            None => notes.push(Note::new(Arc::clone(instrument), index).keyed().starting_at(time)),
        }
    }

    /// Release keyed `index` on `instrument`. Unknown or already released notes are ignored.
    pub fn note_off(&self, instrument: &Arc<Instrument>, index: i32, time: f64) {
        let mut notes = self.lock();
        if let Some(note) = notes.iter_mut().find(|n| n.keyed && n.plays(instrument, index)) {
            note.release(time);
        }
    }

    /// Mix every note at `time`, retire the finished ones, and return the
    /// attenuated sum.
    pub fn render(&self, time: f64) -> f64 {
        let mut notes = self.lock();
        let mut mixed = 0.0;

        for note in notes.iter_mut() {
            if !note.active {
                continue;
            }
            let voice = note.instrument.sound(time, note);
            mixed += voice.sample;
            if voice.finished {
                note.active = false;
            }
        }

        let before = notes.len();
        notes.retain(|n| n.active);
        let retired = before - notes.len();
        if retired > 0 {
            self.retired.fetch_add(retired, Ordering::Relaxed);
        }
        mixed * self.headroom
    }

    /// Number of notes retired by [`NoteRegistry::render`] since the last call.
    pub fn take_retired(&self) -> usize {
        self.retired.swap(0, Ordering::Relaxed)
    }

    /// Entry point for the audio driver: one sample in [-1, 1] per call.
    /// Output is mono, so every channel receives the same value.
    pub fn produce_sample(&self, _channel: usize, time: f64) -> f32 {
        let sample = self.render(time);
        if sample.is_finite() { sample.clamp(-1.0, 1.0) as f32 } else { 0.0 }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the sounding notes, for display and tests.
    pub fn snapshot(&self) -> Vec<Note> {
        self.lock().clone()
    }
}

impl Default for NoteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
