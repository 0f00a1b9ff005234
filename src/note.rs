use std::sync::Arc;
use crate::instrument::Instrument;

/// One sounding instance of an instrument.
#[derive(Debug, Clone)]
pub struct Note {
    pub index: i32, // Position in scale, before the instrument's own offsets
    pub on_time: f64,
    pub off_time: Option<f64>,
    pub active: bool,
    /// Played from the keyboard rather than triggered by the sequencer.
    pub keyed: bool,
    pub instrument: Arc<Instrument>,
}

impl Note {
    pub fn new(instrument: Arc<Instrument>, index: i32) -> Self {
        Note {
            index,
            on_time: 0.0,
            off_time: None,
            active: true,
            keyed: false,
            instrument,
        }
    }

    pub fn starting_at(mut self, time: f64) -> Self {
        self.on_time = time;
        self
    }

    pub fn keyed(mut self) -> Self {
        self.keyed = true;
        self
    }

    pub fn is_released(&self) -> bool {
        matches!(self.off_time, Some(off) if off >= self.on_time)
    }

    /// Start the release stage. No-op if the note is already releasing.
    pub fn release(&mut self, time: f64) {
        if !self.is_released() {
            self.off_time = Some(time.max(self.on_time));
        }
    }

    /// Restart the envelope of a releasing note.
    pub fn retrigger(&mut self, time: f64) {
        self.on_time = time;
        self.off_time = None;
        self.active = true;
    }

    pub fn plays(&self, instrument: &Arc<Instrument>, index: i32) -> bool {
        self.index == index && Arc::ptr_eq(&self.instrument, instrument)
    }
}
