use std::sync::Arc;
use crate::error::{Result, SynthError};
use crate::instrument::Instrument;
use crate::note::Note;

/// Note index given to every sequencer trigger.
pub const SEQUENCER_NOTE_INDEX: i32 = 64;
/// Pattern cycles one update may replay after a long stall.
pub const MAX_CATCH_UP_CYCLES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    On,
    Off,
}

impl Step {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'X' | 'x' => Some(Step::On),
            '.' => Some(Step::Off),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Step::On => 'X',
            Step::Off => '.',
        }
    }
}

pub fn parse_pattern(pattern: &str) -> Result<Vec<Step>> {
    pattern
        .trim()
        .chars()
        .map(|c| Step::from_char(c)
            .ok_or_else(|| SynthError::Parse(format!("Invalid step '{}' in pattern \"{}\"", c, pattern))))
        .collect()
}

#[derive(Debug, Clone)]
pub struct Channel {
    pub instrument: Arc<Instrument>,
    pub steps: Vec<Step>,
}

impl Channel {
    pub fn pattern(&self) -> String {
        self.steps.iter().map(Step::as_char).collect()
    }
}

/// Fixed tempo step sequencer.
///
/// Time is fed in through [`Sequencer::update`]; every whole sub-beat that
/// elapses plays the current step of every channel and moves the cursor on.
/// Triggered notes carry no on-time: the caller stamps them with the playback
/// clock before handing them to the registry.
#[derive(Debug, Clone)]
pub struct Sequencer {
    tempo: f64,
    beats: usize,
    sub_beats: usize,
    sub_beat_duration: f64,
    accumulated: f64,
    current_step: usize,
    channels: Vec<Channel>,
    triggered: Vec<Note>,
}

impl Sequencer {
    pub fn new(tempo: f64, beats: usize, sub_beats: usize) -> Result<Self> {
        if !(tempo.is_finite() && tempo > 0.0) {
            return Err(SynthError::Config(format!("Tempo must be positive, got {}", tempo)));
        }
        if beats == 0 || sub_beats == 0 {
            return Err(SynthError::Config("Beats and sub-beats must be at least 1".to_string()));
        }

        Ok(Sequencer {
            tempo,
            beats,
            sub_beats,
            sub_beat_duration: 60.0 / tempo / sub_beats as f64,
            accumulated: 0.0,
            current_step: 0,
            channels: Vec::new(),
            triggered: Vec::new(),
        })
    }

    pub fn add_channel(&mut self, instrument: Arc<Instrument>, pattern: &str) -> Result<()> {
        let steps = parse_pattern(pattern)?;
        if steps.len() != self.total_steps() {
            return Err(SynthError::InvalidPattern(format!(
                "Pattern \"{}\" for {} has {} steps, expected {}",
                pattern.trim(), instrument.name, steps.len(), self.total_steps()
            )));
        }
        self.channels.push(Channel { instrument, steps });
        Ok(())
    }

    /// Advance by `elapsed` seconds and return how many notes were triggered.
    /// The notes themselves are in [`Sequencer::triggered`] until the next update.
    pub fn update(&mut self, elapsed: f64) -> usize {
        self.triggered.clear();
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulated += elapsed;
        }

        let elapsed_steps = (self.accumulated / self.sub_beat_duration).floor();
        if elapsed_steps < 1.0 {
            return 0;
        }
        self.accumulated = self.accumulated.rem_euclid(self.sub_beat_duration);

        // A long stall replays only the last few cycles of the pattern.
        let total = self.total_steps();
        let limit = total * MAX_CATCH_UP_CYCLES;
        let played = if elapsed_steps > limit as f64 { limit } else { elapsed_steps as usize };
        let skipped = ((elapsed_steps - played as f64) % total as f64) as usize;
        self.current_step = (self.current_step + skipped) % total;

        for _ in 0..played {
            for channel in &self.channels {
                if channel.steps[self.current_step] == Step::On {
                    self.triggered.push(Note::new(Arc::clone(&channel.instrument), SEQUENCER_NOTE_INDEX));
                }
            }
            self.current_step = (self.current_step + 1) % total;
        }

        self.triggered.len()
    }

    pub fn triggered(&self) -> &[Note] {
        &self.triggered
    }

    pub fn take_triggered(&mut self) -> Vec<Note> {
        std::mem::take(&mut self.triggered)
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn beats(&self) -> usize {
        self.beats
    }

    pub fn sub_beats(&self) -> usize {
        self.sub_beats
    }

    pub fn sub_beat_duration(&self) -> f64 {
        self.sub_beat_duration
    }

    pub fn total_steps(&self) -> usize {
        self.beats * self.sub_beats
    }

    /// Step that will play on the next sub-beat.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Sequencer {
            tempo: 120.0,
            beats: 4,
            sub_beats: 4,
            sub_beat_duration: 60.0 / 120.0 / 4.0,
            accumulated: 0.0,
            current_step: 0,
            channels: Vec::new(),
            triggered: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::{InstrumentBank, InstrumentKind};

    fn kick() -> Arc<Instrument> {
        InstrumentBank::new().get(InstrumentKind::DrumKick)
    }

    #[test]
    fn one_sub_beat_triggers_first_step() {
        let mut seq = Sequencer::new(120.0, 1, 4).unwrap();
        seq.add_channel(kick(), "X...").unwrap();
        assert_eq!(seq.sub_beat_duration(), 0.125);

        assert_eq!(seq.update(0.125), 1);
        assert_eq!(seq.current_step(), 1);
        assert_eq!(seq.triggered()[0].index, SEQUENCER_NOTE_INDEX);
        assert_eq!(seq.triggered()[0].instrument.kind, InstrumentKind::DrumKick);
    }

    #[test]
    fn partial_sub_beats_accumulate() {
        let mut seq = Sequencer::new(120.0, 1, 4).unwrap();
        seq.add_channel(kick(), "X...").unwrap();
        assert_eq!(seq.update(0.0625), 0);
        assert_eq!(seq.current_step(), 0);
        assert_eq!(seq.update(0.0625), 1);
        assert_eq!(seq.current_step(), 1);
    }

    #[test]
    fn late_update_processes_every_elapsed_step() {
        let mut seq = Sequencer::new(120.0, 1, 4).unwrap();
        seq.add_channel(kick(), "X.X.").unwrap();
        // Five sub-beats: steps 0..=3 then 0 again
        assert_eq!(seq.update(0.625), 3);
        assert_eq!(seq.current_step(), 1);
    }

    #[test]
    fn long_stall_replays_a_bounded_number_of_cycles() {
        let mut seq = Sequencer::new(120.0, 1, 4).unwrap();
        seq.add_channel(kick(), "X...").unwrap();
        assert_eq!(seq.update(3600.0), MAX_CATCH_UP_CYCLES);
        assert_eq!(seq.current_step(), 0);
        assert_eq!(seq.update(0.125), 1);
    }

    #[test]
    fn huge_elapsed_time_returns() {
        let mut seq = Sequencer::new(120.0, 1, 4).unwrap();
        seq.add_channel(kick(), "X...").unwrap();
        assert!(seq.update(1e17) <= MAX_CATCH_UP_CYCLES);
        assert!(seq.current_step() < seq.total_steps());
        assert!(seq.update(1e300) <= MAX_CATCH_UP_CYCLES);
    }

    #[test]
    fn cursor_wraps_around_pattern() {
        let mut seq = Sequencer::new(120.0, 1, 4).unwrap();
        seq.add_channel(kick(), "...X").unwrap();
        let hits: Vec<usize> = (0..8).map(|_| seq.update(0.125)).collect();
        assert_eq!(hits, vec![0, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    fn channels_trigger_together() {
        let bank = InstrumentBank::new();
        let mut seq = Sequencer::default();
        seq.add_channel(bank.get(InstrumentKind::DrumKick), "X...X...X..X.X..").unwrap();
        seq.add_channel(bank.get(InstrumentKind::DrumHiHat), "X.X.X.X.X.X.X.XX").unwrap();
        assert_eq!(seq.update(seq.sub_beat_duration()), 2);
        assert_eq!(seq.update(seq.sub_beat_duration()), 0);
    }

    #[test]
    fn update_clears_previous_triggers() {
        let mut seq = Sequencer::new(120.0, 1, 4).unwrap();
        seq.add_channel(kick(), "X...").unwrap();
        seq.update(0.125);
        assert_eq!(seq.take_triggered().len(), 1);
        seq.update(0.125);
        assert!(seq.triggered().is_empty());
    }

    #[test]
    fn rejects_wrong_pattern_length() {
        let mut seq = Sequencer::new(120.0, 4, 4).unwrap();
        let err = seq.add_channel(kick(), "X...").unwrap_err();
        assert!(matches!(err, SynthError::InvalidPattern(_)));
    }

    #[test]
    fn rejects_unknown_step_marker() {
        let mut seq = Sequencer::new(120.0, 1, 4).unwrap();
        assert!(matches!(seq.add_channel(kick(), "X.o."), Err(SynthError::Parse(_))));
    }

    #[test]
    fn rejects_bad_timing() {
        assert!(Sequencer::new(0.0, 4, 4).is_err());
        assert!(Sequencer::new(120.0, 0, 4).is_err());
        assert!(Sequencer::new(120.0, 4, 0).is_err());
    }

    #[test]
    fn pattern_round_trips_for_display() {
        let mut seq = Sequencer::new(90.0, 1, 4).unwrap();
        seq.add_channel(kick(), "x.X.").unwrap();
        assert_eq!(seq.channels()[0].pattern(), "X.X.");
    }
}
