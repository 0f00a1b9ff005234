use std::sync::Arc;
use crate::envelope::Envelope;
use crate::note::Note;
use crate::scale::Scale;
use crate::waveform::{Oscillator, WaveformType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Bell,
    Bell8,
    Harmonica,
    DrumKick,
    DrumSnare,
    DrumHiHat,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 6] = [
        InstrumentKind::Bell,
        InstrumentKind::Bell8,
        InstrumentKind::Harmonica,
        InstrumentKind::DrumKick,
        InstrumentKind::DrumSnare,
        InstrumentKind::DrumHiHat,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InstrumentKind::Bell => "Bell",
            InstrumentKind::Bell8 => "8-Bit Bell",
            InstrumentKind::Harmonica => "Harmonica",
            InstrumentKind::DrumKick => "Drum Kick",
            InstrumentKind::DrumSnare => "Drum Snare",
            InstrumentKind::DrumHiHat => "Drum HiHat",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "bell" => Some(InstrumentKind::Bell),
            "bell8" | "8-bit bell" | "8bit" => Some(InstrumentKind::Bell8),
            "harmonica" | "harm" => Some(InstrumentKind::Harmonica),
            "kick" | "drum kick" => Some(InstrumentKind::DrumKick),
            "snare" | "drum snare" => Some(InstrumentKind::DrumSnare),
            "hihat" | "hi-hat" | "drum hihat" => Some(InstrumentKind::DrumHiHat),
            _ => None,
        }
    }

    /// Oscillators mixed for this instrument.
    fn partials(&self) -> &'static [Partial] {
        match self {
            InstrumentKind::Bell => BELL,
            InstrumentKind::Bell8 => BELL8,
            InstrumentKind::Harmonica => HARMONICA,
            InstrumentKind::DrumKick => KICK,
            InstrumentKind::DrumSnare => SNARE,
            InstrumentKind::DrumHiHat => HIHAT,
        }
    }
}

/// One weighted oscillator in an instrument's mix.
#[derive(Debug, Clone, Copy)]
struct Partial {
    weight: f64,
    /// Semitones from the note index. `None` plays at 0 Hz (noise ignores pitch).
    offset: Option<i32>,
    oscillator: Oscillator,
    /// Run the oscillator on `on_time - time` instead of `time - on_time`.
    reversed: bool,
}

impl Partial {
    const fn pitched(weight: f64, offset: i32, oscillator: Oscillator) -> Self {
        Partial { weight, offset: Some(offset), oscillator, reversed: false }
    }

    const fn noise(weight: f64) -> Self {
        Partial { weight, offset: None, oscillator: Oscillator::new(WaveformType::Noise), reversed: false }
    }

    const fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }
}

const SINE: Oscillator = Oscillator::new(WaveformType::Sine);
const SQUARE: Oscillator = Oscillator::new(WaveformType::Square);

const BELL: &[Partial] = &[
    Partial::pitched(1.00, 12, SINE.with_vibrato(5.0, 0.001)),
    Partial::pitched(0.50, 24, SINE),
    Partial::pitched(0.25, 36, SINE),
];

const BELL8: &[Partial] = &[
    Partial::pitched(1.00, 0, SQUARE.with_vibrato(5.0, 0.001)),
    Partial::pitched(0.50, 12, SINE),
    Partial::pitched(0.25, 24, SINE),
];

const HARMONICA: &[Partial] = &[
    Partial::pitched(
        1.00,
        -12,
        Oscillator::new(WaveformType::SawAnalogue).with_vibrato(5.0, 0.001).with_harmonics(100),
    )
    .reversed(),
    Partial::pitched(1.00, 0, SQUARE.with_vibrato(5.0, 0.001)),
    Partial::pitched(0.50, 12, SQUARE),
    Partial::noise(0.05),
];

const KICK: &[Partial] = &[
    Partial::pitched(0.99, -36, SINE.with_vibrato(1.0, 1.0)),
    Partial::noise(0.01),
];

const SNARE: &[Partial] = &[
    Partial::pitched(0.5, -24, SINE.with_vibrato(0.5, 1.0)),
    Partial::noise(0.5),
];

const HIHAT: &[Partial] = &[
    Partial::pitched(0.1, -12, SQUARE.with_vibrato(1.5, 1.0)),
    Partial::noise(0.9),
];

/// Output of an instrument for one note at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub sample: f64,
    /// The note is silent for good and can be retired.
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct Instrument {
    pub kind: InstrumentKind,
    pub name: String,
    pub envelope: Envelope,
    pub volume: f64,
    /// Hard cap on a note's life in seconds, `None` for unbounded.
    pub max_lifetime: Option<f64>,
    pub scale: Scale,
}

impl Instrument {
    pub fn new(kind: InstrumentKind) -> Self {
        let (envelope, max_lifetime, volume) = match kind {
            InstrumentKind::Bell => (Envelope::new(0.01, 1.0, 0.0, 1.0), Some(3.0), 1.0),
            InstrumentKind::Bell8 => (Envelope::new(0.01, 0.5, 0.8, 1.0), Some(3.0), 1.0),
            InstrumentKind::Harmonica => (Envelope::new(0.0, 1.0, 0.95, 0.1), None, 0.3),
            InstrumentKind::DrumKick => (Envelope::new(0.01, 0.15, 0.0, 0.0), Some(1.5), 1.0),
            InstrumentKind::DrumSnare => (Envelope::new(0.0, 0.2, 0.0, 0.0), Some(1.0), 1.0),
            InstrumentKind::DrumHiHat => (Envelope::new(0.01, 0.05, 0.0, 0.0), Some(1.0), 0.5),
        };

        Instrument {
            kind,
            name: kind.name().to_string(),
            envelope,
            volume,
            max_lifetime,
            scale: Scale::Default,
        }
    }

    pub fn sound(&self, time: f64, note: &Note) -> Voice {
        let amplitude = self.envelope.amplitude(time, note.on_time, note.off_time);
        let lifetime = time - note.on_time;

        let faded_out = note.is_released() && amplitude <= 0.0;
        let expired = self.max_lifetime.is_some_and(|max| lifetime >= max);

        let mut mix = 0.0;
        if amplitude > 0.0 {
            for partial in self.kind.partials() {
                let frequency = partial.offset.map_or(0.0, |offset| self.scale.frequency(note.index + offset));
                let t = if partial.reversed { -lifetime } else { lifetime };
                mix += partial.weight * partial.oscillator.sample(t, frequency);
            }
        }

        Voice {
            sample: amplitude * mix * self.volume,
            finished: faded_out || expired,
        }
    }
}

/// Owns one shared instance of every instrument. Notes hold handles into it.
#[derive(Debug, Clone)]
pub struct InstrumentBank {
    instruments: [Arc<Instrument>; 6],
}

impl InstrumentBank {
    pub fn new() -> Self {
        InstrumentBank {
            instruments: InstrumentKind::ALL.map(|kind| Arc::new(Instrument::new(kind))),
        }
    }

    pub fn get(&self, kind: InstrumentKind) -> Arc<Instrument> {
        Arc::clone(&self.instruments[kind as usize])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Instrument>> {
        self.instruments.iter()
    }
}

impl Default for InstrumentBank {
    fn default() -> Self {
        Self::new()
    }
}
