use std::f64::consts::{FRAC_2_PI, FRAC_PI_2, PI, TAU};

pub const DEFAULT_HARMONICS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformType {
    Sine,
    Square,
    Triangle,
    SawAnalogue, // Additive, band-limited
    SawDigital,  // Closed form, aliased
    Noise,
}

impl WaveformType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "sine" => Some(WaveformType::Sine),
            "square" => Some(WaveformType::Square),
            "triangle" => Some(WaveformType::Triangle),
            "saw" | "saw_analogue" | "sawtooth" => Some(WaveformType::SawAnalogue),
            "saw_digital" => Some(WaveformType::SawDigital),
            "noise" => Some(WaveformType::Noise),
            _ => None,
        }
    }

    /// Sample this waveform at an absolute phase in radians.
    ///
    /// `time` and `frequency` are only read by the digital saw, which is defined
    /// on the raw clock rather than on the (vibrato-modulated) phase.
    pub fn generate_sample(&self, phase: f64, time: f64, frequency: f64, harmonics: u32) -> f64 {
        match self {
            WaveformType::Sine => phase.sin(),
            WaveformType::Square => if phase.sin() > 0.0 { 1.0 } else { -1.0 },
            WaveformType::Triangle => phase.sin().asin() * FRAC_2_PI,
            WaveformType::SawAnalogue => {
                let output: f64 = (1..harmonics)
                    .map(|n| {
                        let n = n as f64;
                        (n * phase).sin() / n
                    })
                    .sum();
                output * FRAC_2_PI
            }
            WaveformType::SawDigital => {
                if frequency == 0.0 {
                    return 0.0;
                }
                FRAC_2_PI * (frequency * PI * time.rem_euclid(1.0 / frequency.abs()) - FRAC_PI_2)
            }
            WaveformType::Noise => fastrand::f64() * 2.0 - 1.0,
        }
    }
}

/// Frequency-modulation vibrato applied on top of the carrier phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vibrato {
    pub frequency: f64,
    pub depth: f64,
}

impl Vibrato {
    pub const NONE: Vibrato = Vibrato { frequency: 0.0, depth: 0.0 };

    pub const fn new(frequency: f64, depth: f64) -> Self {
        Vibrato { frequency, depth }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub waveform: WaveformType,
    pub vibrato: Vibrato,
    pub harmonics: u32, // Only used by the analogue saw
}

impl Oscillator {
    pub const fn new(waveform: WaveformType) -> Self {
        Oscillator { waveform, vibrato: Vibrato::NONE, harmonics: DEFAULT_HARMONICS }
    }

    pub const fn with_vibrato(mut self, frequency: f64, depth: f64) -> Self {
        self.vibrato = Vibrato::new(frequency, depth);
        self
    }

    pub const fn with_harmonics(mut self, harmonics: u32) -> Self {
        self.harmonics = harmonics;
        self
    }

    pub fn sample(&self, time: f64, frequency: f64) -> f64 {
        let phase = TAU * frequency * time
            + self.vibrato.depth * frequency * (TAU * self.vibrato.frequency * time).sin();
        self.waveform.generate_sample(phase, time, frequency, self.harmonics)
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Oscillator::new(WaveformType::Sine)
    }
}

pub fn oscillate(
    time: f64,
    frequency: f64,
    waveform: WaveformType,
    vibrato_frequency: f64,
    vibrato_depth: f64,
    harmonics: u32,
) -> f64 {
    Oscillator::new(waveform)
        .with_vibrato(vibrato_frequency, vibrato_depth)
        .with_harmonics(harmonics)
        .sample(time, frequency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_quarter_period_peaks() {
        let s = oscillate(0.25, 1.0, WaveformType::Sine, 0.0, 0.0, DEFAULT_HARMONICS);
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn square_is_bipolar() {
        for i in 0..1000 {
            let t = i as f64 / 1000.0;
            let s = oscillate(t, 3.0, WaveformType::Square, 5.0, 0.001, DEFAULT_HARMONICS);
            assert!(s == 1.0 || s == -1.0, "square produced {s}");
        }
    }

    #[test]
    fn triangle_stays_in_range() {
        for i in 0..1000 {
            let t = i as f64 / 997.0;
            let s = oscillate(t, 440.0, WaveformType::Triangle, 0.0, 0.0, DEFAULT_HARMONICS);
            assert!((-1.0..=1.0).contains(&s), "triangle out of range: {s}");
        }
    }

    #[test]
    fn digital_saw_ramps_within_period() {
        let osc = Oscillator::new(WaveformType::SawDigital);
        let early = osc.sample(0.01, 10.0);
        let late = osc.sample(0.09, 10.0);
        assert!(early < late);
        assert!((osc.sample(0.0, 10.0) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn digital_saw_at_zero_frequency_is_silent() {
        assert_eq!(Oscillator::new(WaveformType::SawDigital).sample(0.3, 0.0), 0.0);
    }

    #[test]
    fn analogue_saw_is_finite() {
        let osc = Oscillator::new(WaveformType::SawAnalogue).with_harmonics(100);
        for i in 0..200 {
            assert!(osc.sample(i as f64 * 0.0013, 220.0).is_finite());
        }
    }

    #[test]
    fn noise_stays_in_range() {
        let osc = Oscillator::new(WaveformType::Noise);
        for _ in 0..1000 {
            let s = osc.sample(0.0, 0.0);
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn parses_waveform_names() {
        assert_eq!(WaveformType::from_name(" Square "), Some(WaveformType::Square));
        assert_eq!(WaveformType::from_name("saw_digital"), Some(WaveformType::SawDigital));
        assert_eq!(WaveformType::from_name("pulse"), None);
    }
}
