pub const BASE_FREQUENCY: f64 = 8.0;

// 2^(1/12)
const SEMITONE_RATIO: f64 = 1.059_463_094_359_295_3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// Twelve-tone equal temperament rooted at [`BASE_FREQUENCY`].
    #[default]
    Default,
}

impl Scale {
    pub fn frequency(&self, index: i32) -> f64 {
        match self {
            Scale::Default => BASE_FREQUENCY * SEMITONE_RATIO.powi(index),
        }
    }
}

pub fn note_frequency(index: i32) -> f64 {
    Scale::Default.frequency(index)
}
