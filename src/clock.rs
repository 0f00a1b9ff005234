use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic playback position, counted in frames.
///
/// Only the render context advances it; the control context reads it to
/// stamp note on/off times.
#[derive(Debug)]
pub struct PlaybackClock {
    frames: AtomicU64,
    sample_rate: u32,
}

impl PlaybackClock {
    pub fn new(sample_rate: u32) -> Self {
        PlaybackClock {
            frames: AtomicU64::new(0),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn position(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Current playback time in seconds.
    pub fn now(&self) -> f64 {
        self.position() as f64 / self.sample_rate as f64
    }

    /// Move forward by `frames`, returning the time of the first of them.
    pub fn advance(&self, frames: u64) -> f64 {
        let start = self.frames.fetch_add(frames, Ordering::AcqRel);
        start as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_in_frames() {
        let clock = PlaybackClock::new(4);
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.advance(1), 0.0);
        assert_eq!(clock.advance(3), 0.25);
        assert_eq!(clock.now(), 1.0);
        assert_eq!(clock.position(), 4);
    }

    #[test]
    fn zero_sample_rate_is_clamped() {
        let clock = PlaybackClock::new(0);
        clock.advance(2);
        assert_eq!(clock.now(), 2.0);
    }
}
