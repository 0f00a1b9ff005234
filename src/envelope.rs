/// Levels at or below this are treated as silence.
pub const SILENCE_THRESHOLD: f64 = 0.01;

/// A linear ADSR envelope. All times are in seconds.
///
/// The envelope keeps no state of its own: every call derives the level from
/// the note's on/off times, so one envelope can be shared by any number of
/// sounding notes.
///
/// ```plaintext
/// amplitude
/// ^
/// |  start
/// |     /\
/// |    /  \ sustain
/// |   /    +--------------+
/// |  /     |              |\
/// +-+------+--------------+-+----> time
///   |attack|decay         |release
///   on                    off
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
    /// Peak level reached at the end of the attack stage.
    pub start: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope {
            attack: 0.1,
            decay: 0.1,
            sustain: 1.0,
            release: 0.2,
            start: 1.0,
        }
    }
}

impl Envelope {
    pub const fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Envelope { attack, decay, sustain, release, start: 1.0 }
    }

    /// Level of the envelope at `time` for a note switched on at `on_time`.
    ///
    /// `off_time` is `None` while the note has never been released. A release
    /// that happened before the latest `on_time` (the note was re-pressed)
    /// also counts as held.
    pub fn amplitude(&self, time: f64, on_time: f64, off_time: Option<f64>) -> f64 {
        let amplitude = match off_time {
            Some(off) if off >= on_time => {
                let released_at = self.held_level(off - on_time);
                if self.release > 0.0 {
                    released_at * (1.0 - (time - off).max(0.0) / self.release)
                } else if time < off {
                    released_at
                } else {
                    0.0
                }
            }
            _ => self.held_level(time - on_time),
        };

        if amplitude <= SILENCE_THRESHOLD { 0.0 } else { amplitude.min(1.0) }
    }

    /// Attack, decay and sustain stages, `lifetime` seconds after note on.
    fn held_level(&self, lifetime: f64) -> f64 {
        let lifetime = lifetime.max(0.0);

        if lifetime <= self.attack {
            if self.attack > 0.0 {
                return lifetime / self.attack * self.start;
            }
            return self.start;
        }

        let decay_time = lifetime - self.attack;
        if decay_time <= self.decay && self.decay > 0.0 {
            return decay_time / self.decay * (self.sustain - self.start) + self.start;
        }

        self.sustain
    }
}
