//  _______             _        _________            ______    _______
// (  ____ \ |\     /| ( (    /| \__   __/ |\     /| (  ___ \  (  ___  ) |\     /|
// | (    \/ ( \   / ) |  \  ( |    ) (    | )   ( | | (   ) ) | (   ) | ( \   / )
// | (_____   \ (_) /  |   \ | |    | |    | (___) | | (__/ /  | |   | |  \ (_) /
// (_____  )   \   /   | (\ \) |    | |    |  ___  | |  __ (   | |   | |   ) _ (
//       ) |    ) (    | | \   |    | |    | (   ) | | (  \ \  | |   | |  / ( ) \
// /\____) |    | |    | )  \  |    | |    | )   ( | | )___) ) | (___) | ( /   \ )
// \_______)    \_/    |/    )_)    )_(    |/     \| |/ \___/  (_______) |/     \|

pub mod error;
pub mod waveform;
pub mod scale;
pub mod envelope;
pub mod instrument;
pub mod note;
pub mod registry;
pub mod sequencer;
pub mod clock;
pub mod config;
pub mod control;
pub mod engine;

pub use error::{SynthError, Result};
pub use waveform::{WaveformType, Oscillator, Vibrato, oscillate};
pub use scale::{Scale, note_frequency};
pub use envelope::Envelope;
pub use instrument::{Instrument, InstrumentKind, InstrumentBank, Voice};
pub use note::Note;
pub use registry::NoteRegistry;
pub use sequencer::{Sequencer, Channel, Step};
pub use clock::PlaybackClock;
pub use config::{SynthConfig, ChannelConfig};
pub use control::{Controller, Keyboard, Stats};
pub use engine::{SynthEngine, render_block, bounce, write_wav};
