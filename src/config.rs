use std::path::Path;
use crate::error::{Result, SynthError};
use crate::instrument::{InstrumentBank, InstrumentKind};
use crate::registry::DEFAULT_HEADROOM;
use crate::sequencer::Sequencer;

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    pub instrument: InstrumentKind,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: Option<u32>, // None = device default
    pub headroom: f64,
    pub tempo: f64,
    pub beats: usize,
    pub sub_beats: usize,
    pub control_rate: f64, // Control loop ticks per second
    pub lead: InstrumentKind,
    pub channels: Vec<ChannelConfig>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            sample_rate: None,
            headroom: DEFAULT_HEADROOM,
            tempo: 90.0,
            beats: 4,
            sub_beats: 4,
            control_rate: 200.0,
            lead: InstrumentKind::Harmonica,
            channels: vec![
                ChannelConfig { instrument: InstrumentKind::DrumKick, pattern: "X...X...X..X.X..".to_string() },
                ChannelConfig { instrument: InstrumentKind::DrumSnare, pattern: "..X...X...X...X.".to_string() },
                ChannelConfig { instrument: InstrumentKind::DrumHiHat, pattern: "X.X.X.X.X.X.X.XX".to_string() },
            ],
        }
    }
}

impl SynthConfig {
    /// Parse the line based `key: value` format.
    ///
    /// Keys left out keep their defaults. The default drum channels are only
    /// used when the text declares no `channel:` line at all.
    pub fn from_cfg(content: &str) -> Result<Self> {
        let mut config = SynthConfig::default();
        let mut channels = Vec::new();

        macro_rules! parse_field {
            ($line:expr, $prefix:expr, $field:expr) => {
                if let Some(v) = $line.strip_prefix($prefix) {
                    $field = v.trim().parse()
                        .map_err(|_| SynthError::Parse(format!("Invalid {} '{}'", $prefix, v.trim())))?;
                    continue;
                }
            };
        }

        for line in content.lines() {
            let line = line.split("//").next().unwrap_or("").trim();
            if line.is_empty() { continue; } // Comments (//) & empty lines

            if let Some(v) = line.strip_prefix("channel:") {
                let (name, pattern) = v.split_once(',')
                    .ok_or_else(|| SynthError::Parse(format!("Expected 'channel: <instrument>, <pattern>', got '{}'", line)))?;
                channels.push(ChannelConfig {
                    instrument: parse_instrument(name)?,
                    pattern: pattern.trim().to_string(),
                });
            } else if let Some(v) = line.strip_prefix("lead:") {
                config.lead = parse_instrument(v)?;
            } else if let Some(v) = line.strip_prefix("sample_rate:") {
                let v = v.trim();
                config.sample_rate = if v.eq_ignore_ascii_case("default") {
                    None
                } else {
                    Some(v.parse().map_err(|_| SynthError::Parse(format!("Invalid sample_rate: '{}'", v)))?)
                };
            } else {
                parse_field!(line, "headroom:", config.headroom);
                parse_field!(line, "tempo:", config.tempo);
                parse_field!(line, "beats:", config.beats);
                parse_field!(line, "sub_beats:", config.sub_beats);
                parse_field!(line, "control_rate:", config.control_rate);
                return Err(SynthError::Parse(format!("Unknown setting '{}'", line)));
            }
        }

        if !channels.is_empty() {
            config.channels = channels;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_cfg(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            tempo = config.tempo,
            channels = config.channels.len(),
            "loaded synth config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.headroom.is_finite() && self.headroom > 0.0) {
            return Err(SynthError::Config(format!("headroom must be positive, got {}", self.headroom)));
        }
        if !(self.control_rate.is_finite() && self.control_rate > 0.0) {
            return Err(SynthError::Config(format!("control_rate must be positive, got {}", self.control_rate)));
        }
        if self.sample_rate == Some(0) {
            return Err(SynthError::Config("sample_rate must be positive".to_string()));
        }
        Ok(())
    }

    /// Sequencer with one channel per configured pattern.
    pub fn build_sequencer(&self, bank: &InstrumentBank) -> Result<Sequencer> {
        let mut sequencer = Sequencer::new(self.tempo, self.beats, self.sub_beats)?;
        for channel in &self.channels {
            sequencer.add_channel(bank.get(channel.instrument), &channel.pattern)?;
        }
        Ok(sequencer)
    }
}

fn parse_instrument(name: &str) -> Result<InstrumentKind> {
    InstrumentKind::from_name(name)
        .ok_or_else(|| SynthError::InvalidInstrument(format!("Unknown instrument '{}'", name.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_demo_sequencer() {
        let config = SynthConfig::default();
        let seq = config.build_sequencer(&InstrumentBank::new()).unwrap();
        assert_eq!(seq.channels().len(), 3);
        assert_eq!(seq.total_steps(), 16);
        assert_eq!(seq.tempo(), 90.0);
    }

    #[test]
    fn parses_settings_and_channels() {
        let text = "
            // two bar groove
            tempo: 120
            beats: 2
            sub_beats: 4
            headroom: 0.25
            sample_rate: 48000
            lead: bell8
            channel: kick, X...X...
            channel: hihat, X.X.X.XX // closed hat
        ";
        let config = SynthConfig::from_cfg(text).unwrap();
        assert_eq!(config.tempo, 120.0);
        assert_eq!(config.beats, 2);
        assert_eq!(config.headroom, 0.25);
        assert_eq!(config.sample_rate, Some(48000));
        assert_eq!(config.lead, InstrumentKind::Bell8);
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels[1].pattern, "X.X.X.XX");

        let seq = config.build_sequencer(&InstrumentBank::new()).unwrap();
        assert_eq!(seq.total_steps(), 8);
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let config = SynthConfig::from_cfg("tempo: 100").unwrap();
        assert_eq!(config.tempo, 100.0);
        assert_eq!(config.channels, SynthConfig::default().channels);
        assert_eq!(config.sample_rate, None);
    }

    #[test]
    fn rejects_unknown_keys_and_instruments() {
        assert!(matches!(SynthConfig::from_cfg("swing: 0.5"), Err(SynthError::Parse(_))));
        assert!(matches!(SynthConfig::from_cfg("channel: tuba, X..."), Err(SynthError::InvalidInstrument(_))));
        assert!(matches!(SynthConfig::from_cfg("tempo: fast"), Err(SynthError::Parse(_))));
        assert!(matches!(SynthConfig::from_cfg("headroom: 0"), Err(SynthError::Config(_))));
    }

    #[test]
    fn pattern_length_is_checked_when_building() {
        let config = SynthConfig::from_cfg("channel: snare, X.X.").unwrap();
        assert!(matches!(
            config.build_sequencer(&InstrumentBank::new()),
            Err(SynthError::InvalidPattern(_))
        ));
    }
}
