use std::path::Path;
use std::sync::Arc;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};

use crate::clock::PlaybackClock;
use crate::config::SynthConfig;
use crate::control::{Controller, Keyboard};
use crate::error::{Result, SynthError};
use crate::instrument::{InstrumentBank, InstrumentKind};
use crate::registry::NoteRegistry;

/// Fill an interleaved output buffer from the registry, one frame at a time.
///
/// Every frame advances the clock by one sample and gets the same mono value
/// on all of its channels. Shared by the live stream and offline bouncing.
pub fn render_block(registry: &NoteRegistry, clock: &PlaybackClock, buffer: &mut [f32], channels: usize) {
    for frame in buffer.chunks_mut(channels.max(1)) {
        let time = clock.advance(1);
        let output = registry.produce_sample(0, time);
        for sample in frame.iter_mut() {
            *sample = output;
        }
    }
}

/// Render `seconds` of mono audio offline, ticking the controller between blocks.
pub fn bounce(controller: &mut Controller, clock: &PlaybackClock, seconds: f64) -> Vec<f32> {
    let sample_rate = clock.sample_rate() as usize;
    let total = (seconds.max(0.0) * sample_rate as f64) as usize;
    let block = (sample_rate / 200).max(1); // 5ms
    let block_duration = block as f64 / sample_rate as f64;

    let mut output = vec![0.0; total];
    for chunk in output.chunks_mut(block) {
        controller.tick(block_duration);
        render_block(controller.registry(), clock, chunk, 1);
    }
    output
}

/// Write mono samples as a 16-bit WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    tracing::info!(path = %path.as_ref().display(), samples = samples.len(), sample_rate, "wrote wav");
    Ok(())
}

pub struct SynthEngine {
    config: SynthConfig,
    device: Device,
    stream_config: StreamConfig,
    instruments: InstrumentBank,
    registry: Arc<NoteRegistry>,
    clock: Arc<PlaybackClock>,
    stream: Option<Stream>,
}

impl SynthEngine {
    /// Open the default output device. Fails here, not mid-stream, when no
    /// usable device exists.
    pub fn new(config: SynthConfig) -> Result<Self> {
        config.validate()?;

        let host = cpal::default_host();
        let device = host.default_output_device()
            .ok_or_else(|| SynthError::Audio("No output device found".to_string()))?;
        let default_config = device.default_output_config()
            .map_err(|e| SynthError::Audio(e.to_string()))?;

        let mut stream_config = default_config.config();
        if let Some(rate) = config.sample_rate {
            stream_config.sample_rate = cpal::SampleRate(rate);
        }

        tracing::info!(
            host = host.id().name(),
            sample_rate = stream_config.sample_rate.0,
            channels = stream_config.channels,
            "audio device opened"
        );

        Ok(SynthEngine {
            registry: Arc::new(NoteRegistry::with_headroom(config.headroom)),
            clock: Arc::new(PlaybackClock::new(stream_config.sample_rate.0)),
            instruments: InstrumentBank::new(),
            config,
            device,
            stream_config,
            stream: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.stream_config.sample_rate.0
    }

    pub fn registry(&self) -> &Arc<NoteRegistry> {
        &self.registry
    }

    pub fn clock(&self) -> &Arc<PlaybackClock> {
        &self.clock
    }

    pub fn instruments(&self) -> &InstrumentBank {
        &self.instruments
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Control context wired to this engine's registry and clock.
    pub fn controller(&self) -> Result<Controller> {
        let sequencer = self.config.build_sequencer(&self.instruments)?;
        let keyboard = Keyboard::new(self.instruments.get(self.config.lead));
        Ok(Controller::new(sequencer, keyboard, Arc::clone(&self.registry), Arc::clone(&self.clock)))
    }

    pub fn note_on(&self, kind: InstrumentKind, index: i32) {
        self.registry.note_on(&self.instruments.get(kind), index, self.clock.now());
    }

    pub fn note_off(&self, kind: InstrumentKind, index: i32) {
        self.registry.note_off(&self.instruments.get(kind), index, self.clock.now());
    }

    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let registry = Arc::clone(&self.registry);
        let clock = Arc::clone(&self.clock);
        let channels = self.stream_config.channels as usize;

        let stream = self.device.build_output_stream(
            &self.stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                render_block(&registry, &clock, data, channels);
            },
            |err| tracing::error!(%err, "stream error"),
            None
        ).map_err(|e| SynthError::Audio(e.to_string()))?;

        stream.play().map_err(|e| SynthError::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::info!("playback started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::info!(notes = self.registry.len(), "playback stopped");
        }
        self.registry.clear();
    }
}

impl Drop for SynthEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
