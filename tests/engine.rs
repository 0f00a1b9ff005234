use std::sync::Arc;
use std::thread;
use synthbox::{
    bounce, write_wav, Controller, InstrumentBank, InstrumentKind, Keyboard, Note, NoteRegistry,
    PlaybackClock, SynthConfig,
};

fn controller_from(config: &SynthConfig, sample_rate: u32) -> (Controller, Arc<NoteRegistry>, Arc<PlaybackClock>) {
    let bank = InstrumentBank::new();
    let registry = Arc::new(NoteRegistry::with_headroom(config.headroom));
    let clock = Arc::new(PlaybackClock::new(sample_rate));
    let controller = Controller::new(
        config.build_sequencer(&bank).unwrap(),
        Keyboard::new(bank.get(config.lead)),
        Arc::clone(&registry),
        Arc::clone(&clock),
    );
    (controller, registry, clock)
}

#[test]
fn bounces_default_groove_to_wav() {
    let config = SynthConfig::default();
    let (mut controller, _registry, clock) = controller_from(&config, 22_050);

    let samples = bounce(&mut controller, &clock, 1.0);
    assert_eq!(samples.len(), 22_050);
    assert!(samples.iter().any(|s| s.abs() > 0.01));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groove.wav");
    write_wav(&path, &samples, 22_050).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 22_050);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.len() as usize, samples.len());
}

#[test]
fn drum_notes_retire_after_pattern_stops() {
    let config = SynthConfig::from_cfg("tempo: 120\nbeats: 1\nsub_beats: 4\nchannel: kick, X...").unwrap();
    let (mut controller, registry, clock) = controller_from(&config, 8_000);

    bounce(&mut controller, &clock, 0.2);
    assert_eq!(registry.len(), 1);

    // Render past the kick's lifetime without ticking the sequencer
    let mut buffer = vec![0.0; 8_000 * 2];
    synthbox::render_block(&registry, &clock, &mut buffer, 1);
    assert!(registry.is_empty());
}

#[test]
fn control_and_render_contexts_share_the_registry() {
    let bank = InstrumentBank::new();
    let registry = Arc::new(NoteRegistry::new());
    let clock = Arc::new(PlaybackClock::new(44_100));

    let render = {
        let registry = Arc::clone(&registry);
        let clock = Arc::clone(&clock);
        thread::spawn(move || {
            let mut buffer = vec![0.0f32; 256];
            for _ in 0..200 {
                synthbox::render_block(&registry, &clock, &mut buffer, 1);
                assert!(buffer.iter().all(|s| s.is_finite()));
            }
        })
    };

    let snare = bank.get(InstrumentKind::DrumSnare);
    let harm = bank.get(InstrumentKind::Harmonica);
    for i in 0..500 {
        let now = clock.now();
        registry.add(Note::new(Arc::clone(&snare), 64).starting_at(now));
        if i % 2 == 0 {
            registry.note_on(&harm, 64 + (i % 16), now);
        } else {
            registry.note_off(&harm, 64 + (i % 16), now);
        }
    }

    render.join().unwrap();
    assert!(registry.snapshot().iter().all(|n| n.active));
}
