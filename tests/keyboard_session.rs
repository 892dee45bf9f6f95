//! End-to-end sessions against the offline backend: key events in,
//! rendered audio, analyser bytes and scope frames out.

use phosphor_synth::audio::{OfflineBackend, ProcessorSlot};
use phosphor_synth::notes;
use phosphor_synth::scope::{Path, Rgba, Scope, StrokeStyle, Surface, TextAlign};
use phosphor_synth::synth::Synth;
use phosphor_synth::FFT_SIZE;

const SR: f32 = 48_000.0;
const BLOCK: usize = 512;

fn session() -> (Synth, ProcessorSlot) {
    let (backend, slot) = OfflineBackend::new(SR);
    (Synth::new(Box::new(backend)), slot)
}

/// Drive the audio side as the device callback would.
fn pump(slot: &ProcessorSlot, blocks: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; BLOCK];
    let mut all = Vec::with_capacity(blocks * BLOCK);
    for _ in 0..blocks {
        assert!(slot.render_block(&mut out), "graph should be running");
        all.extend_from_slice(&out);
    }
    all
}

#[test]
fn chord_reaches_the_analyser() {
    let (mut synth, slot) = session();

    synth.play_note(notes::C4).unwrap();
    synth.play_note(notes::E4).unwrap();
    synth.play_note(notes::G4).unwrap();
    assert_eq!(synth.active_note_count(), 3);

    // Spawns land at the next block boundary.
    let rendered = pump(&slot, 8);
    assert_eq!(slot.voice_count(), Some(3));
    assert!(
        rendered.iter().any(|s| s.abs() > 0.01),
        "a sounding chord must produce audio"
    );

    let analyser = synth.analyser_mut().expect("graph started on first note");
    let mut bytes = vec![0u8; analyser.bin_count()];
    analyser.fill_byte_time_domain(&mut bytes);
    assert!(
        bytes.iter().any(|&b| b != 128),
        "the waveform must move off the center line"
    );
}

#[test]
fn releasing_everything_returns_to_silence_and_placeholder() {
    let (mut synth, slot) = session();

    synth.play_note(notes::C4).unwrap();
    synth.play_note(notes::E4).unwrap();
    pump(&slot, 4);

    synth.stop_note(notes::C4);
    synth.stop_note(notes::E4);
    assert_eq!(
        synth.current_frequency(),
        None,
        "the readout goes back to the placeholder after the last note-off"
    );

    // The 50 ms release fade is 2400 samples at 48 kHz; five blocks pass it.
    pump(&slot, 5);
    assert_eq!(slot.voice_count(), Some(0), "faded voices must be reaped");

    // Once a full analysis window of silence has been rendered, the scope
    // sees a flat center line again.
    if let Some(analyser) = synth.analyser_mut() {
        let mut bytes = vec![0u8; analyser.bin_count()];
        analyser.fill_byte_time_domain(&mut bytes); // drain what is pending
    }
    let tail = pump(&slot, FFT_SIZE / BLOCK);
    assert!(tail.iter().all(|&s| s == 0.0), "no voices, no signal");

    let analyser = synth.analyser_mut().unwrap();
    let mut bytes = vec![0u8; analyser.bin_count()];
    analyser.fill_byte_time_domain(&mut bytes);
    assert!(bytes.iter().all(|&b| b == 128));
}

#[test]
fn master_volume_reaches_the_running_stream() {
    let (mut synth, slot) = session();

    synth.play_note(notes::A4).unwrap();
    let loud = pump(&slot, 4);
    assert!(loud.iter().any(|s| s.abs() > 0.01));

    synth.set_master_volume(0.0);
    pump(&slot, 1); // command picked up at the next block boundary
    let muted = pump(&slot, 2);
    assert!(
        muted.iter().all(|&s| s == 0.0),
        "volume zero must silence a sounding note"
    );
}

#[test]
fn double_press_keeps_the_first_instance() {
    let (mut synth, slot) = session();

    synth.play_note(notes::C4).unwrap();
    pump(&slot, 1);
    assert_eq!(slot.voice_count(), Some(1));

    // Retrigger with fatter settings; the note is already sounding, so
    // nothing changes until it is released and played again.
    synth.set_unison(4);
    synth.play_note(notes::C4).unwrap();
    pump(&slot, 1);
    assert_eq!(synth.active_note_count(), 1);
    assert_eq!(slot.voice_count(), Some(1));
}

#[test]
fn unison_spawns_one_graph_voice_per_component() {
    let (mut synth, slot) = session();

    synth.set_unison(4);
    synth.set_detune_spread(10.0);
    synth.play_note(notes::C4).unwrap();
    pump(&slot, 1);
    assert_eq!(slot.voice_count(), Some(4));

    synth.stop_note(notes::C4);
    pump(&slot, 6);
    assert_eq!(slot.voice_count(), Some(0));
}

#[test]
fn pitch_shift_applies_at_note_on() {
    let (mut synth, _slot) = session();

    synth.set_pitch_shift(10.0);
    synth.play_note(notes::A4).unwrap();
    assert_eq!(synth.current_frequency(), Some(450.0));
}

/// Minimal surface for driving the scope in an integration setting.
#[derive(Default)]
struct CountingSurface {
    ops: usize,
    last_text: Option<String>,
}

impl Surface for CountingSurface {
    fn width(&self) -> f32 {
        400.0
    }

    fn height(&self) -> f32 {
        200.0
    }

    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _color: Rgba) {
        self.ops += 1;
    }

    fn fill_radial_gradient(
        &mut self,
        _cx: f32,
        _cy: f32,
        _inner_radius: f32,
        _outer_radius: f32,
        _inner: Rgba,
        _outer: Rgba,
    ) {
        self.ops += 1;
    }

    fn stroke_path(&mut self, _path: &Path, _style: StrokeStyle) {
        self.ops += 1;
    }

    fn draw_text(&mut self, text: &str, _x: f32, _y: f32, _align: TextAlign, _color: Rgba) {
        self.ops += 1;
        self.last_text = Some(text.to_string());
    }
}

#[test]
fn scope_session_tracks_the_played_note() {
    let (mut synth, slot) = session();
    let mut scope = Scope::new();
    let mut surface = CountingSurface::default();

    // Nothing started yet: a due frame is consumed but nothing drawn.
    assert!(!scope.tick(100.0, 60.0, synth.analyser_mut(), None, &mut surface));
    assert_eq!(surface.ops, 0);

    synth.play_note(notes::E4).unwrap();
    pump(&slot, 8);

    let frequency = synth.current_frequency();
    assert!(scope.tick(200.0, 60.0, synth.analyser_mut(), frequency, &mut surface));
    assert!(surface.ops > 0);
    assert_eq!(surface.last_text.as_deref(), Some("329.63 Hz"));

    synth.stop_note(notes::E4);
    let frequency = synth.current_frequency();
    assert!(scope.tick(300.0, 60.0, synth.analyser_mut(), frequency, &mut surface));
    assert_eq!(
        surface.last_text.as_deref(),
        Some("--- Hz"),
        "the readout shows the placeholder after the last note-off"
    );
}
