// Purpose: note allocation and the user-facing control surface
// This layer sits above the signal graph and owns the global parameters

pub mod voice_manager;

pub use voice_manager::{NoteDisplay, NoteInstance, UnisonVoice, VoiceManager};

use crate::audio::{AudioBackend, AudioError};
use crate::graph::{Analyser, SignalGraph};
use crate::notes::NoteId;
use crate::params::{SynthParams, WaveShape};

/// The whole instrument behind one handle: global parameters, the signal
/// graph and the voice manager.
///
/// This is the surface input collaborators call. Setters are plain value
/// assignments; master volume and smoothing additionally forward to the
/// live graph, everything else is sampled at the next note-on. The graph
/// starts lazily on the first `play_note`.
pub struct Synth {
    params: SynthParams,
    graph: SignalGraph,
    voices: VoiceManager,
}

impl Synth {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self::with_params(backend, SynthParams::default())
    }

    pub fn with_params(backend: Box<dyn AudioBackend>, params: SynthParams) -> Self {
        let graph = SignalGraph::new(backend, params.master_volume, params.smoothing);
        Self {
            params,
            graph,
            voices: VoiceManager::new(),
        }
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn play_note(&mut self, note: NoteId) -> Result<(), AudioError> {
        self.voices.play_note(note, &self.params, &mut self.graph)
    }

    pub fn stop_note(&mut self, note: NoteId) {
        self.voices.stop_note(note, &mut self.graph);
    }

    pub fn set_wave_shape(&mut self, shape: WaveShape) {
        self.params.wave_shape = shape;
    }

    pub fn set_unison(&mut self, unison: u32) {
        self.params.unison = unison;
    }

    pub fn set_detune_spread(&mut self, cents: f32) {
        self.params.detune_spread = cents;
    }

    pub fn set_pitch_shift(&mut self, hz: f32) {
        self.params.pitch_shift = hz;
    }

    /// Applies to the live master gain as well as future note-ons.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.params.master_volume = volume;
        self.graph.set_master_volume(volume);
    }

    /// Applies to the live analyser immediately.
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.params.smoothing = smoothing;
        self.graph.set_smoothing(smoothing);
    }

    pub fn set_refresh_rate(&mut self, hz: f32) {
        self.params.refresh_rate = hz;
    }

    pub fn set_note_display(&mut self, display: Box<dyn NoteDisplay>) {
        self.voices.set_display(display);
    }

    /// Base frequency of the most recent note-on, `None` when silent.
    pub fn current_frequency(&self) -> Option<f32> {
        self.voices.current_frequency()
    }

    pub fn is_sounding(&self, note: NoteId) -> bool {
        self.voices.is_sounding(note)
    }

    pub fn active_note_count(&self) -> usize {
        self.voices.active_note_count()
    }

    pub fn sounding_notes(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.voices.sounding_notes()
    }

    /// The analysis tap, once the graph has started.
    pub fn analyser_mut(&mut self) -> Option<&mut Analyser> {
        self.graph.analyser_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineBackend;

    fn test_synth() -> Synth {
        let (backend, _slot) = OfflineBackend::new(48_000.0);
        Synth::new(Box::new(backend))
    }

    #[test]
    fn setters_update_parameters() {
        let mut synth = test_synth();
        synth.set_wave_shape(WaveShape::Triangle);
        synth.set_unison(5);
        synth.set_detune_spread(12.0);
        synth.set_pitch_shift(-3.0);
        synth.set_refresh_rate(30.0);

        let p = synth.params();
        assert_eq!(p.wave_shape, WaveShape::Triangle);
        assert_eq!(p.unison, 5);
        assert_eq!(p.detune_spread, 12.0);
        assert_eq!(p.pitch_shift, -3.0);
        assert_eq!(p.refresh_rate, 30.0);
    }

    #[test]
    fn first_note_starts_the_graph() {
        let mut synth = test_synth();
        assert!(synth.analyser_mut().is_none());
        synth.play_note(60).unwrap();
        assert!(synth.analyser_mut().is_some());
        assert!(synth.is_sounding(60));
    }

    #[test]
    fn volume_setter_reaches_live_params_and_graph() {
        let mut synth = test_synth();
        synth.play_note(60).unwrap();
        synth.set_master_volume(0.9);
        assert_eq!(synth.params().master_volume, 0.9);

        synth.set_smoothing(0.3);
        assert_eq!(synth.analyser_mut().unwrap().smoothing(), 0.3);
    }
}
