use std::collections::HashMap;

use crate::audio::AudioError;
use crate::graph::{GraphCommand, SignalGraph};
use crate::notes::{self, NoteId};
use crate::params::SynthParams;

/// Receives note start/stop notifications, e.g. a "now playing" label.
pub trait NoteDisplay {
    fn note_state_changed(&mut self, note: NoteId, sounding: bool);
}

/// One unison component as booked at note-on time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnisonVoice {
    /// Symmetric spread offset in cents.
    pub detune_cents: f32,
    /// Equal share of the master volume, `V / U`.
    pub gain: f32,
}

/// The voice set spawned for one sounding note.
#[derive(Debug, Clone)]
pub struct NoteInstance {
    /// Table frequency plus the pitch shift in force at note-on.
    pub base_frequency: f32,
    pub voices: Vec<UnisonVoice>,
}

/// Symmetric unison detune layout: `D * (i - (U-1)/2)` for each component.
/// A single voice always sits at zero, whatever the spread.
fn unison_detunes(unison: u32, spread_cents: f32) -> Vec<f32> {
    let center = (unison - 1) as f32 / 2.0;
    (0..unison)
        .map(|i| spread_cents * (i as f32 - center))
        .collect()
}

/// Turns note-on/note-off into voice spawns and releases, and tracks which
/// notes are sounding.
///
/// Parameters are sampled at note-on: changing unison or detune afterwards
/// never touches voices that are already sounding. Both `play_note` for a
/// sounding note and `stop_note` for a silent one are strict no-ops.
pub struct VoiceManager {
    active: HashMap<NoteId, NoteInstance>,
    current_frequency: Option<f32>,
    display: Option<Box<dyn NoteDisplay>>,
}

impl VoiceManager {
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
            current_frequency: None,
            display: None,
        }
    }

    /// Attach the "now playing" listener.
    pub fn set_display(&mut self, display: Box<dyn NoteDisplay>) {
        self.display = Some(display);
    }

    /// Base frequency of the most recently started note; `None` once the
    /// keyboard falls silent.
    pub fn current_frequency(&self) -> Option<f32> {
        self.current_frequency
    }

    pub fn is_sounding(&self, note: NoteId) -> bool {
        self.active.contains_key(&note)
    }

    pub fn active_note_count(&self) -> usize {
        self.active.len()
    }

    /// Sum of unison components across all sounding notes.
    pub fn active_voice_count(&self) -> usize {
        self.active.values().map(|n| n.voices.len()).sum()
    }

    /// Booked voice set for a sounding note.
    pub fn note_instance(&self, note: NoteId) -> Option<&NoteInstance> {
        self.active.get(&note)
    }

    /// Notes currently sounding, unordered.
    pub fn sounding_notes(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.active.keys().copied()
    }

    /// Start a note: spawn `unison` voices spread symmetrically around the
    /// (possibly pitch-shifted) table frequency, each carrying an equal
    /// share of the master volume.
    ///
    /// Starting a note that is already sounding is a no-op. Notes outside
    /// the table are ignored without touching the graph.
    pub fn play_note(
        &mut self,
        note: NoteId,
        params: &SynthParams,
        graph: &mut SignalGraph,
    ) -> Result<(), AudioError> {
        if self.active.contains_key(&note) {
            return Ok(());
        }
        let Some(table_hz) = notes::frequency(note) else {
            return Ok(());
        };

        graph.ensure_started()?;
        graph.resume()?;

        let unison = params.unison.max(1);
        let frequency = table_hz + params.pitch_shift;
        let gain = params.master_volume / unison as f32;

        let mut voices = Vec::with_capacity(unison as usize);
        for detune_cents in unison_detunes(unison, params.detune_spread) {
            graph.send(GraphCommand::SpawnVoice {
                note,
                shape: params.wave_shape,
                frequency,
                detune_cents,
                gain,
            });
            voices.push(UnisonVoice { detune_cents, gain });
        }

        self.active.insert(
            note,
            NoteInstance {
                base_frequency: frequency,
                voices,
            },
        );
        self.current_frequency = Some(frequency);
        tracing::debug!(note, frequency, unison, "note on");

        if let Some(display) = &mut self.display {
            display.note_state_changed(note, true);
        }
        Ok(())
    }

    /// Stop a note: schedule the 50 ms fade on the audio side and remove
    /// the instance immediately, so the same note can restart right away
    /// with fresh voices while the old ones fade out.
    ///
    /// Stopping a silent note is a no-op.
    pub fn stop_note(&mut self, note: NoteId, graph: &mut SignalGraph) {
        if self.active.remove(&note).is_none() {
            return;
        }

        graph.send(GraphCommand::ReleaseNote { note });
        if self.active.is_empty() {
            self.current_frequency = None;
        }
        tracing::debug!(note, "note off");

        if let Some(display) = &mut self.display {
            display.note_state_changed(note, false);
        }
    }
}

impl Default for VoiceManager {
    fn default() -> Self {
        Self::new()
    }
}
