use crate::graph::gain::GainAutomation;
use crate::graph::oscillator::Oscillator;
use crate::notes::NoteId;
use crate::params::WaveShape;
use crate::GAIN_FLOOR;

/// One sounding unison component: an oscillator through its own gain.
///
/// Voices are one-shot. They start sounding the moment they are spawned
/// and, once released, fade over a scheduled span and are then swept out
/// of the mix by the processor.
#[derive(Debug)]
pub struct GraphVoice {
    note: NoteId,
    osc: Oscillator,
    gain: GainAutomation,
    samples_until_stop: Option<u32>,
}

impl GraphVoice {
    pub fn new(
        note: NoteId,
        shape: WaveShape,
        frequency: f32,
        detune_cents: f32,
        gain: f32,
        sample_rate: f32,
    ) -> Self {
        Self {
            note,
            osc: Oscillator::new(shape, frequency, detune_cents, sample_rate),
            gain: GainAutomation::new(gain),
            samples_until_stop: None,
        }
    }

    pub fn note(&self) -> NoteId {
        self.note
    }

    /// True once a release fade has been scheduled.
    pub fn is_releasing(&self) -> bool {
        self.samples_until_stop.is_some()
    }

    /// True once the scheduled stop has elapsed; the voice renders silence.
    pub fn is_finished(&self) -> bool {
        self.samples_until_stop == Some(0)
    }

    /// Cancel pending automation and fade to the floor over `fade_samples`,
    /// stopping the oscillator when the fade ends. Releasing twice is a
    /// no-op; the first fade keeps its schedule.
    pub fn release(&mut self, fade_samples: u32) {
        if self.is_releasing() {
            return;
        }
        self.gain.cancel_scheduled();
        self.gain.exponential_ramp_to(GAIN_FLOOR, fade_samples);
        self.samples_until_stop = Some(fade_samples.max(1));
    }

    /// Write this voice's samples into `out`. Samples past the scheduled
    /// stop are left untouched (the caller pre-zeros its scratch buffer).
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            if self.is_finished() {
                break;
            }
            *sample = self.osc.next_sample() * self.gain.next_sample();
            if let Some(remaining) = &mut self.samples_until_stop {
                *remaining -= 1;
            }
        }
    }
}
