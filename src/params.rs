#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closed set of voice waveforms.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveShape {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl WaveShape {
    /// Display label used by parameter panels.
    pub fn label(self) -> &'static str {
        match self {
            WaveShape::Sine => "sine",
            WaveShape::Square => "square",
            WaveShape::Sawtooth => "sawtooth",
            WaveShape::Triangle => "triangle",
        }
    }
}

/// Global synth parameters.
///
/// One value assignment per setter, no validation: range policing belongs
/// to the input collaborator. Waveform, unison, detune and pitch shift are
/// read at note-on and never retroactively applied; master volume and
/// smoothing take effect live through the shared gain and analysis nodes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct SynthParams {
    /// Waveform for newly spawned voices.
    pub wave_shape: WaveShape,
    /// Voices stacked per note, >= 1.
    pub unison: u32,
    /// Detune spread across the unison stack, in cents.
    pub detune_spread: f32,
    /// Uniform offset added to the table frequency, in Hz.
    pub pitch_shift: f32,
    /// Master gain, 0..=1.
    pub master_volume: f32,
    /// Analysis smoothing constant, 0..=1.
    pub smoothing: f32,
    /// Scope refresh rate in Hz.
    pub refresh_rate: f32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            wave_shape: WaveShape::Sine,
            unison: 1,
            detune_spread: 0.0,
            pitch_shift: 0.0,
            master_volume: 0.5,
            smoothing: 0.8,
            refresh_rate: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_playable() {
        let p = SynthParams::default();
        assert!(p.unison >= 1, "default unison must spawn at least one voice");
        assert!(
            p.master_volume > 0.0 && p.master_volume <= 1.0,
            "default volume must be audible and in range"
        );
        assert!(p.refresh_rate > 0.0, "scope must refresh by default");
        assert_eq!(p.wave_shape, WaveShape::Sine);
    }
}
