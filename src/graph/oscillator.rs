use std::f32::consts::TAU;

use crate::params::WaveShape;

/*
Voice Oscillator
================

One oscillator per unison component. Phase runs in [0, 1) and advances by
frequency / sample_rate each sample; the waveform is evaluated from phase.

Square and sawtooth have step discontinuities that alias badly when sampled
naively. PolyBLEP (polynomial band-limited step) cancels most of that by
blending a two-sample polynomial correction around each step. Sine has no
discontinuity, and the triangle's corners are mild enough at the playable
range (MIDI 60-72 fundamentals) to leave uncorrected.

Detune is expressed in cents, as keyboards expect:

    effective_hz = frequency * 2^(cents / 1200)

so +1200 cents doubles the pitch and a unison spread stays symmetric in
pitch space rather than in raw Hz.
*/

/// A band-limited oscillator with a fixed shape, frequency and detune.
#[derive(Debug, Clone)]
pub struct Oscillator {
    shape: WaveShape,
    frequency: f32,
    detune_cents: f32,
    phase: f32,
    sample_rate: f32,
}

impl Oscillator {
    pub fn new(shape: WaveShape, frequency: f32, detune_cents: f32, sample_rate: f32) -> Self {
        Self {
            shape,
            frequency,
            detune_cents,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Frequency after the cents detune is applied.
    pub fn effective_frequency(&self) -> f32 {
        self.frequency * 2.0_f32.powf(self.detune_cents / 1200.0)
    }

    fn phase_inc(&self) -> f32 {
        self.effective_frequency() / self.sample_rate
    }

    /// Produce one sample and advance the phase.
    pub fn next_sample(&mut self) -> f32 {
        let inc = self.phase_inc();
        let sample = match self.shape {
            WaveShape::Sine => (TAU * self.phase).sin(),
            WaveShape::Sawtooth => {
                let naive = 2.0 * self.phase - 1.0;
                naive - poly_blep(self.phase, inc)
            }
            WaveShape::Square => {
                let mut value = if self.phase < 0.5 { 1.0 } else { -1.0 };
                value += poly_blep(self.phase, inc);
                value -= poly_blep((self.phase + 0.5) % 1.0, inc);
                value
            }
            WaveShape::Triangle => {
                // Piecewise linear: -1 -> +1 over [0, 0.5), back down over [0.5, 1).
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }
}

/// PolyBLEP correction around a step discontinuity.
///
/// `t` is the phase in [0, 1), `dt` the per-sample phase increment. Nonzero
/// only within one sample of the wrap point.
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let freq = 440.0;
        let mut osc = Oscillator::new(WaveShape::Sine, freq, 0.0, sample_rate);

        for n in 0..64 {
            let sample = osc.next_sample();
            let expected = (TAU * freq * n as f32 / sample_rate).sin();
            assert!(
                (sample - expected).abs() < 1e-4,
                "Sample {} incorrect: got {}, expected {}",
                n,
                sample,
                expected
            );
        }
    }

    #[test]
    fn detune_of_one_octave_doubles_frequency() {
        let osc = Oscillator::new(WaveShape::Sine, 220.0, 1200.0, 48_000.0);
        assert!(
            (osc.effective_frequency() - 440.0).abs() < 1e-3,
            "+1200 cents must double 220 Hz, got {}",
            osc.effective_frequency()
        );
    }

    #[test]
    fn zero_detune_is_exact() {
        let osc = Oscillator::new(WaveShape::Sawtooth, 311.13, 0.0, 48_000.0);
        assert_eq!(osc.effective_frequency(), 311.13);
    }

    #[test]
    fn all_shapes_stay_in_range() {
        for shape in [
            WaveShape::Sine,
            WaveShape::Square,
            WaveShape::Sawtooth,
            WaveShape::Triangle,
        ] {
            let mut osc = Oscillator::new(shape, 523.25, 7.5, 48_000.0);
            for _ in 0..48_000 {
                let s = osc.next_sample();
                assert!(
                    (-1.5..=1.5).contains(&s),
                    "{:?} sample out of range: {}",
                    shape,
                    s
                );
            }
        }
    }

    #[test]
    fn square_alternates_sign() {
        let mut osc = Oscillator::new(WaveShape::Square, 1000.0, 0.0, 48_000.0);
        let mut saw_positive = false;
        let mut saw_negative = false;
        for _ in 0..96 {
            let s = osc.next_sample();
            saw_positive |= s > 0.5;
            saw_negative |= s < -0.5;
        }
        assert!(
            saw_positive && saw_negative,
            "Square must swing both ways within two cycles"
        );
    }
}
