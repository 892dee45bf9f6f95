use crate::GAIN_FLOOR;

/// A gain value with optional scheduled exponential movement.
///
/// Mirrors the automation surface the stop path needs: immediate sets,
/// cancellation of pending movement, and an exponential ramp that lands on
/// its target exactly after the scheduled number of samples. Exponential
/// ramps are undefined at zero, so both endpoints are floored at
/// `GAIN_FLOOR`; a fade "to silence" really fades to the floor and the
/// voice is retired when the ramp ends.
#[derive(Debug, Clone)]
pub struct GainAutomation {
    value: f32,
    ramp: Option<Ramp>,
}

#[derive(Debug, Clone)]
struct Ramp {
    multiplier: f32,
    remaining: u32,
    target: f32,
}

impl GainAutomation {
    pub fn new(value: f32) -> Self {
        Self { value, ramp: None }
    }

    /// Gain applied to the next sample.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Immediate assignment, discarding any scheduled ramp.
    pub fn set_value(&mut self, value: f32) {
        self.value = value;
        self.ramp = None;
    }

    /// Drop pending automation, freezing the gain at its current value.
    pub fn cancel_scheduled(&mut self) {
        self.ramp = None;
    }

    /// Schedule an exponential ramp from the current value to `target`,
    /// completing after `samples` samples.
    pub fn exponential_ramp_to(&mut self, target: f32, samples: u32) {
        let from = self.value.max(GAIN_FLOOR);
        let target = target.max(GAIN_FLOOR);
        let n = samples.max(1);
        // Per-sample multiplier; n steps take `from` to `target`.
        let multiplier = (target / from).powf(1.0 / n as f32);
        self.value = from;
        self.ramp = Some(Ramp {
            multiplier,
            remaining: n,
            target,
        });
    }

    /// Gain for the current sample; advances any active ramp by one step.
    pub fn next_sample(&mut self) -> f32 {
        let out = self.value;
        if let Some(ramp) = &mut self.ramp {
            self.value *= ramp.multiplier;
            ramp.remaining -= 1;
            if ramp.remaining == 0 {
                // Multiplicative stepping accumulates rounding; land exactly.
                self.value = ramp.target;
                self.ramp = None;
            }
        }
        out
    }
}
