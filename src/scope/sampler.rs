//! Frame pacing and waveform capture.

use crate::graph::Analyser;

/// Decides whether a frame is due, given the host clock and the refresh
/// rate. Frames arrive as fast as the host schedules them; we only draw
/// when at least `1000 / rate` milliseconds have passed since the last
/// drawn frame.
#[derive(Debug, Default)]
pub struct FrameGate {
    last_draw_ms: f64,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the frame should be drawn, and records the
    /// timestamp so the next interval is measured from it. A draw that is
    /// skipped leaves the recorded timestamp alone, so intervals never
    /// drift from rounded-up host ticks.
    pub fn should_draw(&mut self, now_ms: f64, rate_hz: f32) -> bool {
        if rate_hz <= 0.0 {
            return false;
        }
        let required_delay = 1000.0 / rate_hz as f64;
        if now_ms < self.last_draw_ms + required_delay {
            return false;
        }
        self.last_draw_ms = now_ms;
        true
    }
}

/// Owns the byte buffer a frame's waveform is captured into, sized to the
/// analyser's bin count on every capture.
#[derive(Debug, Default)]
pub struct FrameSampler {
    buffer: Vec<u8>,
}

impl FrameSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the analyser's current window as unsigned bytes centered
    /// on 128, pulling pending audio off the tap first.
    pub fn sample(&mut self, analyser: &mut Analyser) -> &[u8] {
        self.buffer.resize(analyser.bin_count(), 128);
        analyser.fill_byte_time_domain(&mut self.buffer);
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_skips_frames_that_arrive_early() {
        let mut gate = FrameGate::new();

        // 30 Hz needs 33.3 ms between draws.
        assert!(gate.should_draw(100.0, 30.0), "first frame should draw");
        assert!(
            !gate.should_draw(110.0, 30.0),
            "frame 10 ms later must be skipped at 30 Hz"
        );
        assert!(
            gate.should_draw(140.0, 30.0),
            "frame 40 ms after the last draw must be drawn"
        );
    }

    #[test]
    fn gate_measures_from_last_drawn_frame() {
        let mut gate = FrameGate::new();
        assert!(gate.should_draw(100.0, 30.0));
        assert!(!gate.should_draw(120.0, 30.0));
        // 125 is 25 ms after the skipped frame but only 33.3+ after the
        // drawn one counts.
        assert!(!gate.should_draw(125.0, 30.0));
        assert!(gate.should_draw(133.4, 30.0));
    }

    #[test]
    fn gate_never_fires_for_zero_rate() {
        let mut gate = FrameGate::new();
        assert!(!gate.should_draw(100.0, 0.0));
        assert!(!gate.should_draw(1.0e9, 0.0));
    }

    #[test]
    fn gate_rate_change_takes_effect_immediately() {
        let mut gate = FrameGate::new();
        assert!(gate.should_draw(100.0, 30.0));
        // At 100 Hz the 10 ms gap is enough.
        assert!(gate.should_draw(110.0, 100.0));
    }
}
