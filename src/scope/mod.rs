//! CRT-style oscilloscope view of the analysis tap.
//!
//! The scope is host-agnostic: a host hands [`Scope::tick`] its monotonic
//! clock, the configured refresh rate, the analyser (when the graph has
//! started) and a [`Surface`] to paint on. Pacing, waveform capture and
//! drawing all live behind that one call, so the same scope runs against a
//! terminal canvas in the demo binary and a recording surface in tests.

pub mod render;
pub mod sampler;
pub mod surface;

pub use render::{barrel_distort, ScopeRenderer, ScopeTheme};
pub use sampler::{FrameGate, FrameSampler};
pub use surface::{Glow, Path, PathCmd, Point, Rgba, StrokeStyle, Surface, TextAlign};

use crate::graph::Analyser;

/// Frame-paced oscilloscope. One instance per view.
#[derive(Debug, Default)]
pub struct Scope {
    gate: FrameGate,
    sampler: FrameSampler,
    renderer: ScopeRenderer,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: ScopeTheme) -> Self {
        Self {
            renderer: ScopeRenderer::with_theme(theme),
            ..Self::default()
        }
    }

    pub fn theme(&self) -> &ScopeTheme {
        self.renderer.theme()
    }

    /// Advance the scope by one host frame. Returns true when a frame was
    /// actually drawn onto `surface`.
    ///
    /// The pacing gate runs before anything else: a frame that is due
    /// consumes its slot even when `analyser` is `None` (the graph has not
    /// started yet), so the first audible frame is never drawn early.
    pub fn tick<S: Surface>(
        &mut self,
        now_ms: f64,
        rate_hz: f32,
        analyser: Option<&mut Analyser>,
        frequency: Option<f32>,
        surface: &mut S,
    ) -> bool {
        if !self.gate.should_draw(now_ms, rate_hz) {
            return false;
        }
        let Some(analyser) = analyser else {
            return false;
        };
        let samples = self.sampler.sample(analyser);
        self.renderer.render(samples, frequency, surface);
        true
    }
}
