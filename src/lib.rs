pub mod audio; // Output backends (realtime device, offline)
pub mod graph; // Signal graph: realtime processor, voices, analysis tap
pub mod notes;
pub mod params;
pub mod scope; // Rate-limited CRT-style waveform rendering
pub mod synth; // Note allocation and the top-level facade

/// Largest number of frames rendered in one processor pass.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Analysis window length in samples (one FFT frame).
pub const FFT_SIZE: usize = 2048;

/// Length of the fade applied when a note stops, in seconds.
pub(crate) const RELEASE_FADE: f32 = 0.05;

/// Floor for exponential gain ramps; a ramp to literal zero is degenerate.
pub(crate) const GAIN_FLOOR: f32 = 1.0e-4;
