use rtrb::{Consumer, Producer, PushError};

use crate::graph::command::GraphCommand;
use crate::graph::voice::GraphVoice;
use crate::{MAX_BLOCK_SIZE, RELEASE_FADE};

/// Upper bound on simultaneously sounding voices. Thirteen playable notes
/// times any sane unison count fits well below this; spawns beyond the cap
/// are dropped rather than reallocating on the audio thread.
pub const MAX_VOICES: usize = 256;

/// The audio-thread half of the signal graph.
///
/// Owns the sounding voices and the master gain. Runs inside the backend's
/// render callback: drains pending commands, mixes voices, applies master
/// gain, publishes the post-gain block to the analysis tap, and sweeps
/// finished voices. Never blocks; the tap drops samples when the control
/// side falls behind.
pub struct GraphProcessor {
    sample_rate: f32,
    master_gain: f32,
    voices: Vec<GraphVoice>,
    commands: Consumer<GraphCommand>,
    tap: Producer<f32>,
    temp_buffer: Vec<f32>,
}

impl GraphProcessor {
    pub fn new(
        sample_rate: f32,
        master_gain: f32,
        commands: Consumer<GraphCommand>,
        tap: Producer<f32>,
    ) -> Self {
        Self {
            sample_rate,
            master_gain,
            voices: Vec::with_capacity(MAX_VOICES),
            commands,
            tap,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Voices currently in the mix, fading ones included.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Render one mono block. `out.len()` must not exceed `MAX_BLOCK_SIZE`;
    /// backends chunk their buffers accordingly.
    pub fn render_block(&mut self, out: &mut [f32]) {
        debug_assert!(
            out.len() <= MAX_BLOCK_SIZE,
            "block of {} exceeds MAX_BLOCK_SIZE",
            out.len()
        );

        self.apply_commands();

        // Mix voices
        out.fill(0.0);
        for voice in &mut self.voices {
            self.temp_buffer[..out.len()].fill(0.0);
            voice.render(&mut self.temp_buffer[..out.len()]);

            for (o, v) in out.iter_mut().zip(&self.temp_buffer) {
                *o += v;
            }
        }

        for sample in out.iter_mut() {
            *sample *= self.master_gain;
        }

        // Publish the post-gain signal for visualization. Non-blocking:
        // when the ring is full the scope just misses these samples.
        for &sample in out.iter() {
            if let Err(PushError::Full(_)) = self.tap.push(sample) {
                break;
            }
        }

        self.voices.retain(|v| !v.is_finished());
    }

    fn apply_commands(&mut self) {
        while let Ok(cmd) = self.commands.pop() {
            match cmd {
                GraphCommand::SpawnVoice {
                    note,
                    shape,
                    frequency,
                    detune_cents,
                    gain,
                } => {
                    if self.voices.len() < MAX_VOICES {
                        self.voices.push(GraphVoice::new(
                            note,
                            shape,
                            frequency,
                            detune_cents,
                            gain,
                            self.sample_rate,
                        ));
                    }
                }
                GraphCommand::ReleaseNote { note } => {
                    let fade = (RELEASE_FADE * self.sample_rate).round() as u32;
                    for voice in self
                        .voices
                        .iter_mut()
                        .filter(|v| v.note() == note && !v.is_releasing())
                    {
                        voice.release(fade);
                    }
                }
                GraphCommand::SetMasterGain { gain } => {
                    self.master_gain = gain;
                }
            }
        }
    }
}
