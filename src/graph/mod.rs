//! The audio signal graph.
//!
//! Control side and audio side meet here. [`SignalGraph`] lives with the
//! event loop: it owns the command queue into the realtime processor and
//! the analysis tap coming back out. [`GraphProcessor`] is the audio-thread
//! half, handed to the backend when the graph starts.
//!
//! The chain is fixed: voices -> per-voice gain -> master gain -> analyser
//! tap -> output.

pub mod analyser;
pub mod command;
pub mod gain;
pub mod oscillator;
pub mod processor;
pub mod voice;

pub use analyser::Analyser;
pub use command::{CommandSink, GraphCommand};
pub use oscillator::Oscillator;
pub use processor::GraphProcessor;
pub use voice::GraphVoice;

use rtrb::RingBuffer;

use crate::audio::{AudioBackend, AudioError};
use crate::FFT_SIZE;

/// Command queue depth. A full keyboard of unison-8 note-ons is ~100
/// commands; the queue is drained every audio block.
const COMMAND_QUEUE_LEN: usize = 256;

/// Analysis tap capacity in samples. Several windows deep so a slow UI
/// frame does not starve the next read.
const TAP_RING_LEN: usize = FFT_SIZE * 8;

/// Control-side handle to the audio graph.
///
/// Two-phase lifecycle: construction is cheap and infallible; the graph
/// only builds its queues, analyser and processor on the first
/// [`ensure_started`](SignalGraph::ensure_started), which also hands the
/// processor to the backend. Subsequent calls are no-ops. There is no
/// teardown beyond dropping the value.
pub struct SignalGraph {
    backend: Box<dyn AudioBackend>,
    master_volume: f32,
    smoothing: f32,
    link: Option<GraphLink>,
}

/// The started graph's control-side endpoints.
struct GraphLink {
    commands: rtrb::Producer<GraphCommand>,
    analyser: Analyser,
}

impl SignalGraph {
    /// `master_volume` and `smoothing` seed the master gain node and the
    /// analyser when the graph starts; both can be changed live afterward.
    pub fn new(backend: Box<dyn AudioBackend>, master_volume: f32, smoothing: f32) -> Self {
        Self {
            backend,
            master_volume,
            smoothing,
            link: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.link.is_some()
    }

    /// Build the graph and hand the processor to the backend. Idempotent.
    pub fn ensure_started(&mut self) -> Result<(), AudioError> {
        if self.link.is_some() {
            return Ok(());
        }

        let (cmd_tx, cmd_rx) = RingBuffer::<GraphCommand>::new(COMMAND_QUEUE_LEN);
        let (tap_tx, tap_rx) = RingBuffer::<f32>::new(TAP_RING_LEN);

        let sample_rate = self.backend.sample_rate();
        let processor = GraphProcessor::new(sample_rate, self.master_volume, cmd_rx, tap_tx);
        self.backend.start(processor)?;

        self.link = Some(GraphLink {
            commands: cmd_tx,
            analyser: Analyser::new(tap_rx, self.smoothing),
        });
        tracing::info!(sample_rate, "signal graph started");
        Ok(())
    }

    /// Un-suspend the backend's output. Safe redundantly and before start.
    pub fn resume(&mut self) -> Result<(), AudioError> {
        self.backend.resume()
    }

    /// Immediate master gain change; also the seed value if the graph has
    /// not started yet.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume;
        if self.link.is_some() {
            self.send(GraphCommand::SetMasterGain { gain: volume });
        }
    }

    /// Immediate smoothing change on the analyser; seed value otherwise.
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing;
        if let Some(link) = &mut self.link {
            link.analyser.set_smoothing(smoothing);
        }
    }

    /// Push a command to the processor. Returns `false` before the graph
    /// has started or when the queue is full (the command is then dropped,
    /// never blocked on).
    pub fn send(&mut self, cmd: GraphCommand) -> bool {
        match &mut self.link {
            Some(link) => {
                let sent = link.commands.send(cmd);
                if !sent {
                    tracing::warn!(?cmd, "command queue full, dropping");
                }
                sent
            }
            None => false,
        }
    }

    /// The analysis tap, present once the graph has started.
    pub fn analyser_mut(&mut self) -> Option<&mut Analyser> {
        self.link.as_mut().map(|link| &mut link.analyser)
    }
}
