//! Output backends.
//!
//! The signal graph hands its processor to an [`AudioBackend`] when it
//! starts. The realtime backend drives the processor from the device
//! callback; the offline backend renders blocks on demand, which is what
//! tests and non-realtime hosts use.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::graph::processor::GraphProcessor;
use crate::MAX_BLOCK_SIZE;

/// Errors from the audio output layer.
#[derive(Debug)]
pub enum AudioError {
    /// The host has no default output device.
    NoOutputDevice,
    /// The device rejected its own default configuration.
    Config(String),
    /// Building or starting the stream failed.
    Stream(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "no default audio output device"),
            AudioError::Config(msg) => write!(f, "audio configuration rejected: {}", msg),
            AudioError::Stream(msg) => write!(f, "audio stream failed: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::Config(err.to_string())
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::Stream(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::Stream(err.to_string())
    }
}

/// Where rendered audio goes.
///
/// `start` receives the processor exactly once, when the graph starts.
/// `resume` un-suspends output and must be safe to call redundantly and
/// before `start`.
pub trait AudioBackend {
    /// Output sample rate the processor should render at.
    fn sample_rate(&self) -> f32;

    /// Take ownership of the processor and begin (or arm) playback.
    fn start(&mut self, processor: GraphProcessor) -> Result<(), AudioError>;

    /// Ensure output is running. No-op when already running or not started.
    fn resume(&mut self) -> Result<(), AudioError>;
}

/// Realtime output through the default cpal device.
pub struct CpalBackend {
    device: cpal::Device,
    config: cpal::StreamConfig,
    stream: Option<cpal::Stream>,
}

impl CpalBackend {
    /// Open the host's default output device with its default config.
    pub fn try_default() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let config = device.default_output_config()?.config();
        tracing::info!(
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "opened default output device"
        );
        Ok(Self {
            device,
            config,
            stream: None,
        })
    }
}

impl AudioBackend for CpalBackend {
    fn sample_rate(&self) -> f32 {
        self.config.sample_rate.0 as f32
    }

    fn start(&mut self, mut processor: GraphProcessor) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render =
                        (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut mono[..frames_to_render];
                    processor.render_block(block);

                    // Copy mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| tracing::error!("audio stream error: {}", err),
            None,
        )?;

        self.stream = Some(stream);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = &self.stream {
            stream.play()?;
        }
        Ok(())
    }
}

/// Offline output: holds the processor and renders only when asked.
///
/// The handle returned by [`OfflineBackend::new`] stays valid after the
/// backend has been moved into a graph, so a test can pump blocks through
/// the very processor the graph built.
pub struct OfflineBackend {
    sample_rate: f32,
    slot: ProcessorSlot,
    resumed: bool,
}

/// Shared access to the processor once the graph has handed it over.
#[derive(Clone)]
pub struct ProcessorSlot(Arc<Mutex<Option<GraphProcessor>>>);

impl ProcessorSlot {
    /// Render one block through the held processor. Returns `false` when
    /// the graph has not started yet.
    pub fn render_block(&self, out: &mut [f32]) -> bool {
        let mut guard = self.0.lock().expect("processor slot poisoned");
        match guard.as_mut() {
            Some(processor) => {
                processor.render_block(out);
                true
            }
            None => false,
        }
    }

    /// Voices currently held by the processor, if started.
    pub fn voice_count(&self) -> Option<usize> {
        let guard = self.0.lock().expect("processor slot poisoned");
        guard.as_ref().map(|p| p.voice_count())
    }
}

impl OfflineBackend {
    pub fn new(sample_rate: f32) -> (Self, ProcessorSlot) {
        let slot = ProcessorSlot(Arc::new(Mutex::new(None)));
        (
            Self {
                sample_rate,
                slot: slot.clone(),
                resumed: false,
            },
            slot.clone(),
        )
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }
}

impl AudioBackend for OfflineBackend {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn start(&mut self, processor: GraphProcessor) -> Result<(), AudioError> {
        let mut guard = self.slot.0.lock().expect("processor slot poisoned");
        if guard.is_none() {
            *guard = Some(processor);
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.resumed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::command::GraphCommand;
    use rtrb::RingBuffer;

    #[test]
    fn offline_backend_renders_through_the_slot() {
        let (mut backend, slot) = OfflineBackend::new(48_000.0);
        let mut out = vec![0.0; 64];
        assert!(
            !slot.render_block(&mut out),
            "slot must refuse to render before the graph starts"
        );

        let (_tx, cmd_rx) = RingBuffer::<GraphCommand>::new(8);
        let (tap_tx, _tap_rx) = RingBuffer::<f32>::new(64);
        let processor = GraphProcessor::new(48_000.0, 1.0, cmd_rx, tap_tx);
        backend.start(processor).unwrap();

        assert!(slot.render_block(&mut out), "started slot must render");
        assert_eq!(slot.voice_count(), Some(0));
    }

    #[test]
    fn offline_resume_is_redundantly_safe() {
        let (mut backend, _slot) = OfflineBackend::new(48_000.0);
        assert!(!backend.is_resumed());
        backend.resume().unwrap();
        backend.resume().unwrap();
        assert!(backend.is_resumed());
    }
}
