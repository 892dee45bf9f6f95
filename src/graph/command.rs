use rtrb::Producer;

use crate::notes::NoteId;
use crate::params::WaveShape;

/// Control-thread instructions applied by the processor between blocks.
///
/// One `SpawnVoice` per unison component: a four-voice unison note-on is
/// four commands, each carrying its own detune offset and gain share.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GraphCommand {
    SpawnVoice {
        note: NoteId,
        shape: WaveShape,
        frequency: f32,
        detune_cents: f32,
        gain: f32,
    },
    /// Fade out and retire every sounding voice of `note`.
    ReleaseNote { note: NoteId },
    /// Immediate master gain change, no ramp.
    SetMasterGain { gain: f32 },
}

/// Where the voice manager pushes commands.
///
/// Production code sends into an `rtrb` ring drained by the audio thread;
/// tests collect into a `Vec` and assert on what was sent.
pub trait CommandSink {
    /// Push a command. Returns `false` if the sink refused it (ring full).
    fn send(&mut self, cmd: GraphCommand) -> bool;
}

impl CommandSink for Producer<GraphCommand> {
    fn send(&mut self, cmd: GraphCommand) -> bool {
        self.push(cmd).is_ok()
    }
}

impl CommandSink for Vec<GraphCommand> {
    fn send(&mut self, cmd: GraphCommand) -> bool {
        self.push(cmd);
        true
    }
}
