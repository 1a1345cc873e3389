use thiserror::Error;

pub use crate::audio::{SampleBuffer, SampleId};

// One independently playable clip voice inside the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClipId(pub u32);

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (interrupts thread), so a decoded buffer is
    // registered first and clips are bound to it by id afterwards. The
    // command queue is FIFO, so a sample is always there before its clips.
    RegisterSample { id: SampleId, buffer: SampleBuffer },
    BindClip { clip: ClipId, sample: SampleId, volume: f32, looped: bool },

    Play { clip: ClipId },
    Pause { clip: ClipId },
    Seek { clip: ClipId, frame: usize },
    SetRate { clip: ClipId, rate: f32 },
    SetVolume { clip: ClipId, volume: f32 },

    // first user gesture; Play is refused until this arrives
    Unlock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    Locked,
    Unbound,
}

// what the engine reports back, asynchronously
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    PlayRejected { clip: ClipId, reason: RejectReason },
    Ended { clip: ClipId },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio command queue is full")]
    QueueFull,
    #[error("audio engine is gone")]
    Disconnected,
    #[error("clip lease is no longer current")]
    StaleLease,
    #[error("sound is already registered")]
    DuplicateSound,
    #[error("audio engine has no room left")]
    EngineFull,
}

pub trait AudioOutput {
    fn send(&mut self, cmd: AudioCommand) -> Result<(), AudioError>;
    fn poll_event(&mut self) -> Option<AudioEvent>;
}

impl<T: AudioOutput + ?Sized> AudioOutput for Box<T> {
    fn send(&mut self, cmd: AudioCommand) -> Result<(), AudioError> {
        (**self).send(cmd)
    }

    fn poll_event(&mut self) -> Option<AudioEvent> {
        (**self).poll_event()
    }
}

// Used when there is no usable output device: everything is accepted and
// dropped, so the board keeps working without sound.
#[derive(Debug, Default)]
pub struct MutedOutput;

impl AudioOutput for MutedOutput {
    fn send(&mut self, cmd: AudioCommand) -> Result<(), AudioError> {
        log::trace!("muted output dropping {:?}", CommandName(&cmd));
        Ok(())
    }

    fn poll_event(&mut self) -> Option<AudioEvent> {
        None
    }
}

// Debug for commands without dumping whole sample buffers into the log
pub struct CommandName<'a>(pub &'a AudioCommand);

impl std::fmt::Debug for CommandName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            AudioCommand::RegisterSample { id, buffer } => {
                write!(f, "RegisterSample({:?}, {} frames)", id, buffer.data.len())
            }
            other => write!(f, "{:?}", other),
        }
    }
}
