pub use crate::audio::{SampleBuffer, SampleId};

// The audio thread can't decode files (it would stall the callback), so the
// control side decodes first and registers the finished buffer, then drives
// playback by sample id.
#[derive(Clone, Debug)]
pub enum AudioCommand {
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // `generation` is echoed back in the PlayAck so stale answers can be dropped
    Play { id: SampleId, generation: u64 },
    Pause { id: SampleId },
    Stop { id: SampleId }, // pause + rewind
    StopAll,
    SetGain { id: SampleId, gain: f32 },
}

// Answer to a Play; starting is the one command whose outcome the control
// side has to wait for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayAck {
    pub id: SampleId,
    pub generation: u64,
    pub ok: bool,
}

// Where the playback engine sends its commands: the cpal stream in the app,
// an offline engine in tests or when no output device exists. `send` is false
// when the command never reached the audio side.
pub trait CommandSink {
    fn send(&self, cmd: AudioCommand) -> bool;
    fn poll_ack(&self) -> Option<PlayAck>;
    fn sample_rate(&self) -> u32;
}

impl<T: CommandSink + ?Sized> CommandSink for std::rc::Rc<T> {
    fn send(&self, cmd: AudioCommand) -> bool {
        (**self).send(cmd)
    }

    fn poll_ack(&self) -> Option<PlayAck> {
        (**self).poll_ack()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }
}
