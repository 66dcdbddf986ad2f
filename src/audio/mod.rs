use std::cell::{Cell, RefCell};
use std::time::Duration;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, warn};

use crate::audio_api::{AudioCommand, CommandSink, PlayAck};

mod engine;
mod frame;
mod sample_buffer;
mod sample_id;
mod voice;

pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;
pub use sample_id::{SampleId, SampleIds};

use engine::Engine;

const COMMAND_QUEUE: usize = 1024;
const SEND_TIMEOUT: Duration = Duration::from_millis(20); // a few callback periods
pub const FALLBACK_SAMPLE_RATE: u32 = 44100;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    ack_rx: Receiver<PlayAck>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
}

impl CommandSink for AudioHandle {
    fn send(&self, cmd: AudioCommand) -> bool {
        match self.tx.send_timeout(cmd, SEND_TIMEOUT) {
            Ok(()) => true,
            Err(e) => {
                warn!("audio command dropped: {e}");
                false
            }
        }
    }

    fn poll_ack(&self) -> Option<PlayAck> {
        self.ack_rx.try_recv().ok()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_QUEUE);
    let (ack_tx, ack_rx) = crossbeam_channel::bounded::<PlayAck>(COMMAND_QUEUE);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(&device, &config.into(), rx, ack_tx, channels)?;
            output_stream.play().context("failed to play output stream")?;
            info!(sample_rate, channels, "audio output started");

            Ok(AudioHandle {
                tx,
                ack_rx,
                sample_rate,
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    ack_tx: Sender<PlayAck>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(ack_tx);
    let mut scratch: Vec<StereoFrame> = Vec::new();

    let err_fn = |err| error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            if scratch.len() < n_frames {
                scratch.resize(n_frames, StereoFrame::zero()); // only grows on the first callbacks
            }
            let frames = &mut scratch[..n_frames];
            engine.render_block(frames);

            for (out, f) in data.chunks_exact_mut(channels.max(1)).zip(frames.iter()) {
                match out {
                    [m] => *m = f.mono(),
                    [l, r, rest @ ..] => {
                        *l = f.left;
                        *r = f.right;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// How an offline sink misbehaves, to exercise the failure paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OfflineFault {
    #[default]
    None,
    RefusePlay, // Play answered with ok: false, like a device that went away
    NoAnswer,   // Play accepted but never answered, like a stalled callback
    QueueFull,  // every command rejected
}

// Runs the same engine synchronously on the calling thread, with no device.
// Commands take effect immediately; acks queue up until polled. Used when no
// output device is available and by the tests.
pub struct OfflineAudio {
    engine: RefCell<Engine>,
    ack_tx: Sender<PlayAck>,
    ack_rx: Receiver<PlayAck>,
    sample_rate: u32,
    fault: Cell<OfflineFault>,
}

impl OfflineAudio {
    pub fn new(sample_rate: u32) -> Self {
        let (ack_tx, ack_rx) = crossbeam_channel::unbounded();
        Self {
            engine: RefCell::new(Engine::new(ack_tx.clone())),
            ack_tx,
            ack_rx,
            sample_rate,
            fault: Cell::new(OfflineFault::None),
        }
    }

    pub fn set_fault(&self, fault: OfflineFault) {
        self.fault.set(fault);
    }

    pub fn render(&self, out: &mut [StereoFrame]) {
        self.engine.borrow_mut().render_block(out);
    }

    pub fn is_voice_playing(&self, id: SampleId) -> bool {
        self.engine.borrow().voice(id).is_some_and(|v| v.playing)
    }

    pub fn voice_gain(&self, id: SampleId) -> Option<f32> {
        self.engine.borrow().voice(id).map(|v| v.gain())
    }
}

impl Default for OfflineAudio {
    fn default() -> Self {
        Self::new(FALLBACK_SAMPLE_RATE)
    }
}

impl CommandSink for OfflineAudio {
    fn send(&self, cmd: AudioCommand) -> bool {
        match (self.fault.get(), &cmd) {
            (OfflineFault::QueueFull, _) => return false,
            (OfflineFault::RefusePlay, &AudioCommand::Play { id, generation }) => {
                let _ = self.ack_tx.send(PlayAck { id, generation, ok: false });
                return true;
            }
            (OfflineFault::NoAnswer, AudioCommand::Play { .. }) => return true,
            _ => {}
        }
        self.engine.borrow_mut().handle_cmd(cmd);
        true
    }

    fn poll_ack(&self) -> Option<PlayAck> {
        self.ack_rx.try_recv().ok()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
