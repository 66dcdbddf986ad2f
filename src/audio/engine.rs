use crossbeam_channel::Sender;

use crate::audio_api::{AudioCommand, PlayAck};

use super::frame::StereoFrame;
use super::sample_id::SampleId;
use super::voice::LoopVoice;

// Lives on the audio thread. Everything here must stay non-blocking.
pub struct Engine {
    voices: Vec<LoopVoice>, // one per registered sound; a few dozen at most
    ack_tx: Sender<PlayAck>,
}

impl Engine {
    pub fn new(ack_tx: Sender<PlayAck>) -> Self {
        Self {
            voices: Vec::new(),
            ack_tx,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                match self.voice_mut(id) {
                    Some(v) => *v = LoopVoice::new(id, buffer),
                    None => self.voices.push(LoopVoice::new(id, buffer)),
                }
            }
            AudioCommand::Play { id, generation } => {
                let ok = match self.voice_mut(id) {
                    Some(v) if !v.buffer.is_empty() => {
                        v.playing = true;
                        true
                    }
                    _ => false,
                };
                // a lost ack is caught by the start timeout on the control side
                let _ = self.ack_tx.try_send(PlayAck { id, generation, ok });
            }
            AudioCommand::Pause { id } => {
                if let Some(v) = self.voice_mut(id) {
                    v.playing = false;
                }
            }
            AudioCommand::Stop { id } => {
                if let Some(v) = self.voice_mut(id) {
                    v.stop();
                }
            }
            AudioCommand::StopAll => self.voices.iter_mut().for_each(LoopVoice::stop),
            AudioCommand::SetGain { id, gain } => {
                if let Some(v) = self.voice_mut(id) {
                    v.set_gain(gain);
                }
            }
        }
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        for v in &mut self.voices {
            v.render_into(out);
        }
    }

    pub fn voice(&self, id: SampleId) -> Option<&LoopVoice> {
        self.voices.iter().find(|v| v.id == id)
    }

    fn voice_mut(&mut self, id: SampleId) -> Option<&mut LoopVoice> {
        self.voices.iter_mut().find(|v| v.id == id)
    }
}
