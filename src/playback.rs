// One looping handle per sound id. Starting is the only command with a delayed
// outcome: `play` marks the handle Starting and the answer arrives through
// `poll_acks`. Pause/stop bump the generation so older answers are ignored.
// A handle only changes state once its command has been queued.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::{SampleId, SampleIds};
use crate::audio_api::{AudioCommand, CommandSink};
use crate::loader::sample_loader;
use crate::volume;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    Paused,
    Starting { generation: u64, since: Instant },
    Playing,
}

#[derive(Debug)]
struct Handle {
    sample: SampleId,
    source: PathBuf,
    state: HandleState,
    volume: u8, // as last set on this handle, independent of mixer bookkeeping
    generation: u64,
}

impl Handle {
    fn is_active(&self) -> bool {
        !matches!(self.state, HandleState::Paused)
    }
}

/// Outcome of a play request once the audio side has answered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaySettled {
    pub id: String,
    pub ok: bool,
}

// An unanswered start counts as failed after this long.
pub const START_TIMEOUT: Duration = Duration::from_secs(2);

pub struct PlaybackEngine {
    sink: Box<dyn CommandSink>,
    handles: BTreeMap<String, Handle>,
    ids: SampleIds,
    is_playing: bool, // convenience cache, see refresh_playing
}

impl PlaybackEngine {
    pub fn new(sink: Box<dyn CommandSink>) -> Self {
        Self {
            sink,
            handles: BTreeMap::new(),
            ids: SampleIds::default(),
            is_playing: false,
        }
    }

    /// Decode `source` and register a looping handle for `id`. Does not start it.
    /// A sound that fails to load is logged and stays unknown to the engine.
    pub fn load(&mut self, id: &str, source: &Path) -> bool {
        let buffer = match sample_loader::load(source, self.sink.sample_rate()) {
            Ok(b) => b,
            Err(e) => {
                warn!(sound = id, "failed to load {}: {e:#}", source.display());
                return false;
            }
        };

        let sample = match self.handles.get(id) {
            Some(h) => h.sample, // reload keeps the audio-thread slot
            None => self.ids.next_id(),
        };
        if !self.sink.send(AudioCommand::RegisterSample { id: sample, buffer }) {
            warn!(sound = id, "audio output not accepting samples");
            return false;
        }
        self.handles.insert(
            id.to_string(),
            Handle {
                sample,
                source: source.to_path_buf(),
                state: HandleState::Paused,
                volume: 0,
                generation: 0,
            },
        );
        info!(sound = id, "loaded {}", source.display());
        true
    }

    /// Request playback from the current position. Returns false if `id` is
    /// unknown or the request could not be queued; otherwise the result
    /// arrives through `poll_acks`.
    pub fn play(&mut self, id: &str) -> bool {
        let Some(h) = self.handles.get_mut(id) else {
            warn!(sound = id, "play: sound not found");
            return false;
        };
        if h.is_active() {
            return true;
        }
        let generation = h.generation + 1;
        if !self.sink.send(AudioCommand::Play { id: h.sample, generation }) {
            warn!(sound = id, "play request not delivered");
            return false;
        }
        h.generation = generation;
        h.state = HandleState::Starting { generation, since: Instant::now() };
        debug!(sound = id, generation, "play requested");
        true
    }

    /// False if `id` is unknown or the handle is still active afterwards.
    pub fn pause(&mut self, id: &str) -> bool {
        let Some(h) = self.handles.get_mut(id) else {
            return false;
        };
        if !h.is_active() {
            return true;
        }
        if !self.sink.send(AudioCommand::Pause { id: h.sample }) {
            warn!(sound = id, "pause not delivered");
            return false;
        }
        h.generation += 1;
        h.state = HandleState::Paused;
        debug!(sound = id, "paused");
        true
    }

    /// Pause and rewind to the start.
    pub fn stop(&mut self, id: &str) -> bool {
        let Some(h) = self.handles.get_mut(id) else {
            return false;
        };
        if !self.sink.send(AudioCommand::Stop { id: h.sample }) {
            warn!(sound = id, "stop not delivered");
            return false;
        }
        h.generation += 1;
        h.state = HandleState::Paused;
        true
    }

    pub fn stop_all(&mut self) -> bool {
        if !self.sink.send(AudioCommand::StopAll) {
            warn!("stop all not delivered");
            return false;
        }
        for h in self.handles.values_mut() {
            h.generation += 1;
            h.state = HandleState::Paused;
        }
        self.is_playing = false;
        true
    }

    /// True if every handle was started.
    pub fn play_all(&mut self) -> bool {
        let ids: Vec<String> = self.handles.keys().cloned().collect();
        let mut all = true;
        for id in &ids {
            all &= self.play(id);
        }
        self.refresh_playing();
        all
    }

    /// True if every handle was paused.
    pub fn pause_all(&mut self) -> bool {
        let ids: Vec<String> = self.handles.keys().cloned().collect();
        let mut all = true;
        for id in &ids {
            all &= self.pause(id);
        }
        self.refresh_playing();
        all
    }

    /// Set the handle's gain to `volume / 100`.
    pub fn set_volume(&mut self, id: &str, volume: u8) -> bool {
        let Some(h) = self.handles.get_mut(id) else {
            warn!(sound = id, "set_volume: sound not found");
            return false;
        };
        let volume = volume.min(crate::shared::MAX_VOLUME);
        if !self.sink.send(AudioCommand::SetGain { id: h.sample, gain: volume::to_gain(volume) }) {
            warn!(sound = id, "volume change not delivered");
            return false;
        }
        h.volume = volume;
        true
    }

    /// Settle pending play requests. Answers to superseded requests are
    /// dropped; a start still unanswered after `START_TIMEOUT` fails.
    pub fn poll_acks(&mut self, now: Instant) -> Vec<PlaySettled> {
        let mut settled = Vec::new();
        while let Some(ack) = self.sink.poll_ack() {
            let Some((id, h)) = self.handles.iter_mut().find(|(_, h)| h.sample == ack.id) else {
                continue;
            };
            match h.state {
                HandleState::Starting { generation, .. } if generation == ack.generation => {
                    if ack.ok {
                        h.state = HandleState::Playing;
                        debug!(sound = %id, "playing");
                    } else {
                        h.state = HandleState::Paused;
                        warn!(sound = %id, "audio output refused to start {}", h.source.display());
                    }
                    settled.push(PlaySettled { id: id.clone(), ok: ack.ok });
                }
                _ => debug!(sound = %id, generation = ack.generation, "stale play answer dropped"),
            }
        }

        for (id, h) in &mut self.handles {
            if let HandleState::Starting { since, .. } = h.state {
                if now.saturating_duration_since(since) >= START_TIMEOUT {
                    h.generation += 1; // a late answer is now stale
                    h.state = HandleState::Paused;
                    warn!(sound = %id, "no answer to play request, giving up");
                    settled.push(PlaySettled { id: id.clone(), ok: false });
                }
            }
        }
        settled
    }

    /// Recompute the overall playing flag from the handles.
    pub fn refresh_playing(&mut self) -> bool {
        self.is_playing = self.handles.values().any(Handle::is_active);
        self.is_playing
    }

    pub fn any_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.handles.contains_key(id)
    }

    /// Playing, as confirmed by the audio side.
    pub fn is_playing(&self, id: &str) -> bool {
        self.state(id) == Some(HandleState::Playing)
    }

    /// Playing or about to be.
    pub fn is_active(&self, id: &str) -> bool {
        self.handles.get(id).is_some_and(Handle::is_active)
    }

    pub fn state(&self, id: &str) -> Option<HandleState> {
        self.handles.get(id).map(|h| h.state)
    }

    pub fn volume(&self, id: &str) -> Option<u8> {
        self.handles.get(id).map(|h| h.volume)
    }

    pub fn sample_id(&self, id: &str) -> Option<SampleId> {
        self.handles.get(id).map(|h| h.sample)
    }
}
