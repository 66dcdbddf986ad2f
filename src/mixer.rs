// `volumes` is authoritative; engine handles only mirror it. An active handle
// always carries effective(volume, master) as its gain. Paused handles keep
// their last gain until started again.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::countdown::{self, Countdown, CountdownEvent};
use crate::error::{MixerError, Result};
use crate::playback::PlaybackEngine;
use crate::presets::{Preset, PresetStore, SoundVolumes};
use crate::shared::{
    DisplayState, InputEvent, PresetRow, SoundRow, DEFAULT_MASTER_VOLUME, DEFAULT_SOUND_VOLUME,
    MAX_VOLUME,
};
use crate::volume;

#[derive(Clone, Debug)]
struct SoundEntry {
    id: String,
    name: String,
}

pub struct MixerController {
    engine: PlaybackEngine,
    presets: PresetStore,
    countdown: Countdown,
    sounds: Vec<SoundEntry>, // loaded sounds, catalog order
    volumes: SoundVolumes,
    master: u8,
    timer_minutes: u32,
    countdown_text: Option<String>, // refreshed on every countdown tick
    notice: Option<String>,
    stop_pending: bool, // timer ran out but the stop never reached the audio side
}

impl MixerController {
    pub fn new(engine: PlaybackEngine, presets: PresetStore) -> Self {
        Self {
            engine,
            presets,
            countdown: Countdown::new(),
            sounds: Vec::new(),
            volumes: SoundVolumes::new(),
            master: DEFAULT_MASTER_VOLUME,
            timer_minutes: 0,
            countdown_text: None,
            notice: None,
            stop_pending: false,
        }
    }

    // sounds that fail to load are left out; returns how many loaded
    pub fn load_catalog(&mut self, catalog: &Catalog) -> usize {
        let mut failed = Vec::new();
        for sound in &catalog.sounds {
            if self.engine.load(&sound.id, &catalog.source_path(sound)) {
                if !self.volumes.contains_key(&sound.id) {
                    self.sounds.push(SoundEntry { id: sound.id.clone(), name: sound.name.clone() });
                }
                self.volumes.insert(sound.id.clone(), 0);
            } else {
                failed.push(sound.name.as_str());
            }
        }
        self.presets.set_defaults(catalog.presets.clone());
        if !failed.is_empty() {
            self.notice = Some(format!("could not load: {}", failed.join(", ")));
        }
        self.sounds.len()
    }

    pub fn toggle_sound(&mut self, id: &str) -> Result<bool> {
        let volume = self.known(id)?;
        let on = if self.is_on(id) {
            if !self.engine.pause(id) {
                return Err(MixerError::PlaybackFailure(format!("{id} could not be paused")));
            }
            self.volumes.insert(id.to_string(), 0);
            false
        } else {
            let volume = if volume == 0 { DEFAULT_SOUND_VOLUME } else { volume };
            let previous = self.engine.volume(id);
            if !self.engine.set_volume(id, volume::effective(volume, self.master)) || !self.engine.play(id) {
                if let Some(previous) = previous {
                    self.engine.set_volume(id, previous);
                }
                return Err(MixerError::PlaybackFailure(format!("{id} could not be started")));
            }
            self.volumes.insert(id.to_string(), volume);
            true
        };
        self.engine.refresh_playing();
        debug!(sound = id, on, "toggled");
        Ok(on)
    }

    /// Set a sound's individual volume. Zero silences the sound but does not
    /// pause it; playing and volume are separate controls.
    pub fn set_sound_volume(&mut self, id: &str, volume: u8) -> Result<()> {
        self.known(id)?;
        check_range(volume)?;
        if !self.engine.set_volume(id, volume::effective(volume, self.master)) {
            return Err(MixerError::PlaybackFailure(format!("volume of {id} not applied")));
        }
        self.volumes.insert(id.to_string(), volume);
        Ok(())
    }

    // all active handles take the new master or none do
    pub fn set_master_volume(&mut self, volume: u8) -> Result<()> {
        check_range(volume)?;
        let mut applied = Vec::new();
        for (id, individual) in &self.volumes {
            if !self.engine.is_active(id) {
                continue;
            }
            let previous = self.engine.volume(id).unwrap_or(0);
            if !self.engine.set_volume(id, volume::effective(*individual, volume)) {
                for (id, previous) in applied {
                    self.engine.set_volume(id, previous);
                }
                return Err(MixerError::PlaybackFailure("master volume not applied".into()));
            }
            applied.push((id.as_str(), previous));
        }
        self.master = volume;
        Ok(())
    }

    /// Pause everything if anything plays; otherwise start every sound,
    /// bumping silent ones to the default volume. Returns the new overall state.
    pub fn toggle_all(&mut self) -> bool {
        if self.engine.any_playing() {
            if !self.engine.pause_all() {
                self.notice = Some("some sounds could not be paused".into());
            }
            info!("all sounds paused");
        } else {
            let mut all = true;
            for (id, individual) in self.volumes.iter_mut() {
                let level = if *individual == 0 { DEFAULT_SOUND_VOLUME } else { *individual };
                if self.engine.set_volume(id, volume::effective(level, self.master)) {
                    *individual = level;
                } else {
                    all = false;
                }
            }
            if !self.engine.play_all() || !all {
                self.notice = Some("some sounds could not be started".into());
            }
            info!("all sounds started");
        }
        self.engine.any_playing()
    }

    /// Everything stopped, every volume at 0, master back to its default.
    /// Nothing changes if the audio side can't be reached.
    pub fn reset_all(&mut self) {
        if !self.engine.stop_all() {
            self.notice = Some("audio output not responding, nothing reset".into());
            return;
        }
        self.volumes.values_mut().for_each(|v| *v = 0);
        self.master = DEFAULT_MASTER_VOLUME;
        info!("mixer reset");
    }

    /// Replace the current mix with `preset`, starting from silence. Sounds the
    /// preset names but the mixer doesn't know, or that fail to start, are
    /// skipped. Zero entries leave the sound off.
    pub fn apply_preset(&mut self, preset: &Preset) {
        if !self.engine.stop_all() {
            self.notice = Some(format!("audio output not responding, \"{}\" not applied", preset.name));
            return;
        }
        self.volumes.values_mut().for_each(|v| *v = 0);

        let mut skipped = Vec::new();
        let mut failed = Vec::new();
        for (id, &level) in &preset.sounds {
            if !self.volumes.contains_key(id) {
                skipped.push(id.as_str());
                continue;
            }
            let level = level.min(MAX_VOLUME);
            if level == 0 {
                continue;
            }
            if self.engine.set_volume(id, volume::effective(level, self.master)) && self.engine.play(id) {
                self.volumes.insert(id.clone(), level);
            } else {
                failed.push(id.as_str());
            }
        }
        self.engine.refresh_playing();

        if !skipped.is_empty() {
            warn!(preset = %preset.id, "unknown sounds skipped: {}", skipped.join(", "));
            self.notice = Some(format!("\"{}\": {} not available", preset.name, skipped.join(", ")));
        }
        if !failed.is_empty() {
            self.notice = Some(format!("\"{}\": {} could not be started", preset.name, failed.join(", ")));
        }
        info!(preset = %preset.id, "applied preset \"{}\"", preset.name);
    }

    pub fn apply_preset_by_id(&mut self, id: &str) -> Result<()> {
        let preset = self
            .presets
            .get_preset(id)
            .cloned()
            .ok_or_else(|| MixerError::NotFound(format!("preset {id}")))?;
        self.apply_preset(&preset);
        Ok(())
    }

    pub fn extract_current_state(&self) -> SoundVolumes {
        self.volumes
            .iter()
            .filter(|(_, v)| **v > 0)
            .map(|(id, v)| (id.clone(), *v))
            .collect()
    }

    pub fn save_preset(&mut self, name: &str) -> Result<String> {
        let snapshot = self.extract_current_state();
        if snapshot.is_empty() {
            return Err(MixerError::InvalidInput("no sounds are up, nothing to save".into()));
        }
        self.presets.save(name, snapshot)
    }

    pub fn delete_preset(&mut self, id: &str) -> Result<bool> {
        if !self.presets.is_custom(id) && self.presets.get_preset(id).is_some() {
            return Err(MixerError::InvalidInput("built-in presets can't be deleted".into()));
        }
        self.presets.delete(id)
    }

    // 0 turns the timer off
    pub fn set_timer(&mut self, minutes: u32, now: Instant) {
        self.timer_minutes = minutes;
        if minutes == 0 {
            self.countdown.stop();
            self.countdown_text = None;
            return;
        }
        match self.countdown.start(minutes, now) {
            Ok(ev) => self.on_countdown(ev),
            Err(e) => self.notice = Some(e.to_string()),
        }
        info!(minutes, "sleep timer set");
    }

    /// Everything stops when the sleep timer runs out. If the audio side can't
    /// be reached the stop is retried on every poll until it lands.
    pub fn handle_timer_expiry(&mut self) {
        self.stop_pending = !self.engine.stop_all();
        if self.stop_pending {
            self.notice = Some("audio output not responding, retrying stop".into());
        }
        self.countdown.stop();
        self.timer_minutes = 0;
        self.countdown_text = None;
        info!("sleep timer finished, all sounds stopped");
    }

    // once per frame
    pub fn poll(&mut self, now: Instant) {
        if self.stop_pending && self.engine.stop_all() {
            self.stop_pending = false;
            info!("delayed stop delivered");
        }
        let settled = self.engine.poll_acks(now);
        if !settled.is_empty() {
            for s in settled.iter().filter(|s| !s.ok) {
                let name = self.name_of(&s.id).to_string();
                self.notice = Some(format!("could not start {name}"));
            }
            self.engine.refresh_playing();
        }

        for ev in self.countdown.poll(now) {
            self.on_countdown(ev);
        }
    }

    fn on_countdown(&mut self, ev: CountdownEvent) {
        match ev {
            CountdownEvent::Tick(left) => self.countdown_text = Some(countdown::format_remaining(left)),
            CountdownEvent::Completed => self.handle_timer_expiry(),
        }
    }

    /// Apply one command from the view. Failures become the current notice.
    /// Returns false when the user asked to quit.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> bool {
        self.notice = None;
        let result = match event {
            InputEvent::Quit => return false,
            InputEvent::ToggleSound(id) => self.toggle_sound(&id).map(drop),
            InputEvent::SetSoundVolume(id, v) => self.set_sound_volume(&id, v),
            InputEvent::SetMasterVolume(v) => self.set_master_volume(v),
            InputEvent::ToggleAll => {
                self.toggle_all();
                Ok(())
            }
            InputEvent::ResetAll => {
                self.reset_all();
                Ok(())
            }
            InputEvent::SetTimer(minutes) => {
                self.set_timer(minutes, now);
                Ok(())
            }
            InputEvent::ApplyPreset(id) => self.apply_preset_by_id(&id),
            InputEvent::SavePreset(name) => self
                .save_preset(&name)
                .map(|_| self.notice = Some(format!("saved \"{}\"", name.trim()))),
            InputEvent::DeletePreset(id) => self.delete_preset(&id).and_then(|existed| {
                if existed {
                    Ok(())
                } else {
                    Err(MixerError::NotFound(format!("preset {id}")))
                }
            }),
        };
        if let Err(e) = result {
            warn!("{e}");
            self.notice = Some(e.to_string());
        }
        true
    }

    pub fn display_state(&self) -> DisplayState {
        let sounds = self
            .sounds
            .iter()
            .map(|s| {
                let volume = self.volume(&s.id).unwrap_or(0);
                SoundRow {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    volume,
                    effective_volume: volume::effective(volume, self.master),
                    playing: self.engine.is_active(&s.id), // same rule as the overall flag
                }
            })
            .collect();

        let presets = self
            .presets
            .defaults()
            .iter()
            .map(|p| (p, false))
            .chain(self.presets.get_all_custom().iter().map(|p| (p, true)))
            .map(|(p, custom)| PresetRow { id: p.id.clone(), name: p.name.clone(), custom })
            .collect();

        DisplayState {
            sounds,
            master_volume: self.master,
            any_playing: self.engine.any_playing(),
            timer_minutes: self.timer_minutes,
            countdown: self.countdown_text.clone(),
            presets,
            notice: self.notice.clone(),
        }
    }

    /// On: volume above zero and the handle playing or starting. A master of
    /// zero doesn't change this.
    pub fn is_on(&self, id: &str) -> bool {
        self.volume(id).is_some_and(|v| v > 0) && self.engine.is_active(id)
    }

    pub fn volume(&self, id: &str) -> Option<u8> {
        self.volumes.get(id).copied()
    }

    pub fn effective_volume(&self, id: &str) -> Option<u8> {
        self.volume(id).map(|v| volume::effective(v, self.master))
    }

    pub fn master_volume(&self) -> u8 {
        self.master
    }

    pub fn any_playing(&self) -> bool {
        self.engine.any_playing()
    }

    pub fn timer_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn known(&self, id: &str) -> Result<u8> {
        self.volume(id)
            .ok_or_else(|| MixerError::NotFound(format!("sound {id}")))
    }

    fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.sounds
            .iter()
            .find(|s| s.id == id)
            .map_or(id, |s| s.name.as_str())
    }
}

fn check_range(volume: u8) -> Result<()> {
    if volume > MAX_VOLUME {
        return Err(MixerError::InvalidInput(format!("volume {volume} is outside 0-{MAX_VOLUME}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{OfflineAudio, OfflineFault};
    use crate::playback::tests::write_tone;
    use crate::playback::HandleState;
    use std::rc::Rc;
    use std::time::Duration;

    struct Rig {
        mixer: MixerController,
        audio: Rc<OfflineAudio>,
        _dir: tempfile::TempDir,
    }

    fn rig(names: &[&str]) -> Rig {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            write_tone(dir.path(), name);
        }
        let audio = Rc::new(OfflineAudio::default());
        let engine = PlaybackEngine::new(Box::new(audio.clone()));
        let presets = PresetStore::open(&dir.path().join("data"));
        let mut mixer = MixerController::new(engine, presets);
        let catalog = Catalog::from_wav_files(dir.path()).unwrap();
        assert_eq!(mixer.load_catalog(&catalog), names.len());
        Rig { mixer, audio, _dir: dir }
    }

    fn settle(m: &mut MixerController) {
        m.poll(Instant::now());
    }

    fn preset(pairs: &[(&str, u8)]) -> Preset {
        Preset {
            id: "p".into(),
            name: "P".into(),
            sounds: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn toggle_on_defaults_silent_sound_to_fifty() {
        let mut r = rig(&["rain"]);
        assert!(r.mixer.toggle_sound("rain").unwrap());
        assert_eq!(r.mixer.volume("rain"), Some(50));
        assert_eq!(r.mixer.engine().volume("rain"), Some(25)); // master 50
        settle(&mut r.mixer);
        assert!(r.mixer.engine().is_playing("rain"));
        assert!(r.mixer.any_playing());
    }

    #[test]
    fn toggle_keeps_a_volume_set_while_paused() {
        let mut r = rig(&["rain"]);
        r.mixer.set_sound_volume("rain", 70).unwrap();
        assert!(!r.mixer.is_on("rain"));

        assert!(r.mixer.toggle_sound("rain").unwrap());
        assert_eq!(r.mixer.volume("rain"), Some(70));

        assert!(!r.mixer.toggle_sound("rain").unwrap());
        assert_eq!(r.mixer.volume("rain"), Some(0));
        assert_eq!(r.mixer.engine().state("rain"), Some(HandleState::Paused));
        assert!(!r.mixer.any_playing());
    }

    #[test]
    fn unknown_sound_is_not_found_and_changes_nothing() {
        let mut r = rig(&["rain"]);
        let before = r.mixer.display_state();
        assert!(matches!(r.mixer.toggle_sound("lava"), Err(MixerError::NotFound(_))));
        assert!(matches!(r.mixer.set_sound_volume("lava", 10), Err(MixerError::NotFound(_))));
        assert_eq!(r.mixer.display_state(), before);
    }

    #[test]
    fn master_change_touches_only_active_handles() {
        let mut r = rig(&["rain", "wind", "fire"]);
        r.mixer.set_master_volume(100).unwrap();
        r.mixer.set_sound_volume("rain", 80).unwrap();
        r.mixer.set_sound_volume("wind", 40).unwrap();
        r.mixer.set_sound_volume("fire", 60).unwrap();
        r.mixer.toggle_sound("rain").unwrap();
        r.mixer.toggle_sound("wind").unwrap();
        settle(&mut r.mixer);

        r.mixer.set_master_volume(50).unwrap();
        assert_eq!(r.mixer.engine().volume("rain"), Some(40));
        assert_eq!(r.mixer.engine().volume("wind"), Some(20));
        assert_eq!(r.mixer.engine().volume("fire"), Some(60)); // paused, untouched

        r.mixer.toggle_sound("fire").unwrap();
        assert_eq!(r.mixer.engine().volume("fire"), Some(30));
    }

    #[test]
    fn zero_master_is_silent_but_still_on() {
        let mut r = rig(&["rain"]);
        r.mixer.set_master_volume(0).unwrap();
        r.mixer.toggle_sound("rain").unwrap();
        settle(&mut r.mixer);

        assert!(r.mixer.is_on("rain"));
        assert_eq!(r.mixer.effective_volume("rain"), Some(0));
        assert_eq!(r.mixer.engine().volume("rain"), Some(0));
    }

    #[test]
    fn volume_zero_does_not_pause() {
        let mut r = rig(&["rain"]);
        r.mixer.toggle_sound("rain").unwrap();
        settle(&mut r.mixer);
        r.mixer.set_sound_volume("rain", 0).unwrap();

        assert!(r.mixer.engine().is_playing("rain"));
        assert_eq!(r.mixer.engine().volume("rain"), Some(0));
        assert!(matches!(r.mixer.set_sound_volume("rain", 101), Err(MixerError::InvalidInput(_))));
        assert!(matches!(r.mixer.set_master_volume(101), Err(MixerError::InvalidInput(_))));
    }

    #[test]
    fn toggle_all_starts_everything_then_pauses_keeping_volumes() {
        let mut r = rig(&["rain", "wind"]);
        r.mixer.set_sound_volume("wind", 90).unwrap();

        assert!(r.mixer.toggle_all());
        settle(&mut r.mixer);
        assert_eq!(r.mixer.volume("rain"), Some(50));
        assert_eq!(r.mixer.volume("wind"), Some(90));
        assert!(r.mixer.engine().is_playing("rain") && r.mixer.engine().is_playing("wind"));

        assert!(!r.mixer.toggle_all());
        assert_eq!(r.mixer.volume("wind"), Some(90));
        assert!(!r.mixer.engine().is_active("rain"));
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut r = rig(&["rain", "wind"]);
        r.mixer.set_master_volume(90).unwrap();
        r.mixer.toggle_all();
        settle(&mut r.mixer);

        r.mixer.reset_all();
        assert_eq!(r.mixer.volume("rain"), Some(0));
        assert_eq!(r.mixer.volume("wind"), Some(0));
        assert_eq!(r.mixer.master_volume(), 50);
        assert!(!r.mixer.any_playing());
        assert!(!r.audio.is_voice_playing(r.mixer.engine().sample_id("rain").unwrap()));
    }

    #[test]
    fn preset_replaces_rather_than_adds() {
        let mut r = rig(&["rain", "wind", "fire"]);
        r.mixer.toggle_sound("wind").unwrap();
        settle(&mut r.mixer);

        r.mixer.apply_preset(&preset(&[("rain", 60), ("fire", 20)]));
        settle(&mut r.mixer);

        assert_eq!(r.mixer.extract_current_state(), preset(&[("rain", 60), ("fire", 20)]).sounds);
        assert!(!r.mixer.engine().is_active("wind"));
        assert!(r.mixer.engine().is_playing("rain"));
        assert_eq!(r.mixer.engine().volume("fire"), Some(10));
    }

    #[test]
    fn preset_with_unknown_sound_applies_the_rest() {
        let mut r = rig(&["rain"]);
        r.mixer.apply_preset(&preset(&[("rain", 30), ("lava", 90)]));
        assert_eq!(r.mixer.volume("rain"), Some(30));
        assert!(r.mixer.notice().unwrap().contains("lava"));
        assert!(matches!(r.mixer.apply_preset_by_id("nope"), Err(MixerError::NotFound(_))));
    }

    #[test]
    fn saved_preset_round_trips_through_the_store() {
        let mut r = rig(&["rain", "wind"]);
        assert!(matches!(r.mixer.save_preset("Empty"), Err(MixerError::InvalidInput(_))));

        r.mixer.set_sound_volume("rain", 35).unwrap();
        let id = r.mixer.save_preset("Drizzle").unwrap();
        r.mixer.reset_all();

        r.mixer.apply_preset_by_id(&id).unwrap();
        assert_eq!(r.mixer.volume("rain"), Some(35));
        assert!(r.mixer.delete_preset(&id).unwrap());
        assert!(matches!(r.mixer.apply_preset_by_id(&id), Err(MixerError::NotFound(_))));
    }

    #[test]
    fn timer_expiry_stops_everything() {
        let mut r = rig(&["rain", "wind"]);
        let t0 = Instant::now();
        r.mixer.toggle_all();
        r.mixer.set_timer(1, t0);
        assert_eq!(r.mixer.display_state().countdown.as_deref(), Some("1:00"));

        r.mixer.poll(t0 + Duration::from_secs(30));
        assert_eq!(r.mixer.display_state().countdown.as_deref(), Some("0:30"));
        assert!(r.mixer.any_playing());

        r.mixer.poll(t0 + Duration::from_secs(60));
        assert!(!r.mixer.any_playing());
        assert!(!r.mixer.is_on("rain"));
        assert!(!r.mixer.timer_running());
        let ds = r.mixer.display_state();
        assert_eq!(ds.timer_minutes, 0);
        assert_eq!(ds.countdown, None);
    }

    #[test]
    fn timer_off_cancels_countdown() {
        let mut r = rig(&["rain"]);
        let t0 = Instant::now();
        r.mixer.toggle_sound("rain").unwrap();
        r.mixer.set_timer(5, t0);
        r.mixer.set_timer(0, t0);
        r.mixer.poll(t0 + Duration::from_secs(600));
        assert!(r.mixer.any_playing());
    }

    #[test]
    fn refused_start_is_reported_and_left_paused() {
        let mut r = rig(&["rain", "wind"]);
        r.audio.set_fault(OfflineFault::RefusePlay);
        r.mixer.toggle_sound("rain").unwrap();
        settle(&mut r.mixer);

        assert_eq!(r.mixer.engine().state("rain"), Some(HandleState::Paused));
        assert!(!r.mixer.any_playing());
        assert!(r.mixer.notice().unwrap().contains("Rain"));

        r.audio.set_fault(OfflineFault::None);
        r.mixer.toggle_sound("wind").unwrap();
        settle(&mut r.mixer);
        assert!(r.mixer.engine().is_playing("wind"));
    }

    #[test]
    fn off_before_start_settles_wins() {
        let mut r = rig(&["rain"]);
        r.mixer.toggle_sound("rain").unwrap();
        r.mixer.toggle_sound("rain").unwrap();
        settle(&mut r.mixer);

        assert!(!r.mixer.display_state().sounds[0].playing);
        assert!(!r.audio.is_voice_playing(r.mixer.engine().sample_id("rain").unwrap()));
    }

    #[test]
    fn input_errors_become_notices() {
        let mut r = rig(&["rain"]);
        let now = Instant::now();
        assert!(r.mixer.handle_input(InputEvent::ApplyPreset("ghost".into()), now));
        assert!(r.mixer.notice().unwrap().contains("ghost"));
        assert!(!r.mixer.handle_input(InputEvent::Quit, now));
    }

    #[test]
    fn undelivered_start_changes_nothing() {
        let mut r = rig(&["rain"]);
        r.mixer.set_sound_volume("rain", 70).unwrap();
        r.audio.set_fault(OfflineFault::QueueFull);

        assert!(matches!(r.mixer.toggle_sound("rain"), Err(MixerError::PlaybackFailure(_))));
        assert_eq!(r.mixer.volume("rain"), Some(70));
        assert_eq!(r.mixer.engine().volume("rain"), Some(35));
        assert!(!r.mixer.is_on("rain"));
        assert!(matches!(r.mixer.set_sound_volume("rain", 10), Err(MixerError::PlaybackFailure(_))));
        assert_eq!(r.mixer.volume("rain"), Some(70));
    }

    #[test]
    fn unreachable_output_leaves_mix_alone() {
        let mut r = rig(&["rain", "wind"]);
        r.mixer.set_sound_volume("rain", 80).unwrap();
        r.mixer.toggle_sound("rain").unwrap();
        settle(&mut r.mixer);

        r.audio.set_fault(OfflineFault::QueueFull);
        assert!(r.mixer.set_master_volume(10).is_err());
        assert_eq!(r.mixer.master_volume(), 50);
        assert_eq!(r.mixer.engine().volume("rain"), Some(40));

        r.mixer.reset_all();
        assert_eq!(r.mixer.volume("rain"), Some(80));
        assert!(r.mixer.is_on("rain"));
        assert!(r.mixer.notice().is_some());
    }

    #[test]
    fn timer_stop_is_retried_until_delivered() {
        let mut r = rig(&["rain"]);
        let t0 = Instant::now();
        r.mixer.toggle_sound("rain").unwrap();
        settle(&mut r.mixer);
        r.mixer.set_timer(1, t0);

        r.audio.set_fault(OfflineFault::QueueFull);
        r.mixer.poll(t0 + Duration::from_secs(60));
        assert!(r.mixer.engine().is_playing("rain"));
        assert!(!r.mixer.timer_running());

        r.audio.set_fault(OfflineFault::None);
        r.mixer.poll(t0 + Duration::from_secs(61));
        assert!(!r.mixer.any_playing());
        assert!(!r.audio.is_voice_playing(r.mixer.engine().sample_id("rain").unwrap()));
    }

    #[test]
    fn unanswered_start_becomes_a_notice() {
        let mut r = rig(&["rain"]);
        r.audio.set_fault(OfflineFault::NoAnswer);
        r.mixer.toggle_sound("rain").unwrap();

        let ds = r.mixer.display_state();
        assert_eq!(ds.sounds[0].playing, ds.any_playing);
        assert!(ds.any_playing);

        r.mixer.poll(Instant::now() + crate::playback::START_TIMEOUT);
        assert!(!r.mixer.any_playing());
        assert!(!r.mixer.display_state().sounds[0].playing);
        assert!(r.mixer.notice().unwrap().contains("Rain"));
    }

    #[test]
    fn zero_entries_in_a_preset_leave_sounds_off() {
        let mut r = rig(&["fire", "rain"]);
        r.mixer.apply_preset(&preset(&[("rain", 60), ("fire", 0)]));

        assert_eq!(r.mixer.extract_current_state(), preset(&[("rain", 60)]).sounds);
        assert_eq!(r.mixer.volume("fire"), Some(0));
        assert!(!r.mixer.engine().is_active("fire"));
    }
}
