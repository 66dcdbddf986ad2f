// Custom presets live in one JSON document, rewritten whole on every change.
// Defaults come from the catalog and are never written or deleted.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MixerError, Result};

pub const PRESET_FILE: &str = "presets.json";

pub type SoundVolumes = BTreeMap<String, u8>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub sounds: SoundVolumes,
}

#[derive(Debug, Serialize, Deserialize)]
struct PresetDocument {
    version: u32,
    presets: Vec<Preset>, // oldest first
}

pub struct PresetStore {
    path: PathBuf,
    custom: Vec<Preset>,
    names: HashSet<String>,
    defaults: Vec<Preset>,
}

impl PresetStore {
    /// Open the store at `<data_dir>/presets.json`. A missing file is an empty
    /// store; an unreadable one is logged and left alone until the next save.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(PRESET_FILE);
        let custom = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<PresetDocument>(&text) {
                Ok(doc) => doc.presets,
                Err(e) => {
                    warn!("ignoring unreadable preset file {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("cannot read {}: {e}", path.display());
                Vec::new()
            }
        };
        let names = custom.iter().map(|p| p.name.clone()).collect();
        info!(count = custom.len(), "custom presets loaded");
        Self { path, custom, names, defaults: Vec::new() }
    }

    pub fn set_defaults(&mut self, defaults: Vec<Preset>) {
        self.defaults = defaults;
    }

    pub fn defaults(&self) -> &[Preset] {
        &self.defaults
    }

    pub fn get_all_custom(&self) -> &[Preset] {
        &self.custom
    }

    // custom first, then defaults
    pub fn get_preset(&self, id: &str) -> Option<&Preset> {
        self.custom
            .iter()
            .chain(self.defaults.iter())
            .find(|p| p.id == id)
    }

    pub fn is_custom(&self, id: &str) -> bool {
        self.custom.iter().any(|p| p.id == id)
    }

    /// Exact, case-sensitive match against custom preset names.
    pub fn name_exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn save(&mut self, name: &str, sounds: SoundVolumes) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MixerError::InvalidInput("preset name is empty".into()));
        }
        if self.name_exists(name) {
            return Err(MixerError::InvalidInput(format!("a preset named \"{name}\" already exists")));
        }

        let id = format!("custom-{}", uuid::Uuid::new_v4());
        self.custom.push(Preset { id: id.clone(), name: name.to_string(), sounds });
        if let Err(e) = self.persist() {
            self.custom.pop();
            return Err(e);
        }
        self.names.insert(name.to_string());
        info!(preset = %id, "saved preset \"{name}\"");
        Ok(id)
    }

    // Ok(false) if there was no such custom preset
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(idx) = self.custom.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        let removed = self.custom.remove(idx);
        if let Err(e) = self.persist() {
            self.custom.insert(idx, removed);
            return Err(e);
        }
        self.names.remove(&removed.name);
        info!(preset = id, "deleted preset \"{}\"", removed.name);
        Ok(true)
    }

    // The new document is synced before it replaces the old one, and the
    // directory entry after, so a crash leaves one complete version on disk.
    fn persist(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;
        let doc = PresetDocument { version: 1, presets: self.custom.clone() };
        let json = serde_json::to_vec_pretty(&doc).map_err(|e| MixerError::Parse {
            what: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        #[cfg(unix)]
        std::fs::File::open(dir)?.sync_all()?;
        Ok(())
    }
}
