// The static list of sounds and default presets.
//
// Read from `catalog.toml` in the sounds directory:
//
// [[sound]]
// id = "rain"
// name = "Rain"
// file = "rain.wav"
//
// [preset.rainy-day]
// name = "Rainy Day"
// sounds = { rain = 70, thunder = 30 }
//
// Without that file every `*.wav` in the directory becomes a sound named after
// its file stem, and there are no default presets.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{MixerError, Result};
use crate::loader::sample_loader;
use crate::presets::{Preset, SoundVolumes};

pub const CATALOG_FILE: &str = "catalog.toml";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Sound {
    pub id: String,
    pub name: String,
    pub file: PathBuf, // relative to the sounds directory
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub dir: PathBuf,
    pub sounds: Vec<Sound>,
    pub presets: Vec<Preset>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "sound")]
    sounds: Vec<Sound>,
    #[serde(default, rename = "preset")]
    presets: BTreeMap<String, PresetEntry>,
}

#[derive(Deserialize)]
struct PresetEntry {
    name: String,
    #[serde(default)]
    sounds: SoundVolumes,
}

impl Catalog {
    pub fn load(dir: &Path) -> Result<Self> {
        let file = dir.join(CATALOG_FILE);
        let catalog = if file.is_file() {
            Self::from_toml(dir, &std::fs::read_to_string(&file)?)?
        } else {
            Self::from_wav_files(dir)?
        };
        info!(
            sounds = catalog.sounds.len(),
            presets = catalog.presets.len(),
            "catalog loaded from {}",
            dir.display()
        );
        Ok(catalog)
    }

    pub fn from_toml(dir: &Path, text: &str) -> Result<Self> {
        let parsed: CatalogFile = toml::from_str(text).map_err(|e| MixerError::Parse {
            what: CATALOG_FILE.into(),
            reason: e.to_string(),
        })?;

        let mut seen = std::collections::HashSet::new();
        for s in &parsed.sounds {
            if !seen.insert(s.id.as_str()) {
                return Err(MixerError::InvalidInput(format!("sound id \"{}\" listed twice", s.id)));
            }
        }

        let presets = parsed
            .presets
            .into_iter()
            .map(|(id, entry)| Preset { id, name: entry.name, sounds: entry.sounds })
            .collect();
        Ok(Self { dir: dir.to_path_buf(), sounds: parsed.sounds, presets })
    }

    pub fn from_wav_files(dir: &Path) -> Result<Self> {
        let paths = sample_loader::index_wav_in_dir(dir).map_err(|e| MixerError::InvalidInput(format!(
            "cannot list sounds in {}: {e}",
            dir.display()
        )))?;
        let mut seen = std::collections::HashSet::new();
        let sounds = paths
            .iter()
            .filter_map(|p| {
                let stem = p.file_stem()?.to_str()?;
                let file = p.file_name()?;
                let id = stem.to_lowercase();
                if !seen.insert(id.clone()) {
                    warn!("skipping {}: another file already uses the id \"{id}\"", p.display());
                    return None;
                }
                Some(Sound { id, name: display_name(stem), file: PathBuf::from(file) })
            })
            .collect();
        Ok(Self { dir: dir.to_path_buf(), sounds, presets: Vec::new() })
    }

    pub fn source_path(&self, sound: &Sound) -> PathBuf {
        self.dir.join(&sound.file)
    }
}

// "ocean_waves" -> "Ocean Waves"
fn display_name(stem: &str) -> String {
    stem.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
