// Precedence: command line flag, then <data dir>/ambimix.toml, then defaults.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::{MixerError, Result};
use crate::shared::{DEFAULT_MASTER_VOLUME, MAX_VOLUME};

pub const DATA_DIR: &str = ".ambimix";
pub const SETTINGS_FILE: &str = "ambimix.toml";

/// Ambient sound mixer
#[derive(Parser, Debug, Default)]
#[command(name = "ambimix", version, about = "Mix looping ambient sounds in the terminal")]
pub struct Args {
    /// Directory holding the sound files (and an optional catalog.toml)
    pub sounds_dir: Option<PathBuf>,

    /// Where presets, settings and the log live [default: <SOUNDS_DIR>/.ambimix]
    #[arg(long, env = "AMBIMIX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Initial master volume, 0-100
    #[arg(long)]
    pub master: Option<u8>,

    /// Start a sleep timer of this many minutes
    #[arg(long)]
    pub timer: Option<u32>,

    /// Run without opening an audio device
    #[arg(long)]
    pub no_audio: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub master_volume: Option<u8>,
    pub timer_minutes: Option<u32>,
}

impl Settings {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|e| MixerError::Parse {
                what: path.display().to_string(),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub sounds_dir: PathBuf,
    pub data_dir: PathBuf,
    pub master_volume: u8,
    pub timer_minutes: u32,
    pub no_audio: bool,
}

impl Config {
    pub fn resolve(args: Args) -> Result<Self> {
        let sounds_dir = match args.sounds_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let data_dir = args.data_dir.unwrap_or_else(|| sounds_dir.join(DATA_DIR));
        let settings = Settings::load(&data_dir)?;

        let master_volume = args
            .master
            .or(settings.master_volume)
            .unwrap_or(DEFAULT_MASTER_VOLUME);
        if master_volume > MAX_VOLUME {
            return Err(MixerError::InvalidInput(format!(
                "master volume {master_volume} is outside 0-{MAX_VOLUME}"
            )));
        }

        Ok(Self {
            sounds_dir,
            data_dir,
            master_volume,
            timer_minutes: args.timer.or(settings.timer_minutes).unwrap_or(0),
            no_audio: args.no_audio,
        })
    }
}
