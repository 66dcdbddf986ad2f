mod tui;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ambimix::audio::{self, OfflineAudio};
use ambimix::audio_api::CommandSink;
use ambimix::catalog::Catalog;
use ambimix::config::{Args, Config};
use ambimix::playback::PlaybackEngine;
use ambimix::presets::PresetStore;
use ambimix::MixerController;

const LOG_FILE: &str = "ambimix.log";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::resolve(Args::parse())?;
    init_logging(&config.data_dir)?;
    info!(?config, "starting");

    let catalog = Catalog::load(&config.sounds_dir)?;
    if catalog.sounds.is_empty() {
        anyhow::bail!("no sounds found in {}", config.sounds_dir.display());
    }

    let sink: Box<dyn CommandSink> = if config.no_audio {
        Box::new(OfflineAudio::default())
    } else {
        match audio::start_audio() {
            Ok(handle) => Box::new(handle),
            Err(e) => {
                warn!("no audio output ({e:#}), running silent");
                Box::new(OfflineAudio::default())
            }
        }
    };

    let mut mixer = MixerController::new(PlaybackEngine::new(sink), PresetStore::open(&config.data_dir));
    mixer.load_catalog(&catalog);
    mixer.set_master_volume(config.master_volume)?;
    if config.timer_minutes > 0 {
        mixer.set_timer(config.timer_minutes, Instant::now());
    }

    terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;
    let _guard = RawModeGuard; // restores the terminal however we leave
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(33);
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        mixer.poll(Instant::now());
        let ds = mixer.display_state();
        tui_state.clamp_to(&ds);

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &tui_state);
        })?;

        for event in tui::input::poll_input(tick_rate, &mut tui_state, &ds)? {
            if !mixer.handle_input(event, Instant::now()) {
                info!("quit");
                return Ok(());
            }
        }
    }
}

// stdout belongs to the terminal UI, so logs go to a file next to the presets
fn init_logging(data_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("cannot create {}", data_dir.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "ambimix=info".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
