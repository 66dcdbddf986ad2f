// Ambient sound mixer: looping sounds with their own volumes under one master,
// plus presets and a sleep timer.

pub mod audio;
pub mod audio_api;
pub mod catalog;
pub mod config;
pub mod countdown;
pub mod error;
pub mod loader;
pub mod mixer;
pub mod playback;
pub mod presets;
pub mod shared;
pub mod volume;

pub use error::{MixerError, Result};
pub use mixer::MixerController;
