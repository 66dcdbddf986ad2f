use thiserror::Error;

#[derive(Error, Debug)]
pub enum MixerError {
    /// Unknown sound or preset id
    #[error("not found: {0}")]
    NotFound(String),

    /// Rejected before any state was touched
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The audio side refused to load or start a sound
    #[error("playback failed: {0}")]
    PlaybackFailure(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse {what}: {reason}")]
    Parse { what: String, reason: String },
}

pub type Result<T> = std::result::Result<T, MixerError>;
