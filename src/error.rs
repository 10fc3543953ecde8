/// Crate-wide error types.
///
/// Only conditions the caller must see are errors. Declined hints and
/// ignored guesses are ordinary values (see `sim::round`), and audio
/// failures never leave the audio module.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("word must contain at least one letter")]
    EmptyWord,

    #[error("round is still in progress")]
    RoundInProgress,

    #[error("could not write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode save data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failures inside the playback path. Logged at debug level and dropped.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no usable audio player found")]
    NoPlayer,

    #[error("audio output unavailable: {0}")]
    Device(String),

    #[error("WAV encoding failed: {0}")]
    Encode(#[from] hound::Error),

    #[error("audio I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
