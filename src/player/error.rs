use std::path::PathBuf;

use thiserror::Error;

/// Playback failures.
///
/// None of these are fatal: the controller catches them and surfaces a short
/// message in the now-playing area, reverting to the paused state. Only
/// `Device` can escape, at startup, before any track is loaded.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no audio output device: {0}")]
    Device(String),

    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("nothing loaded")]
    NothingLoaded,
}
