//! Playback state types shared by the sequencer and the controller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatMode {
    /// Stop at the end of the playlist.
    Off,
    /// Replay the last track when the playlist runs out.
    One,
    /// Wrap around to the start of the playlist.
    All,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::Off
    }
}

impl RepeatMode {
    /// The keyboard cycle: off -> one -> all -> off.
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::One,
            Self::One => Self::All,
            Self::All => Self::Off,
        }
    }
}

/// The single owned playback state value.
///
/// Owned exclusively by the controller and passed by reference into the
/// sequencer; `current` is `None` exactly when the playlist is empty.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Index of the loaded track in the playlist, if any.
    pub current: Option<usize>,
    /// Whether playback is currently active.
    pub playing: bool,
    /// Output volume in `[0, 1]`.
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current: None,
            playing: false,
            volume: 1.0,
            shuffle: false,
            repeat: RepeatMode::default(),
        }
    }
}
