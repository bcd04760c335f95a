//! Persisted player state.
//!
//! A small TOML file remembering volume, shuffle, repeat mode and the last
//! played index between sessions. Read once at startup and rewritten on
//! every change; persistence is strictly best-effort and must never disturb
//! playback, so failures are logged and swallowed.

use std::{env, fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::player::RepeatMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedState {
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played_index: Option<usize>,
}

impl Default for SavedState {
    fn default() -> Self {
        Self {
            volume: 1.0,
            shuffle: false,
            repeat: RepeatMode::default(),
            last_played_index: None,
        }
    }
}

/// File-backed store for `SavedState`.
pub struct SavedStateStore {
    path: Option<PathBuf>,
}

impl SavedStateStore {
    /// Store at `MUKERA_STATE_PATH` or the XDG data dir default.
    pub fn at_default_path() -> Self {
        Self {
            path: resolve_state_path(),
        }
    }

    /// Store at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A store that never reads or writes anything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Read the saved state; `None` when there is no usable state file.
    pub fn load(&self) -> Option<SavedState> {
        let path = self.path.as_ref()?;
        let body = fs::read_to_string(path).ok()?;
        match toml::from_str(&body) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("ignoring malformed state file {}: {e}", path.display());
                None
            }
        }
    }

    /// Write the saved state, best-effort.
    pub fn save(&self, state: &SavedState) {
        let Some(path) = &self.path else {
            return;
        };
        let Ok(body) = toml::to_string_pretty(state) else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = fs::write(path, body) {
            log::warn!("failed to persist player state to {}: {e}", path.display());
        }
    }
}

/// Resolve the state path from `MUKERA_STATE_PATH` or XDG defaults.
fn resolve_state_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("MUKERA_STATE_PATH") {
        return Some(PathBuf::from(p));
    }

    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".local").join("share"))
    } else {
        None
    };

    data_home.map(|d| d.join("mukera").join("state.toml"))
}
