use std::path::PathBuf;

use crate::config::Settings;
use crate::library::tags::TagWorker;
use crate::player::{MediaOutput, Player};

/// Fill the playlist from the initial intake, fire tag extraction for every
/// accepted file and restore persisted playback state (falling back to the
/// configured defaults for a first run).
pub fn populate<O: MediaOutput>(
    player: &mut Player<O>,
    tag_worker: &TagWorker,
    files: Vec<PathBuf>,
    settings: &Settings,
) {
    log::info!("starting with {} tracks", files.len());

    let added = player.add_tracks(files);
    for (id, path) in added {
        tag_worker.submit(id, path);
    }

    player.restore(settings.playback.shuffle, settings.playback.repeat);
}
