//! The playback controller.
//!
//! `Player` owns the playlist, the manual queue, the single `PlaybackState`
//! value and the media output. Every mutation of playback state goes through
//! it: user actions call in synchronously, the runtime loop calls `tick()`
//! so end-of-track advances happen inside the same thread of control.
//!
//! Playback failures never escape: they are caught, the state reverts to
//! paused and a short message is surfaced for the now-playing area.

use std::path::PathBuf;
use std::time::Duration;

use rand::thread_rng;

use crate::config::saved::{SavedState, SavedStateStore};
use crate::library::tags::TagUpdate;
use crate::library::{Playlist, Track, TrackId};

use super::output::MediaOutput;
use super::queue::PlayQueue;
use super::sequencer::{self, Decision};
use super::types::{PlaybackState, RepeatMode};

pub struct Player<O: MediaOutput> {
    output: O,
    playlist: Playlist,
    queue: PlayQueue,
    state: PlaybackState,
    store: SavedStateStore,
    /// Transient human-readable playback error, shown until the next
    /// successful load or play.
    status: Option<String>,
}

impl<O: MediaOutput> Player<O> {
    pub fn new(mut output: O, store: SavedStateStore) -> Self {
        let state = PlaybackState::default();
        output.set_volume(state.volume);

        Self {
            output,
            playlist: Playlist::new(),
            queue: PlayQueue::new(),
            state,
            store,
            status: None,
        }
    }

    // --- intake -----------------------------------------------------------

    /// Append accepted files to the playlist, returning (id, path) pairs for
    /// tag extraction. When the playlist was empty before the call, the
    /// first new track becomes current — loaded, not auto-played.
    pub fn add_tracks(&mut self, paths: Vec<PathBuf>) -> Vec<(TrackId, PathBuf)> {
        let was_empty = self.playlist.is_empty();

        let mut added = Vec::with_capacity(paths.len());
        for path in paths {
            let id = self.playlist.add(path.clone());
            added.push((id, path));
        }

        if was_empty && !self.playlist.is_empty() {
            self.load(0, false);
        }
        added
    }

    /// Patch tag data onto its track. A result for a track that no longer
    /// resolves is discarded; re-applying an identical patch is harmless.
    pub fn apply_tag_update(&mut self, update: TagUpdate) {
        let Some(track) = self.playlist.by_id_mut(update.id) else {
            log::debug!("discarding tag result for unknown track {:?}", update.id);
            return;
        };

        if let Some(title) = update.title {
            track.title = title;
        }
        if let Some(artist) = update.artist {
            track.artist = artist;
        }
        if let Some(cover) = update.cover {
            track.cover = Some(cover);
        }
        if let Some(duration) = update.duration {
            track.duration = Some(duration);
        }
    }

    // --- transport --------------------------------------------------------

    /// Bind the output to the track at `index`, paused at position zero, and
    /// optionally start it. A load failure keeps the selection but surfaces
    /// the error and stays paused.
    fn load(&mut self, index: usize, autoplay: bool) {
        let Some(track) = self.playlist.get(index) else {
            return;
        };

        self.status = None;
        match self.output.load(track) {
            Ok(()) => {
                log::info!("loaded \"{}\"", track.display);
                self.state.current = Some(index);
                self.state.playing = false;
                self.persist();
                if autoplay {
                    self.play();
                }
            }
            Err(e) => {
                log::warn!("load failed: {e}");
                self.state.current = Some(index);
                self.state.playing = false;
                self.status = Some(format!("Playback error: {e}"));
                self.persist();
            }
        }
    }

    /// Start or resume playback. Failures surface in the status line and
    /// leave the player paused.
    pub fn play(&mut self) {
        if self.state.current.is_none() {
            return;
        }
        match self.output.play() {
            Ok(()) => {
                self.state.playing = true;
                self.status = None;
            }
            Err(e) => {
                log::warn!("play failed: {e}");
                self.state.playing = false;
                self.status = Some(format!("Playback error: {e}"));
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state.playing {
            self.output.pause();
            self.state.playing = false;
        }
    }

    pub fn toggle(&mut self) {
        if self.state.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Explicit user pick: bypasses the sequencer, loads and plays.
    pub fn select(&mut self, index: usize) {
        if index < self.playlist.len() {
            self.load(index, true);
        }
    }

    /// Skip forward. Preserves the playing/paused intent: if paused, the
    /// next track is loaded but not started.
    pub fn next(&mut self) {
        let decision = sequencer::decide_next(
            &self.state,
            &self.playlist,
            &mut self.queue,
            &mut thread_rng(),
        );
        self.apply(decision, self.state.playing);
    }

    /// Skip backward, preserving the playing/paused intent.
    pub fn previous(&mut self) {
        let decision = sequencer::decide_previous(&self.state, &self.playlist, &mut thread_rng());
        self.apply(decision, self.state.playing);
    }

    /// Drive auto-advance: called from the runtime loop; when the output has
    /// drained while we are nominally playing, the track ended.
    pub fn tick(&mut self) {
        if self.state.playing && self.output.finished() {
            self.on_track_ended();
        }
    }

    fn on_track_ended(&mut self) {
        let was_playing = self.state.playing;
        let decision = sequencer::decide_next(
            &self.state,
            &self.playlist,
            &mut self.queue,
            &mut thread_rng(),
        );
        self.apply(decision, was_playing);
    }

    fn apply(&mut self, decision: Decision, autoplay: bool) {
        if decision.stop {
            // End of the line: halt on the current selection without
            // rebinding the source.
            self.output.pause();
            self.state.playing = false;
            return;
        }
        if let Some(index) = decision.next {
            // A same-index decision is the repeat-one replay; load rebinds
            // from position zero either way.
            self.load(index, autoplay);
        }
    }

    // --- seek & volume ----------------------------------------------------

    /// Seek to a fraction of the track in `[0, 1]`. No-op while the duration
    /// is unknown or zero.
    pub fn seek(&mut self, fraction: f64) {
        let Some(duration) = self.duration() else {
            return;
        };
        if duration.is_zero() {
            return;
        }
        let target = duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.seek_to(target, duration);
    }

    /// Seek relative to the current position by `secs` (either direction).
    pub fn seek_by(&mut self, secs: i64) {
        let Some(duration) = self.duration() else {
            return;
        };
        if duration.is_zero() {
            return;
        }
        let position = self.output.position();
        let target = if secs >= 0 {
            position.saturating_add(Duration::from_secs(secs as u64))
        } else {
            position.saturating_sub(Duration::from_secs(secs.unsigned_abs()))
        };
        self.seek_to(target, duration);
    }

    fn seek_to(&mut self, target: Duration, duration: Duration) {
        if let Err(e) = self.output.seek_to(target.min(duration)) {
            log::warn!("seek failed: {e}");
            self.state.playing = false;
            self.status = Some(format!("Playback error: {e}"));
        }
    }

    /// Clamp, forward to the output and persist.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.output.set_volume(volume);
        self.persist();
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.state.volume + delta);
    }

    // --- playback flags ---------------------------------------------------

    pub fn toggle_shuffle(&mut self) {
        self.state.shuffle = !self.state.shuffle;
        self.persist();
    }

    pub fn cycle_repeat(&mut self) {
        self.state.repeat = self.state.repeat.cycle();
        self.persist();
    }

    // --- queue ------------------------------------------------------------

    /// Queue a track to play next. The id is not validated here; a track
    /// gone by pop time is skipped then.
    pub fn enqueue(&mut self, id: TrackId) {
        self.queue.enqueue(id);
    }

    pub fn dequeue(&mut self, id: TrackId) {
        self.queue.remove(id);
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    // --- persistence ------------------------------------------------------

    /// Restore persisted state, or fall back to the configured defaults when
    /// no state file exists yet. Call after the initial intake so a saved
    /// index can be validated against the playlist.
    pub fn restore(&mut self, fallback_shuffle: bool, fallback_repeat: RepeatMode) {
        match self.store.load() {
            Some(saved) => {
                self.state.shuffle = saved.shuffle;
                self.state.repeat = saved.repeat;
                self.state.volume = saved.volume.clamp(0.0, 1.0);
                self.output.set_volume(self.state.volume);

                if let Some(index) = saved.last_played_index {
                    // Only meaningful when it still points into this playlist.
                    if index < self.playlist.len() {
                        self.load(index, false);
                    }
                }
            }
            None => {
                self.state.shuffle = fallback_shuffle;
                self.state.repeat = fallback_repeat;
            }
        }
    }

    fn persist(&self) {
        self.store.save(&SavedState {
            volume: self.state.volume,
            shuffle: self.state.shuffle,
            repeat: self.state.repeat,
            last_played_index: self.state.current,
        });
    }

    // --- views ------------------------------------------------------------

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current.and_then(|i| self.playlist.get(i))
    }

    pub fn position(&self) -> Duration {
        self.output.position()
    }

    /// Duration of the current track: the decoder's figure when known,
    /// otherwise whatever tag extraction reported.
    pub fn duration(&self) -> Option<Duration> {
        self.output
            .duration()
            .or_else(|| self.current_track().and_then(|t| t.duration))
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}
