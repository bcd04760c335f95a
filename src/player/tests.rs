use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use tempfile::tempdir;

use crate::config::saved::SavedStateStore;
use crate::library::Playlist;
use crate::library::tags::TagUpdate;

use super::error::PlayerError;
use super::output::MediaOutput;
use super::{Player, RepeatMode};

/// Observable state of the fake output, shared with the test body.
#[derive(Default)]
struct OutputLog {
    loaded: Option<PathBuf>,
    loads: usize,
    playing: bool,
    volume: f32,
    sought: Option<Duration>,
    duration: Option<Duration>,
    finished: bool,
    fail_next_play: bool,
    fail_next_load: bool,
}

#[derive(Clone)]
struct FakeOutput(Rc<RefCell<OutputLog>>);

impl FakeOutput {
    fn new() -> (Self, Rc<RefCell<OutputLog>>) {
        let log = Rc::new(RefCell::new(OutputLog::default()));
        (Self(log.clone()), log)
    }
}

impl MediaOutput for FakeOutput {
    fn load(&mut self, track: &crate::library::Track) -> Result<(), PlayerError> {
        let mut log = self.0.borrow_mut();
        if log.fail_next_load {
            log.fail_next_load = false;
            return Err(PlayerError::Decode {
                path: track.path.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        log.loaded = Some(track.path.clone());
        log.loads += 1;
        log.playing = false;
        log.finished = false;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let mut log = self.0.borrow_mut();
        if log.loaded.is_none() {
            return Err(PlayerError::NothingLoaded);
        }
        if log.fail_next_play {
            log.fail_next_play = false;
            return Err(PlayerError::Decode {
                path: log.loaded.clone().unwrap(),
                reason: "scripted failure".to_string(),
            });
        }
        log.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.0.borrow_mut().playing = false;
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.0.borrow_mut().sought = Some(position);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().volume = volume;
    }

    fn position(&self) -> Duration {
        Duration::ZERO
    }

    fn duration(&self) -> Option<Duration> {
        self.0.borrow().duration
    }

    fn finished(&self) -> bool {
        self.0.borrow().finished
    }
}

fn player_with(
    n: usize,
) -> (
    Player<FakeOutput>,
    Rc<RefCell<OutputLog>>,
    Vec<crate::library::TrackId>,
) {
    let (output, log) = FakeOutput::new();
    let mut player = Player::new(output, SavedStateStore::disabled());
    let paths = (0..n)
        .map(|i| PathBuf::from(format!("/music/{i}.mp3")))
        .collect();
    let ids = player
        .add_tracks(paths)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    (player, log, ids)
}

#[test]
fn first_added_track_is_loaded_but_not_playing() {
    let (player, log, _) = player_with(3);

    assert_eq!(player.state().current, Some(0));
    assert!(!player.state().playing);
    assert_eq!(log.borrow().loaded, Some(PathBuf::from("/music/0.mp3")));
    assert!(!log.borrow().playing);
}

#[test]
fn adding_to_a_non_empty_playlist_keeps_the_current_track() {
    let (mut player, _log, _) = player_with(2);
    player.select(1);

    player.add_tracks(vec![PathBuf::from("/music/extra.mp3")]);

    assert_eq!(player.state().current, Some(1));
    assert_eq!(player.playlist().len(), 3);
}

#[test]
fn select_loads_and_plays() {
    let (mut player, log, _) = player_with(3);

    player.select(2);

    assert_eq!(player.state().current, Some(2));
    assert!(player.state().playing);
    assert_eq!(log.borrow().loaded, Some(PathBuf::from("/music/2.mp3")));
    assert!(log.borrow().playing);
}

#[test]
fn select_out_of_range_is_a_noop() {
    let (mut player, _log, _) = player_with(2);
    player.select(5);
    assert_eq!(player.state().current, Some(0));
    assert!(!player.state().playing);
}

#[test]
fn pause_only_acts_while_playing() {
    let (mut player, log, _) = player_with(1);

    player.pause(); // paused already: no-op
    assert!(!player.state().playing);

    player.play();
    assert!(player.state().playing);
    player.pause();
    assert!(!player.state().playing);
    assert!(!log.borrow().playing);
}

#[test]
fn play_failure_surfaces_a_message_and_stays_paused() {
    let (mut player, log, _) = player_with(2);
    log.borrow_mut().fail_next_play = true;

    player.play();

    assert!(!player.state().playing);
    assert!(player.status().unwrap().starts_with("Playback error:"));

    // The next successful play clears the message.
    player.play();
    assert!(player.state().playing);
    assert!(player.status().is_none());
}

#[test]
fn load_failure_keeps_selection_and_stays_paused() {
    let (mut player, log, _) = player_with(3);
    log.borrow_mut().fail_next_load = true;

    player.select(1);

    assert_eq!(player.state().current, Some(1));
    assert!(!player.state().playing);
    assert!(player.status().is_some());
}

#[test]
fn next_advances_and_preserves_the_playing_intent() {
    let (mut player, log, _) = player_with(3);

    // Paused: next moves the selection but does not start playback.
    player.next();
    assert_eq!(player.state().current, Some(1));
    assert!(!player.state().playing);
    assert!(!log.borrow().playing);

    // Playing: next keeps playing.
    player.play();
    player.next();
    assert_eq!(player.state().current, Some(2));
    assert!(player.state().playing);
    assert!(log.borrow().playing);
}

#[test]
fn next_from_last_index_with_repeat_off_halts_in_place() {
    let (mut player, _log, _) = player_with(3);
    player.select(2);
    assert!(player.state().playing);

    player.next();

    assert_eq!(player.state().current, Some(2));
    assert!(!player.state().playing);
}

#[test]
fn next_from_last_index_with_repeat_all_wraps_to_zero() {
    let (mut player, _log, _) = player_with(3);
    player.cycle_repeat(); // One
    player.cycle_repeat(); // All
    player.select(2);

    player.next();

    assert_eq!(player.state().current, Some(0));
    assert!(player.state().playing);
}

#[test]
fn previous_wraps_from_the_first_track() {
    let (mut player, _log, _) = player_with(3);

    player.previous();

    assert_eq!(player.state().current, Some(2));
    assert!(!player.state().playing);
}

#[test]
fn queued_track_wins_over_repeat_and_empties_the_queue() {
    let (mut player, _log, ids) = player_with(3);
    player.cycle_repeat(); // One
    player.enqueue(ids[1]);

    player.next();

    assert_eq!(player.state().current, Some(1));
    assert!(player.queue().is_empty());
}

#[test]
fn stale_queue_entries_are_skipped_on_next() {
    let (mut player, _log, ids) = player_with(3);
    let mut foreign = Playlist::new();
    let stale = foreign.add(PathBuf::from("/elsewhere/x.mp3"));

    player.enqueue(stale);
    player.enqueue(ids[2]);
    player.next();

    assert_eq!(player.state().current, Some(2));
    assert!(player.queue().is_empty());
}

#[test]
fn dequeue_and_clear_queue() {
    let (mut player, _log, ids) = player_with(3);
    player.enqueue(ids[0]);
    player.enqueue(ids[1]);

    player.dequeue(ids[0]);
    player.dequeue(ids[0]); // absent: no-op
    assert_eq!(player.queue().len(), 1);

    player.clear_queue();
    assert!(player.queue().is_empty());
}

#[test]
fn tick_advances_when_the_output_drains() {
    let (mut player, log, _) = player_with(3);
    player.select(0);
    log.borrow_mut().finished = true;

    player.tick();

    assert_eq!(player.state().current, Some(1));
    assert!(player.state().playing);
    assert!(log.borrow().playing);
}

#[test]
fn tick_does_nothing_while_paused() {
    let (mut player, log, _) = player_with(3);
    log.borrow_mut().finished = true;

    player.tick();

    assert_eq!(player.state().current, Some(0));
    assert!(!player.state().playing);
}

#[test]
fn track_end_with_repeat_one_at_last_index_reloads_the_same_track() {
    let (mut player, log, _) = player_with(2);
    player.cycle_repeat(); // One
    player.select(1);
    let loads_before = log.borrow().loads;

    log.borrow_mut().finished = true;
    player.tick();

    assert_eq!(player.state().current, Some(1));
    assert!(player.state().playing);
    assert_eq!(log.borrow().loads, loads_before + 1);
}

#[test]
fn track_end_with_repeat_off_at_last_index_stops() {
    let (mut player, log, _) = player_with(2);
    player.select(1);
    let loads_before = log.borrow().loads;

    log.borrow_mut().finished = true;
    player.tick();

    assert_eq!(player.state().current, Some(1));
    assert!(!player.state().playing);
    assert_eq!(log.borrow().loads, loads_before);
}

#[test]
fn shuffle_on_a_single_track_replays_it() {
    let (mut player, _log, _) = player_with(1);
    player.toggle_shuffle();
    player.select(0);

    player.next();

    assert_eq!(player.state().current, Some(0));
    assert!(player.state().playing);
}

#[test]
fn volume_is_clamped_forwarded_and_persisted() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("state.toml");
    let (output, log) = FakeOutput::new();
    let mut player = Player::new(output, SavedStateStore::at(state_path.clone()));
    player.add_tracks(vec![PathBuf::from("/music/a.mp3")]);

    player.set_volume(1.7);
    assert_eq!(player.state().volume, 1.0);
    assert_eq!(log.borrow().volume, 1.0);

    player.set_volume(-0.3);
    assert_eq!(player.state().volume, 0.0);
    assert_eq!(log.borrow().volume, 0.0);

    player.set_volume(0.4);
    let saved = SavedStateStore::at(state_path).load().unwrap();
    assert_eq!(saved.volume, 0.4);
}

#[test]
fn shuffle_and_repeat_changes_are_persisted() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("state.toml");
    let (output, _log) = FakeOutput::new();
    let mut player = Player::new(output, SavedStateStore::at(state_path.clone()));

    player.toggle_shuffle();
    player.cycle_repeat();

    let saved = SavedStateStore::at(state_path).load().unwrap();
    assert!(saved.shuffle);
    assert_eq!(saved.repeat, RepeatMode::One);
}

#[test]
fn seek_is_a_noop_without_a_known_duration() {
    let (mut player, log, _) = player_with(1);

    player.seek(0.5);
    assert!(log.borrow().sought.is_none());
}

#[test]
fn seek_targets_the_fraction_of_the_duration() {
    let (mut player, log, _) = player_with(1);
    log.borrow_mut().duration = Some(Duration::from_secs(200));

    player.seek(0.25);
    assert_eq!(log.borrow().sought, Some(Duration::from_secs(50)));

    // Out-of-range fractions clamp to the ends.
    player.seek(7.0);
    assert_eq!(log.borrow().sought, Some(Duration::from_secs(200)));
}

#[test]
fn tag_updates_patch_their_track_and_stale_updates_are_dropped() {
    let (mut player, _log, ids) = player_with(2);

    player.apply_tag_update(TagUpdate {
        id: ids[1],
        title: Some("Real Title".to_string()),
        artist: Some("Real Artist".to_string()),
        cover: None,
        duration: Some(Duration::from_secs(180)),
    });

    let track = player.playlist().get(1).unwrap();
    assert_eq!(track.title, "Real Title");
    assert_eq!(track.artist, "Real Artist");
    assert_eq!(track.duration, Some(Duration::from_secs(180)));

    // A result for a track this playlist never held must change nothing.
    let mut foreign = Playlist::new();
    let stale = foreign.add(PathBuf::from("/elsewhere/x.mp3"));
    player.apply_tag_update(TagUpdate {
        id: stale,
        title: Some("Ghost".to_string()),
        artist: None,
        cover: None,
        duration: None,
    });
    assert!(player.playlist().tracks().iter().all(|t| t.title != "Ghost"));
}

#[test]
fn restore_applies_saved_state_and_a_valid_last_index() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("state.toml");
    std::fs::write(
        &state_path,
        "volume = 0.5\nshuffle = true\nrepeat = \"all\"\nlast_played_index = 2\n",
    )
    .unwrap();

    let (output, log) = FakeOutput::new();
    let mut player = Player::new(output, SavedStateStore::at(state_path));
    player.add_tracks(
        (0..4)
            .map(|i| PathBuf::from(format!("/music/{i}.mp3")))
            .collect(),
    );
    player.restore(false, RepeatMode::Off);

    assert_eq!(player.state().volume, 0.5);
    assert!(player.state().shuffle);
    assert_eq!(player.state().repeat, RepeatMode::All);
    assert_eq!(player.state().current, Some(2));
    assert!(!player.state().playing);
    assert_eq!(log.borrow().volume, 0.5);
}

#[test]
fn restore_ignores_an_out_of_range_last_index() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("state.toml");
    std::fs::write(&state_path, "last_played_index = 9\n").unwrap();

    let (output, _log) = FakeOutput::new();
    let mut player = Player::new(output, SavedStateStore::at(state_path));
    player.add_tracks(vec![PathBuf::from("/music/a.mp3")]);
    player.restore(false, RepeatMode::Off);

    assert_eq!(player.state().current, Some(0));
}

#[test]
fn restore_without_a_state_file_uses_the_configured_defaults() {
    let (output, _log) = FakeOutput::new();
    let mut player = Player::new(output, SavedStateStore::disabled());

    player.restore(true, RepeatMode::All);

    assert!(player.state().shuffle);
    assert_eq!(player.state().repeat, RepeatMode::All);
}

#[test]
fn next_and_previous_are_noops_on_an_empty_playlist() {
    let (output, log) = FakeOutput::new();
    let mut player = Player::new(output, SavedStateStore::disabled());

    player.next();
    player.previous();
    player.play();

    assert_eq!(player.state().current, None);
    assert!(!player.state().playing);
    assert_eq!(log.borrow().loads, 0);
}
