//! Pure next/previous decisions.
//!
//! Given the playback state, the playlist and the manual queue, these
//! functions decide which index plays next. They never touch the media
//! output; the controller applies the decision. Randomness is injected so
//! callers (and tests) control the generator.

use rand::Rng;

use crate::library::Playlist;

use super::queue::PlayQueue;
use super::types::{PlaybackState, RepeatMode};

/// Outcome of a sequencing decision.
///
/// `next: None` means there is nothing to do (empty playlist). `stop` means
/// playback halts on the current selection without reloading.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Decision {
    pub next: Option<usize>,
    pub stop: bool,
}

impl Decision {
    fn advance(index: usize) -> Self {
        Self {
            next: Some(index),
            stop: false,
        }
    }

    fn noop() -> Self {
        Self {
            next: None,
            stop: false,
        }
    }
}

/// Decide what plays after the current track, on advance or end-of-track.
///
/// Priority order: the manual queue (stale entries skipped, consumed from
/// `queue`), then shuffle, then linear advance with repeat handling at the
/// last index.
pub fn decide_next(
    state: &PlaybackState,
    playlist: &Playlist,
    queue: &mut PlayQueue,
    rng: &mut impl Rng,
) -> Decision {
    if playlist.is_empty() {
        return Decision::noop();
    }

    if let Some(index) = queue.pop_resolved(playlist) {
        return Decision::advance(index);
    }

    let len = playlist.len();
    let Some(cur) = state.current else {
        // Nothing loaded yet: start at the top.
        return Decision::advance(0);
    };

    if state.shuffle {
        return Decision::advance(random_other(cur, len, rng));
    }

    if cur + 1 < len {
        return Decision::advance(cur + 1);
    }

    match state.repeat {
        RepeatMode::All => Decision::advance(0),
        RepeatMode::One => Decision::advance(cur),
        RepeatMode::Off => Decision {
            next: Some(cur),
            stop: true,
        },
    }
}

/// Decide what plays when the user skips backwards.
///
/// The manual queue is not consulted; shuffle picks a random distinct index
/// and linear mode wraps from the first track to the last.
pub fn decide_previous(
    state: &PlaybackState,
    playlist: &Playlist,
    rng: &mut impl Rng,
) -> Decision {
    if playlist.is_empty() {
        return Decision::noop();
    }

    let len = playlist.len();
    let Some(cur) = state.current else {
        return Decision::advance(0);
    };

    if state.shuffle {
        return Decision::advance(random_other(cur, len, rng));
    }

    Decision::advance((cur + len - 1) % len)
}

/// Uniformly random index different from `cur`; with a single track there is
/// no distinct index to pick, so it degenerates to `cur` instead of looping.
fn random_other(cur: usize, len: usize, rng: &mut impl Rng) -> usize {
    if len <= 1 {
        return cur;
    }
    loop {
        let candidate = rng.gen_range(0..len);
        if candidate != cur {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::TrackId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::PathBuf;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn playlist_of(n: usize) -> (Playlist, Vec<TrackId>) {
        let mut playlist = Playlist::new();
        let ids = (0..n)
            .map(|i| playlist.add(PathBuf::from(format!("/music/{i}.mp3"))))
            .collect();
        (playlist, ids)
    }

    fn state_at(current: usize) -> PlaybackState {
        PlaybackState {
            current: Some(current),
            ..PlaybackState::default()
        }
    }

    #[test]
    fn next_advances_linearly_mid_playlist() {
        let (playlist, _) = playlist_of(3);
        let state = state_at(0);
        let mut queue = PlayQueue::new();

        let d = decide_next(&state, &playlist, &mut queue, &mut rng());
        assert_eq!(d, Decision { next: Some(1), stop: false });
    }

    #[test]
    fn repeat_all_wraps_from_last_index_to_zero() {
        let (playlist, _) = playlist_of(3);
        let mut state = state_at(2);
        state.repeat = RepeatMode::All;
        let mut queue = PlayQueue::new();

        let d = decide_next(&state, &playlist, &mut queue, &mut rng());
        assert_eq!(d, Decision { next: Some(0), stop: false });
    }

    #[test]
    fn repeat_off_stops_at_last_index_keeping_selection() {
        let (playlist, _) = playlist_of(2);
        let state = state_at(1);
        let mut queue = PlayQueue::new();

        let d = decide_next(&state, &playlist, &mut queue, &mut rng());
        assert_eq!(d, Decision { next: Some(1), stop: true });
    }

    #[test]
    fn repeat_one_replays_the_last_index() {
        let (playlist, _) = playlist_of(3);
        let mut state = state_at(2);
        state.repeat = RepeatMode::One;
        let mut queue = PlayQueue::new();

        let d = decide_next(&state, &playlist, &mut queue, &mut rng());
        assert_eq!(d, Decision { next: Some(2), stop: false });
    }

    #[test]
    fn repeat_one_still_advances_mid_playlist() {
        let (playlist, _) = playlist_of(3);
        let mut state = state_at(0);
        state.repeat = RepeatMode::One;
        let mut queue = PlayQueue::new();

        let d = decide_next(&state, &playlist, &mut queue, &mut rng());
        assert_eq!(d, Decision { next: Some(1), stop: false });
    }

    #[test]
    fn shuffle_picks_a_distinct_index() {
        let (playlist, _) = playlist_of(5);
        let mut state = state_at(2);
        state.shuffle = true;
        let mut queue = PlayQueue::new();
        let mut rng = rng();

        for _ in 0..50 {
            let d = decide_next(&state, &playlist, &mut queue, &mut rng);
            let next = d.next.unwrap();
            assert!(next < 5);
            assert_ne!(next, 2);
            assert!(!d.stop);
        }
    }

    #[test]
    fn shuffle_on_single_track_replays_without_looping_forever() {
        let (playlist, _) = playlist_of(1);
        let mut state = state_at(0);
        state.shuffle = true;
        let mut queue = PlayQueue::new();
        let mut rng = rng();

        let d = decide_next(&state, &playlist, &mut queue, &mut rng);
        assert_eq!(d, Decision { next: Some(0), stop: false });

        let d = decide_previous(&state, &playlist, &mut rng);
        assert_eq!(d, Decision { next: Some(0), stop: false });
    }

    #[test]
    fn queue_beats_shuffle_and_repeat() {
        let (playlist, ids) = playlist_of(3);
        let mut state = state_at(0);
        state.shuffle = true;
        state.repeat = RepeatMode::All;

        let mut queue = PlayQueue::new();
        queue.enqueue(ids[1]);

        let d = decide_next(&state, &playlist, &mut queue, &mut rng());
        assert_eq!(d, Decision { next: Some(1), stop: false });
        assert!(queue.is_empty());
    }

    #[test]
    fn stale_queue_head_is_skipped_to_the_next_valid_entry() {
        let (playlist, ids) = playlist_of(3);
        let mut foreign = Playlist::new();
        let stale = foreign.add(PathBuf::from("/elsewhere/x.mp3"));

        let state = state_at(0);
        let mut queue = PlayQueue::new();
        queue.enqueue(stale);
        queue.enqueue(ids[2]);

        let d = decide_next(&state, &playlist, &mut queue, &mut rng());
        assert_eq!(d, Decision { next: Some(2), stop: false });
        assert!(queue.is_empty());
    }

    #[test]
    fn exhausted_stale_queue_falls_through_to_linear_advance() {
        let (playlist, _) = playlist_of(3);
        let mut foreign = Playlist::new();
        let stale = foreign.add(PathBuf::from("/elsewhere/x.mp3"));

        let state = state_at(0);
        let mut queue = PlayQueue::new();
        queue.enqueue(stale);

        let d = decide_next(&state, &playlist, &mut queue, &mut rng());
        assert_eq!(d, Decision { next: Some(1), stop: false });
    }

    #[test]
    fn previous_wraps_from_first_to_last() {
        let (playlist, _) = playlist_of(4);
        let state = state_at(0);

        let d = decide_previous(&state, &playlist, &mut rng());
        assert_eq!(d, Decision { next: Some(3), stop: false });
    }

    #[test]
    fn previous_steps_back_mid_playlist() {
        let (playlist, _) = playlist_of(4);
        let state = state_at(2);

        let d = decide_previous(&state, &playlist, &mut rng());
        assert_eq!(d, Decision { next: Some(1), stop: false });
    }

    #[test]
    fn empty_playlist_is_a_noop_for_both_directions() {
        let playlist = Playlist::new();
        let state = PlaybackState::default();
        let mut queue = PlayQueue::new();
        let mut rng = rng();

        assert_eq!(
            decide_next(&state, &playlist, &mut queue, &mut rng),
            Decision { next: None, stop: false }
        );
        assert_eq!(
            decide_previous(&state, &playlist, &mut rng),
            Decision { next: None, stop: false }
        );
    }
}
