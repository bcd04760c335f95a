use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque identifier for a track, unique within a playlist.
///
/// Queue entries refer to tracks by id; an id that no longer resolves is a
/// stale reference and is skipped at dequeue time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(u64);

/// Embedded cover art extracted from a tag.
#[derive(Clone)]
pub struct CoverArt {
    pub mime: String,
    pub data: Vec<u8>,
}

/// One playable audio item plus its display metadata.
///
/// `title`, `artist`, `cover` and `duration` start as fallbacks and are
/// patched at most once per field when tag extraction for the file completes.
#[derive(Clone)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    /// File-derived display name, also the title fallback.
    pub display: String,
    pub title: String,
    pub artist: String,
    pub cover: Option<CoverArt>,
    pub duration: Option<Duration>,
}

impl Track {
    fn new(id: TrackId, path: PathBuf) -> Self {
        let display = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        Self {
            id,
            path,
            title: display.clone(),
            display,
            artist: String::new(),
            cover: None,
            duration: None,
        }
    }
}

/// The ordered set of all tracks loaded into the session.
///
/// Insertion order is preserved and the collection is append-only from the
/// player's perspective; ids come from a process-wide monotonic counter, so
/// an id never resolves against a playlist that does not hold its track.
#[derive(Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new track for `path` and return its freshly assigned id.
    pub fn add(&mut self, path: PathBuf) -> TrackId {
        let id = TrackId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        self.tracks.push(Track::new(id, path));
        id
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Resolve a track id to its current playlist index.
    pub fn index_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn by_id_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
