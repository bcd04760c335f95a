//! Background tag extraction.
//!
//! Tag reading is fire-and-forget: accepted tracks are submitted as jobs, a
//! worker thread parses them with `lofty` and sends back patches. A file that
//! cannot be parsed delivers nothing and the track keeps its fallback display
//! fields. Results are drained on the main loop and applied only if the track
//! id still resolves, so a late result for a vanished track is harmless.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::PictureType;
use lofty::tag::ItemKey;

use super::model::{CoverArt, TrackId};

/// A completed tag read for one track. Absent fields were not present in the
/// tag; the track's fallbacks stay in place for those.
pub struct TagUpdate {
    pub id: TrackId,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<CoverArt>,
    pub duration: Option<Duration>,
}

/// Handle to the tag extraction thread.
pub struct TagWorker {
    jobs: Option<Sender<(TrackId, PathBuf)>>,
    results: Receiver<TagUpdate>,
    join: Option<JoinHandle<()>>,
}

impl TagWorker {
    pub fn spawn() -> Self {
        let (job_tx, job_rx) = mpsc::channel::<(TrackId, PathBuf)>();
        let (result_tx, result_rx) = mpsc::channel::<TagUpdate>();

        let join = thread::spawn(move || {
            while let Ok((id, path)) = job_rx.recv() {
                if let Some(update) = read_tags(id, &path) {
                    if result_tx.send(update).is_err() {
                        break;
                    }
                }
            }
        });

        Self {
            jobs: Some(job_tx),
            results: result_rx,
            join: Some(join),
        }
    }

    /// Queue a tag read for `path`. Never blocks.
    pub fn submit(&self, id: TrackId, path: PathBuf) {
        if let Some(jobs) = &self.jobs {
            let _ = jobs.send((id, path));
        }
    }

    /// Fetch one finished result, if any arrived since the last call.
    pub fn try_recv(&self) -> Option<TagUpdate> {
        self.results.try_recv().ok()
    }
}

impl Drop for TagWorker {
    fn drop(&mut self) {
        // Closing the job channel lets the worker finish its current read
        // and exit; join so the thread never outlives the terminal session.
        self.jobs.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Read tags for one file. `None` when the file cannot be parsed.
fn read_tags(id: TrackId, path: &Path) -> Option<TagUpdate> {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            log::debug!("tag read failed for {}: {e}", path.display());
            return None;
        }
    };

    let duration = Some(tagged.properties().duration());

    let mut title: Option<String> = None;
    let mut artist: Option<String> = None;
    let mut cover: Option<CoverArt> = None;

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
            let v = v.trim();
            if !v.is_empty() {
                title = Some(v.to_string());
            }
        }
        if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
            let v = v.trim();
            if !v.is_empty() {
                artist = Some(v.to_string());
            }
        }

        let picture = tag
            .pictures()
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| tag.pictures().first());
        if let Some(p) = picture {
            cover = Some(CoverArt {
                mime: p
                    .mime_type()
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                data: p.data().to_vec(),
            });
        }
    }

    Some(TagUpdate {
        id,
        title,
        artist,
        cover,
        duration,
    })
}
