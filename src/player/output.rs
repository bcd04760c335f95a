//! The media output seam.
//!
//! `MediaOutput` is the playback primitive the controller drives: bind a
//! track's bytes, start/stop, seek, report position/duration and signal the
//! end of the track. `RodioOutput` is the production implementation on top
//! of a rodio mixer; tests drive the controller with a scripted fake.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::library::Track;

use super::error::PlayerError;

pub trait MediaOutput {
    /// Bind the output to `track`'s byte source, paused, at position zero.
    fn load(&mut self, track: &Track) -> Result<(), PlayerError>;

    /// Start or resume playback of the loaded source.
    fn play(&mut self) -> Result<(), PlayerError>;

    fn pause(&mut self);

    /// Move the play position of the loaded source.
    fn seek_to(&mut self, position: Duration) -> Result<(), PlayerError>;

    /// Set output volume; the caller guarantees `volume` is in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);

    /// Elapsed play time of the loaded source.
    fn position(&self) -> Duration;

    /// Total duration of the loaded source, when the decoder knows it.
    fn duration(&self) -> Option<Duration>;

    /// True once the loaded source has played to its end.
    fn finished(&self) -> bool;
}

/// rodio-backed output: one `OutputStream` for the process lifetime, one
/// fresh `Sink` per loaded track.
pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    /// Path of the bound source; seeking rebuilds the sink from it.
    loaded: Option<PathBuf>,
    duration: Option<Duration>,
    volume: f32,
    paused: bool,
    // Elapsed accounting: wall time since the last unpause plus the time
    // accumulated before it.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl RodioOutput {
    pub fn new() -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::Device(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            loaded: None,
            duration: None,
            volume: 1.0,
            paused: true,
            started_at: None,
            accumulated: Duration::ZERO,
        })
    }

    /// Build a paused sink for `path` starting at `start_at`.
    ///
    /// `skip_duration` is the seeking primitive; `Duration::ZERO` is a plain
    /// start from the top.
    fn bind(&mut self, path: &Path, start_at: Duration) -> Result<(), PlayerError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let file = File::open(path).map_err(|source| PlayerError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| PlayerError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        self.duration = source.total_duration();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source.skip_duration(start_at));
        sink.pause();

        self.sink = Some(sink);
        self.paused = true;
        self.started_at = None;
        self.accumulated = start_at;
        Ok(())
    }
}

impl MediaOutput for RodioOutput {
    fn load(&mut self, track: &Track) -> Result<(), PlayerError> {
        self.loaded = None;
        self.duration = None;

        let path = track.path.clone();
        self.bind(&path, Duration::ZERO)?;
        self.loaded = Some(path);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        let Some(sink) = self.sink.as_ref() else {
            return Err(PlayerError::NothingLoaded);
        };
        sink.play();
        if self.paused {
            self.paused = false;
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        if !self.paused {
            if let Some(started_at) = self.started_at.take() {
                self.accumulated += started_at.elapsed();
            }
            self.paused = true;
        }
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), PlayerError> {
        let Some(path) = self.loaded.clone() else {
            return Err(PlayerError::NothingLoaded);
        };

        let was_paused = self.paused;
        self.bind(&path, position)?;
        if !was_paused {
            self.play()?;
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(volume);
        }
    }

    fn position(&self) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |started_at| started_at.elapsed())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn finished(&self) -> bool {
        !self.paused && self.sink.as_ref().is_some_and(|s| s.empty())
    }
}
