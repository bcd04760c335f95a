//! UI-side application model.
//!
//! `App` holds the selection cursor and the filter input. Filtering narrows
//! what the list shows; it never affects what the sequencer does — playback
//! always runs over the full playlist.

use crate::library::Playlist;

pub struct App {
    /// Playlist index under the selection cursor.
    pub selected: usize,
    /// While true, typed characters feed the filter query and the playback
    /// shortcut keys are suppressed.
    pub filter_mode: bool,
    pub filter_query: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            selected: 0,
            filter_mode: false,
            filter_query: String::new(),
        }
    }

    /// Playlist indices visible under the current filter, in playlist order.
    ///
    /// The query matches case-insensitively against "title artist", the same
    /// haystack the list renders.
    pub fn display_indices(&self, playlist: &Playlist) -> Vec<usize> {
        let query = self.filter_query.trim().to_lowercase();
        playlist
            .tracks()
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                if query.is_empty() {
                    return true;
                }
                let haystack = format!("{} {}", t.title, t.artist).to_lowercase();
                haystack.contains(&query)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Move the cursor to the next visible track, wrapping at the end.
    pub fn select_next(&mut self, playlist: &Playlist) {
        let display = self.display_indices(playlist);
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(pos) => display[(pos + 1) % display.len()],
            None => display[0],
        };
    }

    /// Move the cursor to the previous visible track, wrapping at the start.
    pub fn select_prev(&mut self, playlist: &Playlist) {
        let display = self.display_indices(playlist);
        if display.is_empty() {
            return;
        }
        self.selected = match display.iter().position(|&i| i == self.selected) {
            Some(0) | None => display[display.len() - 1],
            Some(pos) => display[pos - 1],
        };
    }

    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Drop the filter entirely and restore a visible selection.
    pub fn clear_filter(&mut self, playlist: &Playlist) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible(playlist);
    }

    pub fn push_filter_char(&mut self, c: char, playlist: &Playlist) {
        self.filter_query.push(c);
        self.ensure_selected_visible(playlist);
    }

    pub fn pop_filter_char(&mut self, playlist: &Playlist) {
        self.filter_query.pop();
        self.ensure_selected_visible(playlist);
    }

    /// Keep the cursor on a visible track, falling back to the first one.
    fn ensure_selected_visible(&mut self, playlist: &Playlist) {
        let display = self.display_indices(playlist);
        if display.is_empty() {
            self.selected = 0;
            return;
        }
        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
