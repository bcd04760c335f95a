//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::player::{MediaOutput, Player, RepeatMode};

/// Render the controls help text, incorporating the configured seek step.
fn controls_text(seek_step_secs: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[enter] play selected".to_string(),
        "[space] play/pause".to_string(),
        "[h/l ←/→] prev/next".to_string(),
        format!("[H/L] seek -/+{}s", seek_step_secs),
        "[e/d] queue/unqueue".to_string(),
        "[c] clear queue".to_string(),
        "[s] shuffle".to_string(),
        "[r] repeat".to_string(),
        "[-/+] volume".to_string(),
        "[/] filter".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "off",
        RepeatMode::One => "one",
        RepeatMode::All => "all",
    }
}

/// The lines shown in the now-playing box: track line, then either the
/// transient error or detail line.
fn now_playing_lines<O: MediaOutput>(player: &Player<O>) -> Vec<String> {
    let Some(track) = player.current_track() else {
        return vec!["No track loaded".to_string()];
    };

    let mut lines = Vec::new();
    if track.artist.is_empty() {
        lines.push(track.title.clone());
    } else {
        lines.push(format!("{} — {}", track.artist, track.title));
    }

    if let Some(status) = player.status() {
        lines.push(status.to_string());
    } else {
        let state = if player.state().playing {
            "Playing"
        } else {
            "Paused"
        };
        let cover = match &track.cover {
            Some(art) if !art.mime.is_empty() => format!("  ♪ cover: {}", art.mime),
            Some(_) => "  ♪ cover".to_string(),
            None => String::new(),
        };
        lines.push(format!("{state}{cover}"));
    }
    lines
}

/// Render the entire UI into the provided `frame`.
pub fn draw<O: MediaOutput>(
    frame: &mut Frame,
    app: &App,
    player: &Player<O>,
    display: &[usize],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" mukera ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing
    let now = Paragraph::new(now_playing_lines(player).join("\n"))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(now, chunks[1]);

    // Progress
    {
        let position = player.position();
        let duration = player.duration();
        let ratio = match duration {
            Some(d) if !d.is_zero() => (position.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0),
            _ => 0.0,
        };
        let label = match duration {
            Some(d) => format!("{} / {}", format_mmss(position.min(d)), format_mmss(d)),
            None => format_mmss(position),
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" position "))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, chunks[2]);
    }

    // Track list + queue
    {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(chunks[3]);

        let playlist = player.playlist();
        let current = player.state().current;

        let items: Vec<ListItem> = display
            .iter()
            .map(|&i| {
                let track = &playlist.tracks()[i];
                let marker = if current == Some(i) { "▶ " } else { "  " };
                let label = if track.artist.is_empty() {
                    format!("{marker}{}", track.title)
                } else {
                    format!("{marker}{} — {}", track.artist, track.title)
                };
                if player.queue().contains(track.id) {
                    ListItem::new(label).style(Style::default().add_modifier(Modifier::ITALIC))
                } else {
                    ListItem::new(label)
                }
            })
            .collect();

        let title = if display.len() == playlist.len() {
            format!(" tracks ({}) ", playlist.len())
        } else {
            format!(" tracks ({}/{}) ", display.len(), playlist.len())
        };
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if let Some(pos) = display.iter().position(|&i| i == app.selected) {
            state.select(Some(pos));
        }
        frame.render_stateful_widget(list, columns[0], &mut state);

        // Queue pane: entries in play order; ids that no longer resolve are
        // simply not shown.
        let queue_items: Vec<ListItem> = player
            .queue()
            .iter()
            .filter_map(|id| playlist.index_of(id))
            .enumerate()
            .map(|(pos, i)| {
                let track = &playlist.tracks()[i];
                ListItem::new(format!("{}. {}", pos + 1, track.title))
            })
            .collect();
        let queue_list = List::new(queue_items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" queue ({}) ", player.queue().len())),
        );
        frame.render_widget(queue_list, columns[1]);
    }

    // Footer: controls plus playback flags / filter input.
    {
        let state = player.state();
        let mut flags = vec![
            format!("vol {:>3.0}%", state.volume * 100.0),
            format!("shuffle {}", if state.shuffle { "on" } else { "off" }),
            format!("repeat {}", repeat_label(state.repeat)),
        ];
        if app.filter_mode || !app.filter_query.trim().is_empty() {
            flags.push(format!("filter: {}", app.filter_query));
        }

        let footer = Paragraph::new(format!(
            "{}\n{}",
            controls_text(controls_settings.seek_step_secs),
            flags.join(" • ")
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
        frame.render_widget(footer, chunks[4]);
    }
}
