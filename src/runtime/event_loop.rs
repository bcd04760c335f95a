use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::player::{MediaOutput, Player};
use crate::ui;

/// Main terminal event loop.
///
/// One logical thread of control: finished tag reads are drained, the
/// controller ticks (auto-advance happens synchronously in here, never on a
/// deferred callback), the UI draws, then input is polled for 50ms. Returns
/// `Ok(())` when shutdown is requested.
pub fn run<O: MediaOutput>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player<O>,
    tag_worker: &crate::library::tags::TagWorker,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Apply finished tag reads; results for vanished tracks are dropped
        // inside the controller.
        while let Some(update) = tag_worker.try_recv() {
            player.apply_tag_update(update);
        }

        player.tick();

        let display = app.display_indices(player.playlist());
        terminal.draw(|f| {
            ui::draw(f, app, player, &display, &settings.ui, &settings.controls)
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(key, settings, app, player) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Dispatch one key press. Returns true when the app should quit.
fn handle_key<O: MediaOutput>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player<O>,
) -> bool {
    // Filter mode captures printable characters (including space) for the
    // query, so the playback shortcuts are suppressed while it is active.
    if app.filter_mode {
        match key.code {
            KeyCode::Esc => app.clear_filter(player.playlist()),
            KeyCode::Backspace => app.pop_filter_char(player.playlist()),
            KeyCode::Enter => {
                app.exit_filter_mode();
                if player.playlist().get(app.selected).is_some() {
                    player.select(app.selected);
                }
            }
            KeyCode::Down => app.select_next(player.playlist()),
            KeyCode::Up => app.select_prev(player.playlist()),
            KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c, player.playlist()),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => app.enter_filter_mode(),

        KeyCode::Char(' ') | KeyCode::Char('p') => player.toggle(),
        KeyCode::Right | KeyCode::Char('l') => player.next(),
        KeyCode::Left | KeyCode::Char('h') => player.previous(),
        KeyCode::Char('s') => player.toggle_shuffle(),
        KeyCode::Char('r') => player.cycle_repeat(),

        KeyCode::Down | KeyCode::Char('j') => app.select_next(player.playlist()),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(player.playlist()),
        KeyCode::Enter => {
            if player.playlist().get(app.selected).is_some() {
                player.select(app.selected);
            }
        }

        KeyCode::Char('e') => {
            if let Some(track) = player.playlist().get(app.selected) {
                let id = track.id;
                player.enqueue(id);
            }
        }
        KeyCode::Char('d') => {
            if let Some(track) = player.playlist().get(app.selected) {
                let id = track.id;
                player.dequeue(id);
            }
        }
        KeyCode::Char('c') => player.clear_queue(),

        KeyCode::Char('H') => player.seek_by(-(settings.controls.seek_step_secs as i64)),
        KeyCode::Char('L') => player.seek_by(settings.controls.seek_step_secs as i64),

        KeyCode::Char('+') | KeyCode::Char('=') => {
            player.adjust_volume(settings.controls.volume_step)
        }
        KeyCode::Char('-') => player.adjust_volume(-settings.controls.volume_step),

        _ => {}
    }

    false
}
