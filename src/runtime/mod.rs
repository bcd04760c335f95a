use std::env;
use std::path::PathBuf;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config::saved::SavedStateStore;
use crate::library::{intake, tags::TagWorker};
use crate::player::{Player, RodioOutput};

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    settings::init_logging(&settings.logging);

    let args: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    let paths = if args.is_empty() {
        vec![env::current_dir()?]
    } else {
        args
    };
    let files = intake::collect(&paths, &settings.library);

    let output = RodioOutput::new()?;
    let mut player = Player::new(output, SavedStateStore::at_default_path());
    let tag_worker = TagWorker::spawn();
    startup::populate(&mut player, &tag_worker, files, &settings);

    let mut app = App::new();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &mut player, &tag_worker);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
