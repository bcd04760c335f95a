use std::fs::File;

use simplelog::WriteLogger;

use crate::config::{self, LoggingSettings};

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("mukera: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("mukera: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}

/// Set up the file logger. The UI owns the terminal, so logging anywhere
/// else would corrupt the screen; failures here just leave logging off.
pub fn init_logging(logging: &LoggingSettings) {
    let Some(path) = &logging.file else {
        return;
    };
    let filter = logging.level.to_filter();
    if filter == log::LevelFilter::Off {
        return;
    }

    if let Ok(file) = File::create(path) {
        let _ = WriteLogger::init(filter, simplelog::Config::default(), file);
    }
}
