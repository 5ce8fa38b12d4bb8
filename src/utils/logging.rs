//! Logger setup
//!
//! `RUST_LOG` still overrides the level picked here.

use colored::Colorize;
use log::LevelFilter;
use std::io::Write;

/// Initialize the global logger
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Error => "ERROR".bright_red(),
                log::Level::Warn => "WARN ".yellow(),
                log::Level::Info => "INFO ".green(),
                log::Level::Debug => "DEBUG".blue(),
                log::Level::Trace => "TRACE".magenta(),
            };
            writeln!(buf, "{} {} {}", level, record.target().dimmed(), record.args())
        })
        .try_init();
}
