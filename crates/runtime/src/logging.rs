use std::sync::OnceLock;

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::{PROGRAM_LOG_LEVEL, PROGRAM_NAME};

/// Records from dependencies are capped at this level regardless of
/// `TRAWL_LOG_LEVEL`.
const FOREIGN_LEVEL: Level = Level::Warn;

pub struct Logger {
    level: Level,
}

impl Logger {
    fn threshold(&self, target: &str) -> Level {
        if is_own_target(target) {
            self.level
        } else {
            self.level.min(FOREIGN_LEVEL)
        }
    }
}

/// Targets of the `trawl` binary and the `trawl_*` library crates.
fn is_own_target(target: &str) -> bool {
    let krate = target.split("::").next().unwrap_or(target);
    krate == PROGRAM_NAME
        || krate
            .strip_prefix(PROGRAM_NAME)
            .is_some_and(|rest| rest.starts_with('_'))
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        eprintln!(
            "{} {:<5} [{}] {}",
            timestamp,
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(get_level_from_env())
}

/// Install the stderr logger. Only the first call takes effect.
pub fn init_with_level(level: Level) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // set_max_level must agree with the level the logger was created with,
    // so only the call that creates it gets to set either.
    let init_call = LOGGER.get().is_none();

    let logger = LOGGER.get_or_init(|| Logger { level });

    if init_call {
        log::set_logger(logger)?;
        log::set_max_level(level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
