// Minimal stderr logger for the host binary.
// Level comes from PNG2BMP_LOG (off, error, warn, info, debug, trace);
// unset or unparsable means warn.

use log::{LevelFilter, Log, Metadata, Record};

pub const ENV_VAR: &str = "PNG2BMP_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

pub fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

/// Install the logger; a second call is a no-op.
pub fn init_logger_from_env() {
    let level = level_from(std::env::var(ENV_VAR).ok().as_deref());
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
