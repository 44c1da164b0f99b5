use slog::{o, Discard, Logger};
use sloggers::{terminal::TerminalLoggerBuilder, types::Severity, Build};

/// Returns a logger which drops every record.
pub fn null_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Returns a logger writing to stderr at the given `level`, or a `null_logger` if the terminal
/// logger could not be built.
pub fn terminal_logger(level: Severity) -> Logger {
    TerminalLoggerBuilder::new()
        .level(level)
        .build()
        .unwrap_or_else(|_| null_logger())
}

/// Return a logger suitable for test usage.
///
/// By default no logs will be printed, but they can be enabled via the `test_logger` feature:
///
/// ```bash
/// $ cargo test -p state_processing --features 'logging/test_logger'
/// ```
///
/// Without the feature a null logger is returned and all records are discarded.
pub fn test_logger() -> Logger {
    if cfg!(feature = "test_logger") {
        terminal_logger(Severity::Debug)
    } else {
        null_logger()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{debug, info};

    #[test]
    fn test_logger_accepts_records() {
        let log = test_logger();
        info!(log, "hi"; "epoch" => 1);
        debug!(log, "bye");
    }
}
