use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub struct Logger {
    severity: Level,
    enable_colors: bool,
}

impl Logger {
    /// Initialize the logger from environment variables. Severity comes
    /// from `MDVIEW_LOG` (falling back to `RUST_LOG`); colors honor
    /// `NO_COLOR`.
    pub fn init() -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("MDVIEW_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string())
            .parse::<Level>()
            .unwrap_or(Level::Info);
        let enable_colors = std::env::var("NO_COLOR").is_err();

        let logger = Logger {
            severity,
            enable_colors,
        };
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))
    }

    fn timestamp() -> String {
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default()
    }

    fn color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Debug => "\x1b[35m",
            Level::Trace => "\x1b[37m",
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Self::timestamp();
        let level = record.level().as_str();
        let args = record.args();

        let line = if self.enable_colors {
            let color = Self::color(record.level());
            format!("{color}[{timestamp}] {level}\x1b[0m {args}\n")
        } else {
            format!("[{timestamp}] {level} {args}\n")
        };

        let _ = std::io::stderr().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
