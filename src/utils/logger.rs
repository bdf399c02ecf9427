use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[derive(Debug, Clone, Serialize)]
pub struct LogMessage {
    pub level: String,
    pub target: String,
    pub message: String,
    pub timestamp: String,
}

pub struct Logger {
    max_recent_logs: usize,
    recent_logs: VecDeque<LogMessage>,
    console_logging_enabled: bool,
}

impl Logger {
    /// Installs the logger as the `log` backend. The level is read from `LOG_LEVEL`.
    pub fn init(max_recent_logs: usize) -> Result<(), SetLoggerError> {
        let level = level_from_env(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
        Logger::init_with_level(max_recent_logs, level)
    }

    pub fn init_with_level(
        max_recent_logs: usize,
        level: LevelFilter,
    ) -> Result<(), SetLoggerError> {
        let logger = Logger {
            max_recent_logs,
            recent_logs: VecDeque::with_capacity(max_recent_logs),
            console_logging_enabled: true,
        };

        if let Ok(mut global_logger) = LOGGER.lock() {
            *global_logger = Some(logger);
        }

        log::set_logger(&LoggerImplementation)?;
        log::set_max_level(level);

        Ok(())
    }

    fn log(&mut self, record: &Record) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let log_message = LogMessage {
            level: record.level().to_string(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            timestamp,
        };

        if self.console_logging_enabled {
            println!(
                "[{}] {} - {}: {}",
                log_message.timestamp, log_message.level, log_message.target, log_message.message
            );
        }

        if self.max_recent_logs == 0 {
            return;
        }
        if self.recent_logs.len() >= self.max_recent_logs {
            self.recent_logs.pop_front();
        }
        self.recent_logs.push_back(log_message);
    }
}

/// Unknown or missing values fall back to [`DEFAULT_LOG_LEVEL`].
pub fn level_from_env(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

struct LoggerImplementation;

impl log::Log for LoggerImplementation {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut guard) = LOGGER.lock() {
            if let Some(logger) = guard.as_mut() {
                logger.log(record);
            }
        }
    }

    fn flush(&self) {}
}

pub fn get_recent_logs() -> Vec<LogMessage> {
    LOGGER
        .lock()
        .ok()
        .and_then(|guard| {
            guard
                .as_ref()
                .map(|logger| logger.recent_logs.iter().cloned().collect())
        })
        .unwrap_or_default()
}

pub fn set_console_logging(enabled: bool) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            logger.console_logging_enabled = enabled;
        }
    }
}

pub fn clear_logs() {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            logger.recent_logs.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_is_case_insensitive_with_fallback() {
        assert_eq!(level_from_env(Some("warn")), LevelFilter::Warn);
        assert_eq!(level_from_env(Some("INFO")), LevelFilter::Info);
        assert_eq!(level_from_env(Some("loud")), DEFAULT_LOG_LEVEL);
        assert_eq!(level_from_env(None), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn ring_buffer_keeps_most_recent() {
        let mut logger = Logger {
            max_recent_logs: 2,
            recent_logs: VecDeque::new(),
            console_logging_enabled: false,
        };
        for i in 0..3 {
            logger.log(
                &Record::builder()
                    .args(format_args!("message {}", i))
                    .level(log::Level::Info)
                    .target("flowcalc")
                    .build(),
            );
        }
        let messages: Vec<&str> = logger.recent_logs.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(messages, vec!["message 1", "message 2"]);
    }
}
