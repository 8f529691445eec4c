//! Logging configuration: compile-time bounds plus runtime preferences

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

/// Events retained by a `MemoryLogger` before the oldest are dropped
const MEMORY_BUFFER_SIZE: usize = 10_000;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Preferences are read from the environment once per process
fn get_runtime_preferences() -> &'static LoggingPreferences {
    RUNTIME_PREFERENCES.get_or_init(LoggingPreferences::default)
}

/// Level below which security-relevant events can never be filtered
pub fn get_security_log_level() -> EventsLogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => EventsLogLevel::Error,
        1 => EventsLogLevel::Warning,
        _ => EventsLogLevel::Info,
    }
}

/// Effective minimum level: the user preference, never stricter than the security floor
pub fn get_min_log_level() -> EventsLogLevel {
    let user_level = get_runtime_preferences().min_log_level.to_events_log_level();
    user_level.max(get_security_log_level())
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn log_performance_events() -> bool {
    get_runtime_preferences().log_performance_events
}

pub fn include_grammar_context() -> bool {
    get_runtime_preferences().include_grammar_context
}

pub fn get_memory_buffer_size() -> usize {
    MEMORY_BUFFER_SIZE
}

/// Validate current configuration settings
pub fn validate_config() -> Result<(), String> {
    if MAX_LOG_MESSAGE_LENGTH < 64 {
        return Err(format!(
            "Max log message length too small: {}",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }
    if SECURITY_MIN_LOG_LEVEL > 2 {
        return Err("Security minimum log level must be error, warning or info".to_string());
    }
    Ok(())
}

/// Configuration summary for diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();
    format!(
        "Logging Configuration:\n\
         - Max message length: {}\n\
         - Security min level: {}\n\
         - Min log level: {}\n\
         - Structured logging: {}\n\
         - Performance events: {}\n\
         - Grammar context: {}",
        MAX_LOG_MESSAGE_LENGTH,
        get_security_log_level().as_str(),
        get_min_log_level().as_str(),
        preferences.use_structured_logging,
        preferences.log_performance_events,
        preferences.include_grammar_context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_security_floor_is_respected() {
        assert!(get_min_log_level() >= get_security_log_level());
        assert!(get_security_log_level() <= EventsLogLevel::Info);
    }

    #[test]
    fn test_summary_mentions_levels() {
        let summary = get_config_summary();
        assert!(summary.contains("Min log level"));
        assert!(summary.contains("Security min level"));
    }
}
