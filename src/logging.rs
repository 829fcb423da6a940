// src/logging.rs

use crate::errors::{LoupeError, LoupeResult};
use crate::models::ApiCallLog;
use flexi_logger::{FileSpec, Logger, LoggerHandle};

/// Starts the file logger. The TUI owns the terminal, so everything
/// goes to `loupe.log` in the working directory; the level comes from
/// the config (`LOUPE_LOG_LEVEL` overrides it like any other field).
pub fn init(log_level: &str) -> LoupeResult<LoggerHandle> {
    Logger::try_with_str(log_level)
        .map_err(|e| LoupeError::config(format!("invalid log level: {}", e)))?
        .log_to_file(FileSpec::default().basename("loupe").suppress_timestamp())
        .start()
        .map_err(|e| LoupeError::config(format!("failed to start logger: {}", e)))
}

/// Records one gateway request in the log file.
pub fn log_api_call(call: &ApiCallLog) {
    log::info!(
        "[{}] {} - {} - Status: {} - Time: {}ms",
        call.timestamp.to_rfc3339(),
        call.endpoint,
        call.request_summary,
        call.response_status,
        call.response_time_ms
    );
}
