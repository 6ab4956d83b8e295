#![deny(missing_docs)]
//! Shared logging utilities for the docqa workspace.
//!
//! This crate provides the `docqa_*` logging macros used across the codebase,
//! the logger initialisation used by the console app, and a minimal test
//! initializer for the global logger.

use std::cell::Cell;
use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

thread_local! {
    /// Thread-local storage for the current event-loop turn.
    static LOOP_TURN: Cell<u64> = const { Cell::new(0) };
}

/// Sets the event-loop turn for the current thread.
/// The session loop calls this once per dispatched message.
pub fn set_loop_turn(turn: u64) {
    LOOP_TURN.with(|v| v.set(turn));
}

/// Retrieves the event-loop turn for the current thread.
/// Returns 0 on threads that never dispatch messages (engine workers).
pub fn loop_turn() -> u64 {
    LOOP_TURN.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current loop turn.
#[macro_export]
macro_rules! docqa_trace {
    ($($arg:tt)*) => {{
        log::trace!("[turn {}] {}", $crate::loop_turn(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current loop turn.
#[macro_export]
macro_rules! docqa_debug {
    ($($arg:tt)*) => {{
        log::debug!("[turn {}] {}", $crate::loop_turn(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current loop turn.
#[macro_export]
macro_rules! docqa_info {
    ($($arg:tt)*) => {{
        log::info!("[turn {}] {}", $crate::loop_turn(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current loop turn.
#[macro_export]
macro_rules! docqa_warn {
    ($($arg:tt)*) => {{
        log::warn!("[turn {}] {}", $crate::loop_turn(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current loop turn.
#[macro_export]
macro_rules! docqa_error {
    ($($arg:tt)*) => {{
        log::error!("[turn {}] {}", $crate::loop_turn(), format_args!($($arg)*));
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the given log file only.
    File,
    /// Write to the terminal (stderr/stdout mixed).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the global logger.
///
/// For `LogDestination::File` or `Both`, the file at `log_path` is truncated.
/// If the file cannot be created the file logger is skipped with a warning on
/// stderr. Calling this twice is harmless: the second call is ignored.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_path: &Path) {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        match File::create(log_path) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => {
                eprintln!("Warning: Could not create log file at {log_path:?}: {err}");
            }
        }
    }
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
