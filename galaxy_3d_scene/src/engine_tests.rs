//! Unit tests for the Engine logging hub
//!
//! IMPORTANT: LOGGER is a global OnceLock shared across all tests.
//! All tests are marked with #[serial] to run sequentially, and the capture
//! logger keeps only entries from `SOURCE` so scene tests running in
//! parallel cannot leak into the counts.

use crate::galaxy3d::{Engine, DEFAULT_MIN_SEVERITY};
use crate::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

const SOURCE: &str = "galaxy3d::EngineTest";

/// Test logger that captures formatted entries from `SOURCE`
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source != SOURCE {
            return;
        }
        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" @{}:{}", file, line),
            _ => String::new(),
        };
        self.entries.lock().unwrap().push(format!(
            "{:?} [{}] {}{}",
            entry.severity, entry.source, entry.message, location
        ));
    }
}

// ============================================================================
// LOGGER ROUTING
// ============================================================================

#[test]
#[serial]
fn test_set_logger_routes_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, SOURCE, "hello".to_string());

    Engine::reset_logger();

    let captured = entries.lock().unwrap();
    assert_eq!(captured.as_slice(), ["Info [galaxy3d::EngineTest] hello"]);
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log_detailed(
        LogSeverity::Error,
        SOURCE,
        "bad frustum".to_string(),
        "view.rs",
        12,
    );

    Engine::reset_logger();

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].ends_with("@view.rs:12"));
}

#[test]
#[serial]
fn test_macros_use_engine_hub() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Trace);

    crate::engine_trace!(SOURCE, "t {}", 1);
    crate::engine_debug!(SOURCE, "d {}", 2);
    crate::engine_info!(SOURCE, "i {}", 3);
    crate::engine_warn!(SOURCE, "w {}", 4);
    crate::engine_error!(SOURCE, "e {}", 5);

    Engine::reset_logger();

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 5);
    assert!(captured[0].starts_with("Trace"));
    assert!(captured[3].starts_with("Warn"));
    assert!(captured[4].starts_with("Error"));
    assert!(captured[4].contains("engine_tests.rs"));
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, SOURCE, "to stdout".to_string());

    assert!(entries.lock().unwrap().is_empty());
}

// ============================================================================
// SEVERITY FILTER
// ============================================================================

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Warn);
    assert_eq!(Engine::min_severity(), LogSeverity::Warn);

    Engine::log(LogSeverity::Info, SOURCE, "dropped".to_string());
    Engine::log(LogSeverity::Warn, SOURCE, "kept".to_string());
    Engine::log(LogSeverity::Error, SOURCE, "kept too".to_string());

    Engine::reset_logger();

    assert_eq!(entries.lock().unwrap().len(), 2);
    assert_eq!(Engine::min_severity(), DEFAULT_MIN_SEVERITY);
}

#[test]
#[serial]
fn test_default_floor_drops_per_frame_chatter() {
    Engine::set_min_severity(LogSeverity::Trace);
    Engine::reset_logger();
    assert_eq!(Engine::min_severity(), LogSeverity::Info);

    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    crate::engine_trace!(SOURCE, "pass {}", 1);
    crate::engine_debug!(SOURCE, "pass {}", 2);
    crate::engine_info!(SOURCE, "kept");

    Engine::reset_logger();

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert!(captured[0].starts_with("Info"));
}
