//! Integration tests for scene logging
//!
//! Verify that scene components report through the Engine logging hub and
//! that the severity floor and logger reset behave.
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_scene::galaxy3d::{Engine, Error, Scene, SceneElement, Transform};
use galaxy_3d_scene::galaxy3d::{BoundingVolume, View};
use galaxy_3d_scene::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use galaxy_3d_scene::glam::Vec3;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn install() -> Arc<Mutex<Vec<LogEntry>>> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        Engine::set_logger(Self { entries: entries.clone() });
        entries
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// SCENE SOURCES
// ============================================================================

#[test]
#[serial]
fn test_integration_negative_dt_is_logged_as_error() {
    let entries = TestLogger::install();

    let mut scene = Scene::new();
    let result = scene.update(-0.5);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));

    {
        let captured = entries.lock().unwrap();
        let error = captured
            .iter()
            .find(|e| e.severity == LogSeverity::Error)
            .expect("error entry");
        assert_eq!(error.source, "galaxy3d::Scene");
        assert!(error.message.contains("-0.5"));
        assert!(error.file.is_some());
        assert!(error.line.is_some());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_invalid_projection_is_logged() {
    let entries = TestLogger::install();

    let mut view = View::new();
    assert!(view.set_perspective(1.0, 1.0, 10.0, 1.0).is_err());

    {
        let captured = entries.lock().unwrap();
        assert!(captured
            .iter()
            .any(|e| e.severity == LogSeverity::Error && e.source == "galaxy3d::View"));
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_degenerate_bounds_warns_and_continues() {
    let entries = TestLogger::install();

    let mut scene = Scene::new();
    let bounds = BoundingVolume::sphere(Vec3::ZERO, 1.0).unwrap();
    let broken = scene.add_element(
        SceneElement::new()
            .with_transform(Transform::from_scale(Vec3::splat(f32::INFINITY)))
            .with_local_bounds(bounds),
    );
    let healthy = scene.add_element(
        SceneElement::new()
            .with_translation(Vec3::new(3.0, 0.0, 0.0))
            .with_local_bounds(bounds),
    );

    scene.update(0.0).unwrap();

    assert!(scene.element(broken).unwrap().world_bounds().is_none());
    assert!(scene.element(healthy).unwrap().world_bounds().is_some());
    {
        let captured = entries.lock().unwrap();
        assert!(captured
            .iter()
            .any(|e| e.severity == LogSeverity::Warn && e.source == "galaxy3d::SceneElement"));
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_update_emits_trace_summary() {
    let entries = TestLogger::install();
    Engine::set_min_severity(LogSeverity::Trace);

    let mut scene = Scene::new();
    scene.add_element(SceneElement::new());
    scene.update(0.0).unwrap();

    {
        let captured = entries.lock().unwrap();
        let trace = captured
            .iter()
            .find(|e| e.severity == LogSeverity::Trace && e.source == "galaxy3d::Scene")
            .expect("trace summary");
        assert!(trace.message.contains("1 elements"));
    }

    Engine::reset_logger();
}

// ============================================================================
// SEVERITY FLOOR AND RESET
// ============================================================================

#[test]
#[serial]
fn test_integration_min_severity_filters_scene_chatter() {
    let entries = TestLogger::install();
    Engine::set_min_severity(LogSeverity::Warn);

    let mut scene = Scene::new();
    scene.add_element(SceneElement::new());
    scene.update(0.0).unwrap();
    assert!(scene.update(f32::NAN).is_err());

    {
        let captured = entries.lock().unwrap();
        assert!(captured.iter().all(|e| e.severity >= LogSeverity::Warn));
        assert_eq!(captured.len(), 1);
    }

    Engine::reset_logger();
    assert_eq!(Engine::min_severity(), LogSeverity::Info);
}

#[test]
#[serial]
fn test_integration_logger_reset_detaches_capture() {
    let entries = TestLogger::install();
    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "Message 1");
}
