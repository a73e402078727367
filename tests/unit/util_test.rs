//! Tests for utility functions

use prometheus_tickbus::util::{init_tracing, map_range, DEFAULT_FILTER};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn test_map_range_unclamped() {
    assert!(close(map_range(0.5, 0.0, 1.0, 10.0, 20.0, false), 15.0));
    assert!(close(map_range(2.0, 0.0, 1.0, 10.0, 20.0, false), 30.0));
    assert!(close(map_range(-1.0, -2.0, 0.0, 0.0, 1.0, false), 0.5));
}

#[test]
fn test_map_range_clamped() {
    assert!(close(map_range(2.0, 0.0, 1.0, 10.0, 20.0, true), 20.0));
    assert!(close(map_range(-5.0, 0.0, 1.0, 10.0, 20.0, true), 10.0));
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized with fallback filter {}", DEFAULT_FILTER);
}
