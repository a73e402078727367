//! Tests for the tokio tick driver

use std::time::{Duration, Instant};

use prometheus_tickbus::core::{JobSpec, RuntimeError};
use prometheus_tickbus::runtime::{Runtime, TickDriver};

#[test]
fn test_tick_driver_rejects_zero_period() {
    assert!(matches!(
        TickDriver::new(Duration::ZERO),
        Err(RuntimeError::InvalidConfig(_))
    ));
    assert!(TickDriver::from_hz(0.0).is_err());
    assert!(TickDriver::from_hz(f32::NAN).is_err());
}

#[test]
fn test_tick_driver_from_hz() {
    let driver = TickDriver::from_hz(100.0).unwrap();
    assert_eq!(driver.period().as_millis(), 10);
}

#[tokio::test]
async fn test_tick_driver_stops_when_idle() {
    let mut rt = Runtime::default();
    rt.scheduler_mut()
        .schedule(JobSpec::every_frames(1).times(3), |_| {})
        .unwrap();

    let driver = TickDriver::new(Duration::from_millis(2)).unwrap();
    let ticks = driver.run(&mut rt).await;
    assert_eq!(ticks, 3);
    assert!(!rt.is_running());
}

#[tokio::test]
async fn test_tick_driver_respects_max_ticks() {
    let mut rt = Runtime::default();
    rt.scheduler_mut().schedule(JobSpec::new(), |_| {}).unwrap();

    let driver = TickDriver::new(Duration::from_millis(1))
        .unwrap()
        .with_max_ticks(5);
    assert_eq!(driver.run(&mut rt).await, 5);
    assert_eq!(rt.scheduler().frame(), 5);
    assert!(rt.is_running());
}

#[tokio::test]
async fn test_tick_driver_feeds_real_elapsed_time() {
    let mut rt = Runtime::default();
    rt.scheduler_mut()
        .schedule(JobSpec::once_after_seconds(0.02), |_| {})
        .unwrap();

    let driver = TickDriver::new(Duration::from_millis(5))
        .unwrap()
        .with_max_ticks(200);
    let started = Instant::now();
    let ticks = driver.run(&mut rt).await;
    assert!(!rt.is_running());
    assert!(ticks < 200);
    assert!(started.elapsed() >= Duration::from_millis(15));
}

#[tokio::test]
async fn test_keep_alive_driver_ticks_idle_runtime() {
    let mut rt = Runtime::default();
    let driver = TickDriver::new(Duration::from_millis(1))
        .unwrap()
        .keep_alive()
        .with_max_ticks(2);
    assert_eq!(driver.run(&mut rt).await, 2);
    assert_eq!(rt.scheduler().frame(), 0);
}
