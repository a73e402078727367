//! Tests for builder modules

use prometheus_tickbus::builders::{build_runtime, RuntimeBuilder};
use prometheus_tickbus::config::{BusConfig, PoolConfig, RuntimeConfig};
use prometheus_tickbus::core::{JobSpec, Payload, RuntimeError};

#[derive(Default)]
struct Ping;

impl Payload for Ping {}

#[test]
fn test_runtime_builder_defaults() {
    let builder = RuntimeBuilder::new();
    assert_eq!(builder.config(), &RuntimeConfig::default());

    let rt = builder.build().unwrap();
    assert_eq!(rt.bus().config().strict, cfg!(debug_assertions));
    assert!(!rt.is_running());

    let rt = RuntimeBuilder::new().with_strict_dispatch(false).build().unwrap();
    assert!(!rt.bus().config().strict);
}

#[test]
fn test_runtime_builder_overrides() {
    let builder = RuntimeBuilder::new()
        .with_strict_dispatch(true)
        .with_job_capacity(64)
        .with_listener_capacity(3);

    let cfg = builder.config();
    assert!(cfg.bus.strict);
    assert_eq!(cfg.scheduler.jobs.initial_capacity, 64);
    assert_eq!(cfg.scheduler.active.initial_capacity, 64);
    assert_eq!(cfg.bus.listeners.initial_capacity, 3);
}

#[test]
fn test_runtime_builder_rejects_invalid_config() {
    let err = RuntimeBuilder::new().with_job_capacity(0).build().unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidConfig(ref msg) if msg.contains("jobs")));
}

#[test]
fn test_fixed_job_capacity_limits_scheduling() {
    let mut rt = RuntimeBuilder::new().with_fixed_job_capacity(2).build().unwrap();
    let scheduler = rt.scheduler_mut();
    scheduler.schedule(JobSpec::new(), |_| {}).unwrap();
    scheduler.schedule(JobSpec::new(), |_| {}).unwrap();
    assert_eq!(
        scheduler.schedule(JobSpec::new(), |_| {}),
        Err(RuntimeError::PoolExhausted { capacity: 2 })
    );
}

#[test]
fn test_build_runtime_from_config() {
    let cfg = RuntimeConfig {
        bus: BusConfig {
            listeners: PoolConfig::fixed(1),
            ..BusConfig::default()
        },
        ..RuntimeConfig::default()
    };
    let mut rt = build_runtime(&cfg).unwrap();
    rt.bus_mut().add_listener::<Ping, _>(|_, _| {}).unwrap();
    assert_eq!(
        rt.bus_mut().add_listener::<Ping, _>(|_, _| {}),
        Err(RuntimeError::PoolExhausted { capacity: 1 })
    );
}
