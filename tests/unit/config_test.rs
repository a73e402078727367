//! Tests for configuration validation

use prometheus_tickbus::config::{BusConfig, PoolConfig, RuntimeConfig, SchedulerConfig};

#[test]
fn test_pool_config_validation() {
    assert!(PoolConfig::default().validate().is_ok());
    assert!(PoolConfig::fixed(1).validate().is_ok());
}

#[test]
fn test_pool_config_invalid_capacity() {
    let invalid = PoolConfig {
        initial_capacity: 0,
        ..PoolConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_invalid_growth() {
    for growth_factor in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let invalid = PoolConfig {
            growth_factor,
            ..PoolConfig::default()
        };
        assert!(invalid.validate().is_err(), "growth {growth_factor} accepted");
    }
}

#[test]
fn test_nested_errors_name_the_section() {
    let cfg = RuntimeConfig {
        scheduler: SchedulerConfig {
            jobs: PoolConfig::fixed(0),
            ..SchedulerConfig::default()
        },
        ..RuntimeConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.starts_with("scheduler invalid: jobs:"), "{err}");

    let cfg = RuntimeConfig {
        bus: BusConfig {
            payloads: PoolConfig::fixed(0),
            ..BusConfig::default()
        },
        ..RuntimeConfig::default()
    };
    assert!(cfg.validate().unwrap_err().starts_with("bus invalid: payloads:"));
}

#[test]
fn test_runtime_config_from_json() {
    let json = r#"{
        "bus": {
            "listeners": { "initial_capacity": 32, "growth_factor": 1.0, "resizable": true },
            "strict": true
        },
        "scheduler": {
            "jobs": { "initial_capacity": 4, "resizable": false },
            "deferred_capacity": 2
        }
    }"#;

    let cfg = RuntimeConfig::from_json_str(json).unwrap();
    assert!(cfg.bus.strict);
    assert_eq!(cfg.bus.listeners.initial_capacity, 32);
    assert_eq!(cfg.bus.payloads, BusConfig::default().payloads);
    assert_eq!(cfg.scheduler.jobs, PoolConfig::fixed(4));
    assert_eq!(cfg.scheduler.deferred_capacity, 2);
}

#[test]
fn test_runtime_config_from_json_rejects_invalid() {
    assert!(RuntimeConfig::from_json_str("not json").is_err());
    let err = RuntimeConfig::from_json_str(r#"{ "bus": { "listeners": { "initial_capacity": 0 } } }"#)
        .unwrap_err();
    assert!(err.contains("initial_capacity"), "{err}");
}

#[test]
fn test_runtime_config_round_trips_through_file() {
    let cfg = RuntimeConfig {
        bus: BusConfig {
            strict: true,
            ..BusConfig::default()
        },
        ..RuntimeConfig::default()
    };
    let path = std::env::temp_dir().join(format!("tickbus-config-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();

    let loaded = RuntimeConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, cfg);
}

#[test]
fn test_missing_config_file() {
    let err = RuntimeConfig::from_json_file("/nonexistent/tickbus.json").unwrap_err();
    assert!(err.starts_with("cannot read"), "{err}");
}

#[test]
fn test_runtime_config_from_env_applies_strict_flag() {
    std::env::remove_var("TICKBUS_CONFIG");
    std::env::set_var("TICKBUS_STRICT", "yes");
    let cfg = RuntimeConfig::from_env();
    std::env::remove_var("TICKBUS_STRICT");

    let cfg = cfg.unwrap();
    assert!(cfg.bus.strict);
    assert_eq!(cfg.scheduler, SchedulerConfig::default());

    std::env::set_var("TICKBUS_STRICT", "0");
    let cfg = RuntimeConfig::from_env();
    std::env::remove_var("TICKBUS_STRICT");
    assert!(!cfg.unwrap().bus.strict);
}
