//! Tests for error types

use prometheus_tickbus::core::{AppResult, RuntimeError};

#[test]
fn test_pool_exhausted_error() {
    let err = RuntimeError::PoolExhausted { capacity: 4 };
    assert_eq!(format!("{}", err), "pool exhausted: capacity 4");
}

#[test]
fn test_duplicate_entry_error() {
    assert_eq!(format!("{}", RuntimeError::DuplicateEntry), "duplicate entry");
}

#[test]
fn test_no_listeners_error() {
    let err = RuntimeError::NoListeners("game::Clicked");
    assert_eq!(format!("{}", err), "no listeners for `game::Clicked`");
}

#[test]
fn test_missing_factory_error() {
    let err = RuntimeError::MissingFactory("game::Clicked");
    assert_eq!(
        format!("{}", err),
        "no payload factory registered for `game::Clicked`"
    );
}

#[test]
fn test_invalid_job_error() {
    let err = RuntimeError::InvalidJob("repeat count must be at least 1".to_string());
    assert_eq!(format!("{}", err), "invalid job: repeat count must be at least 1");
}

#[test]
fn test_invalid_config_error() {
    let err = RuntimeError::InvalidConfig("bad".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: bad");
}

#[test]
fn test_converts_into_app_result() {
    fn fallible() -> AppResult<()> {
        let outcome: Result<(), RuntimeError> = Err(RuntimeError::DuplicateEntry);
        outcome?;
        Ok(())
    }
    let err = fallible().unwrap_err();
    assert_eq!(
        err.downcast_ref::<RuntimeError>(),
        Some(&RuntimeError::DuplicateEntry)
    );
}
