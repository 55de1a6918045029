use super::*;

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_empty_key() {
    let mut config = Config::default();
    config.queue.key = String::new();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "queue.key"));
}

#[test]
fn test_validate_whitespace_key_warning() {
    let mut config = Config::default();
    config.queue.key = "my queue".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "queue.key"));
}

#[test]
fn test_validate_broker_scheme() {
    let mut config = Config::default();
    config.broker.url = "http://localhost:6379".to_string();
    assert!(!ConfigValidator::validate(&config).is_valid());

    config.broker.url = "rediss://secure:6380/1".to_string();
    assert!(ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_validate_log_level() {
    let mut config = Config::default();
    config.logging.level = "WARN".to_string();
    assert!(ConfigValidator::validate(&config).is_valid());

    config.logging.level = "loud".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "logging.level"));
}

#[test]
fn test_zero_claim_error_delay_warning() {
    let mut config = Config::default();
    config.queue.claim_error_delay_ms = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "queue.claim_error_delay_ms"));
}

#[test]
fn test_into_result() {
    let mut config = Config::default();
    config.queue.key = String::new();
    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "queue.key"));

    let warnings = ConfigValidator::validate(&Config::default()).into_result().unwrap();
    assert!(warnings.is_empty());
}
