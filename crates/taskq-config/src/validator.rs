//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error, if any, into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_broker(config, &mut result);
        Self::validate_queue(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_broker(config: &Config, result: &mut ValidationResult) {
        let url = &config.broker.url;
        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            result.add_error(ValidationError::new(
                "broker.url",
                "url must start with redis:// or rediss://",
            ));
        }
    }

    fn validate_queue(config: &Config, result: &mut ValidationResult) {
        let key = &config.queue.key;
        if key.is_empty() {
            result.add_error(ValidationError::new("queue.key", "Queue key cannot be empty"));
        } else if key.chars().any(char::is_whitespace) {
            result.add_warning(ValidationWarning::new(
                "queue.key",
                format!("Queue key '{}' contains whitespace", key),
            ));
        }

        if config.queue.claim_error_delay_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "queue.claim_error_delay_ms",
                "No pause after a failed claim, an unreachable broker will be retried in a tight loop",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ValidationError::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', valid values: {:?}",
                    config.logging.level, LOG_LEVELS
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
