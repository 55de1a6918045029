//! Configuration loader.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, or use defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        if let Some(dir) = config.logging.dir.as_deref() {
            config.logging.dir = Some(Self::expand_path(dir));
        }
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.local/state/taskq`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.queue.key, "taskq");
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [broker]
            url = "redis://10.0.0.5:6379/12"

            [queue]
            key = "my"
            block_timeout_secs = 5
            claim_error_delay_ms = 250

            [logging]
            level = "debug"
            json = true
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.broker.url, "redis://10.0.0.5:6379/12");
        assert_eq!(config.queue.key, "my");
        assert_eq!(config.queue.block_timeout_secs, 5);
        assert_eq!(config.queue.claim_error_delay_ms, 250);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[queue]").unwrap();
        writeln!(file, "key = \"from-file\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.queue.key, "from-file");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/taskq.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));

        let config = ConfigLoader::load_or_default(Path::new("/nonexistent/path/taskq.toml"))
            .unwrap();
        assert_eq!(config.queue.key, "taskq");
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[queue").unwrap();
        assert!(ConfigLoader::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("TASKQ_TEST_REDIS_URL", "redis://cache:6379/3");
        }
        let content = "[broker]\nurl = \"${TASKQ_TEST_REDIS_URL}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.broker.url, "redis://cache:6379/3");
        unsafe {
            std::env::remove_var("TASKQ_TEST_REDIS_URL");
        }
    }

    #[test]
    fn test_missing_env_var() {
        let content = "[broker]\nurl = \"${TASKQ_TEST_DEFINITELY_UNSET}\"";
        let result = ConfigLoader::load_str(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(v)) if v == "TASKQ_TEST_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_sample_config_loads_without_environment() {
        let sample = include_str!("../../../taskq.example.toml");
        let config = ConfigLoader::load_str(sample).unwrap();
        assert_eq!(config.broker.url, "redis://127.0.0.1:6379");
        assert_eq!(config.queue.key, "taskq");
        assert!(crate::ConfigValidator::validate(&config).is_valid());
    }

    #[test]
    fn test_log_dir_tilde_expanded() {
        let config = ConfigLoader::load_str("[logging]\ndir = \"~/taskq-logs\"").unwrap();
        let dir = config.logging.dir.unwrap();
        assert!(!dir.starts_with('~'));
        assert!(dir.ends_with("taskq-logs"));
    }
}
