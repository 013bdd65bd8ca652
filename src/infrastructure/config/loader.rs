use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::{CommandConfig, Config};
use crate::domain::models::DiagnosisRules;

/// Project directory holding the configuration files
pub const CONFIG_DIR: &str = ".runway";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "RUNWAY_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Service host cannot be empty")]
    EmptyHost,

    #[error("Invalid port: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Invalid max_attempts: {0}. Must be at least 1")]
    InvalidMaxAttempts(u32),

    #[error("Invalid readiness_timeout_secs: {0}. Must be at least 1")]
    InvalidReadinessTimeout(u64),

    #[error("Invalid poll_interval_ms: {0}. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error("Invalid connect_timeout_ms: {0}. Must be at least 1")]
    InvalidConnectTimeout(u64),

    #[error("Invalid retry_multiplier: {0}. Must be at least 1.0")]
    InvalidRetryMultiplier(f64),

    #[error(
        "Invalid retry delay configuration: retry_delay_ms ({0}) must not exceed max_retry_delay_ms ({1})"
    )]
    InvalidRetryDelay(u64, u64),

    #[error("Command for {0} cannot be empty")]
    EmptyCommand(&'static str),

    #[error("Invalid endpoint '{0}'. Must start with '/'")]
    InvalidEndpoint(String),

    #[error("Invalid diagnosis rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging from the current directory
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .runway/config.yaml (project config, created by init)
    /// 3. .runway/local.yaml (project local overrides, optional)
    /// 4. Environment variables (RUNWAY_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Load configuration rooted at `root` instead of the current directory
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment variables still win
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Path of the project config file below `root`
    pub fn project_config_path(root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(CONFIG_DIR).join("config.yaml")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Service target
        if config.service.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if config.service.port == 0 {
            return Err(ConfigError::InvalidPort(config.service.port));
        }
        validate_command("service.prebuilt.command", &config.service.prebuilt.command)?;
        validate_command("service.build_and_serve", &config.service.build_and_serve)?;

        // Supervisor policy
        let supervisor = &config.supervisor;
        if supervisor.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(supervisor.max_attempts));
        }
        if supervisor.readiness_timeout_secs == 0 {
            return Err(ConfigError::InvalidReadinessTimeout(
                supervisor.readiness_timeout_secs,
            ));
        }
        if supervisor.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval(supervisor.poll_interval_ms));
        }
        if supervisor.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidConnectTimeout(
                supervisor.connect_timeout_ms,
            ));
        }
        if supervisor.retry_multiplier.is_nan() || supervisor.retry_multiplier < 1.0 {
            return Err(ConfigError::InvalidRetryMultiplier(
                supervisor.retry_multiplier,
            ));
        }
        if supervisor.retry_delay_ms > supervisor.max_retry_delay_ms {
            return Err(ConfigError::InvalidRetryDelay(
                supervisor.retry_delay_ms,
                supervisor.max_retry_delay_ms,
            ));
        }

        // Probes
        if let Some(bad) = config
            .probes
            .endpoints
            .iter()
            .find(|endpoint| !endpoint.starts_with('/'))
        {
            return Err(ConfigError::InvalidEndpoint(bad.clone()));
        }

        // Client
        if config.client.enabled {
            validate_command("client.command", &config.client.command)?;
        }

        // Diagnosis rules
        for rule in &config.diagnosis.extra_rules {
            if rule.name.trim().is_empty() {
                return Err(ConfigError::InvalidRule {
                    name: rule.name.clone(),
                    reason: "name cannot be empty".to_string(),
                });
            }
            if rule.patterns.is_empty() {
                return Err(ConfigError::InvalidRule {
                    name: rule.name.clone(),
                    reason: "at least one pattern is required".to_string(),
                });
            }
        }
        if let Err(e) = DiagnosisRules::with_extra(&config.diagnosis.extra_rules) {
            return Err(ConfigError::InvalidRule {
                name: "extra_rules".to_string(),
                reason: e.to_string(),
            });
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}

fn validate_command(section: &'static str, command: &CommandConfig) -> Result<(), ConfigError> {
    if command.program.trim().is_empty() {
        return Err(ConfigError::EmptyCommand(section));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::RuleConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.supervisor.max_attempts, 3);
        assert_eq!(config.supervisor.readiness_timeout_secs, 60);
        assert_eq!(config.supervisor.log_tail_lines, 50);
        assert_eq!(config.logging.level, "warn");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
service:
  host: 127.0.0.1
  port: 9090
  working_dir: backend
  build_and_serve:
    program: ./gradlew
    args: [bootRun]
supervisor:
  max_attempts: 5
  readiness_timeout_secs: 120
probes:
  endpoints: [/health]
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.service.host, "127.0.0.1");
        assert_eq!(config.service.port, 9090);
        assert_eq!(config.service.build_and_serve.program, "./gradlew");
        assert_eq!(config.service.build_and_serve.args, vec!["bootRun"]);
        assert_eq!(config.supervisor.max_attempts, 5);
        assert_eq!(config.supervisor.readiness_timeout_secs, 120);
        assert_eq!(config.probes.endpoints, vec!["/health"]);
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.service.port = 0;

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidPort(0)));
    }

    #[test]
    fn test_validate_zero_attempts() {
        let mut config = Config::default();
        config.supervisor.max_attempts = 0;

        let result = ConfigLoader::validate(&config);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidMaxAttempts(0)
        ));
    }

    #[test]
    fn test_validate_zero_readiness_timeout() {
        let mut config = Config::default();
        config.supervisor.readiness_timeout_secs = 0;

        let result = ConfigLoader::validate(&config);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidReadinessTimeout(0)
        ));
    }

    #[test]
    fn test_validate_retry_delay_bounds() {
        let mut config = Config::default();
        config.supervisor.retry_delay_ms = 60_000;
        config.supervisor.max_retry_delay_ms = 1_000;

        let result = ConfigLoader::validate(&config);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidRetryDelay(60_000, 1_000)
        ));

        let mut config = Config::default();
        config.supervisor.retry_multiplier = 0.5;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRetryMultiplier(_)
        ));
    }

    #[test]
    fn test_validate_empty_build_command() {
        let mut config = Config::default();
        config.service.build_and_serve.program = "  ".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::EmptyCommand("service.build_and_serve")
        ));
    }

    #[test]
    fn test_disabled_client_command_is_not_validated() {
        let mut config = Config::default();
        config.client.enabled = false;
        config.client.command.program = String::new();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_relative_endpoint() {
        let mut config = Config::default();
        config.probes.endpoints.push("cities".to_string());

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidEndpoint(endpoint) => assert_eq!(endpoint, "cities"),
            other => panic!("Expected InvalidEndpoint error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_rule_pattern() {
        let mut config = Config::default();
        config.diagnosis.extra_rules.push(RuleConfig {
            name: "broken".to_string(),
            message: "never matches".to_string(),
            patterns: vec!["[unterminated".to_string()],
        });

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRule { .. }
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "verbose"),
            _ => panic!("Expected InvalidLogLevel error"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogFormat(format) => assert_eq!(format, "xml"),
            _ => panic!("Expected InvalidLogFormat error"),
        }
    }

    #[test]
    fn test_hierarchical_merging() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.yaml"),
            "service:\n  port: 9000\n  host: 127.0.0.1\nsupervisor:\n  max_attempts: 4\n",
        )
        .unwrap();
        fs::write(dir.join("local.yaml"), "service:\n  port: 9100\n").unwrap();

        let config = ConfigLoader::load_from_dir(root.path()).unwrap();

        assert_eq!(config.service.port, 9100, "Local override should win");
        assert_eq!(
            config.service.host, "127.0.0.1",
            "Base value should persist when not overridden"
        );
        assert_eq!(config.supervisor.max_attempts, 4);
        assert_eq!(config.supervisor.readiness_timeout_secs, 60);
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let root = TempDir::new().unwrap();
        let config = ConfigLoader::load_from_dir(root.path()).unwrap();
        assert_eq!(config.service.port, 8080);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let root = TempDir::new().unwrap();
        let result = ConfigLoader::load_from_file(root.path().join("nope.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("runway.yaml");
        fs::write(&path, "supervisor:\n  max_attempts: 0\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }
}
