use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::{DeclaredConfig, OperatorConfig};

/// Project-local directory holding the operator's configuration files.
pub const CONFIG_DIR: &str = ".smokeping-operator";

/// Environment prefix for operator settings (`__` separates nested keys).
pub const OPERATOR_ENV_PREFIX: &str = "SMOKEPING_OPERATOR_";

/// Environment prefix for declared configuration options.
pub const DECLARED_ENV_PREFIX: &str = "SMOKEPING_";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Service name cannot be empty")]
    EmptyServiceName,

    #[error("Service command cannot be empty")]
    EmptyCommand,

    #[error("Container name cannot be empty")]
    EmptyContainerName,

    #[error("Workload root cannot be empty")]
    EmptyWorkloadRoot,

    #[error("{field} must be an absolute path inside the workload, got {value:?}")]
    RelativeWorkloadPath { field: &'static str, value: String },

    #[error("Invalid stop_timeout_secs: {0}. Must be at least 1")]
    InvalidStopTimeout(u64),

    #[error("cache_owner and cache_group must be set together")]
    PartialCacheOwnership,

    #[error("Configuration file not found: {0}")]
    MissingFile(PathBuf),
}

/// Operator configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `config_dir`, plus an optional explicit file.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `<config_dir>/config.yaml`
    /// 3. `<config_dir>/local.yaml` (optional local overrides)
    /// 4. The explicit `--config` file, which must exist
    /// 5. Environment variables (SMOKEPING_OPERATOR_* prefix)
    pub fn load_layered(config_dir: &Path, explicit: Option<&Path>) -> Result<OperatorConfig> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(OperatorConfig::default()))
            .merge(Yaml::file(config_dir.join("config.yaml")))
            .merge(Yaml::file(config_dir.join("local.yaml")));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.to_path_buf()).into());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: OperatorConfig = figment
            .merge(Env::prefixed(OPERATOR_ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &OperatorConfig) -> Result<(), ConfigError> {
        let workload = &config.workload;

        if workload.container.trim().is_empty() {
            return Err(ConfigError::EmptyContainerName);
        }
        if workload.service.trim().is_empty() {
            return Err(ConfigError::EmptyServiceName);
        }
        if workload.command.trim().is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        if workload.root.as_os_str().is_empty() {
            return Err(ConfigError::EmptyWorkloadRoot);
        }

        for (field, value) in [
            ("config_dir", &workload.config_dir),
            ("cache_dir", &workload.cache_dir),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::RelativeWorkloadPath {
                    field,
                    value: value.clone(),
                });
            }
        }

        if workload.cache_owner.is_some() != workload.cache_group.is_some() {
            return Err(ConfigError::PartialCacheOwnership);
        }

        if workload.stop_timeout_secs == 0 {
            return Err(ConfigError::InvalidStopTimeout(workload.stop_timeout_secs));
        }

        if !VALID_LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

/// Loads the declared configuration fresh for every pass.
pub struct DeclaredConfigLoader;

impl DeclaredConfigLoader {
    /// Precedence (lowest to highest):
    /// 1. Defaults (`timezone: UTC`, `targets: "[]"`, no environment)
    /// 2. The YAML document at `path`, when it exists
    /// 3. `SMOKEPING_TIMEZONE` and `SMOKEPING_TARGETS`
    ///
    /// The `environment` map is only read from the file.
    pub fn load(path: &Path) -> Result<DeclaredConfig> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(DeclaredConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(DECLARED_ENV_PREFIX).only(&["timezone"]));

        // Env values are parsed into figment values; targets must stay raw text.
        if let Ok(raw) = std::env::var(format!("{DECLARED_ENV_PREFIX}TARGETS")) {
            figment = figment.merge(Serialized::default("targets", raw));
        }

        figment
            .extract()
            .with_context(|| {
                format!("Failed to load declared configuration from {}", path.display())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::LogFormat;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = OperatorConfig::default();
        assert_eq!(config.workload.service, "smokeping");
        assert_eq!(config.workload.config_dir, "/config");
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
workload:
  service: smokeping-next
  config_dir: /etc/smokeping
  stop_timeout_secs: 3
logging:
  level: debug
  format: json
";
        let config: OperatorConfig = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.workload.service, "smokeping-next");
        assert_eq!(config.workload.config_dir, "/etc/smokeping");
        assert_eq!(config.workload.stop_timeout_secs, 3);
        assert_eq!(config.workload.cache_dir, "/var/cache/smokeping");
        assert_eq!(config.logging.format, LogFormat::Json);
        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_empty_service() {
        let mut config = OperatorConfig::default();
        config.workload.service = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyServiceName)
        ));
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = OperatorConfig::default();
        config.workload.command = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyCommand)
        ));
    }

    #[test]
    fn test_validate_relative_config_dir() {
        let mut config = OperatorConfig::default();
        config.workload.config_dir = "config".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::RelativeWorkloadPath { field, .. }) => {
                assert_eq!(field, "config_dir");
            }
            other => panic!("Expected RelativeWorkloadPath, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_partial_ownership() {
        let mut config = OperatorConfig::default();
        config.workload.cache_group = None;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::PartialCacheOwnership)
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = OperatorConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn test_validate_zero_stop_timeout() {
        let mut config = OperatorConfig::default();
        config.workload.stop_timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidStopTimeout(0))
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "workload:\n  service: base\nlogging:\n  level: info\n  format: json\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("local.yaml"),
            "workload:\n  service: local\nlogging:\n  level: debug\n",
        )
        .unwrap();

        let config = ConfigLoader::load_layered(dir.path(), None).unwrap();

        assert_eq!(config.workload.service, "local", "Override should win");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format,
            LogFormat::Json,
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_env_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yaml"), "logging:\n  level: info\n").unwrap();

        temp_env::with_vars(
            [
                ("SMOKEPING_OPERATOR_LOGGING__LEVEL", Some("warn")),
                ("SMOKEPING_OPERATOR_WORKLOAD__STOP_TIMEOUT_SECS", Some("4")),
            ],
            || {
                let config = ConfigLoader::load_layered(dir.path(), None).unwrap();
                assert_eq!(config.logging.level, "warn");
                assert_eq!(config.workload.stop_timeout_secs, 4);
            },
        );
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = ConfigLoader::load_layered(dir.path(), Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn test_explicit_file_overrides_project_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yaml"), "workload:\n  service: base\n").unwrap();
        let explicit = dir.path().join("ci.yaml");
        fs::write(&explicit, "workload:\n  service: ci\n").unwrap();

        let config = ConfigLoader::load_layered(dir.path(), Some(&explicit)).unwrap();
        assert_eq!(config.workload.service, "ci");
    }

    #[test]
    fn test_declared_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        temp_env::with_vars_unset(["SMOKEPING_TIMEZONE", "SMOKEPING_TARGETS"], || {
            let declared = DeclaredConfigLoader::load(&dir.path().join("declared.yaml")).unwrap();
            assert_eq!(declared, DeclaredConfig::default());
        });
    }

    #[test]
    fn test_declared_targets_from_env_stay_raw() {
        let dir = tempfile::tempdir().unwrap();
        temp_env::with_vars(
            [
                ("SMOKEPING_TARGETS", Some(r#"[{"unit_name":"b","host":"h"}]"#)),
                ("SMOKEPING_TIMEZONE", None),
            ],
            || {
                let declared = DeclaredConfigLoader::load(&dir.path().join("declared.yaml")).unwrap();
                assert_eq!(declared.targets, r#"[{"unit_name":"b","host":"h"}]"#);
            },
        );
    }

    #[test]
    fn test_declared_file_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("declared.yaml");
        fs::write(
            &path,
            "timezone: Europe/Sofia\ntargets: '[{\"unit_name\":\"a\",\"host\":\"10.0.0.1\"}]'\nenvironment:\n  SMOKEPING_PINGS: '20'\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                ("SMOKEPING_TIMEZONE", Some("Asia/Tokyo")),
                ("SMOKEPING_TARGETS", None),
            ],
            || {
                let declared = DeclaredConfigLoader::load(&path).unwrap();
                assert_eq!(declared.timezone, "Asia/Tokyo");
                assert!(declared.targets.contains("10.0.0.1"));
                assert_eq!(declared.environment["SMOKEPING_PINGS"], "20");
            },
        );
    }
}
