use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the operator process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OperatorConfig {
    /// Where the declared (operator-supplied) configuration is read from
    #[serde(default = "default_declared_path")]
    pub declared_path: PathBuf,

    /// The managed workload
    #[serde(default)]
    pub workload: WorkloadSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Status surface configuration
    #[serde(default)]
    pub status: StatusConfig,
}

fn default_declared_path() -> PathBuf {
    PathBuf::from(".smokeping-operator/declared.yaml")
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            declared_path: default_declared_path(),
            workload: WorkloadSettings::default(),
            logging: LoggingConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

/// The container, supervised service and file layout being reconciled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkloadSettings {
    /// Container name, used in diagnostics when it cannot be reached
    #[serde(default = "default_container")]
    pub container: String,

    /// Name of the supervised process
    #[serde(default = "default_service")]
    pub service: String,

    /// Command line the supervisor runs
    #[serde(default = "default_command")]
    pub command: String,

    /// Host directory standing in for the container filesystem root
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Directory receiving the rendered Smokeping sections
    #[serde(default = "default_config_dir")]
    pub config_dir: String,

    /// Smokeping RRD/cache directory
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    #[serde(default = "default_cache_owner")]
    pub cache_owner: Option<String>,

    #[serde(default = "default_cache_owner")]
    pub cache_group: Option<String>,

    /// Optional directory overriding the built-in templates
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Seconds to wait for a stopped process before killing it
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
}

fn default_container() -> String {
    "smokeping".to_string()
}

fn default_service() -> String {
    "smokeping".to_string()
}

fn default_command() -> String {
    "/usr/bin/perl /usr/bin/smokeping --config=/etc/smokeping/config --nodaemon".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from(".smokeping-operator/workload")
}

fn default_config_dir() -> String {
    "/config".to_string()
}

fn default_cache_dir() -> String {
    "/var/cache/smokeping".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_cache_owner() -> Option<String> {
    Some("abc".to_string())
}

const fn default_stop_timeout_secs() -> u64 {
    10
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            container: default_container(),
            service: default_service(),
            command: default_command(),
            root: default_root(),
            config_dir: default_config_dir(),
            cache_dir: default_cache_dir(),
            cache_owner: default_cache_owner(),
            cache_group: default_cache_owner(),
            template_dir: None,
            stop_timeout_secs: default_stop_timeout_secs(),
        }
    }
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Rotation policy for file logging
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for log files (logs only to stderr when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

/// Where the current status is published
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusConfig {
    #[serde(default = "default_status_path")]
    pub path: PathBuf,
}

fn default_status_path() -> PathBuf {
    PathBuf::from(".smokeping-operator/status.json")
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            path: default_status_path(),
        }
    }
}
