//! Domain errors for the Smokeping operator.
//!
//! Every leaf component reports through one of these types. The
//! reconciliation controller is the only place that turns them into a
//! user-visible status.

use thiserror::Error;

/// The declared `targets` option could not be decoded into destinations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed JSON config for targets: {detail}")]
pub struct MalformedInputError {
    /// Parser diagnostic, kept verbatim for the operator.
    pub detail: String,
}

impl MalformedInputError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl From<serde_json::Error> for MalformedInputError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A template could not be rendered.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template {template} requires a render context")]
    MissingContext { template: String },

    #[error("Unknown placeholder ${{{placeholder}}} in template {template}")]
    UnknownPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("Failed to read template {template}: {reason}")]
    Io { template: String, reason: String },
}

/// The step of a runtime apply that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStep {
    Directory,
    Write,
    Layer,
    Query,
    Stop,
    Start,
}

impl ApplyStep {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Write => "write",
            Self::Layer => "layer",
            Self::Query => "query",
            Self::Stop => "stop",
            Self::Start => "start",
        }
    }
}

impl std::fmt::Display for ApplyStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while pushing configuration or driving the supervised process.
#[derive(Debug, Error)]
pub enum RuntimeApplyError {
    #[error("Failed to create directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: WorkloadError,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: WorkloadError,
    },

    #[error("Failed to apply layer for service {service}: {source}")]
    Layer {
        service: String,
        #[source]
        source: WorkloadError,
    },

    #[error("Failed to query service {service}: {source}")]
    Query {
        service: String,
        #[source]
        source: WorkloadError,
    },

    #[error("Failed to stop service {service}: {source}")]
    Stop {
        service: String,
        #[source]
        source: WorkloadError,
    },

    #[error("Failed to start service {service}: {source}")]
    Start {
        service: String,
        #[source]
        source: WorkloadError,
    },
}

impl RuntimeApplyError {
    /// Which synchronizer step produced this error.
    pub const fn step(&self) -> ApplyStep {
        match self {
            Self::Directory { .. } => ApplyStep::Directory,
            Self::Write { .. } => ApplyStep::Write,
            Self::Layer { .. } => ApplyStep::Layer,
            Self::Query { .. } => ApplyStep::Query,
            Self::Stop { .. } => ApplyStep::Stop,
            Self::Start { .. } => ApplyStep::Start,
        }
    }

    /// True when the underlying cause is an unreachable workload.
    pub fn is_unavailable(&self) -> bool {
        let source = match self {
            Self::Directory { source, .. }
            | Self::Write { source, .. }
            | Self::Layer { source, .. }
            | Self::Query { source, .. }
            | Self::Stop { source, .. }
            | Self::Start { source, .. } => source,
        };
        matches!(source, WorkloadError::Unavailable(_))
    }
}

/// Errors raised by a workload adapter (filesystem or supervisor).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("Container {0} not found")]
    Unavailable(String),

    #[error("Service {0} is not defined in any layer")]
    UnknownService(String),

    #[error("Path {0} escapes the workload root")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Supervisor error: {0}")]
    Supervisor(String),
}

impl From<std::io::Error> for WorkloadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WorkloadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Supervisor(err.to_string())
    }
}

/// Failure of an operator action, reported to the action caller only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Action {action} failed: {message}")]
pub struct ActionError {
    pub action: String,
    pub message: String,
}

impl ActionError {
    pub fn new(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
        }
    }
}

/// Any failure that ends a full reconciliation pass in Blocked.
#[derive(Debug, Error)]
pub enum PassError {
    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error("Failed to render {template}: {source}")]
    Render {
        template: String,
        #[source]
        source: RenderError,
    },

    #[error(transparent)]
    RuntimeApply(#[from] RuntimeApplyError),
}

/// Errors raised when publishing status to the platform.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Failed to publish status: {0}")]
    Publish(String),
}

impl From<std::io::Error> for StatusError {
    fn from(err: std::io::Error) -> Self {
        Self::Publish(err.to_string())
    }
}

impl From<serde_json::Error> for StatusError {
    fn from(err: serde_json::Error) -> Self {
        Self::Publish(err.to_string())
    }
}

pub type DomainResult<T, E = WorkloadError> = Result<T, E>;
