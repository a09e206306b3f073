use serde::{Deserialize, Serialize};

use super::config::WorkloadSettings;
use super::declared::DeclaredConfig;
use super::destination::Destination;

/// Everything a context-aware template may reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub config: DeclaredConfig,
    pub destinations: Vec<Destination>,
}

impl RenderContext {
    pub fn new(config: DeclaredConfig, destinations: Vec<Destination>) -> Self {
        Self {
            config,
            destinations,
        }
    }
}

/// Rendered bytes ready to be pushed to a path inside the workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub content: Vec<u8>,
    pub mode: u32,
}

/// Ownership applied to a directory when the names resolve in the workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub user: String,
    pub group: String,
}

/// A directory that must exist before any file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySpec {
    pub path: String,
    pub owner: Option<Ownership>,
}

/// One template rendered to one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub template: String,
    pub path: String,
    pub mode: u32,
    /// Whether the template receives the pass's [`RenderContext`]
    pub with_context: bool,
}

/// Smokeping configuration sections rendered without context.
pub const STATIC_TEMPLATES: &[&str] = &[
    "General",
    "Alerts",
    "Presentation",
    "Probes",
    "Slaves",
];

/// Sections that depend on the declared configuration.
pub const CONTEXT_TEMPLATES: &[&str] = &["Targets", "Database"];

const DEFAULT_FILE_MODE: u32 = 0o644;

/// The directory and file layout pushed into the workload on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLayout {
    pub directories: Vec<DirectorySpec>,
    pub files: Vec<FileSpec>,
}

impl FileLayout {
    /// Layout for the Smokeping container described by `settings`.
    pub fn smokeping(settings: &WorkloadSettings) -> Self {
        let config_dir = settings.config_dir.trim_end_matches('/');
        let owner = match (&settings.cache_owner, &settings.cache_group) {
            (Some(user), Some(group)) => Some(Ownership {
                user: user.clone(),
                group: group.clone(),
            }),
            _ => None,
        };

        let directories = vec![
            DirectorySpec {
                path: settings.cache_dir.clone(),
                owner,
            },
            DirectorySpec {
                path: settings.config_dir.clone(),
                owner: None,
            },
        ];

        let static_files = STATIC_TEMPLATES.iter().map(|name| (*name, false));
        let context_files = CONTEXT_TEMPLATES.iter().map(|name| (*name, true));
        let mut files: Vec<FileSpec> = static_files
            .chain(context_files)
            .map(|(name, with_context)| FileSpec {
                template: name.to_string(),
                path: format!("{config_dir}/{name}"),
                mode: DEFAULT_FILE_MODE,
                with_context,
            })
            .collect();

        files.push(FileSpec {
            template: "pathnames".to_string(),
            path: format!("{config_dir}/pathnames"),
            mode: DEFAULT_FILE_MODE,
            with_context: false,
        });

        Self { directories, files }
    }
}
