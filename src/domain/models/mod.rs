pub mod config;
pub mod declared;
pub mod descriptor;
pub mod destination;
pub mod event;
pub mod render;
pub mod status;

pub use config::{
    LogFormat, LoggingConfig, OperatorConfig, RotationPolicy, StatusConfig, WorkloadSettings,
};
pub use declared::DeclaredConfig;
pub use descriptor::{Layer, OverridePolicy, ProcessDescriptor, Startup};
pub use destination::Destination;
pub use event::{ActionResult, Dispatched, LifecycleEvent, PassOutcome};
pub use render::{DirectorySpec, FileLayout, FileSpec, Ownership, RenderContext, RenderedFile};
pub use status::{ReconciliationStatus, UnitStatus};
