//! Desired process state.

use crate::domain::models::{
    DeclaredConfig, OverridePolicy, ProcessDescriptor, Startup, WorkloadSettings,
};

/// Build the supervision descriptor for the workload's process.
///
/// Pure: equal inputs give equal descriptors. Declared environment options
/// are exported as-is, then `TZ` is set from the timezone option so it
/// always wins.
pub fn build_process_descriptor(
    cfg: &DeclaredConfig,
    workload: &WorkloadSettings,
) -> ProcessDescriptor {
    let mut environment = cfg.environment.clone();
    environment.insert("TZ".to_string(), cfg.timezone.clone());

    ProcessDescriptor {
        name: workload.service.clone(),
        summary: workload.service.clone(),
        command: workload.command.clone(),
        startup: Startup::Enabled,
        override_policy: OverridePolicy::Replace,
        environment,
    }
}
