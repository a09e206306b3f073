//! Local workload adapter.
//!
//! Treats a host directory as the container filesystem and runs a minimal
//! supervisor inside it. The supervisor keeps its layer plan and pid files
//! under `<root>/.supervisor`, so one-shot invocations of the operator see
//! the processes started by earlier ones.

use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::{Group, Pid, User};
use tokio::fs;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainResult, WorkloadError};
use crate::domain::models::{Layer, Ownership, ProcessDescriptor, WorkloadSettings};
use crate::domain::ports::{ServiceInfo, ServiceState, Workload};

const SUPERVISOR_DIR: &str = ".supervisor";
const PLAN_FILE: &str = "layers.json";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Workload rooted at a host directory.
pub struct LocalWorkload {
    name: String,
    root: PathBuf,
    stop_timeout: Duration,
    children: Mutex<HashMap<String, Child>>,
}

impl LocalWorkload {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            stop_timeout: Duration::from_secs(10),
            children: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &WorkloadSettings) -> Self {
        Self::new(settings.container.clone(), settings.root.clone())
            .with_stop_timeout(Duration::from_secs(settings.stop_timeout_secs))
    }

    #[must_use]
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an absolute container path onto the host root.
    fn host_path(&self, path: &str) -> DomainResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(WorkloadError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn supervisor_dir(&self) -> PathBuf {
        self.root.join(SUPERVISOR_DIR)
    }

    fn pid_file(&self, service: &str) -> PathBuf {
        self.supervisor_dir().join(format!("{service}.pid"))
    }

    fn log_file(&self, service: &str) -> PathBuf {
        self.supervisor_dir().join(format!("{service}.log"))
    }

    async fn ensure_connected(&self) -> DomainResult<()> {
        if self.can_connect().await {
            Ok(())
        } else {
            Err(WorkloadError::Unavailable(self.name.clone()))
        }
    }

    async fn load_plan(&self) -> DomainResult<BTreeMap<String, Layer>> {
        let path = self.supervisor_dir().join(PLAN_FILE);
        match fs::read(&path).await {
            Ok(bytes) => {
                let mut plan: BTreeMap<String, Layer> = serde_json::from_slice(&bytes)?;
                for layer in plan.values_mut() {
                    for (name, service) in &mut layer.services {
                        service.name.clone_from(name);
                    }
                }
                Ok(plan)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save_plan(&self, plan: &BTreeMap<String, Layer>) -> DomainResult<()> {
        fs::create_dir_all(self.supervisor_dir()).await?;
        let bytes = serde_json::to_vec_pretty(plan)?;
        fs::write(self.supervisor_dir().join(PLAN_FILE), bytes).await?;
        Ok(())
    }

    async fn service_definition(&self, name: &str) -> DomainResult<Option<ProcessDescriptor>> {
        let plan = self.load_plan().await?;
        Ok(plan
            .into_values()
            .filter_map(|mut layer| layer.services.remove(name))
            .reduce(ProcessDescriptor::combine))
    }

    async fn read_pid(&self, service: &str) -> Option<Pid> {
        let raw = fs::read_to_string(self.pid_file(service)).await.ok()?;
        raw.trim().parse::<i32>().ok().map(Pid::from_raw)
    }

    async fn is_alive(&self, service: &str) -> bool {
        let mut children = self.children.lock().await;
        if let Some(child) = children.get_mut(service) {
            if matches!(child.try_wait(), Ok(Some(_))) {
                children.remove(service);
                return false;
            }
            return true;
        }
        drop(children);

        match self.read_pid(service).await {
            Some(pid) => signal::kill(pid, None).is_ok(),
            None => false,
        }
    }

    async fn wait_for_exit(&self, service: &str, pid: Pid) -> bool {
        if let Some(mut child) = self.children.lock().await.remove(service) {
            return tokio::time::timeout(self.stop_timeout, child.wait())
                .await
                .is_ok();
        }

        let deadline = tokio::time::Instant::now() + self.stop_timeout;
        while tokio::time::Instant::now() < deadline {
            if signal::kill(pid, None) == Err(Errno::ESRCH) {
                return true;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        false
    }
}

fn resolve_owner(owner: &Ownership) -> Option<(nix::unistd::Uid, nix::unistd::Gid)> {
    let user = User::from_name(&owner.user).ok().flatten()?;
    let group = Group::from_name(&owner.group).ok().flatten()?;
    Some((user.uid, group.gid))
}

#[async_trait]
impl Workload for LocalWorkload {
    fn name(&self) -> &str {
        &self.name
    }

    async fn can_connect(&self) -> bool {
        fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn make_dir(&self, path: &str, owner: Option<&Ownership>) -> DomainResult<()> {
        self.ensure_connected().await?;
        let host_path = self.host_path(path)?;
        fs::create_dir_all(&host_path).await?;

        if let Some(owner) = owner {
            match resolve_owner(owner) {
                Some((uid, gid)) => {
                    if let Err(err) = nix::unistd::chown(&host_path, Some(uid), Some(gid)) {
                        warn!(path, user = %owner.user, error = %err, "could not change directory owner");
                    }
                }
                None => debug!(path, user = %owner.user, group = %owner.group, "owner not present, keeping current owner"),
            }
        }
        Ok(())
    }

    async fn push(&self, path: &str, content: &[u8], mode: u32) -> DomainResult<()> {
        use std::os::unix::fs::PermissionsExt;

        self.ensure_connected().await?;
        let host_path = self.host_path(path)?;
        if let Some(parent) = host_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&host_path, content).await?;
        fs::set_permissions(&host_path, std::fs::Permissions::from_mode(mode)).await?;
        Ok(())
    }

    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> DomainResult<()> {
        self.ensure_connected().await?;
        let mut plan = self.load_plan().await?;
        if let Some(existing) = plan.get_mut(label) {
            if !combine {
                return Err(WorkloadError::Supervisor(format!(
                    "layer {label} already exists"
                )));
            }
            existing.combine(layer.clone());
        } else {
            plan.insert(label.to_string(), layer.clone());
        }
        self.save_plan(&plan).await?;
        debug!(label, services = layer.services.len(), "layer added");
        Ok(())
    }

    async fn get_service(&self, name: &str) -> DomainResult<Option<ServiceInfo>> {
        self.ensure_connected().await?;
        let Some(service) = self.service_definition(name).await? else {
            return Ok(None);
        };
        let current = if self.is_alive(name).await {
            ServiceState::Active
        } else {
            ServiceState::Inactive
        };
        Ok(Some(ServiceInfo {
            name: name.to_string(),
            startup: service.startup,
            current,
        }))
    }

    async fn start(&self, name: &str) -> DomainResult<()> {
        self.ensure_connected().await?;
        let service = self
            .service_definition(name)
            .await?
            .ok_or_else(|| WorkloadError::UnknownService(name.to_string()))?;

        if self.is_alive(name).await {
            debug!(service = name, "already running");
            return Ok(());
        }

        let mut parts = service.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| WorkloadError::Supervisor(format!("service {name} has no command")))?;

        fs::create_dir_all(self.supervisor_dir()).await?;
        let log = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_file(name))
            .await?;
        let log_err = log.try_clone().await?.into_std().await;
        let log = log.into_std().await;

        let child = Command::new(program)
            .args(parts)
            .envs(&service.environment)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .spawn()
            .map_err(|err| WorkloadError::Supervisor(format!("failed to spawn {program}: {err}")))?;

        let pid = child
            .id()
            .ok_or_else(|| WorkloadError::Supervisor(format!("service {name} exited immediately")))?;
        fs::write(self.pid_file(name), pid.to_string()).await?;
        self.children.lock().await.insert(name.to_string(), child);

        info!(service = name, pid, "service started");
        Ok(())
    }

    async fn stop(&self, name: &str) -> DomainResult<()> {
        self.ensure_connected().await?;
        let Some(pid) = self.read_pid(name).await else {
            return Ok(());
        };

        match signal::kill(pid, Signal::SIGTERM) {
            Ok(()) => info!(service = name, pid = pid.as_raw(), "sent SIGTERM"),
            Err(Errno::ESRCH) => debug!(service = name, "process already gone"),
            Err(err) => return Err(WorkloadError::Supervisor(format!("SIGTERM failed: {err}"))),
        }

        if !self.wait_for_exit(name, pid).await {
            warn!(service = name, "stop timeout, sending SIGKILL");
            if let Err(err) = signal::kill(pid, Signal::SIGKILL) {
                if err != Errno::ESRCH {
                    return Err(WorkloadError::Supervisor(format!("SIGKILL failed: {err}")));
                }
            }
        }

        match fs::remove_file(self.pid_file(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
