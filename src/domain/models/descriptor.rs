use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Whether the supervisor starts the service on boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    Enabled,
    Disabled,
}

/// How a service definition combines with one the supervisor already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverridePolicy {
    Replace,
    Merge,
}

/// Desired supervision state for one named process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    #[serde(skip)]
    pub name: String,
    pub summary: String,
    pub command: String,
    pub startup: Startup,
    #[serde(rename = "override")]
    pub override_policy: OverridePolicy,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl ProcessDescriptor {
    /// Combine `incoming` onto `self` according to the incoming override policy.
    #[must_use]
    pub fn combine(self, incoming: Self) -> Self {
        match incoming.override_policy {
            OverridePolicy::Replace => incoming,
            OverridePolicy::Merge => {
                let mut environment = self.environment;
                environment.extend(incoming.environment);
                Self {
                    name: incoming.name,
                    summary: if incoming.summary.is_empty() {
                        self.summary
                    } else {
                        incoming.summary
                    },
                    command: if incoming.command.is_empty() {
                        self.command
                    } else {
                        incoming.command
                    },
                    startup: incoming.startup,
                    override_policy: incoming.override_policy,
                    environment,
                }
            }
        }
    }
}

/// A named bundle of service definitions handed to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub summary: String,
    pub description: String,
    pub services: BTreeMap<String, ProcessDescriptor>,
}

impl Layer {
    pub fn for_descriptor(descriptor: ProcessDescriptor) -> Self {
        let mut services = BTreeMap::new();
        let summary = format!("{} layer", descriptor.name);
        let description = format!("pebble config layer for {}", descriptor.name);
        services.insert(descriptor.name.clone(), descriptor);
        Self {
            summary,
            description,
            services,
        }
    }

    /// Fold `incoming` into this layer, service by service.
    pub fn combine(&mut self, incoming: Self) {
        self.summary = incoming.summary;
        self.description = incoming.description;
        for (name, mut service) in incoming.services {
            service.name.clone_from(&name);
            let merged = match self.services.remove(&name) {
                Some(existing) => existing.combine(service),
                None => service,
            };
            self.services.insert(name, merged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(command: &str, policy: OverridePolicy) -> ProcessDescriptor {
        ProcessDescriptor {
            name: "smokeping".to_string(),
            summary: "smokeping".to_string(),
            command: command.to_string(),
            startup: Startup::Enabled,
            override_policy: policy,
            environment: BTreeMap::new(),
        }
    }

    #[test]
    fn test_replace_discards_previous_environment() {
        let mut old = descriptor("/old", OverridePolicy::Replace);
        old.environment.insert("OLD".to_string(), "1".to_string());
        let new = descriptor("/new", OverridePolicy::Replace);

        let combined = old.combine(new.clone());
        assert_eq!(combined, new);
    }

    #[test]
    fn test_merge_keeps_previous_environment() {
        let mut old = descriptor("/old", OverridePolicy::Replace);
        old.environment.insert("OLD".to_string(), "1".to_string());
        let mut new = descriptor("", OverridePolicy::Merge);
        new.environment.insert("TZ".to_string(), "UTC".to_string());

        let combined = old.combine(new);
        assert_eq!(combined.command, "/old");
        assert_eq!(combined.environment.len(), 2);
    }

    #[test]
    fn test_layer_serializes_override_key() {
        let layer = Layer::for_descriptor(descriptor("/bin/true", OverridePolicy::Replace));
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["summary"], "smokeping layer");
        assert_eq!(json["services"]["smokeping"]["override"], "replace");
        assert_eq!(json["services"]["smokeping"]["startup"], "enabled");
    }

    #[test]
    fn test_layer_combine_restores_service_names() {
        let mut plan = Layer::for_descriptor(descriptor("/old", OverridePolicy::Replace));
        let json = serde_json::to_string(&Layer::for_descriptor(descriptor(
            "/new",
            OverridePolicy::Replace,
        )))
        .unwrap();
        let incoming: Layer = serde_json::from_str(&json).unwrap();

        plan.combine(incoming);
        let service = &plan.services["smokeping"];
        assert_eq!(service.name, "smokeping");
        assert_eq!(service.command, "/new");
    }
}
