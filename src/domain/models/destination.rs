use serde::{Deserialize, Serialize};

/// One monitored endpoint.
///
/// The identifier travels as `unit_name` in the declared `targets` option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(rename = "unit_name")]
    pub identifier: String,
    pub host: String,
}

impl Destination {
    pub fn new(identifier: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            host: host.into(),
        }
    }

    /// Identifier rewritten into a Smokeping section name.
    ///
    /// Smokeping only accepts `[A-Za-z0-9_-]` in target section names.
    pub fn section_name(&self) -> String {
        self.identifier
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_uses_unit_name() {
        let dest: Destination =
            serde_json::from_str(r#"{"unit_name":"a","host":"10.0.0.1"}"#).unwrap();
        assert_eq!(dest, Destination::new("a", "10.0.0.1"));
    }

    #[test]
    fn test_section_name_replaces_separators() {
        let dest = Destination::new("web/0", "10.0.0.2");
        assert_eq!(dest.section_name(), "web_0");
    }
}
