//! Text-substitution renderer for the Smokeping configuration sections.
//!
//! Templates use `${name}` placeholders. A block between a
//! `${each destinations}` line and an `${end}` line is emitted once per
//! destination, with `${destination.identifier}`, `${destination.host}` and
//! `${destination.section}` bound to that destination.
//!
//! The built-in templates are compiled into the binary; a template directory
//! can override any of them by file name.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::RenderError;
use crate::domain::models::{Destination, RenderContext};
use crate::domain::ports::Renderer;

const EACH_DESTINATIONS: &str = "${each destinations}";
const END: &str = "${end}";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("General", include_str!("../../../templates/General")),
    ("Alerts", include_str!("../../../templates/Alerts")),
    ("Presentation", include_str!("../../../templates/Presentation")),
    ("Probes", include_str!("../../../templates/Probes")),
    ("Slaves", include_str!("../../../templates/Slaves")),
    ("Targets", include_str!("../../../templates/Targets")),
    ("Database", include_str!("../../../templates/Database")),
    ("pathnames", include_str!("../../../templates/pathnames")),
];

/// Renders templates from an optional override directory, falling back to
/// the built-in set.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    template_dir: Option<PathBuf>,
}

impl TemplateRenderer {
    pub fn new(template_dir: Option<PathBuf>) -> Self {
        Self { template_dir }
    }

    async fn load(&self, name: &str) -> Result<String, RenderError> {
        if name.contains('/') || name.contains("..") {
            return Err(RenderError::TemplateNotFound(name.to_string()));
        }

        if let Some(dir) = &self.template_dir {
            let path = dir.join(name);
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    debug!(template = name, path = %path.display(), "using template override");
                    return Ok(text);
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(RenderError::Io {
                        template: name.to_string(),
                        reason: err.to_string(),
                    })
                }
            }
        }

        BUILTIN_TEMPLATES
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, text)| (*text).to_string())
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))
    }
}

#[async_trait]
impl Renderer for TemplateRenderer {
    async fn render(
        &self,
        template: &str,
        context: Option<&RenderContext>,
    ) -> Result<Vec<u8>, RenderError> {
        let text = self.load(template).await?;
        render_text(template, &text, context).map(String::into_bytes)
    }
}

/// Render template `text` named `name` against `context`.
pub fn render_text(
    name: &str,
    text: &str,
    context: Option<&RenderContext>,
) -> Result<String, RenderError> {
    let globals = context.map(global_variables).unwrap_or_default();
    let mut output = String::with_capacity(text.len());
    let mut block: Option<Vec<&str>> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(lines) = block.as_mut() {
            if trimmed == END {
                let lines = std::mem::take(lines);
                block = None;
                let ctx = context.ok_or_else(|| RenderError::MissingContext {
                    template: name.to_string(),
                })?;
                expand_block(name, &lines, ctx, &globals, &mut output)?;
            } else {
                lines.push(line);
            }
            continue;
        }

        if trimmed == EACH_DESTINATIONS {
            block = Some(Vec::new());
            continue;
        }

        output.push_str(&substitute(name, line, &globals, context.is_some())?);
        output.push('\n');
    }

    if block.is_some() {
        return Err(RenderError::UnknownPlaceholder {
            template: name.to_string(),
            placeholder: "each destinations (unterminated)".to_string(),
        });
    }

    Ok(output)
}

fn expand_block(
    name: &str,
    lines: &[&str],
    context: &RenderContext,
    globals: &HashMap<String, String>,
    output: &mut String,
) -> Result<(), RenderError> {
    for destination in &context.destinations {
        let mut vars = globals.clone();
        vars.extend(destination_variables(destination));
        for line in lines {
            output.push_str(&substitute(name, line, &vars, true)?);
            output.push('\n');
        }
    }
    Ok(())
}

fn global_variables(context: &RenderContext) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("config.timezone".to_string(), context.config.timezone.clone());
    vars.insert(
        "destinations.count".to_string(),
        context.destinations.len().to_string(),
    );
    for (key, value) in &context.config.environment {
        vars.insert(format!("env.{key}"), value.clone());
    }
    vars
}

fn destination_variables(destination: &Destination) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert(
        "destination.identifier".to_string(),
        destination.identifier.clone(),
    );
    vars.insert("destination.host".to_string(), destination.host.clone());
    vars.insert("destination.section".to_string(), destination.section_name());
    vars
}

/// Replace every `${key}` in `line` in one left-to-right pass.
///
/// Substituted values are copied verbatim and never scanned again.
fn substitute(
    name: &str,
    line: &str,
    vars: &HashMap<String, String>,
    has_context: bool,
) -> Result<String, RenderError> {
    let mut result = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(unresolved(name, after, has_context));
        };
        let key = &after[..end];
        let value = vars
            .get(key)
            .ok_or_else(|| unresolved(name, key, has_context))?;
        result.push_str(value);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

fn unresolved(name: &str, placeholder: &str, has_context: bool) -> RenderError {
    if has_context {
        RenderError::UnknownPlaceholder {
            template: name.to_string(),
            placeholder: placeholder.to_string(),
        }
    } else {
        RenderError::MissingContext {
            template: name.to_string(),
        }
    }
}
