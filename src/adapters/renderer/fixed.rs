//! Renderer returning canned output, for tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::errors::RenderError;
use crate::domain::models::RenderContext;
use crate::domain::ports::Renderer;

/// Renders every template as `<name>` followed by one line per destination,
/// unless the template was marked as failing.
#[derive(Clone, Default)]
pub struct FixedRenderer {
    failing: Arc<Mutex<BTreeSet<String>>>,
    rendered: Arc<Mutex<Vec<String>>>,
}

impl FixedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later render of `template` fail.
    pub fn fail_template(&self, template: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(template.into());
        }
    }

    /// Template names rendered so far, in call order.
    pub fn rendered(&self) -> Vec<String> {
        self.rendered
            .lock()
            .map(|rendered| rendered.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Renderer for FixedRenderer {
    async fn render(
        &self,
        template: &str,
        context: Option<&RenderContext>,
    ) -> Result<Vec<u8>, RenderError> {
        if let Ok(mut rendered) = self.rendered.lock() {
            rendered.push(template.to_string());
        }

        let failing = self
            .failing
            .lock()
            .map(|failing| failing.contains(template))
            .unwrap_or(false);
        if failing {
            return Err(RenderError::TemplateNotFound(template.to_string()));
        }

        let mut out = format!("{template}\n");
        for destination in context.map(|ctx| ctx.destinations.as_slice()).unwrap_or_default() {
            out.push_str(&destination.identifier);
            out.push(' ');
            out.push_str(&destination.host);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}
