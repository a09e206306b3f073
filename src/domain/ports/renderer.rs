//! Renderer port - interface for configuration templating.

use async_trait::async_trait;

use crate::domain::errors::RenderError;
use crate::domain::models::RenderContext;

/// Renders one configuration file.
///
/// Implementations must be deterministic for fixed inputs: the same template
/// name and context always produce the same bytes.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        template: &str,
        context: Option<&RenderContext>,
    ) -> Result<Vec<u8>, RenderError>;
}
