//! Renderer adapter implementations.

pub mod fixed;
pub mod template;

pub use fixed::FixedRenderer;
pub use template::TemplateRenderer;
