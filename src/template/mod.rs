//! Template rendering with `:name` placeholders

pub mod renderer;
pub mod tokens;

pub use renderer::TemplateRenderer;
pub use tokens::{scan_placeholders, substitute, unresolved_placeholders, Placeholder, TokenMap};
