//! Span helpers used when the `tracing` feature is enabled

use std::path::Path;
use tracing::Span;

pub fn render_template_span(template: &Path, output: &Path) -> Span {
    tracing::info_span!(
        "lakeview.render_template",
        template = %template.display(),
        output = %output.display()
    )
}

pub fn bootstrap_span(shared_hash: bool) -> Span {
    tracing::info_span!("lakeview.create_redshift_templates", shared_hash)
}
