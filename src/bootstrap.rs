//! Generates the Redshift bootstrap scripts for Canvas Data.
//!
//! Two scripts are rendered in order: database creation, then repointing the
//! external tables at the day's data. The second is never attempted when the
//! first fails.

use once_cell::unsync::OnceCell;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::storage::LocationHasher;
use crate::template::TemplateRenderer;
#[cfg(feature = "tracing")]
use crate::tracing_helpers;

pub const DB_CREATION_TEMPLATE: &str = "dbCreation.template";
pub const DB_CREATION_OUTPUT: &str = "dbCreation.sql";
pub const DB_REPOINT_TEMPLATE: &str = "dbRepoint.template";
pub const DB_REPOINT_OUTPUT: &str = "dbRepoint.sql";

/// A template and the file it renders to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePair {
    pub template: PathBuf,
    pub output: PathBuf,
}

impl TemplatePair {
    pub fn new(template: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output: output.into(),
        }
    }
}

/// The creation and repoint scripts, rendered in that order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub creation: TemplatePair,
    pub repoint: TemplatePair,
}

impl BootstrapPlan {
    /// Default template and output names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            creation: TemplatePair::new(dir.join(DB_CREATION_TEMPLATE), dir.join(DB_CREATION_OUTPUT)),
            repoint: TemplatePair::new(dir.join(DB_REPOINT_TEMPLATE), dir.join(DB_REPOINT_OUTPUT)),
        }
    }
}

/// How storage hashes are obtained across the two renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashPolicy {
    /// Each render asks the hasher for its own hash
    #[default]
    PerRender,
    /// One hash, generated once the creation template has been read, is used
    /// by both renders
    Shared,
}

impl HashPolicy {
    pub fn from_shared_flag(shared: bool) -> Self {
        if shared {
            HashPolicy::Shared
        } else {
            HashPolicy::PerRender
        }
    }
}

/// Render the creation script, then the repoint script
///
/// Stops at the first error; the repoint template is not even read when the
/// creation render fails.
pub fn create_redshift_templates<H: LocationHasher>(
    renderer: &TemplateRenderer<H>,
    plan: &BootstrapPlan,
    policy: HashPolicy,
) -> Result<()> {
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::bootstrap_span(policy == HashPolicy::Shared).entered();

    match policy {
        HashPolicy::PerRender => {
            renderer.render(&plan.creation.template, &plan.creation.output)?;
            renderer.render(&plan.repoint.template, &plan.repoint.output)?;
        }
        HashPolicy::Shared => {
            let hash = OnceCell::new();
            renderer.render_with_shared_hash(&plan.creation.template, &plan.creation.output, &hash)?;
            renderer.render_with_shared_hash(&plan.repoint.template, &plan.repoint.output, &hash)?;
        }
    }

    log::info!(
        "Generated Redshift bootstrap scripts {} and {}",
        plan.creation.output.display(),
        plan.repoint.output.display()
    );
    Ok(())
}
