//! # Lakeview SQL
//!
//! SQL generation for the Canvas Data lake: renders the Redshift bootstrap
//! scripts from templates and builds enrollment lookup queries for bCourses
//! terms. Nothing here executes SQL.

pub mod bootstrap;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod storage;
pub mod template;
#[cfg(feature = "tracing")]
mod tracing_helpers;

pub use bootstrap::{create_redshift_templates, BootstrapPlan, HashPolicy, TemplatePair};
pub use config::CanvasDataConfig;
pub use enrollment::{quote_literal_list, EnrollmentQueryBuilder, EnrollmentTerms, Semester};
pub use error::{Result, SqlGenError};
pub use storage::{DailyHasher, LocationHasher};
pub use template::{substitute, TemplateRenderer, TokenMap};
