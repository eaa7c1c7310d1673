//! Error types for SQL generation

use std::path::PathBuf;
use thiserror::Error;

use crate::enrollment::Semester;

/// Errors raised while rendering templates or building enrollment SQL
#[derive(Debug, Error)]
pub enum SqlGenError {
    /// Template file missing or unreadable
    #[error("Failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendered output could not be written
    #[error("Failed to write generated SQL to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No enrollment term id for the requested year and semester
    #[error("No bCourses enrollment term id available for {year}{semester}")]
    Lookup { year: i32, semester: Semester },

    #[error("Unknown semester '{0}': expected B, C, D, Spring, Summer or Fall")]
    InvalidSemester(String),

    #[error("Invalid enrollment term key '{0}': expected <year><semester code>, e.g. 2020D")]
    InvalidTermKey(String),

    #[error("At least one user identifier is required")]
    EmptyIdentifiers,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, SqlGenError>;
