//! Canvas Data settings for the data lake.
//!
//! Settings live under `data_lake.canvas_data` in `config/config.toml` and can be
//! overridden with environment variables such as
//! `LAKEVIEW_DATA_LAKE__CANVAS_DATA__IAM_ROLE`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const CONFIG_FILE: &str = "config/config.toml";
pub const ENV_PREFIX: &str = "LAKEVIEW";
pub const CANVAS_DATA_KEY: &str = "data_lake.canvas_data";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct CanvasDataConfig {
    /// External (Spectrum) database the scripts create or repoint
    pub external_database: String,
    /// Base S3 location; the daily hash is appended as a path segment
    pub s3_location: String,
    /// IAM role Redshift assumes to read from S3
    pub iam_role: String,
    /// Render both bootstrap scripts against one generated hash
    #[serde(default)]
    pub shared_location_hash: bool,
    /// Enrollment term ids keyed by `<year><semester code>`, e.g. `2020D`
    #[serde(default)]
    pub enrollment_terms: HashMap<String, i64>,
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl CanvasDataConfig {
    /// Load from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(env_source());

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if Path::new(CONFIG_FILE).exists() {
                    log::warn!(
                        "Failed to load {}, falling back to env. Error: {}",
                        CONFIG_FILE,
                        err
                    );
                }
                Config::builder()
                    .add_source(env_source())
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        Self::from_settings(&settings)
    }

    /// Load from an explicit file; env vars still take precedence.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(env_source())
            .build()?;
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        settings
            .get::<CanvasDataConfig>(CANVAS_DATA_KEY)
            .map_err(|e| {
                ConfigError::Message(format!(
                    "Canvas Data configuration ({}) could not be loaded: {}",
                    CANVAS_DATA_KEY, e
                ))
            })
    }

    /// Storage location for one run: `<s3_location>/<hash>`
    pub fn location(&self, hash: &str) -> String {
        format!("{}/{}", self.s3_location.trim_end_matches('/'), hash)
    }
}
