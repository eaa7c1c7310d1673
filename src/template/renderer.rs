//! Renders Redshift bootstrap templates to SQL files

use once_cell::unsync::OnceCell;
use std::fs;
use std::path::Path;

#[cfg(feature = "tracing")]
use crate::tracing_helpers;
use crate::config::CanvasDataConfig;
use crate::error::{Result, SqlGenError};
use crate::storage::LocationHasher;
use crate::template::tokens::{substitute, unresolved_placeholders, TokenMap};

/// Where a render gets its storage hash from
enum HashSource<'a> {
    Fresh,
    Fixed(&'a str),
    Shared(&'a OnceCell<String>),
}

/// Renders templates against the Canvas Data settings and a storage hash
///
/// Recognised tokens are `:externalDatabase`, `:s3Location` and `:iamRole`.
/// `:s3Location` expands to `<s3_location>/<hash>`.
#[derive(Debug, Clone)]
pub struct TemplateRenderer<H> {
    config: CanvasDataConfig,
    hasher: H,
}

impl<H: LocationHasher> TemplateRenderer<H> {
    pub fn new(config: CanvasDataConfig, hasher: H) -> Self {
        Self { config, hasher }
    }

    pub fn config(&self) -> &CanvasDataConfig {
        &self.config
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Token map for one render using the given storage hash
    pub fn tokens(&self, hash: &str) -> TokenMap {
        TokenMap::new()
            .with("externalDatabase", self.config.external_database.as_str())
            .with("s3Location", self.config.location(hash))
            .with("iamRole", self.config.iam_role.as_str())
    }

    /// Render `template` into `output` with a freshly generated hash
    ///
    /// The hasher is only consulted once the template has been read, and
    /// nothing is written when reading fails. `output` is overwritten in place.
    pub fn render(&self, template: &Path, output: &Path) -> Result<()> {
        self.render_inner(template, output, HashSource::Fresh)
    }

    /// Render `template` into `output` using a caller-supplied hash
    pub fn render_with_hash(&self, template: &Path, output: &Path, hash: &str) -> Result<()> {
        self.render_inner(template, output, HashSource::Fixed(hash))
    }

    /// Render `template` into `output` with the hash held in `shared`
    ///
    /// The first render to read its template successfully fills `shared` from
    /// the hasher; later renders reuse that value.
    pub fn render_with_shared_hash(
        &self,
        template: &Path,
        output: &Path,
        shared: &OnceCell<String>,
    ) -> Result<()> {
        self.render_inner(template, output, HashSource::Shared(shared))
    }

    fn render_inner(&self, template: &Path, output: &Path, source: HashSource<'_>) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::render_template_span(template, output).entered();

        let text = read_template(template)?;

        let hash = match source {
            HashSource::Fresh => self.hasher.generate_hash(),
            HashSource::Fixed(hash) => hash.to_string(),
            HashSource::Shared(shared) => shared
                .get_or_init(|| self.hasher.generate_hash())
                .clone(),
        };
        let tokens = self.tokens(&hash);
        log::debug!("Rendering {} with tokens {:?}", template.display(), tokens);

        let unresolved = unresolved_placeholders(&text, &tokens);
        if !unresolved.is_empty() {
            log::debug!(
                "{} has unresolved placeholders: {}",
                template.display(),
                unresolved.join(", ")
            );
        }
        let sql = substitute(&text, &tokens);

        write_output(output, &sql)?;
        log::info!(
            "Successfully generated the canvas data sql file {} from {}",
            output.display(),
            template.display()
        );
        Ok(())
    }
}

fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| {
        log::error!(
            "An error occurred when reading the sql template {}: {}",
            path.display(),
            source
        );
        SqlGenError::Read {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn write_output(path: &Path, sql: &str) -> Result<()> {
    fs::write(path, sql).map_err(|source| {
        log::error!(
            "An error occurred when writing the generated canvas data sql file {}: {}",
            path.display(),
            source
        );
        SqlGenError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::cell::Cell;
    use std::sync::{Mutex, Once};
    use std::thread::{self, ThreadId};
    use tempfile::TempDir;

    /// Keeps every log record together with the thread that emitted it
    struct CapturingLogger;

    static LOGGER: CapturingLogger = CapturingLogger;
    static INSTALL_LOGGER: Once = Once::new();
    static RECORDS: Lazy<Mutex<Vec<(ThreadId, log::Level, String)>>> = Lazy::new(Default::default);

    impl log::Log for CapturingLogger {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((thread::current().id(), record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    /// Drain the records logged so far by the current thread
    fn take_logs() -> Vec<(log::Level, String)> {
        INSTALL_LOGGER.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Trace);
            }
        });

        let current = thread::current().id();
        let mut records = RECORDS.lock().unwrap();
        let (mine, others): (Vec<_>, Vec<_>) =
            records.drain(..).partition(|(thread, _, _)| *thread == current);
        *records = others;
        mine.into_iter().map(|(_, level, message)| (level, message)).collect()
    }

    struct CountingHasher {
        calls: Cell<usize>,
    }

    impl LocationHasher for CountingHasher {
        fn generate_hash(&self) -> String {
            self.calls.set(self.calls.get() + 1);
            format!("hash{}", self.calls.get())
        }
    }

    fn renderer() -> TemplateRenderer<CountingHasher> {
        let config = CanvasDataConfig {
            external_database: "canvas_ext".to_string(),
            s3_location: "s3://bucket/canvas".to_string(),
            iam_role: "arn:aws:iam::1:role/spectrum".to_string(),
            ..Default::default()
        };
        TemplateRenderer::new(config, CountingHasher { calls: Cell::new(0) })
    }

    #[test]
    fn test_render_substitutes_config_tokens() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("db.template");
        let output = dir.path().join("db.sql");
        fs::write(
            &template,
            "CREATE EXTERNAL DATABASE :externalDatabase IAM_ROLE ':iamRole' LOCATION ':s3Location/user_dim';",
        )
        .unwrap();

        let renderer = renderer();
        renderer.render(&template, &output).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "CREATE EXTERNAL DATABASE canvas_ext IAM_ROLE 'arn:aws:iam::1:role/spectrum' LOCATION 's3://bucket/canvas/hash1/user_dim';"
        );
        assert_eq!(renderer.hasher().calls.get(), 1);
    }

    #[test]
    fn test_missing_template_skips_hash_and_write() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("db.sql");

        let renderer = renderer();
        let err = renderer
            .render(&dir.path().join("missing.template"), &output)
            .unwrap_err();

        assert!(matches!(err, SqlGenError::Read { .. }));
        assert!(!output.exists());
        assert_eq!(renderer.hasher().calls.get(), 0);
    }

    #[test]
    fn test_unwritable_output_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("db.template");
        fs::write(&template, "SELECT 1;").unwrap();

        let output = dir.path().join("no-such-dir").join("db.sql");
        let err = renderer().render(&template, &output).unwrap_err();
        assert!(matches!(err, SqlGenError::Write { ref path, .. } if *path == output));
    }

    #[test]
    fn test_read_error_is_logged() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("missing.template");
        take_logs();

        let err = renderer()
            .render(&template, &dir.path().join("db.sql"))
            .unwrap_err();
        assert!(matches!(err, SqlGenError::Read { .. }));

        let logs = take_logs();
        let errors: Vec<_> = logs
            .iter()
            .filter(|(level, _)| *level == log::Level::Error)
            .collect();
        assert_eq!(errors.len(), 1, "logs: {:?}", logs);
        assert!(errors[0].1.contains("reading the sql template"));
        assert!(errors[0].1.contains("missing.template"));
        assert!(!logs.iter().any(|(_, message)| message.contains("Successfully")));
    }

    #[test]
    fn test_write_error_is_logged() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("db.template");
        fs::write(&template, "SELECT 1;").unwrap();
        let output = dir.path().join("no-such-dir").join("db.sql");
        take_logs();

        let err = renderer().render(&template, &output).unwrap_err();
        assert!(matches!(err, SqlGenError::Write { .. }));

        let logs = take_logs();
        let errors: Vec<_> = logs
            .iter()
            .filter(|(level, _)| *level == log::Level::Error)
            .collect();
        assert_eq!(errors.len(), 1, "logs: {:?}", logs);
        assert!(errors[0].1.contains("writing the generated canvas data sql file"));
        assert!(!logs.iter().any(|(_, message)| message.contains("Successfully")));
    }

    #[test]
    fn test_shared_hash_is_generated_once_after_read() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("db.template");
        fs::write(&template, ":s3Location").unwrap();
        let renderer = renderer();
        let shared = OnceCell::new();

        renderer
            .render_with_shared_hash(&dir.path().join("missing.template"), &dir.path().join("a.sql"), &shared)
            .unwrap_err();
        assert!(shared.get().is_none());
        assert_eq!(renderer.hasher().calls.get(), 0);

        renderer
            .render_with_shared_hash(&template, &dir.path().join("b.sql"), &shared)
            .unwrap();
        renderer
            .render_with_shared_hash(&template, &dir.path().join("c.sql"), &shared)
            .unwrap();
        assert_eq!(renderer.hasher().calls.get(), 1);
        assert_eq!(fs::read_to_string(dir.path().join("c.sql")).unwrap(), "s3://bucket/canvas/hash1");
    }

    #[test]
    fn test_render_with_hash_does_not_generate() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("db.template");
        let output = dir.path().join("db.sql");
        fs::write(&template, ":s3Location").unwrap();

        let renderer = renderer();
        renderer.render_with_hash(&template, &output, "fixed").unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "s3://bucket/canvas/fixed");
        assert_eq!(renderer.hasher().calls.get(), 0);
    }
}
