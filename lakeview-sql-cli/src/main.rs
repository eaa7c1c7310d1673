//! Lakeview SQL CLI Tool
//!
//! Renders the Redshift bootstrap scripts for Canvas Data and prints
//! enrollment lookup queries.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lakeview_sql::{
    create_redshift_templates, BootstrapPlan, CanvasDataConfig, DailyHasher,
    EnrollmentQueryBuilder, HashPolicy, Semester, TemplateRenderer,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "lakeview-sql")]
#[command(about = "SQL generation for the Canvas Data lake")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (default: config/config.toml, then env vars)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render dbCreation.sql and dbRepoint.sql from their templates
    Bootstrap {
        /// Directory holding the templates; outputs are written next to them
        #[arg(long, default_value = "db-templates")]
        templates_dir: PathBuf,

        /// Use one storage hash for both scripts
        #[arg(long)]
        shared_hash: bool,

        /// Salt mixed into the daily storage hash
        #[arg(long)]
        hash_salt: Option<String>,
    },

    /// Print the enrollment lookup SQL for a term
    Enrollments {
        /// Term year, e.g. 2020
        #[arg(long)]
        year: i32,

        /// Semester code (B, C, D) or name (Spring, Summer, Fall)
        #[arg(long)]
        semester: String,

        /// User identifiers (campus UIDs)
        #[arg(required = true)]
        uids: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CanvasDataConfig::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => CanvasDataConfig::load().context("loading configuration")?,
    };

    match cli.command {
        Commands::Bootstrap {
            templates_dir,
            shared_hash,
            hash_salt,
        } => {
            let policy = HashPolicy::from_shared_flag(shared_hash || config.shared_location_hash);
            let hasher = match hash_salt {
                Some(salt) => DailyHasher::new().with_salt(salt),
                None => DailyHasher::new(),
            };
            let plan = BootstrapPlan::in_dir(&templates_dir);
            let renderer = TemplateRenderer::new(config, hasher);

            create_redshift_templates(&renderer, &plan, policy)?;
            if !cli.quiet {
                println!("✅ Wrote {}", plan.creation.output.display());
                println!("✅ Wrote {}", plan.repoint.output.display());
            }
        }
        Commands::Enrollments {
            year,
            semester,
            uids,
        } => {
            let semester: Semester = semester.parse()?;
            let builder = EnrollmentQueryBuilder::from_config(&config)?;
            let sql = builder.build(year, semester, &uids)?;
            println!("{}", sql);
        }
    }

    Ok(())
}
