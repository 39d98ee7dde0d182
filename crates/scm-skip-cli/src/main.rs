//! SCM Skip CLI
//!
//! Evaluates a change log against a skip pattern outside of a build host.
//!
//! ## Commands
//!
//! - `inspect`: report whether a change log matches
//! - `gate`: run the full gate against an in-memory run and print its state

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::Level;

use scm_skip_core::fakes::{MemoryJob, MemoryRun, RunKind};
use scm_skip_core::{
    evaluate, init_tracing, purge_if_marked, BuildJob, BuildRun, ChangeSet, DeletionMarker,
    GateDecision, Inspection, RunResult, SkipConfig, SkipGate, SkipMatcher, SkipSettings,
    WriterLog, DEFAULT_PATTERN,
};

#[derive(Parser)]
#[command(name = "scm-skip")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Skip builds whose change log matches a commit-message pattern", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a change log matches the skip pattern
    Inspect {
        #[command(flatten)]
        source: ChangeLogArgs,

        /// Print the inspection as JSON instead of the build log line
        #[arg(long)]
        json: bool,
    },

    /// Run the gate against an in-memory run and print the resulting run state
    Gate {
        #[command(flatten)]
        source: ChangeLogArgs,

        /// How the simulated run can be halted
        #[arg(long, value_enum, default_value = "pipeline")]
        kind: KindArg,

        /// Job name of the simulated run
        #[arg(long, default_value = "job")]
        job: String,

        /// Build number of the simulated run
        #[arg(long, default_value = "1")]
        number: u64,

        /// Delete the build when it is skipped
        #[arg(long)]
        delete_build: bool,

        /// Afterwards, delete the run if it was tagged for deletion
        #[arg(long)]
        purge: bool,
    },
}

#[derive(clap::Args)]
struct ChangeLogArgs {
    /// JSON file holding an array of change sets
    #[arg(short, long)]
    changelog: PathBuf,

    /// Skip pattern (regular expression)
    #[arg(short, long, env = "SCM_SKIP_PATTERN")]
    pattern: Option<String>,

    /// Only test the most recent change entry
    #[arg(long)]
    head_only: bool,

    /// JSON job configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pattern used when none is configured
    #[arg(long, default_value = DEFAULT_PATTERN)]
    default_pattern: String,
}

impl ChangeLogArgs {
    fn settings(&self) -> SkipSettings {
        SkipSettings::new(self.default_pattern.clone())
    }

    fn config(&self) -> Result<SkipConfig> {
        let mut config = match &self.config {
            Some(path) => SkipConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SkipConfig::default(),
        };
        if let Some(pattern) = &self.pattern {
            config.skip_pattern = Some(pattern.clone());
        }
        if self.head_only {
            config.head_only = true;
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Pipeline,
    Freestyle,
    Detached,
}

impl From<KindArg> for RunKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Pipeline => RunKind::Pipeline,
            KindArg::Freestyle => RunKind::Freestyle,
            KindArg::Detached => RunKind::Detached,
        }
    }
}

/// Run state printed by `gate`.
#[derive(Debug, Serialize)]
struct GateReport {
    run_id: String,
    decision: GateDecision,
    result: Option<RunResult>,
    description: Option<String>,
    deletion_marker: Option<DeletionMarker>,
    purged: bool,
    next_build_number: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    init_tracing(cli.json_logs, level);

    match cli.command {
        Commands::Inspect { source, json } => cmd_inspect(&source, json),
        Commands::Gate {
            source,
            kind,
            job,
            number,
            delete_build,
            purge,
        } => {
            let mut config = source.config()?;
            if delete_build {
                config.delete_build = true;
            }
            let report = cmd_gate(&source, config, kind.into(), &job, number, purge).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn cmd_inspect(source: &ChangeLogArgs, json: bool) -> Result<()> {
    let settings = source.settings();
    let config = source.config()?;
    let change_sets = load_change_sets(&source.changelog)?;

    let inspection = inspect_change_log(&settings, &config, &change_sets, json)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    }
    Ok(())
}

/// Inspect `change_sets`; the build log goes to stdout unless `quiet`.
fn inspect_change_log(
    settings: &SkipSettings,
    config: &SkipConfig,
    change_sets: &[ChangeSet],
    quiet: bool,
) -> Result<Inspection> {
    let matcher = SkipMatcher::new(settings, config.skip_pattern.as_deref())
        .context("Invalid skip pattern")?
        .with_head_only(config.head_only);

    let inspection = if quiet {
        let mut sink: Vec<String> = Vec::new();
        evaluate(change_sets, &matcher, &mut sink)
    } else {
        let mut log = WriterLog::new(io::stdout());
        evaluate(change_sets, &matcher, &mut log)
    };
    Ok(inspection)
}

async fn cmd_gate(
    source: &ChangeLogArgs,
    config: SkipConfig,
    kind: RunKind,
    job_name: &str,
    number: u64,
    purge: bool,
) -> Result<GateReport> {
    let change_sets = load_change_sets(&source.changelog)?;
    let gate = SkipGate::new(source.settings(), &config).context("Invalid skip pattern")?;

    let job = MemoryJob::new(job_name);
    job.update_next_build_number(number.saturating_add(1));
    let run = MemoryRun::new(job.clone(), number, kind).with_change_sets(change_sets);

    let mut log = WriterLog::new(io::stderr());
    let decision = gate
        .perform(&run, &mut log)
        .await
        .with_context(|| format!("Gate aborted run {}", run.id()))?;

    let purged = if purge {
        purge_if_marked(&run)
            .await
            .with_context(|| format!("Failed to delete run {}", run.id()))?
    } else {
        false
    };

    Ok(GateReport {
        run_id: run.id(),
        decision,
        result: run.result(),
        description: run.description(),
        deletion_marker: run.deletion_marker(),
        purged,
        next_build_number: job.next_build_number(),
    })
}

/// Load change sets from JSON: either an array of change sets or a bare
/// array of commit messages (one change set, none when the array is empty).
fn load_change_sets(path: &Path) -> Result<Vec<ChangeSet>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read change log {}", path.display()))?;

    if let Ok(messages) = serde_json::from_str::<Vec<String>>(&raw) {
        if messages.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![ChangeSet::from_messages(messages)]);
    }
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse change log {}", path.display()))
}
