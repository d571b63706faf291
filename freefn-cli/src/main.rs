//! freefn command-line entry point
//!
//! Generates free-function wrappers in C++ headers and expands tabs in
//! source trees.

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use freefn_transform::{
    discovery::{extension_patterns, find_files},
    BackupPolicy, EngineConfig, FreeFnSettings, FreeFunctionTransformer, TabExpander,
    TransformationEngine, TransformationResult, Transformer,
};
use freefn_utils::logging::{init_logging, LogLevel, LoggerConfig};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Base name of the configuration file looked up in the root directory
const CONFIG_STEM: &str = "freefn";

#[derive(Parser)]
#[command(name = "freefn")]
#[command(about = "Generate free-function wrappers for marked C++ member functions")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log level: trace, debug, info, warning, error, critical (or 10..50)
    #[arg(long, env = "FREEFN_LOG", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Configuration file (TOML, JSON or YAML); defaults to freefn.* in the root
    #[arg(short, long, env = "FREEFN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Root directory that header globs are relative to
    #[arg(short = 'C', long, env = "FREEFN_ROOT", default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate free functions for every marked member function
    Free {
        /// Headers to process; defaults to the configured globs
        headers: Vec<PathBuf>,

        /// Marker macro flagging member functions
        #[arg(long, env = "FREEFN_MARKER")]
        marker: Option<String>,

        /// Prefix of the line the generated block goes in front of
        #[arg(long, env = "FREEFN_NAMESPACE_END")]
        namespace_end: Option<String>,

        /// How to preserve headers before rewriting them
        #[arg(long, value_enum, default_value = "none")]
        backup: BackupArg,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Write nothing; exit with status 1 if any header is out of date
        #[arg(long)]
        check: bool,

        /// Print the run result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace tabs with spaces, keeping originals as <file>.orig
    ExpandTabs {
        /// Spaces per tab stop
        #[arg(long, env = "FREEFN_TAB_WIDTH")]
        tab_width: Option<usize>,

        /// File extension to process (repeatable); defaults to the configured list
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the run result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackupArg {
    None,
    Orig,
    Timestamped,
}

impl From<BackupArg> for BackupPolicy {
    fn from(arg: BackupArg) -> Self {
        match arg {
            BackupArg::None => BackupPolicy::None,
            BackupArg::Orig => BackupPolicy::OrigSuffix,
            BackupArg::Timestamped => BackupPolicy::Timestamped,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(LoggerConfig {
        level: cli.log_level.raised_by(cli.verbose),
        colored_output: std::io::stderr().is_terminal(),
        ..LoggerConfig::default()
    })?;

    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "freefn", &mut std::io::stdout());
        }

        Commands::Free {
            headers,
            marker,
            namespace_end,
            backup,
            dry_run,
            check,
            json,
        } => {
            let mut settings = load_settings(cli.config.as_deref(), &cli.root)?;
            if let Some(marker) = marker {
                settings.free_functions.marker = marker;
            }
            if let Some(namespace_end) = namespace_end {
                settings.free_functions.namespace_end = namespace_end;
            }

            let files = if headers.is_empty() {
                find_files(&cli.root, &settings.free_functions.headers)
                    .with_context(|| format!("Failed to find headers under {}", cli.root.display()))?
            } else {
                headers.iter().map(|h| resolve(&cli.root, h)).collect()
            };
            if files.is_empty() {
                tracing::warn!(root = %cli.root.display(), "no headers matched");
            }

            let transformer = FreeFunctionTransformer::new(settings.free_functions)
                .context("Invalid free function configuration")?
                .with_backup_policy(backup.into());
            let result = run(&transformer, &files, dry_run || check)?;
            report(&result, json)?;

            if check && result.has_changes() {
                return Ok(ExitCode::from(1));
            }
        }

        Commands::ExpandTabs {
            tab_width,
            extensions,
            dry_run,
            json,
        } => {
            let settings = load_settings(cli.config.as_deref(), &cli.root)?;
            let tab_width = tab_width.unwrap_or(settings.tabs.tab_width);
            let extensions = if extensions.is_empty() {
                settings.tabs.extensions
            } else {
                extensions
            };
            let files = find_files(&cli.root, &extension_patterns(&extensions))
                .with_context(|| format!("Failed to find sources under {}", cli.root.display()))?;

            let result = run(&TabExpander::new(tab_width), &files, dry_run)?;
            report(&result, json)?;
        }

        Commands::Config => {
            let settings = load_settings(cli.config.as_deref(), &cli.root)?;
            print!("{}", freefn_utils::config::to_toml_string(&settings)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_settings(config: Option<&Path>, root: &Path) -> Result<FreeFnSettings> {
    freefn_utils::config::load_or_default(config, root, CONFIG_STEM)
        .context("Failed to load configuration")
}

/// Relative paths given on the command line are taken relative to the root
fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        freefn_utils::normalize_path(&root.join(path))
    }
}

fn run(transformer: &dyn Transformer, files: &[PathBuf], dry_run: bool) -> Result<TransformationResult> {
    let engine = TransformationEngine::new(EngineConfig {
        dry_run,
        ..EngineConfig::default()
    });
    engine.run(transformer, files).with_context(|| {
        format!(
            "{} failed",
            transformer.transformation_type().display_name()
        )
    })
}

fn report(result: &TransformationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let verb = if result.status == freefn_transform::TransformationStatus::DryRun {
        "would change"
    } else {
        "changed"
    };
    for change in &result.changes {
        if let Some(diff) = &change.diff {
            print!("{diff}");
        }
        println!(
            "{verb}: {} (+{} -{}, {} function(s) freed)",
            change.path.display(),
            change.lines_added,
            change.lines_removed,
            change.functions_freed.len()
        );
    }
    let stats = &result.statistics;
    println!(
        "{} of {} file(s) {verb}, {} function(s) freed",
        stats.files_modified, stats.files_scanned, stats.functions_freed
    );
    Ok(())
}
