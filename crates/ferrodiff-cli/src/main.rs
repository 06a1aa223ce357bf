//! ferrodiff - content-addressed directory comparison, sync and dedup
//!
//! Trees are indexed by SHA-256 content digest. The indexes answer which files
//! differ between two trees, which files are duplicates, and what to copy or
//! delete to bring one tree in line with another.

mod display;
mod json_output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Confirm;
use ferrodiff_config::{Config, ConfigLoader};
use ferrodiff_index::{DirectoryIndex, ScanOptions, Scanner};
use ferrodiff_sync::{
    DiffEngine, DuplicateFinder, DuplicateSummary, ExecutionObserver, ExecutorOptions,
    FileComparison, HardlinkPlanner, LinkExecutor, NoopObserver, SyncExecutor, SyncPlanner,
};
use ferrodiff_types::{DedupMode, SyncDirection, SyncMode, WorkerCount};
use json_output::{
    print_json, CompareJson, DedupJson, DuplicatesJson, OperationMetadata, SyncJson,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// ferrodiff - content-addressed directory comparison, sync and dedup
#[derive(Parser)]
#[command(
    name = "ferrodiff",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compare, synchronize and deduplicate directory trees by content",
    long_about = "ferrodiff hashes every file under the given directories and uses the\n\
                  resulting content index to report differences and duplicates, to\n\
                  synchronize trees and to replace duplicates with hardlinks."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of hashing workers
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two directory trees
    Compare {
        /// First directory (A)
        dir_a: PathBuf,
        /// Second directory (B)
        dir_b: PathBuf,
    },
    /// Find duplicate files in one or more directories
    Duplicates {
        /// Directories to scan
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },
    /// Bring a target directory up to date with a source directory
    Sync {
        /// Source directory
        source: PathBuf,
        /// Target directory
        target: PathBuf,
        /// Sync mode: copy or mirror
        #[arg(short, long)]
        mode: Option<SyncMode>,
        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,
    },
    /// Find duplicates or replace them with hardlinks
    Dedup {
        /// Directories to scan
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
        /// Dedup mode: find or link
        #[arg(short, long)]
        mode: Option<DedupMode>,
        /// Dry run - show what would be linked
        #[arg(long)]
        dry_run: bool,
        /// Do not ask for confirmation before linking
        #[arg(short, long)]
        yes: bool,
    },
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

/// How a command finished when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    PartialFailure,
}

impl Outcome {
    fn from_success(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::PartialFailure
        }
    }
}

/// Settings shared by every command
struct Context {
    config: Config,
    config_source: Option<PathBuf>,
    quiet: bool,
    verbose: bool,
    json: bool,
}

impl Context {
    fn scan_options(&self) -> ScanOptions {
        ScanOptions::from_config(&self.config.scan)
    }

    fn observer(&self) -> &'static dyn ExecutionObserver {
        if self.json {
            &NoopObserver
        } else {
            &display::ConsoleObserver
        }
    }

    /// Scan `roots` into one index, with a spinner on interactive output
    async fn scan<P: AsRef<Path>>(&self, roots: &[P]) -> Result<DirectoryIndex> {
        let label = roots
            .iter()
            .map(|r| r.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let spinner =
            display::create_scan_spinner(self.quiet || self.json, &format!("Scanning {label}..."));

        let result = Scanner::new(self.scan_options()).scan(roots).await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        Ok(result?)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(Outcome::Success) => {}
        Ok(Outcome::PartialFailure) => std::process::exit(1),
        Err(error) => {
            display::display_error(&format!("{error:#}"));
            std::process::exit(2);
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let (mut config, config_source) = load_config(cli.config.as_deref())?;

    if let Some(workers) = cli.workers {
        config.scan.workers = WorkerCount::new(workers).map_err(anyhow::Error::msg)?;
    }

    init_logging(&config, cli.debug, cli.quiet, cli.verbose)?;
    info!("ferrodiff v{} starting", env!("CARGO_PKG_VERSION"));

    let ctx = Context {
        config,
        config_source,
        quiet: cli.quiet,
        verbose: cli.verbose,
        json: cli.json,
    };

    match cli.command {
        Commands::Compare { dir_a, dir_b } => compare_command(&ctx, &dir_a, &dir_b).await,
        Commands::Duplicates { dirs } => duplicates_command(&ctx, &dirs).await,
        Commands::Sync {
            source,
            target,
            mode,
            dry_run,
        } => {
            let mode = mode.unwrap_or(ctx.config.sync.mode);
            let dry_run = dry_run || ctx.config.sync.dry_run;
            sync_command(&ctx, &source, &target, mode, dry_run).await
        }
        Commands::Dedup {
            dirs,
            mode,
            dry_run,
            yes,
        } => {
            let mode = mode.unwrap_or(ctx.config.dedup.mode);
            let dry_run = dry_run || ctx.config.dedup.dry_run;
            dedup_command(&ctx, &dirs, mode, dry_run, yes).await
        }
        Commands::Config { default } => config_command(&ctx, default),
    }
}

fn load_config(path: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    match path {
        Some(path) => Ok((
            ConfigLoader::load_from_file(path)?,
            Some(path.to_path_buf()),
        )),
        None => Ok((ConfigLoader::load_default()?, ConfigLoader::config_exists())),
    }
}

fn init_logging(config: &Config, debug: bool, quiet: bool, verbose: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        config.logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

async fn compare_command(ctx: &Context, dir_a: &Path, dir_b: &Path) -> Result<Outcome> {
    info!("Comparing {} with {}", dir_a.display(), dir_b.display());

    let a = ctx.scan(&[dir_a]).await?;
    let b = ctx.scan(&[dir_b]).await?;
    let diff = DiffEngine::compare(&a, &b);

    let details: Vec<FileComparison> = if ctx.verbose || ctx.json {
        diff.modifications
            .iter()
            .filter_map(|path| DiffEngine::inspect(&a, &b, path))
            .collect()
    } else {
        Vec::new()
    };

    if ctx.json {
        let skipped = a.skipped().iter().chain(b.skipped()).cloned().collect();
        print_json(&CompareJson {
            metadata: OperationMetadata::new("compare", &[dir_a, dir_b]),
            diff: &diff,
            details: &details,
            skipped,
        })?;
    } else {
        display::display_diff(&diff, &details);
        display::display_skipped(&a);
        display::display_skipped(&b);
    }

    Ok(Outcome::Success)
}

async fn duplicates_command(ctx: &Context, dirs: &[PathBuf]) -> Result<Outcome> {
    let index = ctx.scan(dirs).await?;
    report_duplicates(ctx, "duplicates", dirs, &index)?;
    Ok(Outcome::Success)
}

fn report_duplicates(
    ctx: &Context,
    operation: &str,
    dirs: &[PathBuf],
    index: &DirectoryIndex,
) -> Result<()> {
    let groups = DuplicateFinder::find(index);
    let summary = DuplicateSummary::of(&groups);

    if ctx.json {
        let roots: Vec<&Path> = dirs.iter().map(PathBuf::as_path).collect();
        print_json(&DuplicatesJson {
            metadata: OperationMetadata::new(operation, &roots),
            groups: &groups,
            summary,
            skipped: index.skipped(),
        })?;
    } else {
        display::display_duplicates(&groups, &summary);
        display::display_skipped(index);
    }

    Ok(())
}

async fn sync_command(
    ctx: &Context,
    source: &Path,
    target: &Path,
    mode: SyncMode,
    dry_run: bool,
) -> Result<Outcome> {
    info!("Starting {} sync", mode);

    if !ctx.json && !ctx.quiet {
        println!(
            "{} Synchronizing {} -> {} ({})",
            style("⟲").blue().bold(),
            style(source.display()).cyan(),
            style(target.display()).cyan(),
            mode
        );
        if dry_run {
            display::display_info("Dry run mode - no changes will be made");
        }
    }

    let source_index = ctx.scan(&[source]).await?;
    let target_index = ctx.scan(&[target]).await?;
    let diff = DiffEngine::compare(&source_index, &target_index);
    let plan = SyncPlanner::plan(&diff, mode, SyncDirection::AToB)
        .hold_back(&source_index.skipped_keys());

    let options = ExecutorOptions::from_config(&ctx.config.sync).with_dry_run(dry_run);
    let report = SyncExecutor::new(options)
        .execute(&plan, source, target, ctx.observer())
        .await;

    if ctx.json {
        print_json(&SyncJson {
            metadata: OperationMetadata::new("sync", &[source, target]),
            plan: &plan,
            report: &report,
        })?;
    } else if plan.is_empty() {
        display::display_success("Trees are already in sync");
    } else if !ctx.quiet {
        display::display_sync_report(&report);
    }

    if !ctx.json {
        display::display_skipped(&source_index);
        display::display_held_back(&plan.held_back);
    }

    Ok(Outcome::from_success(report.is_success()))
}

async fn dedup_command(
    ctx: &Context,
    dirs: &[PathBuf],
    mode: DedupMode,
    dry_run: bool,
    yes: bool,
) -> Result<Outcome> {
    let index = ctx.scan(dirs).await?;

    if mode == DedupMode::Find {
        report_duplicates(ctx, "dedup", dirs, &index)?;
        return Ok(Outcome::Success);
    }

    let roots: Vec<&Path> = dirs.iter().map(PathBuf::as_path).collect();
    let actions = HardlinkPlanner::plan(&DuplicateFinder::find(&index));

    if actions.is_empty() {
        if ctx.json {
            print_json(&DedupJson {
                metadata: OperationMetadata::new("dedup", &roots),
                actions: &actions,
                report: None,
            })?;
        } else {
            display::display_success("No duplicates found");
        }
        return Ok(Outcome::Success);
    }

    if !dry_run && !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Replace {} duplicate files with hardlinks?",
                actions.len()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            if ctx.json {
                print_json(&DedupJson {
                    metadata: OperationMetadata::new("dedup", &roots),
                    actions: &actions,
                    report: None,
                })?;
            } else {
                display::display_warning("Aborted, no files were changed");
            }
            return Ok(Outcome::Success);
        }
    }

    if dry_run && !ctx.json {
        display::display_info("Dry run mode - no files will be linked");
    }

    let report = LinkExecutor::new(dry_run)
        .execute(&index, &actions, ctx.observer())
        .await;

    if ctx.json {
        print_json(&DedupJson {
            metadata: OperationMetadata::new("dedup", &roots),
            actions: &actions,
            report: Some(&report),
        })?;
    } else if !ctx.quiet {
        display::display_link_report(&report);
    }

    Ok(Outcome::from_success(report.is_success()))
}

fn config_command(ctx: &Context, default: bool) -> Result<Outcome> {
    let config = if default {
        Config::default()
    } else {
        ctx.config.clone()
    };

    if ctx.json {
        print_json(&config)?;
        return Ok(Outcome::Success);
    }

    if default {
        println!("{} Default configuration:", style("⚙").blue().bold());
    } else {
        println!("{} Current configuration:", style("⚙").blue().bold());
        match &ctx.config_source {
            Some(path) => println!("  # loaded from {}", path.display()),
            None => println!("  # no configuration file found, using defaults"),
        }
    }
    print!("{}", ConfigLoader::to_yaml(&config)?);

    Ok(Outcome::Success)
}
