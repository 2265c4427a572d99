use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use searchunusedassets::analysis::{Phase, PhaseStatus, Session};
use searchunusedassets::config::Config;
use searchunusedassets::discovery::FileFinder;
use searchunusedassets::identity::{AssetId, MetaFileResolver};
use searchunusedassets::quarantine::Quarantine;
use searchunusedassets::report::{entries_from_snapshot, entries_from_state, Reporter};
use searchunusedassets::roots::BuildSettingsRoots;
use searchunusedassets::snapshot::{self, DEFAULT_SNAPSHOT_FILE};
use searchunusedassets::{report, AnalysisState};

/// SearchUnusedAssets - unused asset detection for Unity projects
#[derive(Parser, Debug)]
#[command(name = "searchunusedassets")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the Unity project directory
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Scene paths to treat as roots in addition to the build settings
    /// (can be specified multiple times)
    #[arg(short, long)]
    root: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also list assets that are in use, with their referencers
    #[arg(long)]
    show_used: bool,

    /// Drive the analysis in time slices instead of one blocking run
    #[arg(long)]
    cooperative: bool,

    /// Time budget per cooperative step, in milliseconds
    #[arg(long, value_name = "MS")]
    budget_ms: Option<u64>,

    /// Move unused assets into the recovery directory
    #[arg(long)]
    remove: bool,

    /// Confirm each asset individually before moving it
    #[arg(long)]
    interactive: bool,

    /// Show what would be removed without making changes
    #[arg(long)]
    dry_run: bool,

    /// Skip the removal confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Move previously removed assets back and exit
    #[arg(long)]
    restore: bool,

    /// Report from the last persisted snapshot instead of re-analyzing
    #[arg(long)]
    from_cache: bool,

    /// Custom snapshot file path (default: .searchunusedassets-cache.json)
    #[arg(long, value_name = "FILE")]
    cache_path: Option<PathBuf>,

    /// Do not persist a snapshot after the analysis
    #[arg(long)]
    no_cache: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for report::ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => report::ReportFormat::Terminal,
            OutputFormat::Json => report::ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completions
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose, cli.quiet);

    info!("SearchUnusedAssets v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    if cli.restore {
        return run_restore(&config, &cli);
    }

    if cli.from_cache {
        return report_from_cache(&config, &cli);
    }

    run_analysis(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if !cli.root.is_empty() {
        config.roots.extend(cli.root.clone());
    }
    if let Some(budget) = cli.budget_ms {
        config.step_budget_ms = budget;
    }
    if let Some(path) = &cli.cache_path {
        config.snapshot_path = Some(path.clone());
    }

    Ok(config)
}

fn snapshot_path(config: &Config, cli: &Cli) -> PathBuf {
    match &config.snapshot_path {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => cli.path.join(path),
        None => cli.path.join(DEFAULT_SNAPSHOT_FILE),
    }
}

fn run_restore(config: &Config, cli: &Cli) -> Result<()> {
    let quarantine = Quarantine::new(&cli.path, &config.recovery_dir);

    if !quarantine.has_recoverable() {
        println!("{}", "Nothing to restore.".yellow());
        return Ok(());
    }

    let restored = quarantine
        .restore()
        .map_err(|err| miette::miette!("{:#}", err))?;

    println!(
        "{} {} file(s) moved back; re-run the analysis to refresh results",
        "Restored".green().bold(),
        restored
    );
    Ok(())
}

fn report_from_cache(config: &Config, cli: &Cli) -> Result<()> {
    let path = snapshot_path(config, cli);
    info!("Reporting from snapshot {}", path.display());

    let snapshot = snapshot::load(&path).into_diagnostic()?;
    let entries = entries_from_snapshot(&snapshot);

    Reporter::new(cli.format.into(), cli.output.clone())
        .with_used_assets(cli.show_used)
        .with_base_path(&cli.path)
        .report(&entries)
}

fn run_analysis(config: &Config, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Discover candidates
    info!("Discovering assets...");
    let content_root = cli.path.join(&config.content_root);
    let finder = FileFinder::new(config);
    let candidates = finder.find_candidates(&content_root)?;

    if candidates.is_empty() {
        println!("{}", "No assets found under the content root.".yellow());
        return Ok(());
    }
    info!("Found {} candidate(s)", candidates.len());

    // Steps 2-4: index, extract, propagate
    let resolver = MetaFileResolver::new();
    let roots = BuildSettingsRoots::new(&cli.path).with_extra_roots(config.roots.clone());

    let mut session = Session::new(&content_root, candidates, &resolver, &roots);
    if !cli.no_cache {
        session = session.with_snapshot_path(snapshot_path(config, cli));
    }

    let bar = phase_bar(cli.quiet);
    let status = if cli.cooperative {
        drive_cooperatively(&mut session, config, &bar)
    } else {
        // blocking run still surfaces per-item progress
        session.run_with_progress(progress_renderer(bar.clone()))
    };
    bar.finish_and_clear();

    if status == PhaseStatus::Interrupted {
        println!("{}", "Analysis interrupted; results discarded.".yellow());
        return Ok(());
    }

    let mut state = session.into_state();

    // Step 5: report
    let entries = entries_from_state(&state);
    Reporter::new(cli.format.into(), cli.output.clone())
        .with_used_assets(cli.show_used)
        .with_base_path(&cli.path)
        .report(&entries)?;

    if cli.remove {
        remove_unused(config, cli, &mut state)?;
    }

    if !cli.quiet {
        println!();
        println!(
            "{}",
            format!(
                "✓ Analysis complete in {:.2}s",
                start_time.elapsed().as_secs_f64()
            )
            .green()
        );
    }
    Ok(())
}

fn phase_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar
}

/// Feed `InProgress` statuses into a progress bar
fn progress_renderer(bar: ProgressBar) -> impl FnMut(&PhaseStatus) {
    let mut last_phase = Phase::Idle;
    move |status| {
        if let PhaseStatus::InProgress {
            phase,
            completed,
            total,
        } = status
        {
            if *phase != last_phase {
                bar.set_message(phase.label().to_string());
                last_phase = *phase;
            }
            bar.set_length(*total as u64);
            bar.set_position(*completed as u64);
        }
    }
}

/// Step the session on a budget, keeping the progress bar current
fn drive_cooperatively(session: &mut Session<'_>, config: &Config, bar: &ProgressBar) -> PhaseStatus {
    let budget = Duration::from_millis(config.step_budget_ms.max(1));
    let mut render = progress_renderer(bar.clone());

    loop {
        match session.step(budget) {
            status @ PhaseStatus::InProgress { .. } => render(&status),
            status => return status,
        }
    }
}

fn remove_unused(config: &Config, cli: &Cli, state: &mut AnalysisState) -> Result<()> {
    let unused = state.unused_ids();
    if unused.is_empty() {
        return Ok(());
    }

    let quarantine =
        Quarantine::new(&cli.path, &config.recovery_dir).with_dry_run(cli.dry_run);

    let selected: Vec<AssetId> = if cli.interactive && !cli.dry_run {
        select_interactively(state, &unused)?
    } else {
        if !cli.yes && !cli.dry_run && !confirm_bulk_removal(unused.len())? {
            println!("{}", "Removal cancelled.".yellow());
            return Ok(());
        }
        unused
    };

    let moved = quarantine
        .remove_assets(state, &selected)
        .map_err(|err| miette::miette!("{:#}", err))?;

    if cli.dry_run {
        println!("{} asset(s) would be moved", moved);
    } else {
        println!(
            "{} {} asset(s) into {}; use --restore to undo",
            "Moved".green().bold(),
            moved,
            quarantine.recovery_dir().display()
        );
    }
    Ok(())
}

fn confirm_bulk_removal(count: usize) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("Move {} unused asset(s) into recovery?", count))
        .default(false)
        .interact()
        .into_diagnostic()
}

fn select_interactively(state: &AnalysisState, unused: &[AssetId]) -> Result<Vec<AssetId>> {
    let mut selected = Vec::new();

    for id in unused {
        let Some(record) = state.index.get(id) else {
            continue;
        };

        let remove = Confirm::new()
            .with_prompt(format!("Remove {}?", record.path.display()))
            .default(false)
            .interact()
            .into_diagnostic()?;

        if remove {
            selected.push(id.clone());
        }
    }

    Ok(selected)
}
