//! AlignMatch - alignment scoring and comparative report engine
//!
//! Scores questionnaire answers of one or two participants on six
//! collaboration dimensions and renders a deterministic report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (I/O, parse failure, contract violation)
//!   2 - A report lacked sufficient data and --fail-on-insufficient was set

mod analysis;
mod cli;
mod config;
mod content;
mod engine;
mod error;
mod models;
mod report;
mod session;
mod snapshot;
#[cfg(test)]
mod test_support;
mod values;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use content::ContentPack;
use engine::ReportEngine;
use indicatif::{ProgressBar, ProgressStyle};
use models::{CompareReportJson, QuestionIndex, SectionId};
use session::SessionInput;
use snapshot::{InsertOutcome, ReportRun, SnapshotStore};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first: it can raise the log level
    let mut config = load_config(&args);
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("AlignMatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Config: {:?}", config);

    match run(args, config) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Report generation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .alignmatch.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set output, content pack and snapshot options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Config {
    if let Some(ref config_path) = args.config {
        return match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        };
    }

    match Config::load_default() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE, e);
            Config::default()
        }
    }
}

fn build_engine(config: &Config) -> Result<ReportEngine> {
    let engine = match config.content.path {
        Some(ref path) => {
            info!("Using content pack: {}", path);
            ReportEngine::with_content(ContentPack::load(Path::new(path))?)
        }
        None => ReportEngine::with_default_content()?,
    };
    debug!(
        "Content pack version {} ({})",
        engine.content().version,
        engine.content().locale
    );
    Ok(engine)
}

/// Per-session result of a run.
struct SessionOutcome {
    session_id: String,
    is_data_sufficient: bool,
}

/// Run the complete workflow. Returns exit code (0, 1 or 2).
fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let engine = build_engine(&config)?;
    let questions = args
        .questions
        .as_deref()
        .context("--questions is required")?;
    let index = session::load_questions(questions)?;
    info!("Loaded {} questions", index.len());

    let paths: Vec<PathBuf> = match (&args.session, &args.batch) {
        (Some(session), _) => vec![session.clone()],
        (None, Some(batch)) => session::discover_sessions(batch)?,
        (None, None) => anyhow::bail!("One of --session or --batch is required"),
    };

    if paths.is_empty() {
        println!("No session files found.");
        return Ok(0);
    }

    if args.dry_run {
        return handle_dry_run(&engine, &index, &paths);
    }

    let store = config
        .snapshot
        .enabled
        .then(|| SnapshotStore::new(&config.snapshot.directory));

    let progress = (args.is_batch() && !args.quiet).then(|| {
        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    });

    let mut outcomes = Vec::new();
    let mut failures = 0usize;

    for path in &paths {
        if let Some(ref pb) = progress {
            pb.set_message(path.display().to_string());
        }

        match process_session(path, &engine, &index, &config, store.as_ref(), args.is_batch()) {
            Ok(outcome) => outcomes.push(outcome),
            // a single session fails the whole run, a batch keeps going
            Err(e) if args.is_batch() => {
                failures += 1;
                warn!("Skipping {}: {:#}", path.display(), e);
            }
            Err(e) => return Err(e),
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let insufficient: Vec<&SessionOutcome> =
        outcomes.iter().filter(|o| !o.is_data_sufficient).collect();

    if args.is_batch() {
        println!("\n📊 Batch Summary:");
        println!("   Reports written: {}", outcomes.len());
        println!("   Insufficient data: {}", insufficient.len());
        println!("   Failed sessions: {}", failures);
        println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    }

    if args.fail_on_insufficient && !insufficient.is_empty() {
        for outcome in &insufficient {
            eprintln!("⛔ Session {} has insufficient data.", outcome.session_id);
        }
        eprintln!("\nFailing (exit code 2).");
        return Ok(2);
    }

    Ok(if failures > 0 { 1 } else { 0 })
}

fn render(report: &CompareReportJson, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => report::generate_json_report(report),
        OutputFormat::Markdown => Ok(report::generate_markdown_report(report)),
    }
}

fn process_session(
    path: &Path,
    engine: &ReportEngine,
    index: &QuestionIndex,
    config: &Config,
    store: Option<&SnapshotStore>,
    batch: bool,
) -> Result<SessionOutcome> {
    let input = SessionInput::load(path)?;
    let report = engine
        .generate(&input, index)
        .with_context(|| format!("Failed to generate report for session {}", input.session_id))?;

    let output_path = if batch {
        config.batch_report_path(&input.session_id)
    } else {
        config.report_path(&input.session_id)
    };
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let rendered = render(&report, config.general.format)?;
    std::fs::write(&output_path, rendered)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if let Some(store) = store {
        match store.insert_if_absent(&ReportRun::new(input.session_id.clone(), report.clone()))? {
            InsertOutcome::Created(path) => debug!("Snapshot written to {}", path.display()),
            InsertOutcome::AlreadyExists(path) => {
                let stored = store.load(&input.session_id, &report.report_version)?;
                info!(
                    "Snapshot for session {} already exists at {} (stored {}), kept unchanged",
                    input.session_id,
                    path.display(),
                    stored.map_or_else(|| "unreadable".to_string(), |run| run.created_at.to_rfc3339())
                );
            }
        }
    }

    if config.report.print_summary && !batch {
        print_summary(&report, &output_path);
    }

    Ok(SessionOutcome {
        session_id: input.session_id,
        is_data_sufficient: report.coverage.is_data_sufficient,
    })
}

fn print_summary(report: &CompareReportJson, output_path: &Path) {
    println!("\n📊 {}", report.cover.subtitle);
    if let Some(summary_type) = report.executive_summary.summary_type {
        println!("   Team type: {}", summary_type);
    }
    println!("   {}", report.coverage.note);
    if report.section(SectionId::ValuesAlignment).is_some() {
        println!("   {}", report.values_module.note);
    }
    for insight in &report.key_insights {
        println!("   - {}", insight.headline);
    }
    println!("\n✅ Report saved to: {}", output_path.display());
}

/// Handle --dry-run: score sessions and print coverage only.
fn handle_dry_run(engine: &ReportEngine, index: &QuestionIndex, paths: &[PathBuf]) -> Result<i32> {
    println!("\n🔍 Dry run: scoring {} session(s), no reports written...\n", paths.len());

    for path in paths {
        let input = SessionInput::load(path)?;
        let preview = engine
            .preview(&input, index)
            .with_context(|| format!("Failed to score session {}", input.session_id))?;
        let coverage = &preview.coverage;
        println!(
            "   {} {}: {}",
            if coverage.is_data_sufficient { "✅" } else { "⚠️ " },
            input.session_id,
            coverage.ratio(&engine.content().narrative.coverage)
        );
        if let Some(summary_type) = preview.summary_type {
            println!("      Team type: {}", summary_type);
        }
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}
