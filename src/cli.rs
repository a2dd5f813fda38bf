//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// AlignMatch - alignment scoring and comparative reports
///
/// Scores questionnaire answers of one or two participants on six
/// collaboration dimensions and renders a deterministic report.
///
/// Examples:
///   alignmatch --session team.session.json --questions questions.json
///   alignmatch --session team.session.json --questions questions.json --format json
///   alignmatch --batch ./sessions --questions questions.json --output ./reports
///   alignmatch --batch ./sessions --questions questions.json --dry-run
///   alignmatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Session file with the answers of one or two participants
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with = "batch",
        required_unless_present_any = ["batch", "init_config"]
    )]
    pub session: Option<PathBuf>,

    /// Directory searched recursively for *.session.json files
    #[arg(short, long, value_name = "DIR")]
    pub batch: Option<PathBuf>,

    /// Question metadata file (JSON array)
    #[arg(
        long,
        value_name = "FILE",
        env = "ALIGNMATCH_QUESTIONS",
        required_unless_present = "init_config"
    )]
    pub questions: Option<PathBuf>,

    /// Content pack (TOML) replacing the built-in German copy
    #[arg(long, value_name = "FILE", env = "ALIGNMATCH_CONTENT")]
    pub content: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file, or output directory in batch mode
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Store every report as a versioned snapshot below this directory
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .alignmatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with code 2 if any report lacks sufficient data
    ///
    /// Useful for pipelines that must not publish thin comparisons.
    #[arg(long)]
    pub fail_on_insufficient: bool,

    /// Dry run: score sessions and print coverage without writing reports
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .alignmatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn is_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match (&self.session, &self.batch) {
            (Some(session), None) => {
                if !session.is_file() {
                    return Err(format!("Session file does not exist: {}", session.display()));
                }
            }
            (None, Some(batch)) => {
                if !batch.is_dir() {
                    return Err(format!(
                        "Batch path is not a directory: {}",
                        batch.display()
                    ));
                }
            }
            (Some(_), Some(_)) => {
                return Err("Use either --session or --batch, not both".to_string());
            }
            (None, None) => {
                return Err("One of --session or --batch is required".to_string());
            }
        }

        match &self.questions {
            Some(questions) if !questions.is_file() => {
                return Err(format!(
                    "Questions file does not exist: {}",
                    questions.display()
                ));
            }
            None => return Err("--questions is required".to_string()),
            _ => {}
        }

        if let Some(ref content) = self.content {
            if !content.is_file() {
                return Err(format!("Content pack does not exist: {}", content.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet` wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
