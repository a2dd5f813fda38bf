//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.alignmatch.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".alignmatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Content pack settings.
    #[serde(default)]
    pub content: ContentConfig,

    /// Snapshot persistence settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file, or directory in batch mode. Derived from the session
    /// id when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Content pack settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Path to a TOML content pack. The built-in pack is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Store each report as a versioned snapshot.
    #[serde(default)]
    pub enabled: bool,

    /// Snapshot root directory.
    #[serde(default = "default_snapshot_dir")]
    pub directory: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_snapshot_dir(),
        }
    }
}

fn default_snapshot_dir() -> String {
    "snapshots".to_string()
}

/// Report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Print a short summary per report to the console.
    #[serde(default = "default_true")]
    pub print_summary: bool,

    /// Default directory for batch output.
    #[serde(default = "default_batch_dir")]
    pub batch_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            print_summary: true,
            batch_dir: default_batch_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_batch_dir() -> String {
    "reports".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref content) = args.content {
            self.content.path = Some(content.display().to_string());
        }

        // An explicit snapshot directory implies snapshots are wanted
        if let Some(ref dir) = args.snapshot_dir {
            self.snapshot.enabled = true;
            self.snapshot.directory = dir.display().to_string();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
        if args.quiet {
            self.report.print_summary = false;
        }
    }

    /// Output path of a single report.
    pub fn report_path(&self, session_id: &str) -> PathBuf {
        match self.general.output {
            Some(ref output) => PathBuf::from(output),
            None => PathBuf::from(format!(
                "{}.report.{}",
                session_id,
                self.general.format.extension()
            )),
        }
    }

    /// Output path of a report in batch mode.
    pub fn batch_report_path(&self, session_id: &str) -> PathBuf {
        let dir = self
            .general
            .output
            .clone()
            .unwrap_or_else(|| self.report.batch_dir.clone());
        PathBuf::from(dir).join(format!(
            "{}.report.{}",
            session_id,
            self.general.format.extension()
        ))
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert!(!config.snapshot.enabled);
        assert_eq!(config.snapshot.directory, "snapshots");
        assert!(config.report.print_summary);
        assert!(config.content.path.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "out/report.json"
format = "json"
verbose = true

[content]
path = "content/en.toml"

[snapshot]
enabled = true
directory = "/var/lib/alignmatch"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output.as_deref(), Some("out/report.json"));
        assert_eq!(config.general.format, OutputFormat::Json);
        assert!(config.general.verbose);
        assert_eq!(config.content.path.as_deref(), Some("content/en.toml"));
        assert!(config.snapshot.enabled);
        assert_eq!(config.snapshot.directory, "/var/lib/alignmatch");
        assert_eq!(config.report.batch_dir, "reports");
    }

    #[test]
    fn test_report_paths() {
        let mut config = Config::default();
        assert_eq!(config.report_path("team-1"), PathBuf::from("team-1.report.md"));
        assert_eq!(
            config.batch_report_path("team-1"),
            PathBuf::from("reports").join("team-1.report.md")
        );

        config.general.format = OutputFormat::Json;
        config.general.output = Some("out".to_string());
        assert_eq!(config.report_path("team-1"), PathBuf::from("out"));
        assert_eq!(
            config.batch_report_path("team-1"),
            PathBuf::from("out").join("team-1.report.json")
        );
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[snapshot]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.snapshot.directory, "snapshots");
    }
}
