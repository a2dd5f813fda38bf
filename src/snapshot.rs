//! Versioned report snapshots.
//!
//! Reports are stored once per session and report version. A stored run is
//! never overwritten; inserting the same version again is a no-op.

use crate::models::CompareReportJson;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A persisted report together with its envelope metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRun {
    pub session_id: String,
    pub report_version: String,
    pub created_at: DateTime<Utc>,
    pub report: CompareReportJson,
}

impl ReportRun {
    pub fn new(session_id: impl Into<String>, report: CompareReportJson) -> Self {
        Self {
            session_id: session_id.into(),
            report_version: report.report_version.clone(),
            created_at: Utc::now(),
            report,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// File-backed snapshot store rooted at a directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of a run: `<root>/<session_id>/<version>.json`.
    pub fn path_for(&self, session_id: &str, report_version: &str) -> PathBuf {
        let file_name = format!("{}.json", report_version.replace(['/', '\\'], "_"));
        self.root.join(session_id).join(file_name)
    }

    /// Store a run unless one exists for the same session and version.
    pub fn insert_if_absent(&self, run: &ReportRun) -> Result<InsertOutcome> {
        let path = self.path_for(&run.session_id, &run.report_version);
        if path.exists() {
            debug!("Snapshot {} already exists", path.display());
            return Ok(InsertOutcome::AlreadyExists(path));
        }

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot directory {}", dir.display()))?;

        let json = serde_json::to_string_pretty(run).context("Failed to serialize report run")?;
        let mut temp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        temp.write_all(json.as_bytes())
            .context("Failed to write snapshot")?;

        match temp.persist_noclobber(&path) {
            Ok(_) => {
                info!("Stored snapshot {}", path.display());
                Ok(InsertOutcome::Created(path))
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                debug!("Snapshot {} was created concurrently", path.display());
                Ok(InsertOutcome::AlreadyExists(path))
            }
            Err(e) => Err(e.error)
                .with_context(|| format!("Failed to persist snapshot {}", path.display())),
        }
    }

    /// Load a stored run, `None` if absent.
    pub fn load(&self, session_id: &str, report_version: &str) -> Result<Option<ReportRun>> {
        let path = self.path_for(session_id, report_version);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let run = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        Ok(Some(run))
    }
}
