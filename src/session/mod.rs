//! Session input loading and discovery.
//!
//! A session file bundles the answers of one or two participants with
//! optional coverage expectations. Question metadata lives in a separate
//! file shared by all sessions.

use crate::models::{Answer, Dimension, QuestionIndex, QuestionMeta};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// File name suffix of session inputs in batch mode.
pub const SESSION_SUFFIX: &str = ".session.json";

/// Directories never descended into during discovery.
const EXCLUDED_DIRS: &[&str] = &["target", "node_modules", "snapshots"];

/// Answers of one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub profile_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// One report request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub session_id: String,
    pub participants: Vec<ParticipantInput>,
    /// Expected question count per dimension label, overriding the count
    /// derived from the question index.
    #[serde(default)]
    pub expected_per_dimension: Option<BTreeMap<String, usize>>,
    /// Number of values questions the answer store claims to hold.
    #[serde(default)]
    pub expected_values_questions: Option<usize>,
}

impl SessionInput {
    /// Load and validate a session file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        let session = Self::from_json_str(&content)
            .with_context(|| format!("Invalid session file: {}", path.display()))?;
        debug!(
            "Loaded session {} with {} participant(s) from {}",
            session.session_id,
            session.participants.len(),
            path.display()
        );
        Ok(session)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(content).context("Failed to parse session JSON")?;
        session.validate()?;
        Ok(session)
    }

    /// Check the request shape before it reaches the engine.
    pub fn validate(&self) -> Result<()> {
        let id = self.session_id.trim();
        if id.is_empty() {
            bail!("session_id must not be empty");
        }
        if id.contains(['/', '\\']) || id.starts_with('.') {
            bail!("session_id '{}' is not usable as a snapshot key", id);
        }
        if self.participants.is_empty() || self.participants.len() > 2 {
            bail!(
                "A session needs one or two participants, found {}",
                self.participants.len()
            );
        }
        Ok(())
    }

    /// Expected-count overrides resolved to dimensions.
    ///
    /// Unknown labels are logged and ignored.
    pub fn expected_overrides(&self) -> BTreeMap<Dimension, usize> {
        let mut overrides = BTreeMap::new();
        for (label, count) in self.expected_per_dimension.iter().flatten() {
            match Dimension::from_label(label) {
                Some(dimension) => {
                    overrides.insert(dimension, *count);
                }
                None => warn!(
                    "Session {}: expected count for unknown dimension '{}' ignored",
                    self.session_id, label
                ),
            }
        }
        overrides
    }
}

/// Load the question metadata index from a JSON array.
pub fn load_questions(path: &Path) -> Result<QuestionIndex> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read questions file: {}", path.display()))?;
    let questions: Vec<QuestionMeta> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse questions file: {}", path.display()))?;
    let index = QuestionIndex::new(questions);
    if index.is_empty() {
        bail!("Questions file {} contains no questions", path.display());
    }
    debug!("Loaded {} questions from {}", index.len(), path.display());
    Ok(index)
}

fn is_excluded(entry: &DirEntry) -> bool {
    // the root itself is always walked
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && EXCLUDED_DIRS.contains(&name.as_ref()))
}

/// Find all session files below `root`, sorted by path.
pub fn discover_sessions(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Batch directory not found: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping directory entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(SESSION_SUFFIX)
        {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!("Discovered {} session files in {}", files.len(), root.display());
    Ok(files)
}
