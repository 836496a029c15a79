//! Storage layer for DeepPlan data.
//!
//! This module handles persistence of the plan document and its journals.
//! All state for one working directory lives in a single state directory
//! (by default `<dir>/.deeplan/`):
//!
//! - `plan.json` - the plan document, pretty-printed, rewritten wholesale
//! - `decisions.jsonl` - append-only decision log
//! - `risks.jsonl` - append-only risk log
//! - `events.jsonl` - append-only event log
//! - `config.kdl` - session configuration (optional)
//!
//! Plan writes go through a temporary file in the state directory followed
//! by a rename, so readers never observe a partially written document.
//! There is no locking: two processes writing the same directory race and
//! the last writer wins.

use crate::config::DeepplanConfig;
use crate::models::PlanDocument;
use crate::models::migration::{LegacyPlan, migrate};
use crate::{Error, Result};
use chrono::{SecondsFormat, Utc};
use kdl::KdlDocument;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Name of the state directory created inside a working directory.
pub const STATE_DIR_NAME: &str = ".deeplan";

const PLAN_FILE: &str = "plan.json";
const DECISIONS_FILE: &str = "decisions.jsonl";
const RISKS_FILE: &str = "risks.jsonl";
const EVENTS_FILE: &str = "events.jsonl";
const CONFIG_FILE: &str = "config.kdl";

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "DP_CONFIG_DIR";

/// Current time in the fixed format used for `updated_at` and journal records.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Owner of the canonical plan document for one state directory.
#[derive(Debug, Clone)]
pub struct PlanStore {
    root: PathBuf,
}

impl PlanStore {
    /// Create a store rooted at an explicit state directory.
    ///
    /// Nothing is touched on disk until [`PlanStore::init`] or
    /// [`PlanStore::load`] is called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store using the default state directory inside `work_dir`.
    pub fn for_work_dir(work_dir: &Path) -> Self {
        Self::new(work_dir.join(STATE_DIR_NAME))
    }

    /// Root directory for this store's data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plan_path(&self) -> PathBuf {
        self.root.join(PLAN_FILE)
    }

    pub fn decisions_path(&self) -> PathBuf {
        self.root.join(DECISIONS_FILE)
    }

    pub fn risks_path(&self) -> PathBuf {
        self.root.join(RISKS_FILE)
    }

    pub fn events_path(&self) -> PathBuf {
        self.root.join(EVENTS_FILE)
    }

    pub fn config_kdl_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Check if the state directory holds a plan.
    pub fn exists(&self) -> bool {
        self.plan_path().exists()
    }

    /// Create the state directory, empty journals and an empty plan.
    ///
    /// Existing files are left untouched.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::Storage(format!(
                "Could not create state directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        for path in [self.decisions_path(), self.risks_path(), self.events_path()] {
            if !path.exists() {
                File::create(&path)?;
            }
        }

        if !self.exists() {
            info!(path = %self.plan_path().display(), "creating empty plan");
            self.save(&mut PlanDocument::new())?;
        }

        Ok(())
    }

    /// Load the plan, migrating it to the current schema.
    ///
    /// The migrated document is written back immediately so the on-disk
    /// schema heals after a single read. Text that is not JSON, or whose top
    /// level is not an object, is reported as a storage error and left on
    /// disk untouched; any field shape inside an object is migrated.
    pub fn load(&self) -> Result<PlanDocument> {
        self.init()?;

        let path = self.plan_path();
        let text = fs::read_to_string(&path)?;
        let legacy: LegacyPlan = serde_json::from_str(&text).map_err(|e| {
            Error::Storage(format!("Malformed plan document {}: {}", path.display(), e))
        })?;

        if legacy.has_legacy_tasks() {
            debug!("migrating legacy task list");
        }
        let mut doc = migrate(legacy);
        self.save(&mut doc)?;
        Ok(doc)
    }

    /// Persist the plan, stamping `updated_at` with the current time.
    pub fn save(&self, doc: &mut PlanDocument) -> Result<()> {
        doc.updated_at = now_timestamp();
        let json = serde_json::to_string_pretty(doc)?;

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(|e| {
            Error::Storage(format!(
                "Could not write to state directory {}: {}",
                self.root.display(),
                e
            ))
        })?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.plan_path())
            .map_err(|e| Error::Io(e.error))?;

        debug!(updated_at = %doc.updated_at, "saved plan");
        Ok(())
    }

    // === Journals ===

    /// Append one record as a JSON line.
    pub fn append_record<T: Serialize>(&self, path: &Path, record: &T) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Read every record of a journal, skipping blank lines.
    pub fn read_records(&self, path: &Path) -> Result<Vec<serde_json::Value>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        fs::read_to_string(path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }

    // === Configuration files ===

    /// Path of the system-wide config.kdl, if a config directory is known.
    ///
    /// `DP_CONFIG_DIR` replaces the platform config directory.
    pub fn system_config_kdl_path() -> Option<PathBuf> {
        match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir).join(CONFIG_FILE)),
            _ => dirs::config_dir().map(|dir| dir.join("deepplan").join(CONFIG_FILE)),
        }
    }

    /// Read the session config.kdl of this state directory.
    pub fn read_session_config(&self) -> Result<DeepplanConfig> {
        read_config_file(&self.config_kdl_path())
    }

    /// Replace the session config.kdl of this state directory.
    pub fn write_session_config(&self, config: &DeepplanConfig) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.config_kdl_path(), config.to_kdl().to_string())?;
        Ok(())
    }

    /// Read the system config.kdl, or an empty config when there is none.
    pub fn read_system_config() -> Result<DeepplanConfig> {
        match Self::system_config_kdl_path() {
            Some(path) => read_config_file(&path),
            None => Ok(DeepplanConfig::default()),
        }
    }
}

fn read_config_file(path: &Path) -> Result<DeepplanConfig> {
    if !path.exists() {
        return Ok(DeepplanConfig::default());
    }
    let text = fs::read_to_string(path)?;
    let doc: KdlDocument = text
        .parse()
        .map_err(|e: kdl::KdlError| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(DeepplanConfig::from_kdl(&doc))
}
