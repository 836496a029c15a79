//! Append-only journals kept next to the plan.
//!
//! Decisions and risks are the user's explicit records, so a failed append
//! fails the command. Events are an audit trail written after the plan has
//! already been saved; a failed event append is logged and swallowed.

use crate::Result;
use crate::storage::{PlanStore, now_timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// One line of `decisions.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub ts: String,
    pub title: String,
    pub chosen: String,
    pub reason: String,
    #[serde(default)]
    pub rejected: Vec<String>,
}

impl DecisionRecord {
    /// Build a record stamped with the current time. Text fields are trimmed.
    pub fn new(title: &str, chosen: &str, reason: &str, rejected: Vec<String>) -> Self {
        Self {
            ts: now_timestamp(),
            title: title.trim().to_string(),
            chosen: chosen.trim().to_string(),
            reason: reason.trim().to_string(),
            rejected,
        }
    }
}

/// One line of `risks.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub ts: String,
    pub risk: String,
    pub signal: String,
    pub mitigation: String,
}

impl RiskRecord {
    pub fn new(risk: &str, signal: &str, mitigation: &str) -> Self {
        Self {
            ts: now_timestamp(),
            risk: risk.trim().to_string(),
            signal: signal.trim().to_string(),
            mitigation: mitigation.trim().to_string(),
        }
    }
}

/// Kind of entry in `events.jsonl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PlanUpdated,
    Replan,
    Ideate,
    IdeaApplied,
}

/// One line of `events.jsonl`: `{ts, type, source, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub ts: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Command that produced the event, e.g. `plan`.
    pub source: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EventRecord {
    pub fn new(kind: EventKind, source: &str) -> Self {
        Self {
            ts: now_timestamp(),
            kind,
            source: source.to_string(),
            fields: Map::new(),
        }
    }

    /// Attach a free-form field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// Append a decision to `decisions.jsonl`.
pub fn record_decision(store: &PlanStore, record: &DecisionRecord) -> Result<()> {
    store.append_record(&store.decisions_path(), record)?;
    debug!(title = %record.title, "recorded decision");
    Ok(())
}

/// Append a risk to `risks.jsonl`.
pub fn record_risk(store: &PlanStore, record: &RiskRecord) -> Result<()> {
    store.append_record(&store.risks_path(), record)?;
    debug!(risk = %record.risk, "recorded risk");
    Ok(())
}

/// Append an event to `events.jsonl`.
///
/// Never fails: when `enabled` is false nothing is written, and write errors
/// are only logged.
pub fn record_event(store: &PlanStore, event: &EventRecord, enabled: bool) {
    if !enabled {
        debug!(kind = ?event.kind, "event log disabled");
        return;
    }
    if let Err(e) = store.append_record(&store.events_path(), event) {
        warn!(kind = ?event.kind, error = %e, "failed to write event log");
    }
}
