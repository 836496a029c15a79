//! Command implementations for the dp CLI.
//!
//! Each command loads what it needs from a [`PlanStore`], does its work and
//! returns a serializable result. Rendering is left to the caller through
//! the [`Output`] trait:
//! - `init` - create the state directory
//! - `plan` / `replan` - edit the plan, then assess and auto-repair
//! - `decide` / `risk` - append to the journals
//! - `qa` / `show` - read-only views of the plan
//! - `ideate` - generate plan skeletons, optionally applying one
//! - `config` - read and write config.kdl

use crate::config::{CONFIG_KEYS, ResolvedConfig};
use crate::journal::{
    DecisionRecord, EventKind, EventRecord, RiskRecord, record_decision, record_event, record_risk,
};
use crate::models::ideas::{Idea, IdeaRequest, generate_ideas};
use crate::models::ListField;
use crate::quality::{Assessment, AssessmentOrchestrator, AssessmentOutcome, Disposition, assess};
use crate::storage::PlanStore;
use crate::{Error, Result};
use serde::Serialize;
use tracing::info;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Split a comma-separated flag value, trimming items and dropping blanks.
pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

// === Init ===

#[derive(Debug, Serialize)]
pub struct InitResult {
    pub initialized: bool,
    pub state_dir: String,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        if self.initialized {
            format!("Initialized state in {}", self.state_dir)
        } else {
            format!("State already initialized in {}", self.state_dir)
        }
    }
}

/// Create the state directory, journals and an empty plan.
pub fn init(store: &PlanStore) -> Result<InitResult> {
    let initialized = !store.exists();
    store.init()?;
    Ok(InitResult {
        initialized,
        state_dir: store.root().display().to_string(),
    })
}

// === Assessment output shared by plan, replan and qa ===

#[derive(Debug, Serialize)]
pub struct AssessResult {
    /// Score of the plan as persisted
    pub score: u32,
    pub disposition: Disposition,
    #[serde(flatten)]
    pub outcome: AssessmentOutcome,
}

impl AssessResult {
    fn from_outcome(outcome: AssessmentOutcome) -> Self {
        Self {
            score: outcome.final_assessment().score,
            disposition: outcome.disposition(),
            outcome,
        }
    }
}

impl Output for AssessResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        self.outcome.to_report()
    }
}

// === Plan ===

/// Edits requested by `dp plan`. Scalars overwrite when given and non-blank;
/// list values are comma-separated and replace the whole list.
#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub goal: Option<String>,
    pub success_metric: Option<String>,
    pub deadline: Option<String>,
    pub selected_option: Option<String>,
    pub lists: Vec<(ListField, String)>,
}

fn set_scalar(slot: &mut String, value: Option<&String>) {
    if let Some(value) = value {
        let value = value.trim();
        if !value.is_empty() {
            *slot = value.to_string();
        }
    }
}

/// Apply a plan update, then assess and auto-repair.
pub fn plan(store: &PlanStore, config: &ResolvedConfig, update: &PlanUpdate) -> Result<AssessResult> {
    let mut doc = store.load()?;

    set_scalar(&mut doc.goal, update.goal.as_ref());
    set_scalar(&mut doc.success_metric, update.success_metric.as_ref());
    set_scalar(&mut doc.deadline, update.deadline.as_ref());
    set_scalar(&mut doc.selected_option, update.selected_option.as_ref());
    for (field, value) in &update.lists {
        *doc.list_mut(*field) = parse_csv(value);
    }

    store.save(&mut doc)?;
    record_event(
        store,
        &EventRecord::new(EventKind::PlanUpdated, "plan").with("goal", doc.goal.clone()),
        config.event_log(),
    );

    let outcome = AssessmentOrchestrator::new(store, config.auto_replan()).run(&mut doc)?;
    Ok(AssessResult::from_outcome(outcome))
}

// === Replan ===

/// Single items appended by `dp replan`.
#[derive(Debug, Clone, Default)]
pub struct ReplanUpdate {
    pub additions: Vec<(ListField, String)>,
}

impl ReplanUpdate {
    fn evidence(&self) -> String {
        self.additions
            .iter()
            .find(|(field, _)| *field == ListField::Evidence)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }
}

/// Append evidence, tasks, references and insights, then assess and
/// auto-repair.
pub fn replan(
    store: &PlanStore,
    config: &ResolvedConfig,
    update: &ReplanUpdate,
) -> Result<AssessResult> {
    let mut doc = store.load()?;

    for (field, value) in &update.additions {
        let value = value.trim();
        if !value.is_empty() {
            doc.list_mut(*field).push(value.to_string());
        }
    }

    store.save(&mut doc)?;
    record_event(
        store,
        &EventRecord::new(EventKind::Replan, "replan").with("evidence", update.evidence()),
        config.event_log(),
    );

    let outcome = AssessmentOrchestrator::new(store, config.auto_replan()).run(&mut doc)?;
    Ok(AssessResult::from_outcome(outcome))
}

// === Decide / Risk ===

#[derive(Debug, Serialize)]
pub struct DecisionRecorded {
    pub recorded: DecisionRecord,
}

impl Output for DecisionRecorded {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        "Decision recorded.".to_string()
    }
}

/// Append a decision to the decision journal.
pub fn decide(
    store: &PlanStore,
    title: &str,
    chosen: &str,
    reason: &str,
    rejected: Option<&str>,
) -> Result<DecisionRecorded> {
    store.init()?;
    let record = DecisionRecord::new(
        title,
        chosen,
        reason,
        rejected.map(parse_csv).unwrap_or_default(),
    );
    record_decision(store, &record)?;
    Ok(DecisionRecorded { recorded: record })
}

#[derive(Debug, Serialize)]
pub struct RiskRecorded {
    pub recorded: RiskRecord,
}

impl Output for RiskRecorded {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        "Risk recorded.".to_string()
    }
}

/// Append a risk to the risk journal. The plan's own `risks` list is not
/// touched.
pub fn risk(store: &PlanStore, risk: &str, signal: &str, mitigation: &str) -> Result<RiskRecorded> {
    store.init()?;
    let record = RiskRecord::new(risk, signal, mitigation);
    record_risk(store, &record)?;
    Ok(RiskRecorded { recorded: record })
}

// === QA ===

/// Assess the current plan without repairing it.
pub fn qa(store: &PlanStore) -> Result<AssessResult> {
    let mut doc = store.load()?;
    let outcome = AssessmentOrchestrator::new(store, false).run(&mut doc)?;
    Ok(AssessResult::from_outcome(outcome))
}

// === Show ===

#[derive(Debug, Serialize)]
pub struct ShowResult {
    pub goal: String,
    pub success_metric: String,
    pub deadline: String,
    pub updated_at: String,
    pub plan_tasks: usize,
    pub execution_tasks: usize,
    /// Plan tasks as a percentage of all tasks
    pub plan_ratio: Option<f64>,
    pub references: usize,
    pub insights: usize,
    pub insight_axes_covered: usize,
    pub risks: usize,
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let ratio = match self.plan_ratio {
            Some(pct) => format!("{:.1}%", pct),
            None => "n/a".to_string(),
        };
        [
            format!("Goal: {}", self.goal),
            format!("Success Metric: {}", self.success_metric),
            format!("Deadline: {}", self.deadline),
            format!("Updated: {}", self.updated_at),
            format!("Plan Tasks: {}", self.plan_tasks),
            format!("Execution Tasks: {}", self.execution_tasks),
            format!("Plan Ratio: {}", ratio),
            format!("References: {}", self.references),
            format!("Insights: {}", self.insights),
            format!("Insight Axes Covered: {}/8", self.insight_axes_covered),
            format!("Risks: {}", self.risks),
        ]
        .join("\n")
    }
}

/// Summarize the current plan.
pub fn show(store: &PlanStore) -> Result<ShowResult> {
    let doc = store.load()?;
    Ok(ShowResult {
        plan_tasks: doc.plan_tasks.len(),
        execution_tasks: doc.execution_tasks.len(),
        plan_ratio: doc.plan_ratio().map(|ratio| ratio * 100.0),
        references: doc.references.len(),
        insights: doc.insights.len(),
        insight_axes_covered: doc.covered_axes(),
        risks: doc.risks.len(),
        goal: doc.goal,
        success_metric: doc.success_metric,
        deadline: doc.deadline,
        updated_at: doc.updated_at,
    })
}

// === Ideate ===

#[derive(Debug, Serialize)]
pub struct IdeateResult {
    pub ideas: Vec<Idea>,
    /// 1-based index of the applied idea
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
}

impl Output for IdeateResult {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for (idx, idea) in self.ideas.iter().enumerate() {
            lines.push(format!("[{}] {}", idx + 1, idea.title));
            lines.push(format!("  Goal: {}", idea.goal));
            lines.push(format!("  Success Metric: {}", idea.success_metric));
            lines.push(format!("  Deadline: {}", idea.deadline));
            lines.push(format!("  Constraints: {}", idea.constraints.join(", ")));
            lines.push(String::new());
        }
        if let (Some(applied), Some(assessment)) = (self.applied, &self.assessment) {
            lines.push(format!("Applied idea #{} to current plan.", applied));
            lines.push(assessment.to_report());
        }
        lines.join("\n")
    }
}

/// Generate ideas and, when `apply` is given, write that idea into the plan
/// and assess it.
pub fn ideate(
    store: &PlanStore,
    config: &ResolvedConfig,
    request: &IdeaRequest,
    apply: Option<usize>,
) -> Result<IdeateResult> {
    store.init()?;
    let ideas = generate_ideas(request, chrono::Local::now().date_naive());
    record_event(
        store,
        &EventRecord::new(EventKind::Ideate, "ideate")
            .with("count", ideas.len())
            .with("profile", request.profile.clone().unwrap_or_default()),
        config.event_log(),
    );

    let Some(index) = apply else {
        return Ok(IdeateResult {
            ideas,
            applied: None,
            assessment: None,
        });
    };

    let selected = index
        .checked_sub(1)
        .and_then(|i| ideas.get(i))
        .ok_or_else(|| {
            Error::Validation(format!("--apply must be between 1 and {}", ideas.len()))
        })?;

    let mut doc = store.load()?;
    selected.apply_to(&mut doc);
    store.save(&mut doc)?;
    record_event(
        store,
        &EventRecord::new(EventKind::IdeaApplied, "ideate")
            .with("selected_index", index)
            .with("goal", selected.goal.clone()),
        config.event_log(),
    );
    info!(index, title = %selected.title, "applied idea");

    let assessment = assess(&doc);
    Ok(IdeateResult {
        ideas,
        applied: Some(index),
        assessment: Some(assessment),
    })
}

// === Config ===

#[derive(Debug, Serialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: String,
    pub source: String,
}

impl Output for ConfigValue {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        format!("{} = {} ({})", self.key, self.value, self.source)
    }
}

fn lookup(config: &ResolvedConfig, key: &str) -> Result<ConfigValue> {
    let (value, source) = config.lookup(key).ok_or_else(|| {
        Error::Config(format!(
            "Unknown config key: {} (expected one of {})",
            key,
            CONFIG_KEYS.join(", ")
        ))
    })?;
    Ok(ConfigValue {
        key: key.to_string(),
        value,
        source: source.to_string(),
    })
}

/// Show the effective value of one key and where it came from.
pub fn config_get(config: &ResolvedConfig, key: &str) -> Result<ConfigValue> {
    lookup(config, key)
}

#[derive(Debug, Serialize)]
pub struct ConfigSet {
    pub key: String,
    pub value: String,
    pub path: String,
}

impl Output for ConfigSet {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path)
    }
}

/// Write a key to the session config.kdl.
pub fn config_set(store: &PlanStore, key: &str, value: &str) -> Result<ConfigSet> {
    let mut session = store.read_session_config()?;
    session.set(key, value).map_err(Error::Config)?;
    store.write_session_config(&session)?;

    let stored = match key {
        "output-format" => session.output_format.map(|f| f.to_string()),
        "auto-replan" => session.auto_replan.map(|b| b.to_string()),
        _ => session.event_log.map(|b| b.to_string()),
    };
    Ok(ConfigSet {
        key: key.to_string(),
        value: stored.unwrap_or_default(),
        path: store.config_kdl_path().display().to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct ConfigList {
    pub entries: Vec<ConfigValue>,
}

impl Output for ConfigList {
    fn to_json(&self) -> String {
        to_json(self)
    }

    fn to_human(&self) -> String {
        self.entries
            .iter()
            .map(Output::to_human)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Every config key with its effective value and source.
pub fn config_list(config: &ResolvedConfig) -> Result<ConfigList> {
    let entries = CONFIG_KEYS
        .iter()
        .map(|key| lookup(config, key))
        .collect::<Result<Vec<_>>>()?;
    Ok(ConfigList { entries })
}
