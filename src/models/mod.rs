//! Data models for the plan document.
//!
//! This module defines the core data structures:
//! - `PlanDocument` - The singleton plan held in `plan.json`
//! - `Risk` - A structured risk entry with an early signal and mitigation
//! - `InsightAxis` - The eight strategic axes a plan must address
//!
//! Legacy documents are upgraded by [`migration::migrate`], and candidate plan
//! skeletons are produced by [`ideas::generate_ideas`].

pub mod ideas;
pub mod migration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Schema tag written to every document after load.
pub const SCHEMA_VERSION: &str = "0.3.0";

/// A top risk with its early warning signal and planned mitigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub mitigation: String,
}

impl Risk {
    pub fn new(
        risk: impl Into<String>,
        signal: impl Into<String>,
        mitigation: impl Into<String>,
    ) -> Self {
        Self {
            risk: risk.into(),
            signal: signal.into(),
            mitigation: mitigation.into(),
        }
    }
}

/// One of the eight long-horizon insight axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightAxis {
    Direction,
    Market,
    Timing,
    Differentiation,
    Monetization,
    Constraint,
    RiskSignal,
    Evolution,
}

impl InsightAxis {
    /// All axes in rubric order.
    pub const ALL: [InsightAxis; 8] = [
        InsightAxis::Direction,
        InsightAxis::Market,
        InsightAxis::Timing,
        InsightAxis::Differentiation,
        InsightAxis::Monetization,
        InsightAxis::Constraint,
        InsightAxis::RiskSignal,
        InsightAxis::Evolution,
    ];

    /// Name of the document field holding this axis.
    pub fn field_name(&self) -> &'static str {
        match self {
            InsightAxis::Direction => "direction_insights",
            InsightAxis::Market => "market_insights",
            InsightAxis::Timing => "timing_insights",
            InsightAxis::Differentiation => "differentiation_insights",
            InsightAxis::Monetization => "monetization_insights",
            InsightAxis::Constraint => "constraint_insights",
            InsightAxis::RiskSignal => "risk_signal_insights",
            InsightAxis::Evolution => "evolution_insights",
        }
    }
}

impl fmt::Display for InsightAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// The plan document: goal, justification, tasks and supporting evidence.
///
/// Every field is always present once a document has gone through
/// [`migration::migrate`]; absence is represented as an empty string or list.
/// Keys this version does not know about are kept in `extra` so a round trip
/// never drops operator data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub version: String,
    pub updated_at: String,
    pub goal: String,
    pub success_metric: String,
    pub deadline: String,
    pub constraints: Vec<String>,
    pub assumptions: Vec<String>,
    pub options: Vec<String>,
    pub selected_option: String,
    pub plan_tasks: Vec<String>,
    pub execution_tasks: Vec<String>,
    pub dependencies: Vec<String>,
    pub experiments: Vec<String>,
    pub risks: Vec<Risk>,
    pub references: Vec<String>,
    pub insights: Vec<String>,
    pub direction_insights: Vec<String>,
    pub market_insights: Vec<String>,
    pub timing_insights: Vec<String>,
    pub differentiation_insights: Vec<String>,
    pub monetization_insights: Vec<String>,
    pub constraint_insights: Vec<String>,
    pub risk_signal_insights: Vec<String>,
    pub evolution_insights: Vec<String>,
    pub definition_of_done: Vec<String>,
    pub evidence: Vec<String>,

    /// Unrecognised keys carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanDocument {
    /// Create an empty document at the current schema version.
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            ..Default::default()
        }
    }

    /// Borrow the list backing an insight axis.
    pub fn axis(&self, axis: InsightAxis) -> &Vec<String> {
        match axis {
            InsightAxis::Direction => &self.direction_insights,
            InsightAxis::Market => &self.market_insights,
            InsightAxis::Timing => &self.timing_insights,
            InsightAxis::Differentiation => &self.differentiation_insights,
            InsightAxis::Monetization => &self.monetization_insights,
            InsightAxis::Constraint => &self.constraint_insights,
            InsightAxis::RiskSignal => &self.risk_signal_insights,
            InsightAxis::Evolution => &self.evolution_insights,
        }
    }

    /// Mutably borrow the list backing an insight axis.
    pub fn axis_mut(&mut self, axis: InsightAxis) -> &mut Vec<String> {
        match axis {
            InsightAxis::Direction => &mut self.direction_insights,
            InsightAxis::Market => &mut self.market_insights,
            InsightAxis::Timing => &mut self.timing_insights,
            InsightAxis::Differentiation => &mut self.differentiation_insights,
            InsightAxis::Monetization => &mut self.monetization_insights,
            InsightAxis::Constraint => &mut self.constraint_insights,
            InsightAxis::RiskSignal => &mut self.risk_signal_insights,
            InsightAxis::Evolution => &mut self.evolution_insights,
        }
    }

    /// Number of insight axes with at least one entry.
    pub fn covered_axes(&self) -> usize {
        InsightAxis::ALL
            .iter()
            .filter(|axis| !self.axis(**axis).is_empty())
            .count()
    }

    /// Share of plan tasks among all tasks, or `None` when there are no tasks.
    pub fn plan_ratio(&self) -> Option<f64> {
        let total = self.plan_tasks.len() + self.execution_tasks.len();
        if total == 0 {
            None
        } else {
            Some(self.plan_tasks.len() as f64 / total as f64)
        }
    }
}

/// String-list fields that commands edit directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Constraints,
    Assumptions,
    Options,
    PlanTasks,
    ExecutionTasks,
    Dependencies,
    Experiments,
    References,
    Insights,
    DefinitionOfDone,
    Evidence,
    Axis(InsightAxis),
}

impl ListField {
    pub fn field_name(&self) -> &'static str {
        match self {
            ListField::Constraints => "constraints",
            ListField::Assumptions => "assumptions",
            ListField::Options => "options",
            ListField::PlanTasks => "plan_tasks",
            ListField::ExecutionTasks => "execution_tasks",
            ListField::Dependencies => "dependencies",
            ListField::Experiments => "experiments",
            ListField::References => "references",
            ListField::Insights => "insights",
            ListField::DefinitionOfDone => "definition_of_done",
            ListField::Evidence => "evidence",
            ListField::Axis(axis) => axis.field_name(),
        }
    }
}

impl PlanDocument {
    /// Mutably borrow a string-list field.
    pub fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Constraints => &mut self.constraints,
            ListField::Assumptions => &mut self.assumptions,
            ListField::Options => &mut self.options,
            ListField::PlanTasks => &mut self.plan_tasks,
            ListField::ExecutionTasks => &mut self.execution_tasks,
            ListField::Dependencies => &mut self.dependencies,
            ListField::Experiments => &mut self.experiments,
            ListField::References => &mut self.references,
            ListField::Insights => &mut self.insights,
            ListField::DefinitionOfDone => &mut self.definition_of_done,
            ListField::Evidence => &mut self.evidence,
            ListField::Axis(axis) => self.axis_mut(axis),
        }
    }
}

/// A string counts as present when it is not blank after trimming.
pub fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_empty_at_current_version() {
        let doc = PlanDocument::new();
        assert_eq!(doc.version, SCHEMA_VERSION);
        assert!(doc.goal.is_empty());
        assert!(doc.risks.is_empty());
        assert_eq!(doc.covered_axes(), 0);
    }

    #[test]
    fn test_is_filled_trims_whitespace() {
        assert!(!is_filled(""));
        assert!(!is_filled("   \t"));
        assert!(is_filled(" x "));
    }

    #[test]
    fn test_axis_accessors_map_to_fields() {
        let mut doc = PlanDocument::new();
        doc.axis_mut(InsightAxis::RiskSignal)
            .push("Watch churn".to_string());
        assert_eq!(doc.risk_signal_insights, vec!["Watch churn"]);
        assert_eq!(doc.covered_axes(), 1);
        assert_eq!(InsightAxis::RiskSignal.field_name(), "risk_signal_insights");
    }

    #[test]
    fn test_list_field_reaches_axes() {
        let mut doc = PlanDocument::new();
        doc.list_mut(ListField::Axis(InsightAxis::Market))
            .push("Niche".into());
        doc.list_mut(ListField::Evidence).push("Interview".into());
        assert_eq!(doc.market_insights, vec!["Niche"]);
        assert_eq!(doc.evidence, vec!["Interview"]);
        assert_eq!(
            ListField::Axis(InsightAxis::Market).field_name(),
            "market_insights"
        );
    }

    #[test]
    fn test_plan_ratio() {
        let mut doc = PlanDocument::new();
        assert_eq!(doc.plan_ratio(), None);
        doc.plan_tasks = vec!["a".into(), "b".into()];
        doc.execution_tasks = vec!["c".into(), "d".into(), "e".into()];
        assert_eq!(doc.plan_ratio(), Some(0.4));
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let json = serde_json::json!({
            "version": "0.3.0",
            "updated_at": "",
            "goal": "Ship",
            "success_metric": "",
            "deadline": "",
            "constraints": [],
            "assumptions": [],
            "options": [],
            "selected_option": "",
            "plan_tasks": [],
            "execution_tasks": [],
            "dependencies": [],
            "experiments": [],
            "risks": [],
            "references": [],
            "insights": [],
            "direction_insights": [],
            "market_insights": [],
            "timing_insights": [],
            "differentiation_insights": [],
            "monetization_insights": [],
            "constraint_insights": [],
            "risk_signal_insights": [],
            "evolution_insights": [],
            "definition_of_done": [],
            "evidence": [],
            "owner": "alice"
        });
        let doc: PlanDocument = serde_json::from_value(json).unwrap();
        assert_eq!(doc.extra["owner"], "alice");
        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["owner"], "alice");
    }
}
