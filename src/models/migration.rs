//! Schema migration for persisted plan documents.
//!
//! Older documents kept a single `tasks` list instead of the separate
//! `plan_tasks` / `execution_tasks` split, and may be missing any field that
//! was added later, or hold it in an older shape. [`migrate`] turns whatever
//! JSON object was read from disk into a current [`PlanDocument`]:
//!
//! - A legacy `tasks` list is split at its midpoint (floor) when neither
//!   `plan_tasks` nor `execution_tasks` is present as a key, and is always
//!   discarded afterwards.
//! - Missing or `null` fields get their empty default. Present values are
//!   never altered.
//! - Loosely typed values are coerced: a bare string becomes a one-item list,
//!   a number or boolean becomes its text, a string risk becomes a risk with
//!   no signal or mitigation. A value that cannot be coerced is kept under
//!   `legacy_<key>` in the extra fields and the field gets its default.
//! - `version` is stamped with [`SCHEMA_VERSION`].
//!
//! The function is pure, total and idempotent: migrating a migrated document
//! yields the same document.

use super::{PlanDocument, Risk, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A plan document as it may appear on disk, from any schema version.
///
/// Only the top level has to be a JSON object; every field is read leniently
/// by [`migrate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyPlan(pub Map<String, Value>);

impl LegacyPlan {
    /// Whether the pre-0.3 undifferentiated `tasks` list is present.
    pub fn has_legacy_tasks(&self) -> bool {
        self.0.contains_key("tasks")
    }
}

/// Field-by-field reader that moves recognised keys out of the raw object
/// and parks unusable values in `extra`.
struct Fields {
    raw: Map<String, Value>,
    stashed: Vec<(String, Value)>,
}

impl Fields {
    fn text(&mut self, key: &str) -> String {
        match self.raw.remove(key) {
            None | Some(Value::Null) => String::new(),
            Some(value) => match scalar_text(&value) {
                Some(text) => text,
                None => {
                    self.stash(key, value);
                    String::new()
                }
            },
        }
    }

    fn list(&mut self, key: &str) -> Vec<String> {
        match self.raw.remove(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => match text_list(&value) {
                Some(items) => items,
                None => {
                    self.stash(key, value);
                    Vec::new()
                }
            },
        }
    }

    fn risks(&mut self) -> Vec<Risk> {
        match self.raw.remove("risks") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => match risk_list(&value) {
                Some(risks) => risks,
                None => {
                    self.stash("risks", value);
                    Vec::new()
                }
            },
        }
    }

    fn stash(&mut self, key: &str, value: Value) {
        self.stashed.push((format!("legacy_{}", key), value));
    }

    /// Remaining unknown keys plus stashed values, the latter renamed until
    /// they no longer collide.
    fn into_extra(self) -> Map<String, Value> {
        let mut extra = self.raw;
        for (base, value) in self.stashed {
            let mut key = base.clone();
            let mut n = 1;
            while extra.contains_key(&key) {
                n += 1;
                key = format!("{}_{}", base, n);
            }
            extra.insert(key, value);
        }
        extra
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect(),
        other => scalar_text(other).map(|text| vec![text]),
    }
}

fn risk_list(value: &Value) -> Option<Vec<Risk>> {
    let to_risk = |item: &Value| match item {
        Value::Object(_) => serde_json::from_value::<Risk>(item.clone()).ok(),
        other => scalar_text(other).map(|text| Risk::new(text, "", "")),
    };
    match value {
        Value::Array(items) => items.iter().map(to_risk).collect(),
        other => to_risk(other).map(|risk| vec![risk]),
    }
}

/// Upgrade any on-disk shape to the current document schema.
pub fn migrate(legacy: LegacyPlan) -> PlanDocument {
    let mut f = Fields {
        raw: legacy.0,
        stashed: Vec::new(),
    };
    f.raw.remove("version");

    if f.raw.contains_key("tasks")
        && !f.raw.contains_key("plan_tasks")
        && !f.raw.contains_key("execution_tasks")
    {
        let mut first_half = f.list("tasks");
        let second_half = first_half.split_off(first_half.len() / 2);
        f.raw.insert("plan_tasks".into(), first_half.into());
        f.raw.insert("execution_tasks".into(), second_half.into());
    }
    f.raw.remove("tasks");

    let mut doc = PlanDocument {
        version: SCHEMA_VERSION.to_string(),
        updated_at: f.text("updated_at"),
        goal: f.text("goal"),
        success_metric: f.text("success_metric"),
        deadline: f.text("deadline"),
        constraints: f.list("constraints"),
        assumptions: f.list("assumptions"),
        options: f.list("options"),
        selected_option: f.text("selected_option"),
        plan_tasks: f.list("plan_tasks"),
        execution_tasks: f.list("execution_tasks"),
        dependencies: f.list("dependencies"),
        experiments: f.list("experiments"),
        risks: f.risks(),
        references: f.list("references"),
        insights: f.list("insights"),
        direction_insights: f.list("direction_insights"),
        market_insights: f.list("market_insights"),
        timing_insights: f.list("timing_insights"),
        differentiation_insights: f.list("differentiation_insights"),
        monetization_insights: f.list("monetization_insights"),
        constraint_insights: f.list("constraint_insights"),
        risk_signal_insights: f.list("risk_signal_insights"),
        evolution_insights: f.list("evolution_insights"),
        definition_of_done: f.list("definition_of_done"),
        evidence: f.list("evidence"),
        extra: Map::new(),
    };
    doc.extra = f.into_extra();
    doc
}

impl From<PlanDocument> for LegacyPlan {
    fn from(doc: PlanDocument) -> Self {
        match serde_json::to_value(doc) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn parse(json: &str) -> LegacyPlan {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_object_gets_all_defaults() {
        let doc = migrate(parse("{}"));
        assert_eq!(doc.version, SCHEMA_VERSION);
        assert_eq!(doc, PlanDocument::new());
    }

    #[test]
    fn test_legacy_tasks_split_at_midpoint() {
        let doc = migrate(parse(r#"{"tasks": ["a", "b", "c", "d", "e"]}"#));
        assert_eq!(doc.plan_tasks, strings(&["a", "b"]));
        assert_eq!(doc.execution_tasks, strings(&["c", "d", "e"]));
        assert!(!doc.extra.contains_key("tasks"));
    }

    #[test]
    fn test_legacy_single_task_goes_to_execution() {
        let doc = migrate(parse(r#"{"tasks": ["only"]}"#));
        assert!(doc.plan_tasks.is_empty());
        assert_eq!(doc.execution_tasks, strings(&["only"]));
    }

    #[test]
    fn test_legacy_tasks_dropped_when_split_lists_exist() {
        let doc = migrate(parse(r#"{"tasks": ["x", "y"], "plan_tasks": ["p"]}"#));
        assert_eq!(doc.plan_tasks, strings(&["p"]));
        assert!(doc.execution_tasks.is_empty());
    }

    #[test]
    fn test_existing_values_untouched() {
        let doc = migrate(parse(
            r#"{"version": "0.1.0", "goal": "Ship it", "updated_at": "2025-01-01T00:00:00+00:00",
                "risks": [{"risk": "r", "signal": "s", "mitigation": "m"}]}"#,
        ));
        assert_eq!(doc.goal, "Ship it");
        assert_eq!(doc.updated_at, "2025-01-01T00:00:00+00:00");
        assert_eq!(doc.version, SCHEMA_VERSION);
        assert_eq!(doc.risks, vec![Risk::new("r", "s", "m")]);
    }

    #[test]
    fn test_null_fields_treated_as_absent() {
        let doc = migrate(parse(r#"{"goal": null, "constraints": null}"#));
        assert_eq!(doc.goal, "");
        assert!(doc.constraints.is_empty());
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let doc = migrate(parse(r#"{"owner": "alice", "priority": 3}"#));
        assert_eq!(doc.extra["owner"], "alice");
        assert_eq!(doc.extra["priority"], 3);
    }

    #[test]
    fn test_loosely_typed_legacy_values_are_coerced() {
        let doc = migrate(parse(r#"{"risks": ["Scope creep"], "constraints": "solo"}"#));
        assert_eq!(doc.risks, vec![Risk::new("Scope creep", "", "")]);
        assert_eq!(doc.constraints, strings(&["solo"]));
        assert!(doc.extra.is_empty());
    }

    #[test]
    fn test_scalars_become_text() {
        let doc = migrate(parse(r#"{"goal": 42, "references": [1, true, "r"]}"#));
        assert_eq!(doc.goal, "42");
        assert_eq!(doc.references, strings(&["1", "true", "r"]));
    }

    #[test]
    fn test_unusable_values_kept_under_legacy_key() {
        let doc = migrate(parse(
            r#"{"goal": {"text": "g"}, "options": [["a"]], "legacy_goal": "mine"}"#,
        ));
        assert_eq!(doc.goal, "");
        assert!(doc.options.is_empty());
        assert_eq!(doc.extra["legacy_goal"], "mine");
        assert_eq!(doc.extra["legacy_goal_2"]["text"], "g");
        assert_eq!(doc.extra["legacy_options"][0][0], "a");
    }

    #[test]
    fn test_null_split_key_still_blocks_legacy_split() {
        let doc = migrate(parse(r#"{"tasks": ["a", "b"], "plan_tasks": null}"#));
        assert!(doc.plan_tasks.is_empty());
        assert!(doc.execution_tasks.is_empty());
        assert!(!doc.extra.contains_key("tasks"));
    }

    #[test]
    fn test_bare_string_tasks_split_as_one_item() {
        let doc = migrate(parse(r#"{"tasks": "write it"}"#));
        assert!(doc.plan_tasks.is_empty());
        assert_eq!(doc.execution_tasks, strings(&["write it"]));
    }

    #[test]
    fn test_migration_is_idempotent() {
        let inputs = [
            "{}",
            r#"{"tasks": ["a", "b", "c"]}"#,
            r#"{"tasks": [], "goal": "g", "extra_key": [1, 2]}"#,
            r#"{"plan_tasks": ["p"], "execution_tasks": ["e"], "risks": []}"#,
            r#"{"risks": ["Scope creep"], "constraints": "solo", "goal": [{}]}"#,
            r#"{"tasks": {"a": 1}, "plan_tasks": null}"#,
        ];
        for input in inputs {
            let once = migrate(parse(input));
            let twice = migrate(LegacyPlan::from(once.clone()));
            assert_eq!(once, twice, "not idempotent for {}", input);
        }
    }
}
