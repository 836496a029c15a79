//! One assess / repair / re-assess cycle.
//!
//! ```text
//! Assessed --(NEEDS_REPLAN, auto-replan on)--> Repaired
//! ```
//!
//! `CRITICAL_FAILURE` and `PASS` stop in `Assessed`. A repair happens at
//! most once per run; the post-repair assessment is reported as is, even
//! when it still falls short.

use super::{Assessment, Disposition, RepairSummary, assess, repair};
use crate::Result;
use crate::models::PlanDocument;
use crate::storage::PlanStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Terminal state of an orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentState {
    Assessed,
    Repaired,
}

/// Both verdict sets of a run, plus what the repair changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    pub state: AssessmentState,
    pub initial: Assessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair: Option<RepairSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repaired: Option<Assessment>,
}

impl AssessmentOutcome {
    fn assessed(initial: Assessment) -> Self {
        Self {
            state: AssessmentState::Assessed,
            initial,
            repair: None,
            repaired: None,
        }
    }

    /// The assessment describing the document as persisted.
    pub fn final_assessment(&self) -> &Assessment {
        self.repaired.as_ref().unwrap_or(&self.initial)
    }

    pub fn disposition(&self) -> Disposition {
        self.final_assessment().disposition()
    }

    /// Human report: the initial verdicts, then the post-repair verdicts
    /// when a repair ran.
    pub fn to_report(&self) -> String {
        let mut report = self.initial.to_report();
        if let Some(repaired) = &self.repaired {
            report.push_str("\nAuto replan triggered.\nPost-replan QA:\n");
            report.push_str(&repaired.to_report());
        }
        report
    }
}

/// Runs the rubric and, when allowed, the one-shot repair.
pub struct AssessmentOrchestrator<'a> {
    store: &'a PlanStore,
    auto_replan: bool,
}

impl<'a> AssessmentOrchestrator<'a> {
    pub fn new(store: &'a PlanStore, auto_replan: bool) -> Self {
        Self { store, auto_replan }
    }

    /// Assess `doc`; on `NEEDS_REPLAN` repair the failed non-critical
    /// checks, persist and assess again.
    ///
    /// The caller is expected to have saved `doc` already; only a repaired
    /// document is written here.
    pub fn run(&self, doc: &mut PlanDocument) -> Result<AssessmentOutcome> {
        let initial = assess(doc);
        let disposition = initial.disposition();
        debug!(score = initial.score, %disposition, "assessed plan");

        if disposition != Disposition::NeedsReplan || !self.auto_replan {
            return Ok(AssessmentOutcome::assessed(initial));
        }

        let summary = repair(doc, &initial.failed_non_critical());
        self.store.save(doc)?;
        let repaired = assess(doc);
        info!(
            before = initial.score,
            after = repaired.score,
            filled = summary.filled_fields.len(),
            "auto replan applied"
        );

        Ok(AssessmentOutcome {
            state: AssessmentState::Repaired,
            initial,
            repair: Some(summary),
            repaired: Some(repaired),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    fn structured_plan() -> PlanDocument {
        let mut doc = PlanDocument::new();
        doc.goal = "Launch".into();
        doc.success_metric = "10 users".into();
        doc.deadline = "2026-12-31".into();
        doc.definition_of_done = vec!["Shipped".into()];
        doc.plan_tasks = vec!["p1".into(), "p2".into()];
        doc.execution_tasks = vec!["e1".into(), "e2".into(), "e3".into()];
        doc
    }

    #[test]
    fn test_needs_replan_repairs_once_and_persists() {
        let env = TestEnv::new();
        let store = env.init_store();
        let mut doc = structured_plan();
        store.save(&mut doc).unwrap();

        let outcome = AssessmentOrchestrator::new(&store, true)
            .run(&mut doc)
            .unwrap();

        assert_eq!(outcome.state, AssessmentState::Repaired);
        assert_eq!(outcome.initial.score, 35);
        assert_eq!(outcome.initial.disposition(), Disposition::NeedsReplan);
        assert_eq!(outcome.final_assessment().score, 100);
        assert_eq!(outcome.disposition(), Disposition::Pass);

        let on_disk = store.load().unwrap();
        assert_eq!(on_disk.references.len(), 3);
        assert_eq!(on_disk.covered_axes(), 8);
    }

    #[test]
    fn test_critical_failure_is_not_repaired() {
        let env = TestEnv::new();
        let store = env.init_store();
        let mut doc = PlanDocument::new();

        let outcome = AssessmentOrchestrator::new(&store, true)
            .run(&mut doc)
            .unwrap();

        assert_eq!(outcome.state, AssessmentState::Assessed);
        assert_eq!(outcome.disposition(), Disposition::CriticalFailure);
        assert!(outcome.repair.is_none());
        assert!(doc.constraints.is_empty());
    }

    #[test]
    fn test_auto_replan_disabled_only_assesses() {
        let env = TestEnv::new();
        let store = env.init_store();
        let mut doc = structured_plan();

        let outcome = AssessmentOrchestrator::new(&store, false)
            .run(&mut doc)
            .unwrap();

        assert_eq!(outcome.state, AssessmentState::Assessed);
        assert_eq!(outcome.disposition(), Disposition::NeedsReplan);
        assert!(doc.references.is_empty());
    }

    #[test]
    fn test_skewed_split_is_critical_and_left_alone() {
        let env = TestEnv::new();
        let store = env.init_store();
        let mut doc = structured_plan();
        doc.plan_tasks = vec!["p1".into()];
        doc.execution_tasks = vec!["e1".into(), "e2".into(), "e3".into(), "e4".into()];

        let outcome = AssessmentOrchestrator::new(&store, true)
            .run(&mut doc)
            .unwrap();
        assert_eq!(outcome.state, AssessmentState::Assessed);
        assert_eq!(outcome.disposition(), Disposition::CriticalFailure);
        assert_eq!(doc.plan_tasks.len(), 1);
    }

    #[test]
    fn test_report_includes_post_replan_section() {
        let env = TestEnv::new();
        let store = env.init_store();
        let mut doc = structured_plan();

        let outcome = AssessmentOrchestrator::new(&store, true)
            .run(&mut doc)
            .unwrap();
        let report = outcome.to_report();
        assert!(report.starts_with("QA score: 35/100"));
        assert!(report.contains("Result: NEEDS_REPLAN (score < 70)\nAuto replan triggered.\nPost-replan QA:\nQA score: 100/100"));
        assert!(report.ends_with("Result: PASS"));
    }

    #[test]
    fn test_outcome_json_omits_missing_repair() {
        let outcome = AssessmentOutcome::assessed(assess(&PlanDocument::new()));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["state"], "assessed");
        assert!(json.get("repaired").is_none());
    }
}
