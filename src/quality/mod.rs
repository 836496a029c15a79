//! Quality rubric for plan documents.
//!
//! A plan is scored against twelve fixed checks. Each check carries a weight
//! (the weights sum to 100) and some are marked critical. The resulting
//! [`Assessment`] yields a three-way [`Disposition`]:
//!
//! - `CRITICAL_FAILURE` when any critical check fails, whatever the score
//! - `NEEDS_REPLAN` when the score is below [`thresholds::PASS_SCORE`]
//! - `PASS` otherwise
//!
//! Checks are independent of each other and evaluation is total: every
//! well-formed document produces an assessment, failing a check is not an
//! error.
//!
//! # Example
//!
//! ```
//! use deepplan::models::PlanDocument;
//! use deepplan::quality::{assess, Disposition};
//!
//! let assessment = assess(&PlanDocument::new());
//! assert_eq!(assessment.score, 0);
//! assert_eq!(assessment.disposition(), Disposition::CriticalFailure);
//! ```

pub mod orchestrator;
pub mod replan;

pub use orchestrator::{AssessmentOrchestrator, AssessmentOutcome, AssessmentState};
pub use replan::{RepairSummary, repair};

use crate::models::{InsightAxis, PlanDocument, is_filled};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Thresholds used by the rubric.
pub mod thresholds {
    /// Score at or above which a plan without critical failures passes.
    pub const PASS_SCORE: u32 = 70;

    /// Highest attainable score (sum of all weights).
    pub const MAX_SCORE: u32 = 100;

    /// Options that must be listed before a comparison counts.
    pub const MIN_OPTIONS: usize = 2;

    /// References required for coverage.
    pub const MIN_REFERENCES: usize = 3;

    /// Fewest plan + execution tasks for a balanced split.
    pub const MIN_TOTAL_TASKS: usize = 4;

    /// Inclusive bounds on the plan-task share of all tasks.
    pub const BALANCE_MIN_RATIO: f64 = 0.4;
    pub const BALANCE_MAX_RATIO: f64 = 0.6;
}

/// Identifier of a rubric check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    GoalClarity,
    Measurability,
    Constraints,
    Assumptions,
    OptionsComparison,
    ReferencesCoverage,
    InsightAxesCoverage,
    PlanExecutionBalance,
    VerificationLoop,
    RiskCoverage,
    Dependencies,
    DefinitionOfDone,
}

impl CheckName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::GoalClarity => "goal_clarity",
            CheckName::Measurability => "measurability",
            CheckName::Constraints => "constraints",
            CheckName::Assumptions => "assumptions",
            CheckName::OptionsComparison => "options_comparison",
            CheckName::ReferencesCoverage => "references_coverage",
            CheckName::InsightAxesCoverage => "insight_axes_coverage",
            CheckName::PlanExecutionBalance => "plan_execution_balance",
            CheckName::VerificationLoop => "verification_loop",
            CheckName::RiskCoverage => "risk_coverage",
            CheckName::Dependencies => "dependencies",
            CheckName::DefinitionOfDone => "definition_of_done",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static definition of one rubric rule.
struct Check {
    name: CheckName,
    detail: &'static str,
    weight: u32,
    critical: bool,
    rule: fn(&PlanDocument) -> bool,
}

/// The rubric, in reporting order.
const RUBRIC: [Check; 12] = [
    Check {
        name: CheckName::GoalClarity,
        detail: "Goal is present and outcome-oriented.",
        weight: 10,
        critical: true,
        rule: |doc| is_filled(&doc.goal),
    },
    Check {
        name: CheckName::Measurability,
        detail: "Success metric and deadline are both defined.",
        weight: 10,
        critical: true,
        rule: |doc| is_filled(&doc.success_metric) && is_filled(&doc.deadline),
    },
    Check {
        name: CheckName::Constraints,
        detail: "Constraints are explicitly listed.",
        weight: 8,
        critical: false,
        rule: |doc| !doc.constraints.is_empty(),
    },
    Check {
        name: CheckName::Assumptions,
        detail: "Core assumptions are extracted.",
        weight: 8,
        critical: false,
        rule: |doc| !doc.assumptions.is_empty(),
    },
    Check {
        name: CheckName::OptionsComparison,
        detail: "At least two options and one selected option exist.",
        weight: 8,
        critical: false,
        rule: |doc| {
            doc.options.len() >= thresholds::MIN_OPTIONS && is_filled(&doc.selected_option)
        },
    },
    Check {
        name: CheckName::ReferencesCoverage,
        detail: "Plan includes at least three references (docs, cases, benchmarks).",
        weight: 10,
        critical: false,
        rule: |doc| doc.references.len() >= thresholds::MIN_REFERENCES,
    },
    Check {
        name: CheckName::InsightAxesCoverage,
        detail: "Eight long-horizon insight axes are all covered.",
        weight: 10,
        critical: false,
        rule: |doc| {
            InsightAxis::ALL
                .iter()
                .all(|axis| !doc.axis(*axis).is_empty())
        },
    },
    Check {
        name: CheckName::PlanExecutionBalance,
        detail: "Plan/Execution task split is balanced near 50:50 (40-60% range).",
        weight: 10,
        critical: true,
        rule: task_balance_ok,
    },
    Check {
        name: CheckName::VerificationLoop,
        detail: "Validation experiments exist for key assumptions.",
        weight: 8,
        critical: false,
        rule: |doc| !doc.experiments.is_empty(),
    },
    Check {
        name: CheckName::RiskCoverage,
        detail: "Top risks include early signals and mitigations.",
        weight: 8,
        critical: false,
        rule: |doc| !doc.risks.is_empty(),
    },
    Check {
        name: CheckName::Dependencies,
        detail: "External dependencies/blockers are documented.",
        weight: 5,
        critical: false,
        rule: |doc| !doc.dependencies.is_empty(),
    },
    Check {
        name: CheckName::DefinitionOfDone,
        detail: "Definition of done exists.",
        weight: 5,
        critical: true,
        rule: |doc| !doc.definition_of_done.is_empty(),
    },
];

/// Plan and execution tasks must both exist, total at least four, and the
/// plan share must fall within the inclusive balance bounds.
pub fn task_balance_ok(doc: &PlanDocument) -> bool {
    let plan = doc.plan_tasks.len();
    let execution = doc.execution_tasks.len();
    let total = plan + execution;
    if total < thresholds::MIN_TOTAL_TASKS || plan == 0 || execution == 0 {
        return false;
    }
    let ratio = plan as f64 / total as f64;
    (thresholds::BALANCE_MIN_RATIO..=thresholds::BALANCE_MAX_RATIO).contains(&ratio)
}

/// Outcome of one rubric check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckVerdict {
    pub name: CheckName,
    pub passed: bool,
    pub detail: String,
    pub weight: u32,
    pub critical: bool,
}

/// Overall verdict on a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Disposition {
    CriticalFailure,
    NeedsReplan,
    Pass,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::CriticalFailure => "CRITICAL_FAILURE",
            Disposition::NeedsReplan => "NEEDS_REPLAN",
            Disposition::Pass => "PASS",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and per-check verdicts for one evaluation of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub score: u32,
    pub verdicts: Vec<CheckVerdict>,
    pub critical_failure: bool,
}

impl Assessment {
    /// Critical failures override the score.
    pub fn disposition(&self) -> Disposition {
        if self.critical_failure {
            Disposition::CriticalFailure
        } else if self.score < thresholds::PASS_SCORE {
            Disposition::NeedsReplan
        } else {
            Disposition::Pass
        }
    }

    /// Names of all failed checks, in rubric order.
    pub fn failed(&self) -> Vec<CheckName> {
        self.verdicts
            .iter()
            .filter(|v| !v.passed)
            .map(|v| v.name)
            .collect()
    }

    /// Names of failed checks that are not critical.
    pub fn failed_non_critical(&self) -> Vec<CheckName> {
        self.verdicts
            .iter()
            .filter(|v| !v.passed && !v.critical)
            .map(|v| v.name)
            .collect()
    }

    /// Look up the verdict for a check.
    pub fn verdict(&self, name: CheckName) -> Option<&CheckVerdict> {
        self.verdicts.iter().find(|v| v.name == name)
    }

    /// Render the report printed by the CLI in human mode.
    pub fn to_report(&self) -> String {
        let mut lines = vec![format!(
            "QA score: {}/{}",
            self.score,
            thresholds::MAX_SCORE
        )];
        for verdict in &self.verdicts {
            lines.push(format!(
                "- {} {}{}: {}",
                if verdict.passed { "PASS" } else { "FAIL" },
                verdict.name,
                if verdict.critical { " [CRITICAL]" } else { "" },
                verdict.detail
            ));
        }
        lines.push(match self.disposition() {
            Disposition::NeedsReplan => format!(
                "Result: NEEDS_REPLAN (score < {})",
                thresholds::PASS_SCORE
            ),
            other => format!("Result: {}", other),
        });
        lines.join("\n")
    }
}

/// Evaluate every rubric check against the document.
pub fn assess(doc: &PlanDocument) -> Assessment {
    let verdicts: Vec<CheckVerdict> = RUBRIC
        .iter()
        .map(|check| CheckVerdict {
            name: check.name,
            passed: (check.rule)(doc),
            detail: check.detail.to_string(),
            weight: check.weight,
            critical: check.critical,
        })
        .collect();

    let score = verdicts
        .iter()
        .filter(|v| v.passed)
        .map(|v| v.weight)
        .sum();
    let critical_failure = verdicts.iter().any(|v| v.critical && !v.passed);

    Assessment {
        score,
        verdicts,
        critical_failure,
    }
}
