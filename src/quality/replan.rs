//! Best-effort repair of structural gaps in a plan.
//!
//! Each rubric check that can be remediated maps to one entry in a fixed,
//! ordered table. A remediation only writes to the fields it owns and only
//! when those fields are still empty, so running it twice, or on a check
//! that was named by mistake, never changes operator-authored content. Lists
//! with content but an unfavourable shape (too few references, a skewed
//! task split) are left alone.
//!
//! `goal_clarity` and `measurability` have no remediation: those gaps must
//! be filled by the operator.

use super::CheckName;
use crate::models::{InsightAxis, PlanDocument, Risk, is_filled};
use serde::{Deserialize, Serialize};
use tracing::debug;

const BALANCED_OPTION: &str = "Balanced option: medium scope with staged rollout.";

/// A remediation fills empty fields and returns the names of those it wrote.
type Remediation = fn(&mut PlanDocument) -> Vec<&'static str>;

const REMEDIATIONS: [(CheckName, Remediation); 10] = [
    (CheckName::Constraints, fill_constraints),
    (CheckName::Assumptions, fill_assumptions),
    (CheckName::OptionsComparison, fill_options),
    (CheckName::ReferencesCoverage, fill_references),
    (CheckName::InsightAxesCoverage, fill_insight_axes),
    (CheckName::PlanExecutionBalance, fill_tasks),
    (CheckName::VerificationLoop, fill_experiments),
    (CheckName::RiskCoverage, fill_risks),
    (CheckName::Dependencies, fill_dependencies),
    (CheckName::DefinitionOfDone, fill_definition_of_done),
];

/// What a repair pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSummary {
    /// Checks that were named as failing
    pub requested: Vec<CheckName>,
    /// Document fields that received placeholder content
    pub filled_fields: Vec<String>,
}

impl RepairSummary {
    pub fn is_noop(&self) -> bool {
        self.filled_fields.is_empty()
    }
}

/// Insert placeholder content for each named failing check, in table order.
///
/// Never removes or reorders existing entries.
pub fn repair(doc: &mut PlanDocument, failed: &[CheckName]) -> RepairSummary {
    let mut summary = RepairSummary {
        requested: failed.to_vec(),
        filled_fields: Vec::new(),
    };

    for (check, remediation) in REMEDIATIONS.iter() {
        if !failed.contains(check) {
            continue;
        }
        let filled = remediation(doc);
        debug!(check = %check, fields = ?filled, "applied remediation");
        summary
            .filled_fields
            .extend(filled.into_iter().map(String::from));
    }

    summary
}

fn fill_list(list: &mut Vec<String>, items: &[&str]) -> bool {
    if !list.is_empty() {
        return false;
    }
    list.extend(items.iter().map(|s| s.to_string()));
    true
}

fn fill_constraints(doc: &mut PlanDocument) -> Vec<&'static str> {
    if fill_list(
        &mut doc.constraints,
        &["Define practical limits for time, budget, and staffing."],
    ) {
        vec!["constraints"]
    } else {
        vec![]
    }
}

fn fill_assumptions(doc: &mut PlanDocument) -> Vec<&'static str> {
    if fill_list(
        &mut doc.assumptions,
        &["Key assumptions need explicit validation."],
    ) {
        vec!["assumptions"]
    } else {
        vec![]
    }
}

fn fill_options(doc: &mut PlanDocument) -> Vec<&'static str> {
    let mut filled = Vec::new();
    if fill_list(
        &mut doc.options,
        &[
            "Conservative option: narrow scope and faster delivery.",
            BALANCED_OPTION,
        ],
    ) {
        filled.push("options");
    }
    if !is_filled(&doc.selected_option) {
        // Prefer the balanced placeholder only when we supplied the options.
        doc.selected_option = if filled.is_empty() {
            doc.options
                .first()
                .cloned()
                .unwrap_or_else(|| BALANCED_OPTION.to_string())
        } else {
            BALANCED_OPTION.to_string()
        };
        filled.push("selected_option");
    }
    filled
}

fn fill_references(doc: &mut PlanDocument) -> Vec<&'static str> {
    if fill_list(
        &mut doc.references,
        &[
            "Structured planning examples",
            "Agent workflow docs",
            "Postmortem of failed planning cases",
        ],
    ) {
        vec!["references"]
    } else {
        vec![]
    }
}

fn axis_placeholder(axis: InsightAxis) -> &'static str {
    match axis {
        InsightAxis::Direction => {
            "State why this initiative matters now and what outcome it must create."
        }
        InsightAxis::Market => "Identify the highest-pain user segment and current alternatives.",
        InsightAxis::Timing => "Define why this timing is favorable now and what delay would cost.",
        InsightAxis::Differentiation => {
            "Describe one clear strategic difference versus existing options."
        }
        InsightAxis::Monetization => "Link user value to a concrete monetization path.",
        InsightAxis::Constraint => {
            "List execution constraints and the intended workaround strategy."
        }
        InsightAxis::RiskSignal => "Define one early failure signal and the immediate response.",
        InsightAxis::Evolution => {
            "Define how the plan will be revised on a weekly or monthly cadence."
        }
    }
}

fn fill_insight_axes(doc: &mut PlanDocument) -> Vec<&'static str> {
    InsightAxis::ALL
        .into_iter()
        .filter(|axis| fill_list(doc.axis_mut(*axis), &[axis_placeholder(*axis)]))
        .map(|axis| axis.field_name())
        .collect()
}

fn fill_tasks(doc: &mut PlanDocument) -> Vec<&'static str> {
    let mut filled = Vec::new();
    if fill_list(
        &mut doc.plan_tasks,
        &[
            "Collect references and extract constraints.",
            "Generate and compare three strategy options.",
        ],
    ) {
        filled.push("plan_tasks");
    }
    if fill_list(
        &mut doc.execution_tasks,
        &[
            "Implement minimal CLI flow for plan/qa/replan.",
            "Run pilot and collect evidence against success metric.",
        ],
    ) {
        filled.push("execution_tasks");
    }
    filled
}

fn fill_experiments(doc: &mut PlanDocument) -> Vec<&'static str> {
    if fill_list(
        &mut doc.experiments,
        &["Run one pilot iteration and compare against success metric."],
    ) {
        vec!["experiments"]
    } else {
        vec![]
    }
}

fn fill_risks(doc: &mut PlanDocument) -> Vec<&'static str> {
    if !doc.risks.is_empty() {
        return vec![];
    }
    doc.risks.push(Risk::new(
        "Scope drift",
        "New requirements added mid-cycle",
        "Freeze sprint scope and defer extras",
    ));
    vec!["risks"]
}

fn fill_dependencies(doc: &mut PlanDocument) -> Vec<&'static str> {
    if fill_list(
        &mut doc.dependencies,
        &["Agent runtime support for the planning workflow"],
    ) {
        vec!["dependencies"]
    } else {
        vec![]
    }
}

fn fill_definition_of_done(doc: &mut PlanDocument) -> Vec<&'static str> {
    if fill_list(
        &mut doc.definition_of_done,
        &["All core commands work and QA >= 70."],
    ) {
        vec!["definition_of_done"]
    } else {
        vec![]
    }
}
