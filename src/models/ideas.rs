//! Idea templates for bootstrapping a plan.
//!
//! Ideas are candidate plan skeletons built from a fixed set of templates and
//! the operator's profile. Generation is deterministic for a given request
//! and date. Applying an idea overwrites the matching plan fields; the
//! result is then assessed like any other edit.

use super::PlanDocument;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Limits for idea generation.
pub mod limits {
    /// Fewest ideas ever returned.
    pub const MIN_COUNT: usize = 1;

    /// Most ideas ever returned.
    pub const MAX_COUNT: usize = 10;

    /// Default deadline horizon, in days from today.
    pub const DEFAULT_HORIZON_DAYS: i64 = 14;

    /// Skills quoted in the generated assumption line.
    pub const MAX_SKILLS_QUOTED: usize = 3;
}

const DEFAULT_PROFILE: &str = "solo builder";
const DEFAULT_TIME_PER_DAY: &str = "1h/day";
const DEFAULT_BUDGET: &str = "$0";
const DEFAULT_FOCUS: [&str; 3] = ["your workflow", "your learning", "your output quality"];

struct Template {
    name: &'static str,
    goal: &'static str,
    metric: &'static str,
    plan_tasks: [&'static str; 2],
    execution_tasks: [&'static str; 2],
}

const TEMPLATES: [Template; 4] = [
    Template {
        name: "Workflow Automation",
        goal: "Automate one repetitive {focus} task end-to-end",
        metric: "Reduce manual time on {focus} by 30% by {deadline}",
        plan_tasks: [
            "Map the current manual workflow and baseline time.",
            "Select one high-friction step to automate first.",
        ],
        execution_tasks: [
            "Build the smallest working automation script/tool.",
            "Run for one week and compare baseline vs after metrics.",
        ],
    },
    Template {
        name: "Portfolio Artifact",
        goal: "Ship a public mini-project around {focus}",
        metric: "Publish a working demo and one write-up by {deadline}",
        plan_tasks: [
            "Define MVP scope and success criteria for the demo.",
            "Collect 3 references from similar projects.",
        ],
        execution_tasks: [
            "Implement MVP with one differentiating feature.",
            "Publish demo, doc, and changelog.",
        ],
    },
    Template {
        name: "Learning Sprint",
        goal: "Complete a focused sprint to improve {focus} capability",
        metric: "Deliver 3 practical outputs proving {focus} improvement by {deadline}",
        plan_tasks: [
            "Choose a narrow syllabus and output format.",
            "Define weekly checkpoints with explicit evidence.",
        ],
        execution_tasks: [
            "Produce output #1 and gather feedback.",
            "Produce output #2/#3 and review gaps.",
        ],
    },
    Template {
        name: "Insight Pipeline",
        goal: "Build a repeatable system to collect and summarize {focus} insights",
        metric: "Generate 10 curated insights and 3 actions by {deadline}",
        plan_tasks: [
            "Define sources and capture format.",
            "Set quality bar for actionable insights.",
        ],
        execution_tasks: [
            "Run weekly collection and summarization loop.",
            "Apply top 3 insights and measure outcomes.",
        ],
    },
];

/// Operator profile used to fill the templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaRequest {
    pub profile: Option<String>,
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub time_per_day: Option<String>,
    pub budget: Option<String>,
    pub deadline: Option<String>,
    pub count: usize,
}

/// A candidate plan skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub title: String,
    pub goal: String,
    pub success_metric: String,
    pub deadline: String,
    pub constraints: Vec<String>,
    pub assumptions: Vec<String>,
    pub plan_tasks: Vec<String>,
    pub execution_tasks: Vec<String>,
    pub definition_of_done: Vec<String>,
    pub experiments: Vec<String>,
}

impl Idea {
    /// Write this idea's skeleton into a plan, replacing the fields it covers.
    pub fn apply_to(&self, plan: &mut PlanDocument) {
        plan.goal = self.goal.clone();
        plan.success_metric = self.success_metric.clone();
        plan.deadline = self.deadline.clone();
        plan.constraints = self.constraints.clone();
        plan.assumptions = self.assumptions.clone();
        plan.plan_tasks = self.plan_tasks.clone();
        plan.execution_tasks = self.execution_tasks.clone();
        plan.experiments = self.experiments.clone();
        plan.definition_of_done = self.definition_of_done.clone();
    }
}

/// Treat a missing or blank option as unset, trimming the rest.
fn or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// Generate `request.count` ideas (clamped to 1..=10), cycling templates and
/// focus terms.
pub fn generate_ideas(request: &IdeaRequest, today: NaiveDate) -> Vec<Idea> {
    let profile = or_default(request.profile.as_deref(), DEFAULT_PROFILE);
    let time_limit = or_default(request.time_per_day.as_deref(), DEFAULT_TIME_PER_DAY);
    let budget = or_default(request.budget.as_deref(), DEFAULT_BUDGET);
    let horizon = match request.deadline.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => (today + Duration::days(limits::DEFAULT_HORIZON_DAYS))
            .format("%Y-%m-%d")
            .to_string(),
    };

    let focus_terms: Vec<String> = if request.interests.is_empty() {
        DEFAULT_FOCUS.iter().map(|s| s.to_string()).collect()
    } else {
        request.interests.clone()
    };

    let count = request.count.clamp(limits::MIN_COUNT, limits::MAX_COUNT);

    (0..count)
        .map(|i| {
            let template = &TEMPLATES[i % TEMPLATES.len()];
            let focus = &focus_terms[i % focus_terms.len()];
            let fill = |text: &str| fill_template(text, focus, &horizon);

            let mut assumptions = vec![
                format!("{} can sustain {} for this project.", profile, time_limit),
                format!(
                    "Budget stays within {} without external paid tooling.",
                    budget
                ),
            ];
            if !request.skills.is_empty() {
                let quoted: Vec<&str> = request
                    .skills
                    .iter()
                    .take(limits::MAX_SKILLS_QUOTED)
                    .map(String::as_str)
                    .collect();
                assumptions.push(format!(
                    "Existing skills ({}) are enough for MVP delivery.",
                    quoted.join(", ")
                ));
            }

            Idea {
                title: template.name.to_string(),
                goal: fill(template.goal),
                success_metric: fill(template.metric),
                deadline: horizon.clone(),
                constraints: vec![
                    format!("time: {}", time_limit),
                    format!("budget: {}", budget),
                    "scope: single focused outcome".to_string(),
                ],
                assumptions,
                plan_tasks: template.plan_tasks.iter().map(|s| s.to_string()).collect(),
                execution_tasks: template
                    .execution_tasks
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                definition_of_done: vec![
                    "Primary success metric is measured with before/after evidence.".to_string(),
                    "At least one artifact (code/doc/demo) is published.".to_string(),
                ],
                experiments: vec!["Run a 7-day pilot and log outcomes.".to_string()],
            }
        })
        .collect()
}

/// Substitute `{focus}` and `{deadline}` in one pass, so placeholder text
/// inside a substituted value is left as is.
fn fill_template(template: &str, focus: &str, deadline: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{focus}") {
            out.push_str(focus);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{deadline}") {
            out.push_str(deadline);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
