//! CLI argument definitions for dp.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DP_GIT_COMMIT"),
    ", built ",
    env!("DP_BUILD_TIMESTAMP"),
    ")"
);

/// DeepPlan - local plan quality assessment and self-repair.
///
/// Start with `dp init`, describe the plan with `dp plan`, and check it with `dp qa`.
#[derive(Parser, Debug)]
#[command(name = "dp")]
#[command(author, version, long_version = LONG_VERSION, about = "Local planning engine: score a plan against a fixed rubric and repair structural gaps", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if dp was started in <path> instead of the current directory.
    /// Can also be set via DP_DIR environment variable.
    #[arg(short = 'C', long = "dir", global = true, env = "DP_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Use <path> as the state directory instead of <dir>/.deeplan.
    #[arg(long = "state-dir", global = true, env = "DP_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Skip the automatic repair pass for this run
    #[arg(long = "no-auto-replan", global = true)]
    pub no_auto_replan: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the state directory, journals and an empty plan
    Init,

    /// Set plan fields, then run QA (with auto replan when it falls short)
    ///
    /// List flags take comma-separated values and replace the whole list.
    Plan {
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        success_metric: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        constraints: Option<String>,
        #[arg(long)]
        assumptions: Option<String>,
        #[arg(long)]
        options: Option<String>,
        #[arg(long)]
        selected_option: Option<String>,
        #[arg(long)]
        plan_tasks: Option<String>,
        #[arg(long)]
        execution_tasks: Option<String>,
        #[arg(long)]
        references: Option<String>,
        #[arg(long)]
        insights: Option<String>,
        #[arg(long)]
        direction_insights: Option<String>,
        #[arg(long)]
        market_insights: Option<String>,
        #[arg(long)]
        timing_insights: Option<String>,
        #[arg(long)]
        differentiation_insights: Option<String>,
        #[arg(long)]
        monetization_insights: Option<String>,
        #[arg(long)]
        constraint_insights: Option<String>,
        #[arg(long)]
        risk_signal_insights: Option<String>,
        #[arg(long)]
        evolution_insights: Option<String>,
        #[arg(long)]
        dependencies: Option<String>,
        #[arg(long)]
        experiments: Option<String>,
        #[arg(long)]
        definition_of_done: Option<String>,
    },

    /// Append evidence, tasks, references or insights, then run QA
    Replan {
        #[arg(long)]
        evidence: Option<String>,
        #[arg(long)]
        plan_task: Option<String>,
        #[arg(long)]
        execution_task: Option<String>,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        insight: Option<String>,
        #[arg(long)]
        direction_insight: Option<String>,
        #[arg(long)]
        market_insight: Option<String>,
        #[arg(long)]
        timing_insight: Option<String>,
        #[arg(long)]
        differentiation_insight: Option<String>,
        #[arg(long)]
        monetization_insight: Option<String>,
        #[arg(long)]
        constraint_insight: Option<String>,
        #[arg(long)]
        risk_signal_insight: Option<String>,
        #[arg(long)]
        evolution_insight: Option<String>,
    },

    /// Record a decision in decisions.jsonl
    Decide {
        /// What was decided
        #[arg(long)]
        title: String,
        /// The chosen alternative
        #[arg(long)]
        chosen: String,
        /// Why it was chosen
        #[arg(long)]
        reason: String,
        /// Rejected alternatives (comma-separated)
        #[arg(long)]
        rejected: Option<String>,
    },

    /// Record a risk in risks.jsonl
    Risk {
        #[arg(long)]
        risk: String,
        /// Early warning signal
        #[arg(long)]
        signal: String,
        #[arg(long)]
        mitigation: String,
    },

    /// Score the current plan without changing it
    Qa,

    /// Summarize the current plan
    Show,

    /// Generate candidate plan skeletons from a profile
    Ideate {
        /// Who is doing the work (default: solo builder)
        #[arg(long)]
        profile: Option<String>,
        /// Focus areas (comma-separated)
        #[arg(long)]
        interests: Option<String>,
        /// Existing skills (comma-separated)
        #[arg(long)]
        skills: Option<String>,
        /// Daily time available (default: 1h/day)
        #[arg(long)]
        time_per_day: Option<String>,
        /// Budget (default: $0)
        #[arg(long)]
        budget: Option<String>,
        /// Deadline (default: 14 days from today)
        #[arg(long)]
        deadline: Option<String>,
        /// Number of ideas, clamped to 1..=10
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Apply the idea with this index (1-based) to the current plan
        #[arg(long)]
        apply: Option<usize>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value in the session config.kdl
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// List all configuration values with their sources
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["dp", "qa", "-H", "--state-dir", "/tmp/s"]).unwrap();
        assert!(cli.human_readable);
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/s")));
        assert!(matches!(cli.command, Commands::Qa));
    }

    #[test]
    fn test_no_auto_replan_flag() {
        let cli = Cli::try_parse_from(["dp", "plan", "--goal", "g", "--no-auto-replan"]).unwrap();
        assert!(cli.no_auto_replan);
        let cli = Cli::try_parse_from(["dp", "qa"]).unwrap();
        assert!(!cli.no_auto_replan);
    }

    #[test]
    fn test_ideate_defaults() {
        let cli = Cli::try_parse_from(["dp", "ideate"]).unwrap();
        match cli.command {
            Commands::Ideate { count, apply, .. } => {
                assert_eq!(count, 5);
                assert_eq!(apply, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_decide_requires_reason() {
        assert!(Cli::try_parse_from(["dp", "decide", "--title", "t", "--chosen", "c"]).is_err());
    }
}
