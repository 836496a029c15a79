//! dp - local plan quality assessment and self-repair.

use clap::Parser;
use deepplan::cli::{Cli, Commands, ConfigCommands};
use deepplan::commands::{self, Output, PlanUpdate, ReplanUpdate, parse_csv};
use deepplan::config::{ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config};
use deepplan::models::ideas::IdeaRequest;
use deepplan::models::{InsightAxis, ListField};
use deepplan::storage::PlanStore;
use std::env;
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `DP_LOG=deepplan=debug`.
const LOG_ENV: &str = "DP_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let flag_human = cli.human_readable;

    let store = match resolve_store(cli.work_dir, cli.state_dir) {
        Ok(store) => store,
        Err(e) => fail(&e, flag_human),
    };

    let mut overrides = ConfigOverrides::new();
    if flag_human {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    if cli.no_auto_replan {
        overrides = overrides.with_auto_replan(false);
    }
    let config = match resolve_config(&store, &overrides) {
        Ok(config) => config,
        Err(e) => fail(&e, flag_human),
    };
    let human = *config.output_format() == OutputFormat::Human;
    debug!(state_dir = %store.root().display(), human, "resolved invocation");

    if let Err(e) = run_command(cli.command, &store, &config, human) {
        fail(&e, human);
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print an error in the selected format and exit non-zero.
fn fail(error: &deepplan::Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", error);
    } else {
        eprintln!("{}", serde_json::json!({ "error": error.to_string() }));
    }
    process::exit(1);
}

/// Resolve the state directory.
///
/// Priority: --state-dir / DP_STATE_DIR > <dir>/.deeplan, where <dir> is
/// --dir / DP_DIR or the current working directory.
fn resolve_store(
    work_dir: Option<PathBuf>,
    state_dir: Option<PathBuf>,
) -> Result<PlanStore, deepplan::Error> {
    if let Some(state_dir) = state_dir {
        return Ok(PlanStore::new(state_dir));
    }
    match work_dir {
        Some(path) => {
            if !path.is_dir() {
                return Err(deepplan::Error::Storage(format!(
                    "Specified directory does not exist: {}",
                    path.display()
                )));
            }
            Ok(PlanStore::for_work_dir(&path))
        }
        None => {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Ok(PlanStore::for_work_dir(&cwd))
        }
    }
}

/// Keep only the list flags that were given.
fn given<const N: usize>(pairs: [(ListField, Option<String>); N]) -> Vec<(ListField, String)> {
    pairs
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
}

fn run_command(
    command: Commands,
    store: &PlanStore,
    config: &ResolvedConfig,
    human: bool,
) -> Result<(), deepplan::Error> {
    match command {
        Commands::Init => {
            let result = commands::init(store)?;
            output(&result, human);
        }
        Commands::Plan {
            goal,
            success_metric,
            deadline,
            constraints,
            assumptions,
            options,
            selected_option,
            plan_tasks,
            execution_tasks,
            references,
            insights,
            direction_insights,
            market_insights,
            timing_insights,
            differentiation_insights,
            monetization_insights,
            constraint_insights,
            risk_signal_insights,
            evolution_insights,
            dependencies,
            experiments,
            definition_of_done,
        } => {
            let update = PlanUpdate {
                goal,
                success_metric,
                deadline,
                selected_option,
                lists: given([
                    (ListField::Constraints, constraints),
                    (ListField::Assumptions, assumptions),
                    (ListField::Options, options),
                    (ListField::PlanTasks, plan_tasks),
                    (ListField::ExecutionTasks, execution_tasks),
                    (ListField::References, references),
                    (ListField::Insights, insights),
                    (ListField::Axis(InsightAxis::Direction), direction_insights),
                    (ListField::Axis(InsightAxis::Market), market_insights),
                    (ListField::Axis(InsightAxis::Timing), timing_insights),
                    (
                        ListField::Axis(InsightAxis::Differentiation),
                        differentiation_insights,
                    ),
                    (
                        ListField::Axis(InsightAxis::Monetization),
                        monetization_insights,
                    ),
                    (ListField::Axis(InsightAxis::Constraint), constraint_insights),
                    (ListField::Axis(InsightAxis::RiskSignal), risk_signal_insights),
                    (ListField::Axis(InsightAxis::Evolution), evolution_insights),
                    (ListField::Dependencies, dependencies),
                    (ListField::Experiments, experiments),
                    (ListField::DefinitionOfDone, definition_of_done),
                ]),
            };
            let result = commands::plan(store, config, &update)?;
            output(&result, human);
        }
        Commands::Replan {
            evidence,
            plan_task,
            execution_task,
            reference,
            insight,
            direction_insight,
            market_insight,
            timing_insight,
            differentiation_insight,
            monetization_insight,
            constraint_insight,
            risk_signal_insight,
            evolution_insight,
        } => {
            let update = ReplanUpdate {
                additions: given([
                    (ListField::Evidence, evidence),
                    (ListField::PlanTasks, plan_task),
                    (ListField::ExecutionTasks, execution_task),
                    (ListField::References, reference),
                    (ListField::Insights, insight),
                    (ListField::Axis(InsightAxis::Direction), direction_insight),
                    (ListField::Axis(InsightAxis::Market), market_insight),
                    (ListField::Axis(InsightAxis::Timing), timing_insight),
                    (
                        ListField::Axis(InsightAxis::Differentiation),
                        differentiation_insight,
                    ),
                    (ListField::Axis(InsightAxis::Monetization), monetization_insight),
                    (ListField::Axis(InsightAxis::Constraint), constraint_insight),
                    (ListField::Axis(InsightAxis::RiskSignal), risk_signal_insight),
                    (ListField::Axis(InsightAxis::Evolution), evolution_insight),
                ]),
            };
            let result = commands::replan(store, config, &update)?;
            output(&result, human);
        }
        Commands::Decide {
            title,
            chosen,
            reason,
            rejected,
        } => {
            let result = commands::decide(store, &title, &chosen, &reason, rejected.as_deref())?;
            output(&result, human);
        }
        Commands::Risk {
            risk,
            signal,
            mitigation,
        } => {
            let result = commands::risk(store, &risk, &signal, &mitigation)?;
            output(&result, human);
        }
        Commands::Qa => {
            let result = commands::qa(store)?;
            output(&result, human);
        }
        Commands::Show => {
            let result = commands::show(store)?;
            output(&result, human);
        }
        Commands::Ideate {
            profile,
            interests,
            skills,
            time_per_day,
            budget,
            deadline,
            count,
            apply,
        } => {
            let request = IdeaRequest {
                profile,
                interests: interests.as_deref().map(parse_csv).unwrap_or_default(),
                skills: skills.as_deref().map(parse_csv).unwrap_or_default(),
                time_per_day,
                budget,
                deadline,
                count,
            };
            let result = commands::ideate(store, config, &request, apply)?;
            output(&result, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Get { key } => {
                let result = commands::config_get(config, &key)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(store, &key, &value)?;
                output(&result, human);
            }
            ConfigCommands::List => {
                let result = commands::config_list(config)?;
                output(&result, human);
            }
        },
    }
    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
