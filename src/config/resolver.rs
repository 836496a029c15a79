//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment (`DP_OUTPUT_FORMAT`, output format only)
//! 3. Session config.kdl (`<state-dir>/config.kdl`)
//! 4. System config.kdl (`~/.config/deepplan/config.kdl`)
//! 5. Built-in defaults

use crate::Result;
use crate::config::{DeepplanConfig, OutputFormat};
use crate::storage::PlanStore;

/// Environment variable overriding the output format.
pub const OUTPUT_FORMAT_ENV: &str = "DP_OUTPUT_FORMAT";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from session-level config
    Session,
    /// Value from system-level config
    System,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Session => write!(f, "session"),
            ValueSource::System => write!(f, "system"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Output format preference
    pub output_format: Resolved<OutputFormat>,
    /// Whether NEEDS_REPLAN triggers the automatic repair pass
    pub auto_replan: Resolved<bool>,
    /// Whether command events are appended to events.jsonl
    pub event_log: Resolved<bool>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            auto_replan: Resolved::new(true, ValueSource::Default),
            event_log: Resolved::new(true, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Get the output format value.
    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    pub fn auto_replan(&self) -> bool {
        self.auto_replan.value
    }

    pub fn event_log(&self) -> bool {
        self.event_log.value
    }

    /// Value and source for a config key, as shown by `dp config get/list`.
    pub fn lookup(&self, key: &str) -> Option<(String, &ValueSource)> {
        match key {
            "output-format" => Some((
                self.output_format.value.to_string(),
                &self.output_format.source,
            )),
            "auto-replan" => Some((self.auto_replan.value.to_string(), &self.auto_replan.source)),
            "event-log" => Some((self.event_log.value.to_string(), &self.event_log.source)),
            _ => None,
        }
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Output format override from CLI flag
    pub output_format: Option<OutputFormat>,
    /// Auto-replan override from CLI flag
    pub auto_replan: Option<bool>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output format override.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set auto-replan override.
    pub fn with_auto_replan(mut self, enabled: bool) -> Self {
        self.auto_replan = Some(enabled);
        self
    }
}

fn pick<T: Clone>(
    cli: Option<&T>,
    env: Option<(T, String)>,
    session: Option<&T>,
    system: Option<&T>,
    default: T,
) -> Resolved<T> {
    if let Some(value) = cli {
        Resolved::new(value.clone(), ValueSource::CliFlag)
    } else if let Some((value, name)) = env {
        Resolved::new(value, ValueSource::EnvVar(name))
    } else if let Some(value) = session {
        Resolved::new(value.clone(), ValueSource::Session)
    } else if let Some(value) = system {
        Resolved::new(value.clone(), ValueSource::System)
    } else {
        Resolved::new(default, ValueSource::Default)
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(store: &PlanStore, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system_config = PlanStore::read_system_config()?;
    let session_config = store.read_session_config()?;
    Ok(resolve_from(&system_config, &session_config, overrides))
}

/// Combine already-loaded config layers.
pub fn resolve_from(
    system: &DeepplanConfig,
    session: &DeepplanConfig,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    // An unparseable env value is ignored rather than fatal.
    let env_format = std::env::var(OUTPUT_FORMAT_ENV)
        .ok()
        .and_then(|v| OutputFormat::parse(&v))
        .map(|format| (format, OUTPUT_FORMAT_ENV.to_string()));

    ResolvedConfig {
        output_format: pick(
            overrides.output_format.as_ref(),
            env_format,
            session.output_format.as_ref(),
            system.output_format.as_ref(),
            OutputFormat::Json,
        ),
        auto_replan: pick(
            overrides.auto_replan.as_ref(),
            None,
            session.auto_replan.as_ref(),
            system.auto_replan.as_ref(),
            true,
        ),
        event_log: pick(
            None,
            None,
            session.event_log.as_ref(),
            system.event_log.as_ref(),
            true,
        ),
    }
}
