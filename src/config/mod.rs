//! Configuration for deepplan.
//!
//! Preferences live in `config.kdl`, found at:
//! - System: `~/.config/deepplan/config.kdl` (or `$DP_CONFIG_DIR/config.kdl`)
//! - Session: `<state-dir>/config.kdl`, next to plan.json
//!
//! Keys:
//! - `output-format` - "json" or "human"
//! - `auto-replan` - repair non-critical gaps when QA returns NEEDS_REPLAN
//! - `event-log` - append command events to events.jsonl
//!
//! ## Precedence
//!
//! CLI flag > environment > session config > system config > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, OUTPUT_FORMAT_ENV, Resolved, ResolvedConfig, ValueSource, resolve_config,
};
pub use schema::{CONFIG_KEYS, DeepplanConfig, OutputFormat, parse_bool};
