//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - String-keyed updates for `dp config set`

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted in config.kdl.
pub const CONFIG_KEYS: [&str; 3] = ["output-format", "auto-replan", "event-log"];

/// Preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// output-format "human"  // or "json"
/// auto-replan #true      // repair non-critical gaps after plan/replan
/// event-log #true        // append to events.jsonl
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepplanConfig {
    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Whether a NEEDS_REPLAN result triggers the automatic repair pass
    pub auto_replan: Option<bool>,

    /// Whether command events are written to the event log
    pub event_log: Option<bool>,
}

/// Parse a boolean config value the way operators tend to type it.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "#true" => Some(true),
        "false" | "0" | "no" | "off" | "#false" => Some(false),
        _ => None,
    }
}

fn first_value(doc: &KdlDocument, key: &str) -> Option<KdlValue> {
    doc.get(key)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value().clone())
}

impl DeepplanConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from a KDL document. Unknown nodes and badly typed values
    /// are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(value) = first_value(doc, "output-format") {
            if let Some(s) = value.as_string() {
                config.output_format = OutputFormat::parse(s);
            }
        }

        if let Some(value) = first_value(doc, "auto-replan") {
            config.auto_replan = value.as_bool();
        }

        if let Some(value) = first_value(doc, "event-log") {
            config.event_log = value.as_bool();
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref format) = self.output_format {
            let mut node = KdlNode::new("output-format");
            node.push(KdlEntry::new(KdlValue::String(format.as_str().to_string())));
            doc.nodes_mut().push(node);
        }

        if let Some(auto_replan) = self.auto_replan {
            let mut node = KdlNode::new("auto-replan");
            node.push(KdlEntry::new(KdlValue::Bool(auto_replan)));
            doc.nodes_mut().push(node);
        }

        if let Some(event_log) = self.event_log {
            let mut node = KdlNode::new("event-log");
            node.push(KdlEntry::new(KdlValue::Bool(event_log)));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &DeepplanConfig) {
        if other.output_format.is_some() {
            self.output_format = other.output_format.clone();
        }
        if other.auto_replan.is_some() {
            self.auto_replan = other.auto_replan;
        }
        if other.event_log.is_some() {
            self.event_log = other.event_log;
        }
    }

    /// Set a key from its string form, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "output-format" => {
                let format = OutputFormat::parse(value).ok_or_else(|| {
                    format!("output-format must be \"json\" or \"human\", got {}", value)
                })?;
                self.output_format = Some(format);
            }
            "auto-replan" | "event-log" => {
                let flag = parse_bool(value)
                    .ok_or_else(|| format!("{} must be true or false, got {}", key, value))?;
                if key == "auto-replan" {
                    self.auto_replan = Some(flag);
                } else {
                    self.event_log = Some(flag);
                }
            }
            _ => {
                return Err(format!(
                    "Unknown config key: {} (expected one of {})",
                    key,
                    CONFIG_KEYS.join(", ")
                ));
            }
        }
        Ok(())
    }
}
