//! The declarative TOML program document.
//!
//! `#[serde(default)]` throughout, a `from_path`/`from_str` pair, and
//! structured errors rather than panics on a malformed document.

use cyclesim_common::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reserved variable/attribute names a declared item must never collide
/// with, re-exported here for the loader's early validation pass.
pub use cyclesim_runtime::RESERVED_FIELDS;

/// Clock driving mode as written in the `[clock]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClockModeDoc {
    /// Paces cycles against wall-clock time.
    Realtime,
    /// Runs as fast as the driver calls it; the default for scripted runs.
    #[default]
    Generator,
}

/// The `[clock]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockDoc {
    /// Cycle period in seconds. Validated `> 0` by [`ProgramDocument::validate`].
    pub cycle_time: f64,
    /// Simulated start timestamp in seconds since the Unix epoch.
    pub start_time: f64,
    /// Sampling interval in seconds; defaults to `cycle_time` when absent.
    pub sample_interval: Option<f64>,
    /// Optional `chrono` strftime-style pattern for `time_str`.
    pub time_format: Option<String>,
    /// Driving mode.
    pub mode: ClockModeDoc,
}

impl Default for ClockDoc {
    fn default() -> Self {
        Self {
            cycle_time: 0.0,
            start_time: 0.0,
            sample_interval: None,
            time_format: None,
            mode: ClockModeDoc::default(),
        }
    }
}

/// One `[[program]]` entry: either a `VARIABLE` (becomes an
/// `ExpressionNode`) or a typed instance (becomes an `AlgorithmNode`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramItemDoc {
    /// Unique item name.
    pub name: String,
    /// `"VARIABLE"` or a registered algorithm/model type name.
    #[serde(rename = "type")]
    pub item_type: String,
    /// The DSL source text for this item.
    pub expression: String,
    /// Scalar (or list-of-pairs, for `LIST_WAVE`) init arguments; forbidden
    /// for `VARIABLE` items.
    #[serde(default)]
    pub init_args: toml::value::Table,
}

/// The whole program document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramDocument {
    /// Clock configuration.
    pub clock: ClockDoc,
    /// Optional override for every lag-requiring variable's history
    /// buffer capacity, in place of the analyzer-derived
    /// `max(10, ceil(1.5 * maxLag))` computation.
    pub record_length: Option<usize>,
    /// Ordered program items.
    pub program: Vec<ProgramItemDoc>,
    /// Opaque template string handed to a CSV exporter; not interpreted here.
    pub export_template: Option<String>,
}

impl Default for ProgramDocument {
    fn default() -> Self {
        Self {
            clock: ClockDoc::default(),
            record_length: None,
            program: Vec::new(),
            export_template: None,
        }
    }
}

impl ProgramDocument {
    /// Load and parse a program document from a TOML file.
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_str(&content)
    }

    /// Parse a program document from a TOML string.
    pub fn from_str(content: &str) -> EngineResult<Self> {
        let doc: Self = toml::from_str(content)
            .map_err(|e| EngineError::config(format!("failed to parse TOML: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize back to a TOML string.
    pub fn to_toml(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::config(format!("failed to serialize TOML: {e}")))
    }

    /// Structural validation independent of type/instance resolution:
    /// positive cycle time, no duplicate item names, no reserved-name
    /// collisions, no `init_args` on a `VARIABLE` item.
    fn validate(&self) -> EngineResult<()> {
        if self.clock.cycle_time <= 0.0 {
            return Err(EngineError::config("clock.cycle_time must be positive"));
        }
        if let Some(interval) = self.clock.sample_interval {
            if interval < self.clock.cycle_time {
                return Err(EngineError::config(
                    "clock.sample_interval must be >= clock.cycle_time",
                ));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for item in &self.program {
            if RESERVED_FIELDS.contains(&item.name.as_str()) {
                return Err(EngineError::config(format!(
                    "item name '{}' collides with a reserved snapshot field",
                    item.name
                )));
            }
            if !seen.insert(item.name.clone()) {
                return Err(EngineError::config(format!("duplicate item name '{}'", item.name)));
            }
            if item.item_type.eq_ignore_ascii_case("VARIABLE") && !item.init_args.is_empty() {
                return Err(EngineError::config(format!(
                    "item '{}' is a VARIABLE and must not declare init_args",
                    item.name
                )));
            }
        }
        Ok(())
    }
}

/// Convert a parsed TOML init-args table into the `serde_json::Map` the
/// program-instance constructors expect.
pub fn init_args_to_json(table: &toml::value::Table) -> EngineResult<serde_json::Map<String, serde_json::Value>> {
    match serde_json::to_value(table)
        .map_err(|e| EngineError::config(format!("failed to convert init_args: {e}")))?
    {
        serde_json::Value::Object(map) => Ok(map),
        _ => unreachable!("a TOML table always converts to a JSON object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_document() {
        let toml = r#"
            [clock]
            cycle_time = 0.5

            [[program]]
            name = "v1"
            type = "VARIABLE"
            expression = "v1 = 1 + 1"
        "#;
        let doc = ProgramDocument::from_str(toml).unwrap();
        assert_eq!(doc.clock.cycle_time, 0.5);
        assert_eq!(doc.program.len(), 1);
        assert_eq!(doc.program[0].item_type, "VARIABLE");
    }

    #[test]
    fn rejects_non_positive_cycle_time() {
        let toml = "[clock]\ncycle_time = 0.0\n";
        assert!(ProgramDocument::from_str(toml).is_err());
    }

    #[test]
    fn rejects_duplicate_item_names() {
        let toml = r#"
            [clock]
            cycle_time = 1.0

            [[program]]
            name = "v1"
            type = "VARIABLE"
            expression = "v1 = 1"

            [[program]]
            name = "v1"
            type = "VARIABLE"
            expression = "v1 = 2"
        "#;
        assert!(ProgramDocument::from_str(toml).is_err());
    }

    #[test]
    fn rejects_reserved_item_names() {
        let toml = r#"
            [clock]
            cycle_time = 1.0

            [[program]]
            name = "cycleCount"
            type = "VARIABLE"
            expression = "cycleCount = 1"
        "#;
        assert!(ProgramDocument::from_str(toml).is_err());
    }

    #[test]
    fn rejects_init_args_on_a_variable_item() {
        let toml = r#"
            [clock]
            cycle_time = 1.0

            [[program]]
            name = "v1"
            type = "VARIABLE"
            expression = "v1 = 1"
            init_args = { foo = 1 }
        "#;
        assert!(ProgramDocument::from_str(toml).is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut doc = ProgramDocument::default();
        doc.clock.cycle_time = 0.25;
        doc.program.push(ProgramItemDoc {
            name: "v1".to_string(),
            item_type: "VARIABLE".to_string(),
            expression: "v1 = 1".to_string(),
            init_args: toml::value::Table::new(),
        });
        let text = doc.to_toml().unwrap();
        let parsed = ProgramDocument::from_str(&text).unwrap();
        assert_eq!(parsed.clock.cycle_time, 0.25);
        assert_eq!(parsed.program.len(), 1);
    }

    #[test]
    fn init_args_convert_to_a_json_map() {
        let mut table = toml::value::Table::new();
        table.insert("amplitude".to_string(), toml::Value::Float(2.0));
        let map = init_args_to_json(&table).unwrap();
        assert_eq!(map.get("amplitude").and_then(serde_json::Value::as_f64), Some(2.0));
    }
}
