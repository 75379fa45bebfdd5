//! Ties the parsed document, lag analyzer, instance factory, and
//! registry together into a runnable [`Engine`].
//!
//! Parses every item once, partitions into algorithm/expression nodes in
//! declaration order, runs the lag analyzer over every parsed expression,
//! then hands the whole thing to the engine constructor.

use crate::factory::InstanceFactory;
use crate::schema::{ClockModeDoc, ProgramDocument};
use cyclesim_common::EngineResult;
use cyclesim_runtime::{
    analyze_lag_requirements, AlgorithmNode, ClockConfig, ClockMode, Engine, EngineConfig,
    ExpressionNode, HistorySink, InstanceRegistry, LivePublisher,
};
use cyclesim_dsl::ast::Expr;
use std::path::Path;

fn clock_config(doc: &ProgramDocument) -> ClockConfig {
    let cycle_time = doc.clock.cycle_time;
    ClockConfig {
        cycle_time,
        start_time: doc.clock.start_time,
        mode: match doc.clock.mode {
            ClockModeDoc::Realtime => ClockMode::Realtime,
            ClockModeDoc::Generator => ClockMode::Generator,
        },
        sample_interval: doc.clock.sample_interval.unwrap_or(cycle_time),
        time_format: doc.clock.time_format.clone(),
    }
}

/// Build an [`Engine`] from an already-parsed document, pre-seeding
/// `registry` with every built-in type before resolution.
///
/// `live_publisher`/`history_sink` are supplied by the caller (the
/// daemon binary, or a test) rather than constructed here: the loader's
/// job is config resolution, not collaborator wiring.
pub fn build_engine(
    doc: &ProgramDocument,
    mut registry: InstanceRegistry,
    live_publisher: Option<Box<dyn LivePublisher>>,
    history_sink: Option<Box<dyn HistorySink>>,
) -> EngineResult<Engine> {
    cyclesim_programs::register_defaults(&mut registry);

    let mut factory = InstanceFactory::new(doc.clock.cycle_time);
    let mut algorithm_nodes = Vec::new();
    let mut expression_nodes = Vec::new();

    for item in &doc.program {
        if item.item_type.eq_ignore_ascii_case("VARIABLE") {
            expression_nodes.push(ExpressionNode::parse(&item.name, &item.expression)?);
        } else {
            factory.create_instance(item, &registry)?;
            algorithm_nodes.push(AlgorithmNode::parse(&item.expression)?);
        }
    }

    let lag_requirements = analyze_lag_requirements(all_expressions(&algorithm_nodes, &expression_nodes));

    let config = EngineConfig {
        clock: clock_config(doc),
        algorithm_nodes,
        expression_nodes,
        instances: factory.into_instances(),
        registry,
        lag_requirements,
        record_length: doc.record_length,
        live_publisher,
        history_sink,
    };
    Engine::new(config)
}

/// Parse `path` and build an [`Engine`] from it, with no collaborators
/// attached.
pub fn load_from_path(path: &Path) -> EngineResult<Engine> {
    let doc = ProgramDocument::from_path(path)?;
    build_engine(&doc, InstanceRegistry::new(), None, None)
}

fn all_expressions<'a>(
    algorithm_nodes: &'a [AlgorithmNode],
    expression_nodes: &'a [ExpressionNode],
) -> impl Iterator<Item = &'a Expr> {
    algorithm_nodes
        .iter()
        .flat_map(|n| n.kwargs.iter().map(|(_, e)| e))
        .chain(expression_nodes.iter().map(|n| &n.expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
            [clock]
            cycle_time = 0.5
            mode = "generator"

            [[program]]
            name = "sin1"
            type = "SINE_WAVE"
            expression = "sin1.execute()"
            init_args = { amplitude = 10.0, period = 5.0 }

            [[program]]
            name = "doubled"
            type = "VARIABLE"
            expression = "doubled = sin1.out * 2"
        "#
    }

    #[test]
    fn builds_an_engine_from_a_minimal_document() {
        let doc = ProgramDocument::from_str(minimal_toml()).unwrap();
        let mut engine = build_engine(&doc, InstanceRegistry::new(), None, None).unwrap();
        let snapshots = engine.run_generator(5).unwrap();
        assert_eq!(snapshots.len(), 5);
        assert!(snapshots[0].variables.contains_key("sin1.out"));
        assert!(snapshots[0].variables.contains_key("doubled"));
    }

    #[test]
    fn lag_requirements_feed_the_history_buffer() {
        let toml = r#"
            [clock]
            cycle_time = 1.0

            [[program]]
            name = "a"
            type = "VARIABLE"
            expression = "a = 1"

            [[program]]
            name = "b"
            type = "VARIABLE"
            expression = "b = a[-3]"
        "#;
        let doc = ProgramDocument::from_str(toml).unwrap();
        let mut engine = build_engine(&doc, InstanceRegistry::new(), None, None).unwrap();
        let snapshots = engine.run_generator(4).unwrap();
        assert_eq!(snapshots[3].variables.get("b"), Some(&1.0));
    }

    #[test]
    fn record_length_document_override_caps_history_below_the_analyzer_floor() {
        let toml = r#"
            record_length = 2

            [clock]
            cycle_time = 1.0

            [[program]]
            name = "a"
            type = "VARIABLE"
            expression = "a = a[-1] + 1"

            [[program]]
            name = "b"
            type = "VARIABLE"
            expression = "b = a[-3]"
        "#;
        let doc = ProgramDocument::from_str(toml).unwrap();
        assert_eq!(doc.record_length, Some(2));
        let mut engine = build_engine(&doc, InstanceRegistry::new(), None, None).unwrap();
        // the analyzer would otherwise floor "a"'s history at 10 slots; the
        // document's record_length caps it at 2, so lag 3 never resolves.
        let snapshots = engine.run_generator(5).unwrap();
        assert_eq!(snapshots[4].variables.get("b"), Some(&0.0));
    }

    #[test]
    fn unknown_instance_type_fails_to_build() {
        let toml = r#"
            [clock]
            cycle_time = 1.0

            [[program]]
            name = "x"
            type = "NOT_A_TYPE"
            expression = "x.execute()"
        "#;
        let doc = ProgramDocument::from_str(toml).unwrap();
        assert!(build_engine(&doc, InstanceRegistry::new(), None, None).is_err());
    }
}
