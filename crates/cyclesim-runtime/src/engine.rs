//! The cyclic engine: ties the clock, variable store, ordered node list,
//! live instances, and collaborator fan-out into one cycle-stepping loop.
//!
//! Each cycle runs algorithms in declaration order, then expressions in
//! declaration order, advances the clock, then fans results out to
//! collaborators: kick the work, pace the cycle, publish and sample,
//! repeat until stopped or cancelled.

use crate::clock::{Clock, ClockConfig};
use crate::collaborator::{HistorySink, LivePublisher};
use crate::eval_context::EngineEvalContext;
use crate::instance::ProgramInstance;
use crate::node::{AlgorithmNode, ExpressionNode};
use crate::registry::InstanceRegistry;
use crate::snapshot::Snapshot;
use crate::variable_store::VariableStore;
use cyclesim_common::{EngineError, EngineResult, RunState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything needed to construct an [`Engine`].
///
/// Built by the configuration loader: the node lists and instance map
/// already reflect one fully resolved program (every `type` name looked
/// up in `registry`, every lag requirement computed by the lag
/// analyzer), so `Engine::new` only wires them together.
pub struct EngineConfig {
    /// Cycle pacing configuration.
    pub clock: ClockConfig,
    /// Algorithm nodes, in declaration order.
    pub algorithm_nodes: Vec<AlgorithmNode>,
    /// Expression nodes, in declaration order.
    pub expression_nodes: Vec<ExpressionNode>,
    /// Live program/model instances, keyed by instance name.
    pub instances: HashMap<String, Box<dyn ProgramInstance>>,
    /// Type registry backing expression evaluation's function lookups.
    pub registry: InstanceRegistry,
    /// Per-variable maximum lag, as computed by the lag analyzer; used to
    /// pre-size each variable's history buffer.
    pub lag_requirements: HashMap<String, i64>,
    /// Document-wide override for every lag-requiring variable's history
    /// capacity, in place of the analyzer-derived
    /// `max(10, ceil(1.5 * maxLag))` floor.
    pub record_length: Option<usize>,
    /// Optional live publisher, fed every cycle.
    pub live_publisher: Option<Box<dyn LivePublisher>>,
    /// Optional history sink, fed only on sampled cycles.
    pub history_sink: Option<Box<dyn HistorySink>>,
}

/// Drives a resolved program through its cycles.
///
/// Node evaluation order is fixed at construction: all [`AlgorithmNode`]s
/// in declaration order, then all [`ExpressionNode`]s in declaration
/// order. Within a cycle, an algorithm node's keyword arguments are
/// resolved against an immutable borrow of the store and instance map;
/// that borrow is dropped before the instance is mutably invoked, so the
/// engine never needs interior mutability to satisfy the borrow checker.
pub struct Engine {
    clock: Clock,
    store: VariableStore,
    algorithm_nodes: Vec<AlgorithmNode>,
    expression_nodes: Vec<ExpressionNode>,
    instances: HashMap<String, Box<dyn ProgramInstance>>,
    registry: InstanceRegistry,
    live_publisher: Option<Box<dyn LivePublisher>>,
    history_sink: Option<Box<dyn HistorySink>>,
    state: RunState,
}

impl Engine {
    /// Construct an engine from a fully resolved configuration.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let clock = Clock::new(config.clock)?;
        let mut store = VariableStore::new();
        for (name, max_lag) in &config.lag_requirements {
            let capacity = config
                .record_length
                .unwrap_or_else(|| crate::clock::history_capacity(*max_lag));
            store.configure_lag(name, capacity as i64);
        }
        Ok(Self {
            clock,
            store,
            algorithm_nodes: config.algorithm_nodes,
            expression_nodes: config.expression_nodes,
            instances: config.instances,
            registry: config.registry,
            live_publisher: config.live_publisher,
            history_sink: config.history_sink,
            state: RunState::Idle,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Read-only access to the variable store, e.g. for inspection after
    /// a batch run.
    #[must_use]
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Run every algorithm node, then every expression node, then advance
    /// the clock and assemble this cycle's [`Snapshot`].
    ///
    /// Collaborator failures (publish or sample) are logged and do not
    /// abort the cycle, per the sink isolation contract; an evaluation
    /// failure in an algorithm or expression node is fatal and propagates.
    pub fn step_once(&mut self) -> EngineResult<Snapshot> {
        for node in &self.algorithm_nodes {
            let kwargs = {
                let ctx = EngineEvalContext::new(&self.store, &self.instances, &self.registry);
                node.resolve_kwargs(&ctx)?
            };
            self.instances
                .get_mut(&node.instance_name)
                .ok_or_else(|| {
                    EngineError::config(format!("unknown instance '{}'", node.instance_name))
                })?
                .execute(&kwargs)?;
            if let Some(instance) = self.instances.get(&node.instance_name) {
                node.project_stored_attributes(instance.as_ref(), &mut self.store);
            }
        }

        for node in &self.expression_nodes {
            let value = {
                let ctx = EngineEvalContext::new(&self.store, &self.instances, &self.registry);
                node.eval_value(&ctx)?
            };
            self.store.set(&node.name, value);
        }

        let tick = self.clock.step();
        let snapshot = Snapshot {
            variables: self.store.snapshot(),
            cycle_count: tick.cycle_count,
            need_sample: tick.need_sample,
            time_str: tick.time_str,
            sim_time: tick.sim_time,
            exec_ratio: tick.exec_ratio,
        };

        if let Some(publisher) = self.live_publisher.as_mut() {
            if let Err(e) = publisher.publish(&snapshot) {
                tracing::warn!(error = %e, "live publisher failed; continuing");
            }
        }
        if snapshot.need_sample {
            if let Some(sink) = self.history_sink.as_mut() {
                if let Err(e) = sink.record(&snapshot) {
                    tracing::warn!(error = %e, "history sink failed; continuing");
                }
            }
        }

        Ok(snapshot)
    }

    /// Run a fixed number of cycles back-to-back, collecting every
    /// snapshot. Intended for [`crate::clock::ClockMode::Generator`]
    /// batch runs, where there is no wall clock to race against.
    pub fn run_generator(&mut self, cycles: u64) -> EngineResult<Vec<Snapshot>> {
        self.state = RunState::Running;
        self.clock.start();
        let mut snapshots = Vec::with_capacity(cycles as usize);
        for _ in 0..cycles {
            snapshots.push(self.step_once()?);
        }
        self.clock.stop();
        self.state = RunState::Stopped;
        if let Some(sink) = self.history_sink.as_mut() {
            if let Err(e) = sink.close() {
                tracing::warn!(error = %e, "history sink failed to close; continuing");
            }
        }
        Ok(snapshots)
    }

    /// Drive cycles paced against the wall clock until `cancel` is
    /// observed between cycles, or `max_cycles` (if given) is reached.
    ///
    /// `cancel` is a Rust-native cooperative cancellation signal: the
    /// source has no equivalent, relying on an external process kill.
    /// Observing cancellation is a normal, successful stop, not an error
    /// — `run_realtime` returns `Ok(())`, leaving the run's state as
    /// [`RunState::Stopped`].
    pub fn run_realtime(
        &mut self,
        max_cycles: Option<u64>,
        cancel: &AtomicBool,
    ) -> EngineResult<()> {
        self.state = RunState::Running;
        self.clock.start();
        let mut completed: u64 = 0;
        while !cancel.load(Ordering::Relaxed) {
            self.step_once()?;
            completed += 1;
            if max_cycles.is_some_and(|n| completed >= n) {
                break;
            }
        }
        if cancel.load(Ordering::Relaxed) {
            self.state = RunState::Stopping;
        }
        self.clock.stop();
        self.state = RunState::Stopped;
        if let Some(sink) = self.history_sink.as_mut() {
            if let Err(e) = sink.close() {
                tracing::warn!(error = %e, "history sink failed to close; continuing");
            }
        }
        Ok(())
    }
}
