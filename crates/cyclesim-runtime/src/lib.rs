#![doc = "Clock, variable store, lag analysis, nodes, and the cyclic engine for cyclesim."]

pub mod clock;
pub mod collaborator;
pub mod engine;
pub mod eval_context;
pub mod instance;
pub mod lag_analyzer;
pub mod node;
pub mod registry;
pub mod ring_buffer;
pub mod snapshot;
pub mod variable_store;

pub use clock::{Clock, ClockConfig, ClockMode, CycleTick};
pub use collaborator::{HistorySink, LivePublisher, LoggingPublisher, MemorySink, NullSink};
pub use engine::{Engine, EngineConfig};
pub use eval_context::EngineEvalContext;
pub use instance::ProgramInstance;
pub use lag_analyzer::analyze as analyze_lag_requirements;
pub use node::{AlgorithmNode, ExpressionNode};
pub use registry::{Constructor, InstanceRegistry};
pub use ring_buffer::RingBuffer;
pub use snapshot::{check_no_reserved_collisions, Snapshot, RESERVED_FIELDS};
pub use variable_store::VariableStore;
