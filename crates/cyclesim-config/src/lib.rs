#![doc = "TOML program document, instance factory, and engine loader for cyclesim."]

pub mod factory;
pub mod loader;
pub mod schema;

pub use factory::InstanceFactory;
pub use loader::{build_engine, load_from_path};
pub use schema::{ClockDoc, ClockModeDoc, ProgramDocument, ProgramItemDoc};
