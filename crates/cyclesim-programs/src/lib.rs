#![doc = "Concrete algorithm and model program instances for the cyclesim engine."]

mod args;
pub mod list_wave;
pub mod pid;
pub mod random_walk;
pub mod sine_wave;
pub mod square_wave;
pub mod tank;
pub mod triangle_wave;
pub mod valve;

use cyclesim_runtime::InstanceRegistry;

/// Register every built-in algorithm and model constructor under its
/// canonical type name.
///
/// An explicit call rather than import-time registration, so the
/// configuration loader controls exactly when and whether defaults are
/// wired in.
pub fn register_defaults(registry: &mut InstanceRegistry) {
    registry.register_algorithm("PID", pid::construct);
    registry.register_algorithm("SINE_WAVE", sine_wave::construct);
    registry.register_algorithm("SQUARE_WAVE", square_wave::construct);
    registry.register_algorithm("TRIANGLE_WAVE", triangle_wave::construct);
    registry.register_algorithm("LIST_WAVE", list_wave::construct);
    registry.register_algorithm("RANDOM_WALK", random_walk::construct);
    registry.register_model("CYLINDRICAL_TANK", tank::construct);
    registry.register_model("VALVE", valve::construct);
}
