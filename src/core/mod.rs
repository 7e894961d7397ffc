//! Core timing: the scaled frame clock, frame stage ordering, and deferred actions.
pub mod plugin;
pub mod scheduler;

pub use plugin::{CorePlugin, FrameStage, SimulationClock};
