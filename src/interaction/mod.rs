//! Interaction module: agent registry, range detection, and the chat coordinator.
pub mod coordinator;
pub mod events;
pub mod overlap;
pub mod plugin;
pub mod proximity;
pub mod registry;
pub mod systems;

pub use plugin::InteractionPlugin;
