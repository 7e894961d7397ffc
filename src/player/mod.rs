//! Player module - the walkable character NPCs react to.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::PlayerPlugin;
