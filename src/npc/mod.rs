//! NPC module exposes NPC ids and the configured spawner.
pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::NpcPlugin;
