//! World module housing the camera and environment setup.
pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::WorldPlugin;
