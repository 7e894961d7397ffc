//! Dialogue module: scripts, per-NPC sessions, the typewriter, and the event hub.
pub mod config;
pub mod errors;
pub mod events;
pub mod hub;
pub mod plugin;
pub mod runtime;
pub mod script;
pub mod session;
pub mod systems;
pub mod telemetry;
pub mod typewriter;

pub use config::DialogueConfig;
pub use plugin::DialoguePlugin;
