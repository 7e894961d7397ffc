// src/ui/chat_button/mod.rs
//
// Screen-space chat button shown while the player is near a talkative NPC.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::ChatButtonPlugin;
