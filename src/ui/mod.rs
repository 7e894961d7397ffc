// src/ui/mod.rs
//
// UI module providing screen-space elements for dialogue.
//
// Current features:
// - Speech bubble following the current speaker
// - Chat button following the player while an NPC is in range

pub mod chat_button;
pub mod plugin;
pub mod speech_bubble;

pub use plugin::UiPlugin;
