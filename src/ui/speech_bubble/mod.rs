// src/ui/speech_bubble/mod.rs
//
// Speech bubble module: one screen-space bubble showing the current line.
//
// - Sized from the visible text with padding and width clamps (layout)
// - Re-measured on every typewriter reveal
// - Follows the speaking agent through the camera projection (follow)

pub mod components;
pub mod follow;
pub mod layout;
pub mod measure;
pub mod plugin;
pub mod systems;

pub use plugin::SpeechBubblePlugin;
