// src/ui/chat_button/components.rs
//
// Chat button markers.

use bevy::prelude::*;

/// The on-screen control that talks to the NPC in range.
#[derive(Component, Debug, Default)]
pub struct ChatButton;
