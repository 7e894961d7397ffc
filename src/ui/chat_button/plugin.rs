// src/ui/chat_button/plugin.rs
//
// Plugin registration for the chat button.

use bevy::prelude::*;

use crate::core::FrameStage;
use crate::dialogue::config::InteractionSettings;

use super::systems::{position_chat_button, send_chat_press_from_button, spawn_chat_button};

/// Plugin providing the clickable chat control.
///
/// Requires `InteractionPlugin` for `ChatPressed` and the coordinator.
pub struct ChatButtonPlugin;

impl Plugin for ChatButtonPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionSettings>()
            .add_systems(Startup, spawn_chat_button)
            .add_systems(Update, send_chat_press_from_button.in_set(FrameStage::Input))
            .add_systems(Update, position_chat_button.in_set(FrameStage::Follow));

        info!("ChatButtonPlugin registered");
    }
}
