// src/ui/plugin.rs
//
// UiPlugin groups the dialogue UI plugins.

use bevy::prelude::*;

use super::{chat_button::ChatButtonPlugin, speech_bubble::SpeechBubblePlugin};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        info!("UiPlugin registered");

        app.add_plugins((SpeechBubblePlugin, ChatButtonPlugin));
    }
}
