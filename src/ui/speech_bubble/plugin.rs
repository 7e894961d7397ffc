// src/ui/speech_bubble/plugin.rs
//
// Plugin registration for speech bubble systems.

use bevy::prelude::*;

use crate::core::FrameStage;
use crate::dialogue::config::SpeechBubbleSettings;

use super::layout::BubbleLayoutEngine;
use super::measure::{GlyphGridMeasure, TextMeasureService};
use super::systems::{follow_bubble_target, refresh_bubble_layout, spawn_speech_bubble};

/// Plugin providing the screen-space speech bubble.
///
/// # System Ordering
///
/// 1. `refresh_bubble_layout` - `FrameStage::Layout`, after the session stage
///    changed the displayed text
/// 2. `follow_bubble_target` - `FrameStage::Follow`, using this frame's size
///
/// # Dependencies
///
/// - `DialoguePlugin` provides `DialogueRuntime` and `SpeechBubbleSettings`
/// - `InteractionPlugin` provides `AgentRegistry` for locating the player
pub struct SpeechBubblePlugin;

impl Plugin for SpeechBubblePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpeechBubbleSettings>();
        let settings = *app.world().resource::<SpeechBubbleSettings>();

        app.insert_resource(BubbleLayoutEngine::new(settings.layout))
            .insert_resource(TextMeasureService::new(GlyphGridMeasure::new(
                settings.font_size,
            )))
            .add_systems(Startup, spawn_speech_bubble)
            .add_systems(Update, refresh_bubble_layout.in_set(FrameStage::Layout))
            .add_systems(Update, follow_bubble_target.in_set(FrameStage::Follow));

        info!("SpeechBubblePlugin registered");
    }
}
