// src/ui/speech_bubble/components.rs
//
// Speech bubble UI markers.

use bevy::prelude::*;

/// Root node of the single speech bubble. Positioned in screen space by the
/// follow system and sized by the layout system.
#[derive(Component, Debug, Default)]
pub struct SpeechBubble;

/// Text node inside the bubble showing the typewriter's visible text.
#[derive(Component, Debug, Default)]
pub struct SpeechBubbleText;
