//! Components for the player character.
use bevy::prelude::*;

/// Marker component identifying the player entity.
#[derive(Component, Debug)]
pub struct Player;

/// Walking speed of the kinematic player controller, in world units per second.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerMotion {
    pub speed: f32,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self { speed: 220.0 }
    }
}
