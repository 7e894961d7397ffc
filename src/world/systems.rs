//! Systems for the world module.
use bevy::prelude::*;

use crate::world::components::{Ground, MainCamera};

const GROUND_SIZE: Vec2 = Vec2::new(2400.0, 40.0);
/// Top of the ground strip; agents stand on it.
pub const GROUND_TOP: f32 = -120.0;

/// Spawns the 2D camera and the ground the demo characters walk on.
pub fn spawn_world_environment(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera, Name::new("Main Camera")));

    commands.spawn((
        Sprite::from_color(Color::srgb_u8(90, 140, 90), GROUND_SIZE),
        Transform::from_xyz(0.0, GROUND_TOP - GROUND_SIZE.y * 0.5, -1.0),
        Ground,
        Name::new("Ground"),
    ));
}
