//! Systems for spawning and walking the player.
use bevy::prelude::*;

use crate::{
    core::plugin::SimulationClock,
    interaction::registry::{AgentRegistry, AgentTag},
    npc::components::DialogueAnchor,
    player::components::{Player, PlayerMotion},
    world::systems::GROUND_TOP,
};

const PLAYER_SIZE: Vec2 = Vec2::new(28.0, 44.0);
const PLAYER_START_X: f32 = -240.0;

/// Spawns the player and registers it so proximity detectors can track it.
pub fn spawn_player(mut commands: Commands, mut registry: ResMut<AgentRegistry>) {
    let player = commands
        .spawn((
            Sprite::from_color(Color::srgb_u8(230, 220, 200), PLAYER_SIZE),
            Transform::from_xyz(PLAYER_START_X, GROUND_TOP + PLAYER_SIZE.y * 0.5, 0.0),
            Player,
            PlayerMotion::default(),
            DialogueAnchor::new(Vec2::new(0.0, PLAYER_SIZE.y * 0.5)),
            Name::new("Player"),
        ))
        .id();

    registry.register(player, AgentTag::player());
}

/// Walks the player left and right with A/D or the arrow keys.
pub fn move_player(
    keyboard: Res<ButtonInput<KeyCode>>,
    clock: Res<SimulationClock>,
    mut query: Query<(&PlayerMotion, &mut Transform), With<Player>>,
) {
    let Ok((motion, mut transform)) = query.single_mut() else {
        return;
    };

    let mut direction = 0.0;
    if keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        direction -= 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        direction += 1.0;
    }

    if direction != 0.0 {
        let modifier = if keyboard.pressed(KeyCode::ShiftLeft) {
            1.8
        } else {
            1.0
        };
        transform.translation.x +=
            direction * motion.speed * modifier * clock.last_scaled_delta().as_secs_f32();
    }
}
