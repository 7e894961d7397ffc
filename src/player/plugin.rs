//! Player plugin wiring the player spawn and walk controls.
use bevy::prelude::*;

use crate::{
    core::FrameStage,
    player::systems::{move_player, spawn_player},
};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_player)
            .add_systems(Update, move_player.in_set(FrameStage::Input));
    }
}
