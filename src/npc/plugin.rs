//! NPC plugin wiring NPC ids and the configured spawner.
use bevy::prelude::*;

use crate::npc::{components::NpcIdGenerator, systems::spawn_configured_npcs};

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NpcIdGenerator>()
            .add_systems(Startup, spawn_configured_npcs);
    }
}
