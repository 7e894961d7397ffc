//! Systems related to NPC spawning.
use std::sync::Arc;

use bevy::prelude::*;

use crate::{
    dialogue::{config::NpcRoster, session::DialogueSession},
    interaction::{overlap::TriggerContacts, proximity::ProximityDetector},
    npc::components::{DialogueAnchor, NpcIdGenerator},
    world::systems::GROUND_TOP,
};

const NPC_SIZE: Vec2 = Vec2::new(32.0, 48.0);

const NPC_COLORS: [Color; 3] = [
    Color::srgb(0.78, 0.35, 0.35),
    Color::srgb(0.35, 0.59, 0.82),
    Color::srgb(0.55, 0.78, 0.47),
];

/// Spawns every NPC declared in the roster with its dialogue session and
/// interaction range.
pub fn spawn_configured_npcs(
    mut commands: Commands,
    roster: Res<NpcRoster>,
    mut id_generator: ResMut<NpcIdGenerator>,
) {
    for (index, definition) in roster.npcs.iter().enumerate() {
        let id = id_generator.next_id();
        let session = match &definition.script {
            Some(script) => DialogueSession::new(id, Arc::new(script.clone())),
            None => {
                warn!("{} ({}) has no dialogue script", definition.name, id);
                DialogueSession::unscripted(id)
            }
        };

        commands.spawn((
            Sprite::from_color(NPC_COLORS[index % NPC_COLORS.len()], NPC_SIZE),
            Transform::from_xyz(
                definition.position.x,
                GROUND_TOP + NPC_SIZE.y * 0.5 + definition.position.y,
                0.0,
            ),
            id,
            DialogueAnchor::new(definition.anchor_offset),
            session,
            ProximityDetector::new(
                definition.detection,
                definition.radius,
                definition.tracked_tag.clone(),
            ),
            definition.trigger,
            TriggerContacts::default(),
            Name::new(format!("NPC {}", definition.name)),
        ));

        info!(
            "Spawned {} ({}) with {:?} detection",
            definition.name, id, definition.detection
        );
    }
}
