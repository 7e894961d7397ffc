//! Interaction plugin wiring proximity detection, input bindings and the coordinator.
use bevy::prelude::*;

use crate::{core::FrameStage, dialogue::systems::run_deferred_dialogue_actions};

use super::{
    coordinator::InteractionCoordinator,
    events::{ChatPressed, ProximityEvent},
    overlap::{detect_trigger_overlaps, TriggerEntered, TriggerExited},
    registry::AgentRegistry,
    systems::{
        apply_proximity_to_coordinator, detect_proximity, handle_chat_press, prune_expired_agents,
        release_despawned_npcs, send_chat_press_from_keys,
    },
};

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AgentRegistry>()
            .init_resource::<InteractionCoordinator>()
            .add_message::<TriggerEntered>()
            .add_message::<TriggerExited>()
            .add_message::<ProximityEvent>()
            .add_message::<ChatPressed>()
            .add_systems(
                Update,
                (prune_expired_agents, send_chat_press_from_keys).in_set(FrameStage::Input),
            )
            .add_systems(
                Update,
                (detect_trigger_overlaps, detect_proximity)
                    .chain()
                    .in_set(FrameStage::Proximity),
            )
            // Range changes settle before due dialogue work runs.
            .add_systems(
                Update,
                (release_despawned_npcs, apply_proximity_to_coordinator)
                    .chain()
                    .before(run_deferred_dialogue_actions)
                    .in_set(FrameStage::Session),
            )
            .add_systems(
                Update,
                handle_chat_press
                    .after(run_deferred_dialogue_actions)
                    .in_set(FrameStage::Session),
            );
    }
}
