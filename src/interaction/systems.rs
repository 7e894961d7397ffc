//! Systems feeding proximity and input into the interaction coordinator.
use bevy::prelude::*;

use crate::{
    dialogue::{runtime::DialogueRuntime, session::DialogueSession},
    npc::components::NpcId,
};

use super::{
    coordinator::{InteractionCoordinator, PressOutcome},
    events::{ChatPressed, ProximityEvent, ProximityKind},
    overlap::{TriggerEntered, TriggerExited},
    proximity::{nearest_agent, DetectionMode, ProximityDetector, ProximityTransition},
    registry::AgentRegistry,
};

/// Drops registered agents whose entity is gone.
pub fn prune_expired_agents(mut registry: ResMut<AgentRegistry>, alive: Query<(), With<Transform>>) {
    let removed = registry.retain_alive(|entity| alive.contains(entity));
    if removed > 0 {
        debug!(target: "interaction", "Pruned {} expired agents", removed);
    }
}

/// `E` and `Space` press the chat control.
pub fn send_chat_press_from_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut presses: MessageWriter<ChatPressed>,
) {
    if keyboard.any_just_pressed([KeyCode::KeyE, KeyCode::Space]) {
        presses.write(ChatPressed);
    }
}

/// Resolves enter/exit transitions for every NPC detector.
pub fn detect_proximity(
    registry: Res<AgentRegistry>,
    agents: Query<&GlobalTransform>,
    mut entered: MessageReader<TriggerEntered>,
    mut exited: MessageReader<TriggerExited>,
    mut detectors: Query<(Entity, &NpcId, &GlobalTransform, &mut ProximityDetector)>,
    mut events: MessageWriter<ProximityEvent>,
) {
    let entered: Vec<TriggerEntered> = entered.read().copied().collect();
    let exited: Vec<TriggerExited> = exited.read().copied().collect();

    for (entity, npc, transform, mut detector) in detectors.iter_mut() {
        let mut transitions = Vec::new();
        transitions.extend(
            detector.validate_agent(|agent| registry.contains(agent) && agents.contains(agent)),
        );

        match detector.mode() {
            DetectionMode::ShapeOverlap => {
                for exit in exited.iter().filter(|exit| exit.trigger == entity) {
                    if detector.agent() == Some(exit.agent) {
                        transitions.extend(detector.on_agent_exit());
                    }
                }
                for enter in entered.iter().filter(|enter| enter.trigger == entity) {
                    if registry.has_tag(enter.agent, detector.tracked_tag()) {
                        transitions.extend(detector.on_agent_enter(enter.agent));
                    }
                }
            }
            DetectionMode::PolledDistance => {
                let position = transform.translation().truncate();
                let candidates = registry
                    .tagged(detector.tracked_tag())
                    .filter_map(|agent| {
                        agents
                            .get(agent)
                            .ok()
                            .map(|agent_transform| (agent, agent_transform.translation().truncate()))
                    })
                    .collect::<Vec<_>>();
                let nearest = nearest_agent(position, candidates);
                transitions.extend(detector.poll_distance(position, nearest));
            }
        }

        for transition in transitions {
            let kind = match transition {
                ProximityTransition::Entered(_) => ProximityKind::Entered,
                ProximityTransition::Exited => ProximityKind::Exited,
            };
            debug!(target: "interaction", "{} range {:?}", npc, kind);
            events.write(ProximityEvent { npc: *npc, kind });
        }
    }
}

/// Clears the bubble and the chat slot of NPCs whose session was despawned.
pub fn release_despawned_npcs(
    mut removed: RemovedComponents<DialogueSession>,
    sessions: Query<&DialogueSession>,
    mut coordinator: ResMut<InteractionCoordinator>,
    mut runtime: ResMut<DialogueRuntime>,
) {
    if removed.read().count() == 0 {
        return;
    }

    let exists = |npc: NpcId| sessions.iter().any(|session| session.npc() == npc);
    for npc in [runtime.bubble_owner(), coordinator.current()]
        .into_iter()
        .flatten()
    {
        if exists(npc) {
            continue;
        }
        info!(target: "interaction", "{} despawned, dropping its dialogue", npc);
        runtime.dismiss(npc);
        coordinator.release(npc);
    }
}

pub fn apply_proximity_to_coordinator(
    mut events: MessageReader<ProximityEvent>,
    mut coordinator: ResMut<InteractionCoordinator>,
    mut runtime: ResMut<DialogueRuntime>,
    mut sessions: Query<&mut DialogueSession>,
) {
    for event in events.read() {
        match event.kind {
            ProximityKind::Entered => {
                info!(target: "interaction", "Player entered range of {}", event.npc);
                coordinator.on_range_entered(event.npc, &mut runtime, &mut sessions);
            }
            ProximityKind::Exited => {
                info!(target: "interaction", "Player left range of {}", event.npc);
                coordinator.on_range_exited(event.npc, &mut runtime, &mut sessions);
            }
        }
    }
}

pub fn handle_chat_press(
    mut presses: MessageReader<ChatPressed>,
    mut coordinator: ResMut<InteractionCoordinator>,
    mut runtime: ResMut<DialogueRuntime>,
    mut sessions: Query<&mut DialogueSession>,
) {
    for _ in presses.read() {
        match coordinator.press(&mut runtime, &mut sessions) {
            PressOutcome::Refused(refusal) => {
                info!(target: "interaction", "Chat press refused: {}", refusal);
            }
            PressOutcome::Ignored => {
                debug!(target: "interaction", "Chat press with nobody in range");
            }
            outcome => debug!(target: "interaction", "Chat press: {:?}", outcome),
        }
    }
}
