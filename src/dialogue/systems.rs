//! Systems driving deferred dialogue work and notice mirroring.
use bevy::prelude::*;

use crate::core::plugin::SimulationClock;

use super::{
    config::NpcRoster,
    events::DialogueNoticeEvent,
    runtime::DialogueRuntime,
    session::{dispatch_due_actions, DialogueSession},
};

/// Advances the dialogue clock by the scaled frame delta and runs every
/// typewriter tick and auto-advance that came due.
pub fn run_deferred_dialogue_actions(
    clock: Res<SimulationClock>,
    mut runtime: ResMut<DialogueRuntime>,
    mut sessions: Query<&mut DialogueSession>,
) {
    runtime.advance_clock(clock.last_scaled_delta());
    dispatch_due_actions(&mut runtime, &mut sessions);
}

/// Mirrors hub notices into ECS messages, after hub subscribers have seen them.
pub fn forward_dialogue_notices(
    mut runtime: ResMut<DialogueRuntime>,
    mut notices: MessageWriter<DialogueNoticeEvent>,
) {
    for notice in runtime.hub.drain_outbox() {
        notices.write(DialogueNoticeEvent { notice });
    }
}

/// Registers a logging handler for every hook name the roster mentions.
pub fn register_roster_hooks(roster: Res<NpcRoster>, mut runtime: ResMut<DialogueRuntime>) {
    let mut hooks = Vec::new();
    for script in roster.npcs.iter().filter_map(|npc| npc.script.as_ref()) {
        hooks.extend(script.completion_hook().cloned());
        hooks.extend(
            (0..script.line_count())
                .filter_map(|index| script.line(index))
                .filter_map(|line| line.on_shown.clone()),
        );
    }
    hooks.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    hooks.dedup();

    for hook in hooks {
        debug!(target: "dialogue", "Registering hook '{}'", hook);
        runtime.hub.register_hook(hook, |context| {
            info!(
                target: "dialogue",
                "Hook '{}' fired for {} (line {:?})",
                context.hook,
                context.npc,
                context.line_index
            );
            Ok(())
        });
    }
}
