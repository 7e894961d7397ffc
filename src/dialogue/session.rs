//! Per-NPC dialogue session state machine.
use std::sync::Arc;

use bevy::prelude::*;

use crate::npc::components::NpcId;

use super::{
    errors::DialogueRefusal,
    hub::{DialogueNotice, HookContext},
    runtime::{DeferredAction, DialogueRuntime, FollowTarget},
    script::{DialogueScript, Speaker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Ended,
}

/// Result of a session operation. A refusal leaves the session untouched.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Applied,
    Refused(DialogueRefusal),
}

impl SessionOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// One NPC's traversal through its script. Lives on the NPC entity.
#[derive(Component, Debug)]
pub struct DialogueSession {
    npc: NpcId,
    script: Option<Arc<DialogueScript>>,
    cursor: usize,
    state: SessionState,
    has_completed_once: bool,
    generation: u64,
}

impl DialogueSession {
    pub fn new(npc: NpcId, script: Arc<DialogueScript>) -> Self {
        Self {
            script: Some(script),
            ..Self::unscripted(npc)
        }
    }

    /// Session for an NPC whose script is missing; every `start` is refused.
    pub fn unscripted(npc: NpcId) -> Self {
        Self {
            npc,
            script: None,
            cursor: 0,
            state: SessionState::Idle,
            has_completed_once: false,
            generation: 0,
        }
    }

    pub fn npc(&self) -> NpcId {
        self.npc
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_completed_once(&self) -> bool {
        self.has_completed_once
    }

    /// Bumped by every transition; deferred work scheduled under an older
    /// generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn script(&self) -> Option<&DialogueScript> {
        self.script.as_deref()
    }

    /// Why `start` would be refused right now, if it would.
    pub fn start_refusal(&self) -> Option<DialogueRefusal> {
        let Some(script) = self.script.as_deref() else {
            return Some(DialogueRefusal::MissingScript);
        };
        match self.state {
            SessionState::Active => Some(DialogueRefusal::AlreadyActive),
            SessionState::Ended if self.has_completed_once && !script.is_repeatable() => {
                Some(DialogueRefusal::Exhausted)
            }
            _ => None,
        }
    }

    pub fn start(&mut self, runtime: &mut DialogueRuntime) -> SessionOutcome {
        if let Some(refusal) = self.start_refusal() {
            debug!(target: "dialogue", "{} refused to start: {}", self.npc, refusal);
            return SessionOutcome::Refused(refusal);
        }

        self.cursor = 0;
        self.state = SessionState::Active;
        self.generation += 1;
        info!(
            target: "dialogue",
            "Dialogue with {} ({}) started",
            self.speaker_label(),
            self.npc
        );

        runtime
            .hub
            .publish(DialogueNotice::SessionStarted { npc: self.npc });
        self.show_current_line(runtime);
        SessionOutcome::Applied
    }

    pub fn advance(&mut self, runtime: &mut DialogueRuntime) -> SessionOutcome {
        if !self.is_active() {
            return SessionOutcome::Refused(DialogueRefusal::NotActive);
        }

        runtime.cancel_auto_advance_for(self.npc);
        self.cursor += 1;
        self.generation += 1;

        if self.cursor >= self.line_count() {
            return self.finish(runtime, false);
        }
        self.show_current_line(runtime);
        SessionOutcome::Applied
    }

    pub fn end(&mut self, runtime: &mut DialogueRuntime) -> SessionOutcome {
        self.finish(runtime, false)
    }

    /// Ends an interrupted conversation, e.g. when the player walks away.
    pub fn force_end(&mut self, runtime: &mut DialogueRuntime) -> SessionOutcome {
        let outcome = self.finish(runtime, true);
        if outcome.is_applied() {
            info!(target: "dialogue", "Dialogue with {} was interrupted", self.npc);
        }
        outcome
    }

    /// Fires a scheduled auto-advance if it still belongs to this session's
    /// current line.
    pub fn on_auto_advance(&mut self, generation: u64, runtime: &mut DialogueRuntime) -> bool {
        if !self.is_active() || generation != self.generation {
            debug!(target: "dialogue", "Dropping stale auto-advance for {}", self.npc);
            return false;
        }
        self.advance(runtime).is_applied()
    }

    fn finish(&mut self, runtime: &mut DialogueRuntime, forced: bool) -> SessionOutcome {
        if !self.is_active() {
            return SessionOutcome::Refused(DialogueRefusal::NotActive);
        }

        let line_index = self.cursor.min(self.line_count().saturating_sub(1));
        self.state = SessionState::Ended;
        self.has_completed_once = true;
        self.generation += 1;
        runtime.dismiss(self.npc);

        runtime.hub.publish(DialogueNotice::SessionEnded {
            npc: self.npc,
            line_index,
            forced,
        });
        if let Some(hook) = self.script().and_then(DialogueScript::completion_hook) {
            runtime.hub.fire_hook(HookContext {
                hook: hook.clone(),
                npc: self.npc,
                line_index: None,
            });
        }

        info!(
            target: "dialogue",
            "Dialogue with {} ({}) ended",
            self.speaker_label(),
            self.npc
        );
        SessionOutcome::Applied
    }

    fn show_current_line(&mut self, runtime: &mut DialogueRuntime) {
        let Some(script) = self.script.clone() else {
            return;
        };
        let Some(line) = script.line(self.cursor) else {
            return;
        };

        let target = match line.speaker {
            Speaker::Player => FollowTarget::Player,
            Speaker::Npc => FollowTarget::Npc(self.npc),
        };
        runtime.present_line(self.npc, target, &line.text);

        if let Some(hook) = &line.on_shown {
            runtime.hub.fire_hook(HookContext {
                hook: hook.clone(),
                npc: self.npc,
                line_index: Some(self.cursor),
            });
        }
        runtime.hub.publish(DialogueNotice::LineShown {
            npc: self.npc,
            line_index: self.cursor,
            text: line.text.clone(),
            speaker: line.speaker,
        });

        let speaker_name = match line.speaker {
            Speaker::Player => "Player",
            Speaker::Npc => script.speaker_label(),
        };
        info!(target: "dialogue", "{}: {}", speaker_name, line.text);

        if let Some(delay) = script.auto_advance() {
            runtime.schedule_auto_advance(self.npc, self.generation, delay);
        }
    }

    fn line_count(&self) -> usize {
        self.script().map_or(0, DialogueScript::line_count)
    }

    fn speaker_label(&self) -> &str {
        self.script().map_or("unscripted NPC", DialogueScript::speaker_label)
    }
}

/// Access to sessions by NPC id, so callers can drive sessions stored in
/// ECS queries and in plain collections alike.
pub trait SessionLookup {
    fn with_session<R>(
        &mut self,
        npc: NpcId,
        f: impl FnOnce(&mut DialogueSession) -> R,
    ) -> Option<R>;
}

impl SessionLookup for Query<'_, '_, &mut DialogueSession> {
    fn with_session<R>(
        &mut self,
        npc: NpcId,
        f: impl FnOnce(&mut DialogueSession) -> R,
    ) -> Option<R> {
        self.iter_mut()
            .find(|session| session.npc() == npc)
            .map(|mut session| f(&mut *session))
    }
}

#[cfg(test)]
impl SessionLookup for std::collections::HashMap<NpcId, DialogueSession> {
    fn with_session<R>(
        &mut self,
        npc: NpcId,
        f: impl FnOnce(&mut DialogueSession) -> R,
    ) -> Option<R> {
        self.get_mut(&npc).map(f)
    }
}

#[cfg(test)]
impl SessionLookup for DialogueSession {
    fn with_session<R>(
        &mut self,
        npc: NpcId,
        f: impl FnOnce(&mut DialogueSession) -> R,
    ) -> Option<R> {
        (self.npc == npc).then(|| f(self))
    }
}

/// Runs every deferred action that has come due: typewriter reveals and
/// auto-advances. Stale entries are discarded by their owners.
pub fn dispatch_due_actions(runtime: &mut DialogueRuntime, sessions: &mut impl SessionLookup) {
    while let Some((due, action)) = runtime.pop_due() {
        match action {
            DeferredAction::RevealNext { run } => runtime.on_reveal_tick(run, due),
            DeferredAction::AutoAdvance { npc, generation } => {
                let fired = sessions.with_session(npc, |session| {
                    session.on_auto_advance(generation, runtime)
                });
                if fired.is_none() {
                    debug!(target: "dialogue", "Auto-advance for missing {}", npc);
                }
            }
        }
    }
}
