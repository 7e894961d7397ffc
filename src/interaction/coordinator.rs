//! The chat-button façade: one control that starts, skips, and advances the
//! conversation with whichever NPC the player most recently walked up to.
use bevy::prelude::*;

use crate::{
    dialogue::{
        errors::DialogueRefusal,
        runtime::DialogueRuntime,
        session::{SessionLookup, SessionOutcome},
    },
    npc::components::NpcId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Started,
    Skipped,
    Advanced,
    Refused(DialogueRefusal),
    /// No NPC in range.
    Ignored,
}

#[derive(Resource, Debug, Default)]
pub struct InteractionCoordinator {
    current: Option<NpcId>,
    button_visible: bool,
}

impl InteractionCoordinator {
    pub fn current(&self) -> Option<NpcId> {
        self.current
    }

    pub fn is_button_visible(&self) -> bool {
        self.button_visible
    }

    /// Adopts `npc` as the current conversation partner. Last entry wins: a
    /// previous partner's session is force-ended first.
    pub fn on_range_entered(
        &mut self,
        npc: NpcId,
        runtime: &mut DialogueRuntime,
        sessions: &mut impl SessionLookup,
    ) {
        if let Some(previous) = self.current.filter(|previous| *previous != npc) {
            let ended = sessions.with_session(previous, |session| session.force_end(runtime));
            if ended.is_some_and(SessionOutcome::is_applied) {
                info!(
                    target: "interaction",
                    "Ended dialogue with {} in favour of {}",
                    previous,
                    npc
                );
            }
        }

        self.current = Some(npc);
        self.button_visible = true;
    }

    pub fn on_range_exited(
        &mut self,
        npc: NpcId,
        runtime: &mut DialogueRuntime,
        sessions: &mut impl SessionLookup,
    ) {
        let _ = sessions.with_session(npc, |session| session.force_end(runtime));

        if self.current == Some(npc) {
            self.current = None;
            self.button_visible = false;
        }
    }

    /// Forgets `npc` without touching its session, for NPCs that no longer exist.
    pub fn release(&mut self, npc: NpcId) {
        if self.current == Some(npc) {
            self.current = None;
            self.button_visible = false;
        }
    }

    pub fn press(
        &mut self,
        runtime: &mut DialogueRuntime,
        sessions: &mut impl SessionLookup,
    ) -> PressOutcome {
        let Some(npc) = self.current else {
            return PressOutcome::Ignored;
        };

        let outcome = sessions.with_session(npc, |session| {
            if !session.is_active() {
                return match session.start(runtime) {
                    SessionOutcome::Applied => PressOutcome::Started,
                    SessionOutcome::Refused(refusal) => PressOutcome::Refused(refusal),
                };
            }
            if runtime.skip_typewriter() {
                return PressOutcome::Skipped;
            }
            match session.advance(runtime) {
                SessionOutcome::Applied => PressOutcome::Advanced,
                SessionOutcome::Refused(refusal) => PressOutcome::Refused(refusal),
            }
        });

        outcome.unwrap_or_else(|| {
            warn!(target: "interaction", "{} is in range but has no dialogue session", npc);
            PressOutcome::Ignored
        })
    }
}
