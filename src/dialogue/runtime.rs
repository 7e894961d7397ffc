//! Shared dialogue runtime: event hub, deferred actions, typewriter, and bubble display state.
use std::time::Duration;

use bevy::prelude::*;

use crate::{
    core::scheduler::{DeferredHandle, DeferredQueue},
    npc::components::NpcId,
};

use super::{
    hub::DialogueEventHub,
    typewriter::{Typewriter, TypewriterRunId},
};

/// Work scheduled for a later frame. Each entry carries what it needs to
/// detect that it has gone stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    RevealNext { run: TypewriterRunId },
    AutoAdvance { npc: NpcId, generation: u64 },
}

/// What the speech bubble should follow on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowTarget {
    /// The registered player. Falls back to the owning NPC when no player is registered.
    Player,
    Npc(NpcId),
}

#[derive(Debug, Default)]
struct BubbleDisplay {
    owner: Option<NpcId>,
    target: Option<FollowTarget>,
    layout_requests: u32,
}

#[derive(Resource, Debug)]
pub struct DialogueRuntime {
    pub hub: DialogueEventHub,
    deferred: DeferredQueue<DeferredAction>,
    typewriter: Typewriter,
    bubble: BubbleDisplay,
    auto_advance: Option<(NpcId, DeferredHandle)>,
}

impl DialogueRuntime {
    pub fn new(seconds_per_char: Duration, typewriter_enabled: bool) -> Self {
        Self {
            hub: DialogueEventHub::default(),
            deferred: DeferredQueue::default(),
            typewriter: Typewriter::new(seconds_per_char, typewriter_enabled),
            bubble: BubbleDisplay::default(),
            auto_advance: None,
        }
    }

    pub fn advance_clock(&mut self, delta: Duration) {
        self.deferred.advance_by(delta);
    }

    pub fn pop_due(&mut self) -> Option<(Duration, DeferredAction)> {
        self.deferred.pop_due()
    }

    /// Shows `text` in the bubble for `npc`, restarting the typewriter.
    pub fn present_line(&mut self, npc: NpcId, target: FollowTarget, text: &str) {
        self.typewriter.start(text, &mut self.deferred);
        self.bubble.owner = Some(npc);
        self.bubble.target = Some(target);
        self.request_layout();
    }

    pub fn on_reveal_tick(&mut self, run: TypewriterRunId, due: Duration) {
        if self.typewriter.on_tick(run, due, &mut self.deferred) {
            self.request_layout();
        }
    }

    /// Reveals the rest of the current line. Returns false when nothing was typing.
    pub fn skip_typewriter(&mut self) -> bool {
        let skipped = self.typewriter.skip(&mut self.deferred);
        if skipped {
            self.request_layout();
        }
        skipped
    }

    pub fn is_typing(&self) -> bool {
        self.typewriter.is_typing()
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn schedule_auto_advance(&mut self, npc: NpcId, generation: u64, delay: Duration) {
        self.cancel_auto_advance();
        let handle = self
            .deferred
            .schedule_in(delay, DeferredAction::AutoAdvance { npc, generation });
        self.auto_advance = Some((npc, handle));
    }

    pub fn cancel_auto_advance(&mut self) {
        if let Some((_, handle)) = self.auto_advance.take() {
            self.deferred.cancel(handle);
        }
    }

    pub fn cancel_auto_advance_for(&mut self, npc: NpcId) {
        if self.auto_advance.is_some_and(|(owner, _)| owner == npc) {
            self.cancel_auto_advance();
        }
    }

    /// Clears every piece of in-flight work belonging to `npc` and hides its bubble.
    pub fn dismiss(&mut self, npc: NpcId) {
        self.cancel_auto_advance_for(npc);
        if self.bubble.owner == Some(npc) {
            self.typewriter.cancel(&mut self.deferred);
            self.bubble = BubbleDisplay::default();
        }
    }

    pub fn is_bubble_visible(&self) -> bool {
        self.bubble.owner.is_some()
    }

    pub fn bubble_owner(&self) -> Option<NpcId> {
        self.bubble.owner
    }

    pub fn follow_target(&self) -> Option<FollowTarget> {
        self.bubble.target
    }

    pub fn displayed_text(&self) -> &str {
        self.typewriter.visible_text()
    }

    /// Number of layout recomputes requested since the last call.
    pub fn take_layout_requests(&mut self) -> u32 {
        std::mem::take(&mut self.bubble.layout_requests)
    }

    fn request_layout(&mut self) {
        self.bubble.layout_requests = self.bubble.layout_requests.saturating_add(1);
    }
}

impl Default for DialogueRuntime {
    fn default() -> Self {
        Self::new(Duration::from_millis(50), true)
    }
}
