//! Messages produced by interaction-range detection and input bindings.
use bevy::prelude::*;

use crate::npc::components::NpcId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityKind {
    Entered,
    Exited,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityEvent {
    pub npc: NpcId,
    pub kind: ProximityKind,
}

/// The chat control was activated, by click or key.
#[derive(Message, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatPressed;
