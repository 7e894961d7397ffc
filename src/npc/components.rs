//! NPC-specific components and supporting resources.
use std::fmt;

use bevy::prelude::*;
use serde::Serialize;

/// Unique identifier for an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Component, Serialize)]
pub struct NpcId(u64);

impl NpcId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NPC-{:04}", self.0)
    }
}

/// Point, relative to the NPC's transform, that speech bubbles follow.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct DialogueAnchor {
    pub offset: Vec2,
}

impl DialogueAnchor {
    pub fn new(offset: Vec2) -> Self {
        Self { offset }
    }

    pub fn world_point(&self, transform: &GlobalTransform) -> Vec3 {
        transform.translation() + self.offset.extend(0.0)
    }
}

/// Resource that issues monotonically increasing NPC ids.
#[derive(Resource, Default)]
pub struct NpcIdGenerator {
    next: u64,
}

impl NpcIdGenerator {
    pub fn next_id(&mut self) -> NpcId {
        let id = self.next;
        self.next += 1;
        NpcId::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_issues_sequential_ids() {
        let mut generator = NpcIdGenerator::default();
        assert_eq!(generator.next_id(), NpcId::new(0));
        assert_eq!(generator.next_id(), NpcId::new(1));
        assert_eq!(NpcId::new(7).to_string(), "NPC-0007");
    }

    #[test]
    fn anchor_offsets_world_point() {
        let anchor = DialogueAnchor::new(Vec2::new(0.0, 40.0));
        let transform = GlobalTransform::from_translation(Vec3::new(10.0, 5.0, 0.0));
        assert_eq!(anchor.world_point(&transform), Vec3::new(10.0, 45.0, 0.0));
    }
}
