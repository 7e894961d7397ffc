//! Explicit registry of agents that proximity detectors can track.
use std::fmt;

use bevy::prelude::*;

/// Tag an agent registers under, e.g. `"player"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentTag(String);

impl AgentTag {
    pub const PLAYER: &'static str = "player";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn player() -> Self {
        Self::new(Self::PLAYER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agents register themselves when spawned; detectors never search the scene.
#[derive(Resource, Debug, Default)]
pub struct AgentRegistry {
    agents: Vec<(Entity, AgentTag)>,
}

impl AgentRegistry {
    pub fn register(&mut self, entity: Entity, tag: AgentTag) {
        if self.has_tag(entity, &tag) {
            return;
        }
        info!(target: "interaction", "Registered agent {:?} as '{}'", entity, tag);
        self.agents.push((entity, tag));
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn unregister(&mut self, entity: Entity) -> bool {
        let before = self.agents.len();
        self.agents.retain(|(agent, _)| *agent != entity);
        self.agents.len() < before
    }

    pub fn tagged<'a>(&'a self, tag: &'a AgentTag) -> impl Iterator<Item = Entity> + 'a {
        self.agents
            .iter()
            .filter(move |(_, agent_tag)| agent_tag == tag)
            .map(|(entity, _)| *entity)
    }

    pub fn first_tagged(&self, tag: &AgentTag) -> Option<Entity> {
        self.tagged(tag).next()
    }

    pub fn has_tag(&self, entity: Entity, tag: &AgentTag) -> bool {
        self.agents
            .iter()
            .any(|(agent, agent_tag)| *agent == entity && agent_tag == tag)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.agents.iter().any(|(agent, _)| *agent == entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.agents.iter().map(|(entity, _)| *entity)
    }

    /// Drops agents for which `alive` returns false.
    pub fn retain_alive(&mut self, mut alive: impl FnMut(Entity) -> bool) -> usize {
        let before = self.agents.len();
        self.agents.retain(|(entity, _)| alive(*entity));
        before - self.agents.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_tag() {
        let mut world = World::new();
        let player = world.spawn_empty().id();
        let pet = world.spawn_empty().id();

        let mut registry = AgentRegistry::default();
        registry.register(player, AgentTag::player());
        registry.register(player, AgentTag::player());
        registry.register(pet, AgentTag::new("pet"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.first_tagged(&AgentTag::player()), Some(player));
        assert!(registry.has_tag(pet, &AgentTag::new("pet")));
        assert!(!registry.has_tag(pet, &AgentTag::player()));

        assert_eq!(registry.retain_alive(|entity| entity != pet), 1);
        assert!(registry.unregister(player));
        assert!(registry.is_empty());
        assert_eq!(registry.first_tagged(&AgentTag::player()), None);
    }
}
