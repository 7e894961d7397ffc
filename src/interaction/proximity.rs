//! Interaction-range detection: turns overlap or distance into discrete
//! enter/exit transitions.
use bevy::prelude::*;

use super::registry::AgentTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    /// Driven by `TriggerEntered`/`TriggerExited` from the overlap stage.
    ShapeOverlap,
    /// Distance to the nearest tracked agent, checked every tick.
    PolledDistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeState {
    PlayerAbsent,
    PlayerPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityTransition {
    Entered(Entity),
    Exited,
}

#[derive(Component, Debug, Clone)]
pub struct ProximityDetector {
    mode: DetectionMode,
    radius: f32,
    tracked_tag: AgentTag,
    state: RangeState,
    /// Lookup-only reference to the agent in range; cleared on exit.
    agent: Option<Entity>,
}

impl ProximityDetector {
    pub fn new(mode: DetectionMode, radius: f32, tracked_tag: AgentTag) -> Self {
        Self {
            mode,
            radius: radius.max(0.0),
            tracked_tag,
            state: RangeState::PlayerAbsent,
            agent: None,
        }
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    pub fn tracked_tag(&self) -> &AgentTag {
        &self.tracked_tag
    }

    pub fn state(&self) -> RangeState {
        self.state
    }

    pub fn agent(&self) -> Option<Entity> {
        self.agent
    }

    pub fn on_agent_enter(&mut self, agent: Entity) -> Option<ProximityTransition> {
        if self.state == RangeState::PlayerPresent {
            return None;
        }
        self.state = RangeState::PlayerPresent;
        self.agent = Some(agent);
        Some(ProximityTransition::Entered(agent))
    }

    pub fn on_agent_exit(&mut self) -> Option<ProximityTransition> {
        if self.state == RangeState::PlayerAbsent {
            return None;
        }
        self.state = RangeState::PlayerAbsent;
        self.agent = None;
        Some(ProximityTransition::Exited)
    }

    /// Polled-distance step. With no agent around nothing changes.
    pub fn poll_distance(
        &mut self,
        position: Vec2,
        nearest: Option<(Entity, Vec2)>,
    ) -> Option<ProximityTransition> {
        let (agent, agent_position) = nearest?;
        if position.distance(agent_position) <= self.radius {
            self.on_agent_enter(agent)
        } else {
            self.on_agent_exit()
        }
    }

    /// Treats an agent that no longer exists as having left.
    pub fn validate_agent(&mut self, alive: impl FnOnce(Entity) -> bool) -> Option<ProximityTransition> {
        match self.agent {
            Some(agent) if !alive(agent) => self.on_agent_exit(),
            _ => None,
        }
    }
}

/// Nearest of `candidates` to `position`.
pub fn nearest_agent(
    position: Vec2,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Option<(Entity, Vec2)> {
    candidates.into_iter().min_by(|(_, a), (_, b)| {
        position
            .distance_squared(*a)
            .total_cmp(&position.distance_squared(*b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents(count: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..count).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn reentry_while_present_is_ignored() {
        let player = agents(1)[0];
        let mut detector = ProximityDetector::new(DetectionMode::ShapeOverlap, 0.0, AgentTag::player());

        assert_eq!(detector.on_agent_enter(player), Some(ProximityTransition::Entered(player)));
        assert_eq!(detector.on_agent_enter(player), None);
        assert_eq!(detector.state(), RangeState::PlayerPresent);

        assert_eq!(detector.on_agent_exit(), Some(ProximityTransition::Exited));
        assert_eq!(detector.on_agent_exit(), None);
        assert_eq!(detector.agent(), None);
    }

    #[test]
    fn polled_distance_fires_on_crossings_only() {
        let player = agents(1)[0];
        let mut detector =
            ProximityDetector::new(DetectionMode::PolledDistance, 10.0, AgentTag::player());
        let npc = Vec2::ZERO;

        assert_eq!(detector.poll_distance(npc, Some((player, Vec2::new(20.0, 0.0)))), None);
        assert_eq!(
            detector.poll_distance(npc, Some((player, Vec2::new(10.0, 0.0)))),
            Some(ProximityTransition::Entered(player))
        );
        assert_eq!(detector.poll_distance(npc, Some((player, Vec2::new(5.0, 0.0)))), None);
        assert_eq!(
            detector.poll_distance(npc, Some((player, Vec2::new(10.5, 0.0)))),
            Some(ProximityTransition::Exited)
        );
    }

    #[test]
    fn missing_agent_leaves_state_unchanged() {
        let player = agents(1)[0];
        let mut detector =
            ProximityDetector::new(DetectionMode::PolledDistance, 10.0, AgentTag::player());
        detector.poll_distance(Vec2::ZERO, Some((player, Vec2::ZERO)));

        assert_eq!(detector.poll_distance(Vec2::ZERO, None), None);
        assert_eq!(detector.state(), RangeState::PlayerPresent);
    }

    #[test]
    fn expired_agent_is_an_implicit_exit() {
        let player = agents(1)[0];
        let mut detector = ProximityDetector::new(DetectionMode::ShapeOverlap, 0.0, AgentTag::player());
        detector.on_agent_enter(player);

        assert_eq!(detector.validate_agent(|_| true), None);
        assert_eq!(detector.validate_agent(|_| false), Some(ProximityTransition::Exited));
        assert_eq!(detector.state(), RangeState::PlayerAbsent);
    }

    #[test]
    fn nearest_agent_picks_the_closest() {
        let ids = agents(2);
        let nearest = nearest_agent(
            Vec2::ZERO,
            [(ids[0], Vec2::new(9.0, 0.0)), (ids[1], Vec2::new(0.0, -3.0))],
        );
        assert_eq!(nearest.map(|(entity, _)| entity), Some(ids[1]));
        assert_eq!(nearest_agent(Vec2::ZERO, std::iter::empty()), None);
    }
}
