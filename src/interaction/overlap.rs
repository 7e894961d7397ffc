//! Trigger shapes and the overlap stage that reports agents entering and
//! leaving them, in the manner of engine collision-trigger callbacks.
use bevy::prelude::*;

use super::registry::AgentRegistry;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum TriggerShape {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

impl TriggerShape {
    pub fn contains(&self, center: Vec2, point: Vec2) -> bool {
        let offset = point - center;
        match *self {
            Self::Circle { radius } => offset.length_squared() <= radius * radius,
            Self::Rect { half_extents } => {
                offset.x.abs() <= half_extents.x && offset.y.abs() <= half_extents.y
            }
        }
    }
}

/// Agents currently inside a trigger.
#[derive(Component, Debug, Default)]
pub struct TriggerContacts {
    inside: Vec<Entity>,
}

impl TriggerContacts {
    pub fn contains(&self, agent: Entity) -> bool {
        self.inside.contains(&agent)
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEntered {
    pub trigger: Entity,
    pub agent: Entity,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerExited {
    pub trigger: Entity,
    pub agent: Entity,
}

/// Tests every registered agent against every trigger and reports changes.
/// Agents that disappeared while inside are reported as exits.
pub fn detect_trigger_overlaps(
    registry: Res<AgentRegistry>,
    agents: Query<&GlobalTransform>,
    mut triggers: Query<(Entity, &GlobalTransform, &TriggerShape, &mut TriggerContacts)>,
    mut entered: MessageWriter<TriggerEntered>,
    mut exited: MessageWriter<TriggerExited>,
) {
    for (trigger, transform, shape, mut contacts) in triggers.iter_mut() {
        let center = transform.translation().truncate();
        let now_inside: Vec<Entity> = registry
            .entities()
            .filter(|agent| *agent != trigger)
            .filter(|agent| {
                agents
                    .get(*agent)
                    .is_ok_and(|agent_transform| {
                        shape.contains(center, agent_transform.translation().truncate())
                    })
            })
            .collect();

        for agent in contacts.inside.iter().filter(|a| !now_inside.contains(*a)) {
            exited.write(TriggerExited {
                trigger,
                agent: *agent,
            });
        }
        for agent in now_inside.iter().filter(|a| !contacts.contains(**a)) {
            entered.write(TriggerEntered {
                trigger,
                agent: *agent,
            });
        }
        contacts.inside = now_inside;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_contain_points() {
        let circle = TriggerShape::Circle { radius: 5.0 };
        assert!(circle.contains(Vec2::ZERO, Vec2::new(3.0, 4.0)));
        assert!(!circle.contains(Vec2::ZERO, Vec2::new(3.0, 4.1)));

        let rect = TriggerShape::Rect {
            half_extents: Vec2::new(10.0, 2.0),
        };
        assert!(rect.contains(Vec2::new(100.0, 0.0), Vec2::new(91.0, -2.0)));
        assert!(!rect.contains(Vec2::new(100.0, 0.0), Vec2::new(100.0, 3.0)));
    }
}
