// src/ui/speech_bubble/systems.rs
//
// Systems spawning, sizing and positioning the speech bubble.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::dialogue::{
    config::SpeechBubbleSettings,
    runtime::{DialogueRuntime, FollowTarget},
};
use crate::interaction::registry::{AgentRegistry, AgentTag};
use crate::npc::components::{DialogueAnchor, NpcId};
use crate::world::components::MainCamera;

use super::components::{SpeechBubble, SpeechBubbleText};
use super::follow::{bubble_origin, clamp_to_canvas, project_to_screen};
use super::layout::BubbleLayoutEngine;
use super::measure::TextMeasureService;

// Visual constants
const BACKGROUND_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.85);
const TEXT_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);

/// Spawns the bubble hidden; it becomes visible once a line is shown.
pub fn spawn_speech_bubble(mut commands: Commands, settings: Res<SpeechBubbleSettings>) {
    let padding = settings.layout.padding;
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                padding: UiRect::axes(Val::Px(padding.x), Val::Px(padding.y)),
                display: Display::None,
                ..default()
            },
            BackgroundColor(BACKGROUND_COLOR),
            ZIndex(100),
            SpeechBubble,
            Name::new("Speech Bubble"),
        ))
        .with_children(|bubble| {
            bubble.spawn((
                Text::new(""),
                TextFont {
                    font_size: settings.font_size,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                SpeechBubbleText,
            ));
        });
}

/// Re-measures the bubble whenever the displayed text changed this frame.
pub fn refresh_bubble_layout(
    mut runtime: ResMut<DialogueRuntime>,
    mut engine: ResMut<BubbleLayoutEngine>,
    measure: Res<TextMeasureService>,
    mut bubbles: Query<&mut Node, With<SpeechBubble>>,
    mut texts: Query<&mut Text, With<SpeechBubbleText>>,
) {
    let requests = runtime.take_layout_requests();

    if !runtime.is_bubble_visible() {
        engine.reset();
        for mut node in bubbles.iter_mut() {
            node.display = Display::None;
        }
        return;
    }

    if requests == 0 {
        return;
    }

    engine.request();
    let displayed = runtime.displayed_text();
    engine.run_pending(displayed, measure.measurer());

    for mut text in texts.iter_mut() {
        if text.0 != displayed {
            text.0 = displayed.to_string();
        }
    }

    let size = engine.state().size;
    for mut node in bubbles.iter_mut() {
        node.width = Val::Px(size.x);
        node.height = Val::Px(size.y);
    }
}

/// Moves the bubble so its pivot sits over the current speaker.
#[allow(clippy::too_many_arguments)] // System function requires all arguments
pub fn follow_bubble_target(
    runtime: Res<DialogueRuntime>,
    engine: Res<BubbleLayoutEngine>,
    settings: Res<SpeechBubbleSettings>,
    registry: Res<AgentRegistry>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    npcs: Query<(Entity, &NpcId)>,
    anchors: Query<(&GlobalTransform, Option<&DialogueAnchor>)>,
    mut bubbles: Query<&mut Node, With<SpeechBubble>>,
) {
    let (Some(owner), Some(target)) = (runtime.bubble_owner(), runtime.follow_target()) else {
        return;
    };

    let Ok(window) = window_query.single() else {
        return; // No canvas to place the bubble on
    };

    let npc_entity = npcs
        .iter()
        .find(|(_, id)| **id == owner)
        .map(|(entity, _)| entity);
    let followed = match target {
        FollowTarget::Player => registry
            .first_tagged(&AgentTag::player())
            .filter(|player| anchors.contains(*player))
            .or(npc_entity),
        FollowTarget::Npc(_) => npc_entity,
    };
    let Some((transform, anchor)) = followed.and_then(|entity| anchors.get(entity).ok()) else {
        for mut node in bubbles.iter_mut() {
            node.display = Display::None;
        }
        return;
    };

    let world_point = anchor.copied().unwrap_or_default().world_point(transform)
        + Vec3::Y * settings.vertical_offset;
    let camera = camera_query.single().ok();

    for mut node in bubbles.iter_mut() {
        let Some(screen) = project_to_screen(camera, window.height(), world_point) else {
            node.display = Display::None; // Behind the camera
            continue;
        };

        let layout = engine.state();
        let anchor_point = screen + Vec2::new(0.0, layout.vertical_compensation);
        let mut origin = bubble_origin(anchor_point, layout.size, engine.config().pivot);
        if settings.clamp_to_canvas {
            origin = clamp_to_canvas(origin, layout.size, Vec2::new(window.width(), window.height()));
        }

        node.display = Display::Flex;
        node.left = Val::Px(origin.x);
        node.bottom = Val::Px(origin.y);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::transform::TransformPlugin;

    use super::*;
    use crate::core::CorePlugin;
    use crate::dialogue::{
        script::{DialogueScript, LineEntry},
        session::DialogueSession,
        DialogueConfig, DialoguePlugin,
    };
    use crate::interaction::InteractionPlugin;
    use crate::ui::speech_bubble::layout::{compute_layout, BubbleLayoutState};
    use crate::ui::speech_bubble::measure::GlyphGridMeasure;
    use crate::ui::speech_bubble::SpeechBubblePlugin;

    const NPC_POSITION: Vec3 = Vec3::new(200.0, 100.0, 0.0);
    const ANCHOR_OFFSET: Vec2 = Vec2::new(0.0, 40.0);

    fn bubble_app() -> App {
        let mut config = DialogueConfig::default();
        config.typewriter.enabled = false;
        config.telemetry.persist = false;

        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            TransformPlugin,
            CorePlugin::default(),
            DialoguePlugin::new(config),
            InteractionPlugin,
            SpeechBubblePlugin,
        ))
        .init_resource::<ButtonInput<KeyCode>>();
        app.world_mut().spawn((Window::default(), PrimaryWindow));

        let npc = NpcId::new(7);
        let script = DialogueScript::new("Ink Master", vec![LineEntry::npc("Hello there")])
            .expect("script has a line");
        app.world_mut().spawn((
            npc,
            Transform::from_translation(NPC_POSITION),
            DialogueAnchor::new(ANCHOR_OFFSET),
            DialogueSession::new(npc, Arc::new(script)),
        ));
        // Propagate the NPC's transform before anything follows it.
        app.update();
        app
    }

    fn with_session(app: &mut App, f: impl Fn(&mut DialogueSession, &mut DialogueRuntime)) {
        app.world_mut()
            .resource_scope(|world, mut runtime: Mut<DialogueRuntime>| {
                let mut sessions = world.query::<&mut DialogueSession>();
                for mut session in sessions.iter_mut(world) {
                    f(&mut *session, &mut *runtime);
                }
            });
    }

    fn bubble_node(app: &mut App) -> Node {
        let world = app.world_mut();
        let mut bubbles = world.query_filtered::<&Node, With<SpeechBubble>>();
        bubbles.single(world).expect("one speech bubble").clone()
    }

    fn px(value: Val) -> f32 {
        match value {
            Val::Px(px) => px,
            other => panic!("expected pixels, got {:?}", other),
        }
    }

    #[test]
    fn shown_line_sizes_and_places_the_bubble_over_the_speaker() {
        let mut app = bubble_app();
        assert_eq!(bubble_node(&mut app).display, Display::None);

        with_session(&mut app, |session, runtime| {
            assert!(session.start(runtime).is_applied());
        });
        app.update();

        let settings = *app.world().resource::<SpeechBubbleSettings>();
        let expected = compute_layout(
            &settings.layout,
            BubbleLayoutState::default(),
            "Hello there",
            &GlyphGridMeasure::new(settings.font_size),
        );
        assert_eq!(app.world().resource::<BubbleLayoutEngine>().state(), expected);

        let anchor = Vec2::new(
            NPC_POSITION.x + ANCHOR_OFFSET.x,
            NPC_POSITION.y + ANCHOR_OFFSET.y + settings.vertical_offset,
        ) + Vec2::new(0.0, expected.vertical_compensation);
        let origin = anchor - expected.size * settings.layout.pivot;

        let node = bubble_node(&mut app);
        assert_eq!(node.display, Display::Flex);
        assert!((px(node.width) - expected.size.x).abs() < 1e-3);
        assert!((px(node.height) - expected.size.y).abs() < 1e-3);
        assert!((px(node.left) - origin.x).abs() < 1e-3);
        assert!((px(node.bottom) - origin.y).abs() < 1e-3);

        let world = app.world_mut();
        let mut texts = world.query_filtered::<&Text, With<SpeechBubbleText>>();
        let text = texts.single(world).expect("bubble text");
        assert_eq!(text.0, "Hello there");
    }

    #[test]
    fn ending_the_session_hides_the_bubble_and_resets_layout() {
        let mut app = bubble_app();
        with_session(&mut app, |session, runtime| {
            assert!(session.start(runtime).is_applied());
        });
        app.update();
        assert_eq!(bubble_node(&mut app).display, Display::Flex);

        with_session(&mut app, |session, runtime| {
            assert!(session.end(runtime).is_applied());
        });
        app.update();

        assert_eq!(bubble_node(&mut app).display, Display::None);
        assert_eq!(
            app.world().resource::<BubbleLayoutEngine>().state(),
            BubbleLayoutState::default()
        );
    }
}
