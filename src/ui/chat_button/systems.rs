// src/ui/chat_button/systems.rs
//
// Systems spawning the chat button, forwarding clicks, and keeping it over the player.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::dialogue::config::InteractionSettings;
use crate::interaction::{
    coordinator::InteractionCoordinator,
    events::ChatPressed,
    registry::{AgentRegistry, AgentTag},
};
use crate::ui::speech_bubble::follow::{bubble_origin, project_to_screen};
use crate::world::components::MainCamera;

use super::components::ChatButton;

const BUTTON_COLOR: Color = Color::srgba(0.18, 0.18, 0.22, 0.95);
const BUTTON_PRESSED_COLOR: Color = Color::srgba(0.3, 0.3, 0.38, 0.95);
const BORDER_COLOR: Color = Color::srgb(0.4, 0.4, 0.45);
const LABEL: &str = "Chat";

pub fn spawn_chat_button(mut commands: Commands, settings: Res<InteractionSettings>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Px(settings.chat_button_size.x),
                height: Val::Px(settings.chat_button_size.y),
                border: UiRect::all(Val::Px(1.5)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                display: Display::None,
                ..Default::default()
            },
            Button,
            Interaction::None,
            BackgroundColor(BUTTON_COLOR),
            BorderColor::from(BORDER_COLOR),
            ZIndex(110),
            ChatButton,
            Name::new("Chat Button"),
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(LABEL),
                TextFont {
                    font_size: 15.0,
                    ..Default::default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

/// Clicking the button sends the same press as the keyboard binding.
#[allow(clippy::type_complexity)]
pub fn send_chat_press_from_button(
    mut buttons: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<ChatButton>),
    >,
    mut presses: MessageWriter<ChatPressed>,
) {
    for (interaction, mut background) in buttons.iter_mut() {
        match *interaction {
            Interaction::Pressed => {
                background.0 = BUTTON_PRESSED_COLOR;
                presses.write(ChatPressed);
            }
            Interaction::Hovered | Interaction::None => background.0 = BUTTON_COLOR,
        }
    }
}

/// Shows the button while an NPC is in range and keeps it over the player.
pub fn position_chat_button(
    coordinator: Res<InteractionCoordinator>,
    settings: Res<InteractionSettings>,
    registry: Res<AgentRegistry>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    transforms: Query<&GlobalTransform>,
    mut buttons: Query<&mut Node, With<ChatButton>>,
) {
    let placement = if coordinator.is_button_visible() {
        window_query.single().ok().and_then(|window| {
            let player = registry.first_tagged(&AgentTag::player())?;
            let transform = transforms.get(player).ok()?;
            let world = transform.translation() + settings.chat_button_offset.extend(0.0);
            let screen = project_to_screen(camera_query.single().ok(), window.height(), world)?;
            Some(bubble_origin(
                screen,
                settings.chat_button_size,
                Vec2::new(0.5, 0.0),
            ))
        })
    } else {
        None
    };

    for mut node in buttons.iter_mut() {
        match placement {
            Some(origin) => {
                node.display = Display::Flex;
                node.left = Val::Px(origin.x);
                node.bottom = Val::Px(origin.y);
            }
            None => node.display = Display::None,
        }
    }
}
