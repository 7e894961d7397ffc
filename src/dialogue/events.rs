//! Messages mirrored out of the dialogue event hub for ECS consumers.
use bevy::prelude::*;

use super::hub::DialogueNotice;

/// A session notice, written once per notice after every hub subscriber ran.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct DialogueNoticeEvent {
    pub notice: DialogueNotice,
}
