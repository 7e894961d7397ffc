//! Dialogue event hub: explicit subscription channels for session notices.
//!
//! Notices are delivered to global subscribers first, then to the subscribers
//! of the NPC the notice concerns, each in subscription order. Every handler
//! runs in isolation: an `Err` or a panic is logged and counted, and delivery
//! continues with the next handler.
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use bevy::log::{debug, warn};
use serde::Serialize;

use crate::npc::components::NpcId;

use super::{
    errors::HookError,
    script::{HookId, Speaker},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum DialogueNotice {
    SessionStarted {
        npc: NpcId,
    },
    LineShown {
        npc: NpcId,
        line_index: usize,
        text: String,
        speaker: Speaker,
    },
    SessionEnded {
        npc: NpcId,
        line_index: usize,
        forced: bool,
    },
}

impl DialogueNotice {
    pub fn npc(&self) -> NpcId {
        match self {
            Self::SessionStarted { npc }
            | Self::LineShown { npc, .. }
            | Self::SessionEnded { npc, .. } => *npc,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session-start",
            Self::LineShown { .. } => "line-shown",
            Self::SessionEnded { .. } => "session-end",
        }
    }
}

/// Arguments passed to a named hook (a line's `on_shown` or a script's completion hook).
#[derive(Debug, Clone, PartialEq)]
pub struct HookContext {
    pub hook: HookId,
    pub npc: NpcId,
    pub line_index: Option<usize>,
}

pub type NoticeHandler = Box<dyn FnMut(&DialogueNotice) -> Result<(), HookError> + Send + Sync>;
pub type HookHandler = Box<dyn FnMut(&HookContext) -> Result<(), HookError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<H> {
    id: SubscriptionId,
    handler: H,
}

#[derive(Default)]
pub struct DialogueEventHub {
    next_id: u64,
    global: Vec<Subscriber<NoticeHandler>>,
    per_npc: HashMap<NpcId, Vec<Subscriber<NoticeHandler>>>,
    hooks: HashMap<HookId, Vec<Subscriber<HookHandler>>>,
    outbox: Vec<DialogueNotice>,
    failures: u64,
}

impl fmt::Debug for DialogueEventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogueEventHub")
            .field("global", &self.global.len())
            .field("per_npc", &self.per_npc.len())
            .field("hooks", &self.hooks.len())
            .field("outbox", &self.outbox.len())
            .field("failures", &self.failures)
            .finish()
    }
}

impl DialogueEventHub {
    pub fn subscribe_global<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&DialogueNotice) -> Result<(), HookError> + Send + Sync + 'static,
    {
        let id = self.issue_id();
        self.global.push(Subscriber {
            id,
            handler: Box::new(handler),
        });
        id
    }

    pub fn subscribe_npc<F>(&mut self, npc: NpcId, handler: F) -> SubscriptionId
    where
        F: FnMut(&DialogueNotice) -> Result<(), HookError> + Send + Sync + 'static,
    {
        let id = self.issue_id();
        self.per_npc.entry(npc).or_default().push(Subscriber {
            id,
            handler: Box::new(handler),
        });
        id
    }

    pub fn register_hook<F>(&mut self, hook: HookId, handler: F) -> SubscriptionId
    where
        F: FnMut(&HookContext) -> Result<(), HookError> + Send + Sync + 'static,
    {
        let id = self.issue_id();
        self.hooks.entry(hook).or_default().push(Subscriber {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription from whichever channel holds it.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriber_count();
        self.global.retain(|sub| sub.id != id);
        for subscribers in self.per_npc.values_mut() {
            subscribers.retain(|sub| sub.id != id);
        }
        for subscribers in self.hooks.values_mut() {
            subscribers.retain(|sub| sub.id != id);
        }
        self.subscriber_count() < before
    }

    /// Delivers a notice on the global channel, then on the NPC's own channel.
    pub fn publish(&mut self, notice: DialogueNotice) {
        debug!(target: "dialogue", "{} for {}", notice.label(), notice.npc());

        let mut failures = 0;
        for subscriber in self.global.iter_mut() {
            failures += deliver(&mut subscriber.handler, &notice, "global");
        }
        if let Some(subscribers) = self.per_npc.get_mut(&notice.npc()) {
            for subscriber in subscribers.iter_mut() {
                failures += deliver(&mut subscriber.handler, &notice, "npc");
            }
        }
        self.failures += failures;
        self.outbox.push(notice);
    }

    /// Invokes every handler registered under the context's hook name.
    pub fn fire_hook(&mut self, context: HookContext) {
        let Some(handlers) = self.hooks.get_mut(&context.hook) else {
            debug!(target: "dialogue", "No handler registered for hook '{}'", context.hook);
            return;
        };

        let mut failures = 0;
        for subscriber in handlers.iter_mut() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| (subscriber.handler)(&context)))
                .unwrap_or_else(|payload| Err(HookError::panicked(panic_message(&*payload))));
            if let Err(err) = result {
                warn!(target: "dialogue", "Hook '{}' for {}: {}", context.hook, context.npc, err);
                failures += 1;
            }
        }
        self.failures += failures;
    }

    /// Takes every notice published since the last drain, for mirroring into ECS messages.
    pub fn drain_outbox(&mut self) -> Vec<DialogueNotice> {
        std::mem::take(&mut self.outbox)
    }

    /// Number of handlers registered across all hook names.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn hook_count(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    /// Number of handler invocations that failed or panicked.
    pub fn failure_count(&self) -> u64 {
        self.failures
    }

    fn issue_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    fn subscriber_count(&self) -> usize {
        self.global.len()
            + self.per_npc.values().map(Vec::len).sum::<usize>()
            + self.hooks.values().map(Vec::len).sum::<usize>()
    }
}

fn deliver(handler: &mut NoticeHandler, notice: &DialogueNotice, channel: &str) -> u64 {
    let result = panic::catch_unwind(AssertUnwindSafe(|| handler(notice)))
        .unwrap_or_else(|payload| Err(HookError::panicked(panic_message(&*payload))));
    match result {
        Ok(()) => 0,
        Err(err) => {
            warn!(
                target: "dialogue",
                "{} subscriber on {} channel for {}: {}",
                notice.label(),
                channel,
                notice.npc(),
                err
            );
            1
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn started(npc: u64) -> DialogueNotice {
        DialogueNotice::SessionStarted {
            npc: NpcId::new(npc),
        }
    }

    #[test]
    fn delivers_global_then_npc_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hub = DialogueEventHub::default();

        let sink = log.clone();
        hub.subscribe_npc(NpcId::new(1), move |_| {
            sink.lock().unwrap().push("npc-1");
            Ok(())
        });
        let sink = log.clone();
        hub.subscribe_global(move |_| {
            sink.lock().unwrap().push("global-a");
            Ok(())
        });
        let sink = log.clone();
        hub.subscribe_global(move |_| {
            sink.lock().unwrap().push("global-b");
            Ok(())
        });
        let sink = log.clone();
        hub.subscribe_npc(NpcId::new(2), move |_| {
            sink.lock().unwrap().push("npc-2");
            Ok(())
        });

        hub.publish(started(1));

        assert_eq!(*log.lock().unwrap(), vec!["global-a", "global-b", "npc-1"]);
        assert_eq!(hub.drain_outbox(), vec![started(1)]);
        assert!(hub.drain_outbox().is_empty());
    }

    #[test]
    fn failing_and_panicking_subscribers_do_not_block_others() {
        let delivered = Arc::new(Mutex::new(0));
        let mut hub = DialogueEventHub::default();

        hub.subscribe_global(|_| Err(HookError::failed("nope")));
        hub.subscribe_global(|_| panic!("subscriber exploded"));
        let counter = delivered.clone();
        hub.subscribe_global(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        hub.publish(started(3));
        hub.publish(started(3));

        assert_eq!(*delivered.lock().unwrap(), 2);
        assert_eq!(hub.failure_count(), 4);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let delivered = Arc::new(Mutex::new(0));
        let mut hub = DialogueEventHub::default();
        let counter = delivered.clone();
        let id = hub.subscribe_npc(NpcId::new(4), move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        hub.publish(started(4));
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.publish(started(4));

        assert_eq!(*delivered.lock().unwrap(), 1);
    }

    #[test]
    fn hooks_fire_by_name() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hub = DialogueEventHub::default();
        let sink = seen.clone();
        hub.register_hook(HookId::new("give_brush"), move |ctx| {
            sink.lock().unwrap().push(ctx.line_index);
            Ok(())
        });

        hub.fire_hook(HookContext {
            hook: HookId::new("give_brush"),
            npc: NpcId::new(0),
            line_index: Some(2),
        });
        hub.fire_hook(HookContext {
            hook: HookId::new("unregistered"),
            npc: NpcId::new(0),
            line_index: None,
        });

        assert_eq!(*seen.lock().unwrap(), vec![Some(2)]);
        assert_eq!(hub.failure_count(), 0);
    }
}
