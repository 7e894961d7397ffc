//! Cooperative deferred-action queue polled once per frame.
//!
//! Entries are ordered by due time (ties resolve in scheduling order) and can
//! be cancelled in constant time through the handle returned on scheduling.
//! Cancelled entries stay in the heap and are skipped when they surface.
use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    time::Duration,
};

/// Handle identifying a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeferredHandle(u64);

#[derive(Debug)]
pub struct DeferredQueue<T> {
    now: Duration,
    next_handle: u64,
    order: BinaryHeap<Reverse<(Duration, u64)>>,
    entries: HashMap<u64, T>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            order: BinaryHeap::new(),
            entries: HashMap::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the queue's notion of "now" forward by one frame.
    pub fn advance_by(&mut self, delta: Duration) {
        self.now += delta;
    }

    pub fn schedule_in(&mut self, delay: Duration, action: T) -> DeferredHandle {
        self.schedule_at(self.now + delay, action)
    }

    /// Schedules at an absolute time. A due time in the past fires on the next poll.
    pub fn schedule_at(&mut self, due: Duration, action: T) -> DeferredHandle {
        let id = self.next_handle;
        self.next_handle += 1;
        self.order.push(Reverse((due, id)));
        self.entries.insert(id, action);
        DeferredHandle(id)
    }

    /// Returns true when the entry was still pending.
    pub fn cancel(&mut self, handle: DeferredHandle) -> bool {
        self.entries.remove(&handle.0).is_some()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_pending(&self, handle: DeferredHandle) -> bool {
        self.entries.contains_key(&handle.0)
    }

    /// Pops the earliest entry whose due time has been reached, with that due time.
    ///
    /// Entries scheduled from inside the drain loop at or before `now` are
    /// returned by the same drain, which lets fixed-interval work catch up
    /// after a long frame.
    pub fn pop_due(&mut self) -> Option<(Duration, T)> {
        while let Some(Reverse((due, id))) = self.order.peek().copied() {
            if due > self.now {
                return None;
            }
            self.order.pop();
            if let Some(action) = self.entries.remove(&id) {
                return Some((due, action));
            }
        }
        None
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
