//! Character-by-character reveal of the current line.
use std::time::Duration;

use crate::core::scheduler::{DeferredHandle, DeferredQueue};

use super::runtime::DeferredAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterState {
    Running,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypewriterRunId(u64);

/// Reveal progress for one line. Counts chars, never splitting a UTF-8 sequence.
#[derive(Debug, Clone)]
pub struct TypewriterRun {
    id: TypewriterRunId,
    full_text: String,
    char_count: usize,
    revealed: usize,
    state: TypewriterState,
}

impl TypewriterRun {
    fn new(id: TypewriterRunId, full_text: String) -> Self {
        let char_count = full_text.chars().count();
        let state = if char_count == 0 {
            TypewriterState::Completed
        } else {
            TypewriterState::Running
        };
        Self {
            id,
            full_text,
            char_count,
            revealed: 0,
            state,
        }
    }

    fn revealed_at_once(id: TypewriterRunId, full_text: String) -> Self {
        let mut run = Self::new(id, full_text);
        run.revealed = run.char_count;
        run.state = TypewriterState::Completed;
        run
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn state(&self) -> TypewriterState {
        self.state
    }

    pub fn is_typing(&self) -> bool {
        self.state == TypewriterState::Running
    }

    pub fn visible_text(&self) -> &str {
        match self.full_text.char_indices().nth(self.revealed) {
            Some((byte_index, _)) => &self.full_text[..byte_index],
            None => &self.full_text,
        }
    }

    /// Reveals one more char. Returns false when nothing changed.
    fn reveal_next(&mut self) -> bool {
        if !self.is_typing() {
            return false;
        }
        self.revealed += 1;
        if self.revealed >= self.char_count {
            self.revealed = self.char_count;
            self.state = TypewriterState::Completed;
        }
        true
    }

    /// Jumps to the full text. The run passes through cancellation straight
    /// into `Completed`, so a skipped run is indistinguishable from one that
    /// finished on its own.
    fn skip(&mut self) -> bool {
        if !self.is_typing() {
            return false;
        }
        self.revealed = self.char_count;
        self.state = TypewriterState::Completed;
        true
    }

    fn cancel(&mut self) {
        if self.is_typing() {
            self.state = TypewriterState::Cancelled;
        }
    }
}

/// Single-flight scheduler: starting a run supersedes the previous one.
#[derive(Debug)]
pub struct Typewriter {
    seconds_per_char: Duration,
    enabled: bool,
    next_id: u64,
    current: Option<TypewriterRun>,
    pending_tick: Option<DeferredHandle>,
}

impl Typewriter {
    pub fn new(seconds_per_char: Duration, enabled: bool) -> Self {
        Self {
            seconds_per_char,
            enabled,
            next_id: 0,
            current: None,
            pending_tick: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn seconds_per_char(&self) -> Duration {
        self.seconds_per_char
    }

    pub fn current(&self) -> Option<&TypewriterRun> {
        self.current.as_ref()
    }

    pub fn is_typing(&self) -> bool {
        self.current.as_ref().is_some_and(TypewriterRun::is_typing)
    }

    pub fn visible_text(&self) -> &str {
        self.current
            .as_ref()
            .map(TypewriterRun::visible_text)
            .unwrap_or("")
    }

    /// Starts revealing `text`, cancelling any run in flight.
    pub fn start(
        &mut self,
        text: &str,
        queue: &mut DeferredQueue<DeferredAction>,
    ) -> TypewriterRunId {
        self.cancel(queue);

        let id = TypewriterRunId(self.next_id);
        self.next_id += 1;

        let run = if self.enabled {
            TypewriterRun::new(id, text.to_string())
        } else {
            TypewriterRun::revealed_at_once(id, text.to_string())
        };
        if run.is_typing() {
            self.pending_tick =
                Some(queue.schedule_in(self.seconds_per_char, DeferredAction::RevealNext { run: id }));
        }
        self.current = Some(run);
        id
    }

    /// Handles a due reveal tick. Stale ticks for superseded runs are ignored.
    /// Returns true when the visible text changed.
    pub fn on_tick(
        &mut self,
        run: TypewriterRunId,
        due: Duration,
        queue: &mut DeferredQueue<DeferredAction>,
    ) -> bool {
        let Some(current) = self.current.as_mut().filter(|current| current.id == run) else {
            return false;
        };

        self.pending_tick = None;
        let changed = current.reveal_next();
        if current.is_typing() {
            self.pending_tick = Some(queue.schedule_at(
                due + self.seconds_per_char,
                DeferredAction::RevealNext { run },
            ));
        }
        changed
    }

    /// Reveals the rest of the line. No-op unless a run is typing.
    pub fn skip(&mut self, queue: &mut DeferredQueue<DeferredAction>) -> bool {
        let Some(current) = self.current.as_mut() else {
            return false;
        };
        if !current.skip() {
            return false;
        }
        if let Some(handle) = self.pending_tick.take() {
            queue.cancel(handle);
        }
        true
    }

    /// Stops the current run where it is and forgets it.
    pub fn cancel(&mut self, queue: &mut DeferredQueue<DeferredAction>) {
        if let Some(handle) = self.pending_tick.take() {
            queue.cancel(handle);
        }
        if let Some(mut run) = self.current.take() {
            run.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEED: Duration = Duration::from_millis(50);

    fn drive(
        typewriter: &mut Typewriter,
        queue: &mut DeferredQueue<DeferredAction>,
        elapsed: Duration,
    ) {
        queue.advance_by(elapsed);
        while let Some((due, action)) = queue.pop_due() {
            if let DeferredAction::RevealNext { run } = action {
                typewriter.on_tick(run, due, queue);
            }
        }
    }

    #[test]
    fn reveals_one_char_per_interval() {
        let mut queue = DeferredQueue::default();
        let mut typewriter = Typewriter::new(SPEED, true);
        typewriter.start("0123456789", &mut queue);

        drive(&mut typewriter, &mut queue, Duration::from_millis(250));

        let run = typewriter.current().expect("run in flight");
        assert_eq!(run.revealed(), 5);
        assert_eq!(typewriter.visible_text(), "01234");
        assert!(typewriter.is_typing());

        assert!(typewriter.skip(&mut queue));
        let run = typewriter.current().expect("run kept after skip");
        assert_eq!(run.revealed(), 10);
        assert_eq!(run.state(), TypewriterState::Completed);
        assert!(!typewriter.is_typing());
        assert!(queue.is_empty());

        assert!(!typewriter.skip(&mut queue));
        assert_eq!(typewriter.current().map(TypewriterRun::revealed), Some(10));
    }

    #[test]
    fn completes_after_full_length() {
        let mut queue = DeferredQueue::default();
        let mut typewriter = Typewriter::new(SPEED, true);
        typewriter.start("hey", &mut queue);

        drive(&mut typewriter, &mut queue, Duration::from_secs(1));

        let run = typewriter.current().expect("run kept after completion");
        assert_eq!(run.state(), TypewriterState::Completed);
        assert_eq!(typewriter.visible_text(), "hey");
        assert!(queue.is_empty());
    }

    #[test]
    fn new_run_supersedes_the_old_one() {
        let mut queue = DeferredQueue::default();
        let mut typewriter = Typewriter::new(SPEED, true);
        let first = typewriter.start("first line", &mut queue);
        drive(&mut typewriter, &mut queue, Duration::from_millis(100));

        let second = typewriter.start("second", &mut queue);
        assert_ne!(first, second);
        assert_eq!(queue.len(), 1);

        assert!(!typewriter.on_tick(first, queue.now(), &mut queue));
        drive(&mut typewriter, &mut queue, Duration::from_millis(50));
        assert_eq!(typewriter.visible_text(), "s");
    }

    #[test]
    fn disabled_typewriter_reveals_immediately() {
        let mut queue = DeferredQueue::default();
        let mut typewriter = Typewriter::new(SPEED, false);
        typewriter.start("instant", &mut queue);

        assert_eq!(typewriter.visible_text(), "instant");
        assert!(!typewriter.is_typing());
        assert!(queue.is_empty());
    }

    #[test]
    fn multibyte_text_reveals_whole_chars() {
        let mut queue = DeferredQueue::default();
        let mut typewriter = Typewriter::new(SPEED, true);
        typewriter.start("你好！", &mut queue);

        drive(&mut typewriter, &mut queue, Duration::from_millis(100));
        assert_eq!(typewriter.visible_text(), "你好");
    }
}
