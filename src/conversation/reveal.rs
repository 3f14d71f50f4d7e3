//! Character-by-character reveal of a reply that has already arrived.

use crate::conversation::entry::EntryId;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Progress of one reveal: the full target text and how much of it is showing.
///
/// Offsets count Unicode scalar values, so a reply never shows half a character.
#[derive(Debug, Clone)]
pub struct RevealState {
    entry_id: EntryId,
    target: Vec<char>,
    offset: usize,
    revealed: String,
}

impl RevealState {
    pub fn new(entry_id: EntryId, target: &str) -> Self {
        Self {
            entry_id,
            target: target.chars().collect(),
            offset: 0,
            revealed: String::with_capacity(target.len()),
        }
    }

    /// Entry currently receiving the text
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    pub(crate) fn retarget(&mut self, entry_id: EntryId) {
        self.entry_id = entry_id;
    }

    /// Show one more character; `None` once everything is showing
    pub fn advance(&mut self) -> Option<char> {
        let next = *self.target.get(self.offset)?;
        self.offset += 1;
        self.revealed.push(next);
        Some(next)
    }

    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    /// The complete target text
    pub fn target(&self) -> String {
        self.target.iter().collect()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.offset >= self.target.len()
    }
}

/// Result of a single timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Finished,
}

/// Handle to a running reveal timer.
///
/// The timer calls its tick closure once per period, starting one period after spawn,
/// until the closure reports [`TickOutcome::Finished`] or the handle is cancelled.
#[derive(Debug)]
pub struct RevealHandle {
    task: JoinHandle<()>,
}

impl RevealHandle {
    /// Spawn a ticking task on the current tokio runtime.
    ///
    /// A zero period is raised to one millisecond.
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> TickOutcome + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tick() == TickOutcome::Finished {
                    break;
                }
            }
        });

        Self { task }
    }

    /// Abort the timer task
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
