//! Bounded mutation history with undo/redo (§4.B).

use std::collections::VecDeque;

use mailqual_model::{BlocklistEvent, BlocklistOperation};

use crate::error::{BlocklistError, Result};

const DEFAULT_CAPACITY: usize = 100;

/// A LIFO undo stack plus a FIFO redo queue, both bounded. Pushing a new
/// event clears the redo queue (standard editor semantics).
#[derive(Debug, Default)]
pub struct History {
    capacity: usize,
    undo_stack: VecDeque<BlocklistEvent>,
    redo_stack: VecDeque<BlocklistEvent>,
}

impl History {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::new()
        }
    }

    pub fn push(&mut self, event: BlocklistEvent) {
        if self.undo_stack.len() == self.capacity {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(event);
        self.redo_stack.clear();
    }

    pub fn undo_last(&mut self) -> Result<BlocklistEvent> {
        let event = self
            .undo_stack
            .pop_back()
            .ok_or(BlocklistError::HistoryEmpty)?;
        if self.redo_stack.len() == self.capacity {
            self.redo_stack.pop_front();
        }
        self.redo_stack.push_back(event.clone());
        Ok(event)
    }

    pub fn redo_last(&mut self) -> Result<BlocklistEvent> {
        let event = self
            .redo_stack
            .pop_front()
            .ok_or(BlocklistError::HistoryEmpty)?;
        self.undo_stack.push_back(event.clone());
        Ok(event)
    }

    pub fn events(&self) -> impl Iterator<Item = &BlocklistEvent> {
        self.undo_stack.iter()
    }
}

/// The inverse operation for a history event, used by `undo_last` to
/// determine what mutation to apply to the snapshot.
pub fn inverse(operation: BlocklistOperation) -> BlocklistOperation {
    match operation {
        BlocklistOperation::AddEmail => BlocklistOperation::RemoveEmail,
        BlocklistOperation::AddDomain => BlocklistOperation::RemoveDomain,
        BlocklistOperation::RemoveEmail => BlocklistOperation::AddEmail,
        BlocklistOperation::RemoveDomain => BlocklistOperation::AddDomain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(target: &str) -> BlocklistEvent {
        BlocklistEvent {
            timestamp: Utc::now(),
            operation: BlocklistOperation::AddEmail,
            target: target.to_string(),
            note: None,
            before_count: 0,
            after_count: 1,
        }
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut h = History::new();
        h.push(event("a@example.com"));
        let undone = h.undo_last().unwrap();
        assert_eq!(undone.target, "a@example.com");
        let redone = h.redo_last().unwrap();
        assert_eq!(redone.target, "a@example.com");
    }

    #[test]
    fn redo_is_fifo_not_lifo() {
        let mut h = History::new();
        h.push(event("a@example.com"));
        h.push(event("b@example.com"));
        h.undo_last().unwrap(); // undoes b, redo_stack = [b]
        h.undo_last().unwrap(); // undoes a, redo_stack = [b, a]
        let first = h.redo_last().unwrap();
        assert_eq!(first.target, "b@example.com");
        let second = h.redo_last().unwrap();
        assert_eq!(second.target, "a@example.com");
    }

    #[test]
    fn undo_on_empty_history_errors() {
        let mut h = History::new();
        assert!(matches!(h.undo_last(), Err(BlocklistError::HistoryEmpty)));
    }

    #[test]
    fn capacity_is_bounded() {
        let mut h = History::with_capacity(2);
        h.push(event("a@example.com"));
        h.push(event("b@example.com"));
        h.push(event("c@example.com"));
        assert_eq!(h.events().count(), 2);
    }

    #[test]
    fn new_push_clears_redo_stack() {
        let mut h = History::new();
        h.push(event("a@example.com"));
        h.undo_last().unwrap();
        h.push(event("b@example.com"));
        assert!(matches!(h.redo_last(), Err(BlocklistError::HistoryEmpty)));
    }
}
