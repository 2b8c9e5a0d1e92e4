//! Single-slot direction mailbox shared by keyboard and gesture input.
//!
//! Writers overwrite the slot, the tick reads it once. Intents submitted
//! between two ticks coalesce to the last one.

use super::action::Direction;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionBuffer {
    pending: Option<Direction>,
}

impl DirectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an intent unless it reverses the committed direction.
    ///
    /// Returns whether the intent was stored.
    pub fn submit(&mut self, intent: Direction, committed: Direction) -> bool {
        if committed.is_opposite(intent) {
            return false;
        }
        self.pending = Some(intent);
        true
    }

    /// Read and clear the slot
    pub fn take(&mut self) -> Option<Direction> {
        self.pending.take()
    }

    #[cfg(test)]
    pub fn peek(&self) -> Option<Direction> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
