//! Frame coalescing for high-frequency pointer moves.
//!
//! Pan, drag, resize, and box-select only need the latest pointer position
//! once per display frame. Moves are parked here ("latest wins") and the
//! engine drains them on `frame_tick`. Freehand drawing bypasses this.

use crate::input::Modifiers;
use sb_core::Point;

/// A parked pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingMove {
    pub position: Point,
    pub modifiers: Modifiers,
}

/// Holds at most one pending move.
#[derive(Debug, Clone, Default)]
pub struct FrameCoalescer {
    pending: Option<PendingMove>,
    /// Moves folded into the pending one since the last flush.
    coalesced: u32,
}

impl FrameCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a move, replacing any earlier one from the same frame.
    pub fn push(&mut self, position: Point, modifiers: Modifiers) {
        if self.pending.is_some() {
            self.coalesced += 1;
        }
        self.pending = Some(PendingMove {
            position,
            modifiers,
        });
    }

    /// Take the latest parked move, if any.
    pub fn flush(&mut self) -> Option<PendingMove> {
        if self.coalesced > 0 {
            log::trace!("coalesced {} pointer moves", self.coalesced);
        }
        self.coalesced = 0;
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop anything parked (gesture ended without a frame).
    pub fn clear(&mut self) {
        self.pending = None;
        self.coalesced = 0;
    }
}
