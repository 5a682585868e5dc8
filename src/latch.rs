//! Single-slot edge latch for interrupt-driven buttons.
//!
//! An interrupt handler signals edges into the latch and the device loop
//! takes at most one per tick. A newer edge replaces one that was not taken
//! yet. Interrupt safe via critical sections.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time::Instant;

use crate::input::{ButtonEdge, EdgeSource};

/// Latest pending button edge
pub struct EdgeLatch {
    slot: Mutex<Cell<Option<ButtonEdge>>>,
}

impl EdgeLatch {
    /// Create an empty latch.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Store an edge, replacing any edge not taken yet.
    pub fn signal(&self, edge: ButtonEdge) {
        critical_section::with(|cs| {
            self.slot.borrow(cs).set(Some(edge));
        });
    }

    /// Take the pending edge, leaving the latch empty.
    pub fn take(&self) -> Option<ButtonEdge> {
        critical_section::with(|cs| self.slot.borrow(cs).take())
    }

    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow(cs).get().is_some())
    }
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeSource for &EdgeLatch {
    fn next_edge(&mut self, _now: Instant) -> Option<ButtonEdge> {
        self.take()
    }
}
