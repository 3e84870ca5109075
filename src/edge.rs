//! Edge capture shared between the pin interrupt and the main loop.
//!
//! The mailbox holds at most one edge. The interrupt is the only writer of a pending edge and
//! the main loop is the only one clearing it, so a single atomic word is all the locking needed.
//! An edge the main loop has not picked up yet is overwritten by the next one.

use core::convert::Infallible;
use core::sync::atomic::{AtomicU32, Ordering};

const PENDING: u32 = 1 << 31;
const RISING: u32 = 1 << 30;

/// Timestamps are kept modulo 2^30 ms, a bit over 12 days.
pub const TIMESTAMP_MASK: u32 = RISING - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Pulse begins, pause ends.
    Rising,
    /// Pulse ends, pause begins.
    Falling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeEvent {
    pub edge: Edge,
    /// Milliseconds, masked with [`TIMESTAMP_MASK`].
    pub at_ms: u32,
}

impl EdgeEvent {
    pub fn new(edge: Edge, at_ms: u32) -> Self {
        Self {
            edge,
            at_ms: at_ms & TIMESTAMP_MASK,
        }
    }
}

pub struct EdgeMailbox {
    slot: AtomicU32,
}

impl EdgeMailbox {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU32::new(0),
        }
    }

    /// Records an edge. Meant to be called from the pin interrupt: one store, no branches on
    /// shared state.
    pub fn post(&self, edge: Edge, now_ms: u32) {
        let direction = match edge {
            Edge::Rising => RISING,
            Edge::Falling => 0,
        };
        self.slot
            .store(PENDING | direction | (now_ms & TIMESTAMP_MASK), Ordering::Release);
    }

    /// Takes the pending edge, or `WouldBlock` if there is none.
    pub fn take(&self) -> nb::Result<EdgeEvent, Infallible> {
        let word = self.slot.swap(0, Ordering::Acquire);
        if word & PENDING == 0 {
            return Err(nb::Error::WouldBlock);
        }

        let edge = if word & RISING != 0 {
            Edge::Rising
        } else {
            Edge::Falling
        };
        Ok(EdgeEvent {
            edge,
            at_ms: word & TIMESTAMP_MASK,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) & PENDING != 0
    }
}

impl Default for EdgeMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction of the edge after which the input reads high (`true`) or low.
pub fn edge_for_level(high: bool) -> Edge {
    if high {
        Edge::Rising
    } else {
        Edge::Falling
    }
}

/// Milliseconds from `from` to `to`, both masked timestamps. Handles the counter wrapping.
pub fn elapsed(from: u32, to: u32) -> u32 {
    to.wrapping_sub(from) & TIMESTAMP_MASK
}
