//! Pulse width classification.
//!
//! The receiver output is high for 100 ms (a 0) or 200 ms (a 1) at the start of every second.
//! The 59th second carries no pulse, so the pause before second 0 of the next minute is about
//! 1.8 s or 1.9 s long.

use crate::config::{Config, Window};
use crate::edge::{elapsed, Edge, EdgeEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bit {
    Zero,
    One,
}

/// What a single edge means once the time since the previous edge is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pulse {
    /// A pulse begins after a pause as long as the missing 59th second: second 0 starts here.
    SyncGap { pause_ms: u32 },
    /// A pulse begins after an ordinary pause.
    PulseStart,
    Bit { bit: Bit, width_ms: u32 },
    /// A pulse ended but its width fits neither bit.
    Noise { width_ms: u32 },
    /// Two edges of the same direction in a row, the edge in between was lost.
    MissedEdge(Edge),
    /// A falling edge before any rising edge has been seen.
    Unmatched,
}

pub struct PulseClassifier {
    zero: Window,
    one: Window,
    sync: Window,
    prev_edge: Option<Edge>,
    // Start of the current pulse, which is also the end of the last pause.
    pulse_start: Option<u32>,
    // End of the last pulse, which is also the start of the current pause.
    pulse_end: Option<u32>,
}

impl PulseClassifier {
    pub fn new(config: &Config) -> Self {
        Self {
            zero: config.zero_window(),
            one: config.one_window(),
            sync: config.sync_window(),
            prev_edge: None,
            pulse_start: None,
            pulse_end: None,
        }
    }

    pub fn classify(&mut self, event: EdgeEvent) -> Pulse {
        let repeated = self.prev_edge == Some(event.edge);
        self.prev_edge = Some(event.edge);

        match event.edge {
            Edge::Rising => {
                self.pulse_start = Some(event.at_ms);
                if repeated {
                    return Pulse::MissedEdge(Edge::Rising);
                }
                match self.pulse_end {
                    Some(end) => {
                        let pause_ms = elapsed(end, event.at_ms);
                        if self.is_sync_gap(pause_ms) {
                            Pulse::SyncGap { pause_ms }
                        } else {
                            Pulse::PulseStart
                        }
                    }
                    None => Pulse::PulseStart,
                }
            }
            Edge::Falling => {
                self.pulse_end = Some(event.at_ms);
                if repeated {
                    return Pulse::MissedEdge(Edge::Falling);
                }
                let start = match self.pulse_start {
                    Some(start) => start,
                    None => return Pulse::Unmatched,
                };
                let width_ms = elapsed(start, event.at_ms);
                match self.bit_for(width_ms) {
                    Some(bit) => Pulse::Bit { bit, width_ms },
                    None => Pulse::Noise { width_ms },
                }
            }
        }
    }

    /// Maps a pulse width to a bit. The windows are disjoint, so at most one matches.
    pub fn bit_for(&self, width_ms: u32) -> Option<Bit> {
        if self.zero.contains(width_ms) {
            Some(Bit::Zero)
        } else if self.one.contains(width_ms) {
            Some(Bit::One)
        } else {
            None
        }
    }

    pub fn is_sync_gap(&self, pause_ms: u32) -> bool {
        self.sync.contains(pause_ms)
    }
}
