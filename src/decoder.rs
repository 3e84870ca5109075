//! The decoder instance: classifies edges, fills the frame and decodes it at every minute
//! boundary.
use core::convert::Infallible;

use embedded_hal::digital::v2::ToggleableOutputPin;

use crate::classifier::{Bit, Pulse, PulseClassifier};
use crate::config::Config;
use crate::dcf77;
use crate::edge::{EdgeEvent, EdgeMailbox};
use crate::error::{ConfigError, Dcf77Error};
use crate::frame::Frame;
use crate::sync::{SyncState, SyncTracker};
use crate::time::DateTime;

/// The outcome of processing one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A pulse began inside a minute.
    PulseStart,
    /// A pulse ended while the second numbering is unknown; nothing was recorded.
    Unsynchronized,
    Bit { second: u8, bit: Bit },
    /// A pulse of unusable width. Its slot stays unset.
    Noise { second: u8, width_ms: u32 },
    /// An edge was lost. The pulse it belonged to counts as noise.
    MissedEdge { second: Option<u8> },
    /// A pulse arrived after all 59 slots were filled: the sync gap was missed.
    Overrun,
    /// The first sync gap after power up or after losing lock. No frame was collected yet.
    Synchronized,
    /// A minute boundary closed the frame collected since the previous one.
    Minute(Result<DateTime, Dcf77Error>),
}

impl Event {
    /// The character echoed for this event in the live bit stream.
    pub fn symbol(&self) -> Option<char> {
        match self {
            Event::Bit { bit: Bit::Zero, .. } => Some('0'),
            Event::Bit { bit: Bit::One, .. } => Some('1'),
            Event::Unsynchronized => Some('*'),
            Event::Noise { .. } | Event::MissedEdge { .. } | Event::Overrun => Some('?'),
            _ => None,
        }
    }

    pub fn is_minute_boundary(&self) -> bool {
        matches!(self, Event::Synchronized | Event::Minute(_))
    }
}

/// An indicator for boards without an LED.
pub struct NoIndicator;

impl ToggleableOutputPin for NoIndicator {
    type Error = Infallible;

    fn toggle(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct Dcf77<P> {
    config: Config,
    classifier: PulseClassifier,
    sync: SyncTracker,
    frame: Frame,
    last_frame: Frame,
    // Set when pulses arrived with no slot left; the frame can't be trusted.
    overrun: bool,
    time: Option<DateTime>,
    indicator: P,
}

impl<P: ToggleableOutputPin> Dcf77<P> {
    pub fn new(config: Config, indicator: P) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: PulseClassifier::new(&config),
            sync: SyncTracker::new(config.max_rejected_minutes),
            frame: Frame::new(),
            last_frame: Frame::new(),
            overrun: false,
            time: None,
            indicator,
            config,
        })
    }

    /// Processes the pending edge, if any. Never blocks.
    pub fn poll(&mut self, mailbox: &EdgeMailbox) -> Option<Event> {
        match mailbox.take() {
            Ok(edge) => Some(self.process(edge)),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(never)) => match never {},
        }
    }

    pub fn process(&mut self, edge: EdgeEvent) -> Event {
        match self.classifier.classify(edge) {
            Pulse::SyncGap { .. } => self.finish_minute(),
            Pulse::PulseStart => Event::PulseStart,
            Pulse::MissedEdge(_) if self.sync.is_synchronized() => match self.next_slot() {
                Some(slot) => Event::MissedEdge {
                    second: Some(slot as u8),
                },
                None => Event::Overrun,
            },
            Pulse::MissedEdge(_) => Event::MissedEdge { second: None },
            Pulse::Unmatched => Event::Unsynchronized,
            Pulse::Bit { .. } | Pulse::Noise { .. } if !self.sync.is_synchronized() => {
                Event::Unsynchronized
            }
            Pulse::Bit { bit, .. } => match self.next_slot() {
                Some(slot) => {
                    self.frame.set(slot, bit);
                    Event::Bit {
                        second: slot as u8,
                        bit,
                    }
                }
                None => Event::Overrun,
            },
            Pulse::Noise { width_ms } => match self.next_slot() {
                Some(slot) => Event::Noise {
                    second: slot as u8,
                    width_ms,
                },
                None => Event::Overrun,
            },
        }
    }

    // Counts a finished pulse while synchronized.
    fn next_slot(&mut self) -> Option<usize> {
        self.indicator.toggle().ok();
        let slot = self.sync.advance();
        match slot {
            Some(second) => {
                if let Some(time) = self.time.as_mut() {
                    time.second = second as u8;
                }
            }
            None => self.overrun = true,
        }
        slot
    }

    fn finish_minute(&mut self) -> Event {
        let event = match self.sync.acquire() {
            SyncState::Unsynchronized => Event::Synchronized,
            SyncState::Synchronized => {
                let result = if self.overrun {
                    Err(Dcf77Error::MissedSyncGap)
                } else {
                    dcf77::decode(&self.frame)
                };
                match result {
                    Ok(time) => {
                        self.sync.frame_accepted();
                        self.time = Some(time);
                    }
                    Err(_) => {
                        self.time = None;
                        self.sync.frame_rejected();
                    }
                }
                Event::Minute(result)
            }
        };

        self.last_frame = self.frame;
        self.frame.reset();
        self.overrun = false;
        event
    }

    /// The last decoded time, its seconds following the pulses received since. `None` until
    /// the first valid minute and after a rejected one.
    pub fn time(&self) -> Option<DateTime> {
        self.time
    }

    /// True while [`time`](Self::time) holds a decoded minute. Whether the frame closed by the
    /// last boundary had all of its slots is `last_frame().is_complete()`.
    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    pub fn is_synchronized(&self) -> bool {
        self.sync.is_synchronized()
    }

    /// Second of the minute the next pulse belongs to.
    pub fn second(&self) -> u8 {
        self.sync.second()
    }

    /// The frame being collected.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The frame closed by the last minute boundary.
    pub fn last_frame(&self) -> &Frame {
        &self.last_frame
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.config.verbose
    }

    pub fn release(self) -> P {
        self.indicator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_LEN;
    use crate::edge::Edge;
    use crate::error::ParityGroup;
    use crate::time::Dst;

    const REFERENCE: &str = "01001101001001000010110011100100100010100001111000011010001";

    #[derive(Default)]
    struct Led {
        toggles: u32,
    }

    impl ToggleableOutputPin for Led {
        type Error = Infallible;

        fn toggle(&mut self) -> Result<(), Self::Error> {
            self.toggles += 1;
            Ok(())
        }
    }

    /// Feeds edges with explicit timestamps.
    struct Signal<P> {
        decoder: Dcf77<P>,
        now: u32,
    }

    impl<P: ToggleableOutputPin> Signal<P> {
        fn new(decoder: Dcf77<P>) -> Self {
            Self { decoder, now: 0 }
        }

        fn edge(&mut self, edge: Edge, after_ms: u32) -> Event {
            self.now += after_ms;
            self.decoder.process(EdgeEvent::new(edge, self.now))
        }

        /// Ends a pulse and waits through the gap, returning the event of the rising edge that
        /// starts second 0.
        fn sync_gap(&mut self) -> Event {
            self.edge(Edge::Falling, 100);
            self.edge(Edge::Rising, 1850)
        }

        /// Sends the pulses of seconds 0..=58 and the gap after them. Assumes the rising edge
        /// of second 0 was just sent.
        fn minute(&mut self, bits: &str) -> Event {
            let mut events = self.minute_losing(bits, &[]);
            events.pop().unwrap()
        }

        /// Like `minute`, but the `(second, edge)` pairs in `lost` never reach the decoder.
        /// Returns the events of every edge sent, ending with the rising edge after the gap.
        fn minute_losing(&mut self, bits: &str, lost: &[(usize, Edge)]) -> Vec<Event> {
            let mut events = Vec::new();
            let mut rising_at = self.now;
            for (second, c) in bits.chars().enumerate() {
                let width = if c == '1' { 200 } else { 100 };
                if second > 0 && !lost.contains(&(second, Edge::Rising)) {
                    let edge = EdgeEvent::new(Edge::Rising, rising_at);
                    events.push(self.decoder.process(edge));
                }
                if !lost.contains(&(second, Edge::Falling)) {
                    let edge = EdgeEvent::new(Edge::Falling, rising_at + width);
                    events.push(self.decoder.process(edge));
                }
                rising_at += 1000;
            }
            self.now = rising_at + 1000;
            events.push(self.decoder.process(EdgeEvent::new(Edge::Rising, self.now)));
            events
        }
    }

    fn decoder() -> Dcf77<Led> {
        Dcf77::new(Config::default(), Led::default()).unwrap()
    }

    #[test]
    fn rejects_bad_config() {
        let config = Config {
            jitter_ms: 60,
            ..Config::default()
        };
        assert!(Dcf77::new(config, NoIndicator).is_err());
    }

    #[test]
    fn poll_without_edge_is_a_no_op() {
        let mailbox = EdgeMailbox::new();
        let mut decoder = decoder();
        assert_eq!(decoder.poll(&mailbox), None);
        assert_eq!(decoder.poll(&mailbox), None);
        assert!(!decoder.is_synchronized());
        assert!(!decoder.has_time());
        assert!(!decoder.has_time());
    }

    #[test]
    fn poll_takes_mailbox_edge() {
        let mailbox = EdgeMailbox::new();
        let mut decoder = decoder();
        mailbox.post(Edge::Falling, 0);
        assert_eq!(decoder.poll(&mailbox), Some(Event::Unsynchronized));
        mailbox.post(Edge::Rising, 1850);
        assert_eq!(decoder.poll(&mailbox), Some(Event::Synchronized));
        assert_eq!(decoder.poll(&mailbox), None);
        assert!(decoder.is_synchronized());
    }

    #[test]
    fn pulses_before_sync_are_discarded() {
        let mut signal = Signal::new(decoder());
        assert_eq!(signal.edge(Edge::Rising, 0), Event::PulseStart);
        assert_eq!(signal.edge(Edge::Falling, 100), Event::Unsynchronized);
        assert_eq!(signal.edge(Edge::Rising, 900), Event::PulseStart);
        assert_eq!(signal.edge(Edge::Falling, 200), Event::Unsynchronized);
        assert!(signal.decoder.frame().is_empty());
        assert_eq!(signal.decoder.release().toggles, 0);
    }

    #[test]
    fn decodes_reference_minute() {
        let mut signal = Signal::new(decoder());
        assert_eq!(signal.sync_gap(), Event::Synchronized);
        assert_eq!(signal.decoder.second(), 0);

        let event = signal.minute(REFERENCE);
        assert!(event.is_minute_boundary());
        let time = match event {
            Event::Minute(Ok(time)) => time,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(time.to_string(), "Sa 2016-03-05 09:39:00 MEZ");
        assert_eq!(time.dst, Dst::Standard);
        assert!(signal.decoder.has_time());
        assert_eq!(signal.decoder.time(), Some(time));
        assert!(signal.decoder.last_frame().is_complete());
        assert_eq!(signal.decoder.last_frame().to_string(), REFERENCE);
        assert!(signal.decoder.frame().is_empty());
        assert_eq!(signal.decoder.release().toggles, FRAME_LEN as u32);
    }

    #[test]
    fn seconds_follow_pulses() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        signal.minute(REFERENCE);
        assert_eq!(signal.decoder.time().map(|t| t.second), Some(0));

        signal.edge(Edge::Falling, 100);
        signal.edge(Edge::Rising, 900);
        signal.edge(Edge::Falling, 200);
        assert_eq!(signal.decoder.second(), 2);
        assert_eq!(signal.decoder.time().map(|t| t.second), Some(1));
    }

    #[test]
    fn clock_shows_second_in_progress() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        signal.minute(REFERENCE);
        signal.edge(Edge::Falling, 100);
        let time = signal.decoder.time().unwrap();
        assert_eq!(time.to_string(), "Sa 2016-03-05 09:39:00 MEZ");
        assert_eq!(time.to_unix(), Some(1_457_167_140));

        for _ in 1..FRAME_LEN {
            signal.edge(Edge::Rising, 900);
            signal.edge(Edge::Falling, 100);
        }
        assert_eq!(signal.decoder.time().map(|t| t.second), Some(58));
    }

    #[test]
    fn lost_edges_keep_seconds_in_place() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        // Second 5 is a meteo bit and second 15 the call bit, neither is checked.
        let events = signal.minute_losing(REFERENCE, &[(5, Edge::Falling), (15, Edge::Rising)]);

        let missed: Vec<Event> = events
            .iter()
            .copied()
            .filter(|event| matches!(event, Event::MissedEdge { .. }))
            .collect();
        assert_eq!(
            missed,
            vec![
                Event::MissedEdge { second: Some(5) },
                Event::MissedEdge { second: Some(15) },
            ]
        );
        assert_eq!(
            events.last(),
            Some(&Event::Minute(Ok(DateTime::from_wire(
                39,
                9,
                5,
                6,
                3,
                16,
                Dst::Standard
            ))))
        );
        assert_eq!(signal.decoder.last_frame().bit(5), None);
        assert_eq!(signal.decoder.last_frame().bit(15), None);
        assert_eq!(signal.decoder.last_frame().bit(16), Some(0));
    }

    #[test]
    fn lost_edge_in_parity_group_rejects_minute() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        let events = signal.minute_losing(REFERENCE, &[(25, Edge::Falling)]);
        assert!(events.contains(&Event::MissedEdge { second: Some(25) }));
        assert_eq!(
            events.last(),
            Some(&Event::Minute(Err(Dcf77Error::Parity(ParityGroup::Minute))))
        );
        assert!(signal.decoder.is_synchronized());
        assert!(!signal.decoder.has_time());
    }

    #[test]
    fn lost_edge_while_unsynchronized() {
        let mut signal = Signal::new(decoder());
        signal.edge(Edge::Rising, 0);
        assert_eq!(
            signal.edge(Edge::Rising, 1000),
            Event::MissedEdge { second: None }
        );
        assert!(signal.decoder.frame().is_empty());
        assert_eq!(signal.decoder.release().toggles, 0);
    }

    #[test]
    fn parity_failure_keeps_lock() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        // Flip the 10 hours bit.
        let mut corrupted = String::from(&REFERENCE[..33]);
        corrupted.push('1');
        corrupted.push_str(&REFERENCE[34..]);
        assert_eq!(
            signal.minute(&corrupted),
            Event::Minute(Err(Dcf77Error::Parity(ParityGroup::Hour)))
        );
        assert!(signal.decoder.is_synchronized());
        assert!(!signal.decoder.has_time());

        match signal.minute(REFERENCE) {
            Event::Minute(Ok(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(signal.decoder.has_time());
    }

    #[test]
    fn noise_leaves_slot_unset_and_advances() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        assert_eq!(
            signal.edge(Edge::Falling, 150),
            Event::Noise {
                second: 0,
                width_ms: 150
            }
        );
        assert_eq!(signal.edge(Edge::Rising, 850), Event::PulseStart);
        assert_eq!(
            signal.edge(Edge::Falling, 200),
            Event::Bit {
                second: 1,
                bit: Bit::One
            }
        );
        assert_eq!(signal.decoder.frame().bit(0), None);
        assert_eq!(signal.decoder.frame().bit(1), Some(1));
    }

    #[test]
    fn frame_does_not_leak_into_next_minute() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        signal.minute(REFERENCE);
        // Second 0 of the new minute is lost to noise.
        signal.edge(Edge::Falling, 20);
        assert_eq!(signal.decoder.frame().bit(0), None);
        assert_eq!(signal.decoder.frame().received(), 0);
    }

    #[test]
    fn mid_minute_lock_is_incomplete() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        // Only the last 10 seconds of a minute, then a gap.
        for _ in 0..10 {
            signal.edge(Edge::Falling, 100);
            signal.edge(Edge::Rising, 900);
        }
        assert_eq!(
            signal.sync_gap(),
            Event::Minute(Err(Dcf77Error::Incomplete { received: 11 }))
        );
    }

    #[test]
    fn missed_gap_is_reported() {
        let mut signal = Signal::new(decoder());
        signal.sync_gap();
        signal.edge(Edge::Falling, 100);
        for _ in 1..FRAME_LEN {
            signal.edge(Edge::Rising, 900);
            signal.edge(Edge::Falling, 100);
        }
        assert!(signal.decoder.frame().is_complete());
        // A pulse where the gap should be.
        signal.edge(Edge::Rising, 900);
        assert_eq!(signal.edge(Edge::Falling, 100), Event::Overrun);
        assert_eq!(
            signal.edge(Edge::Rising, 1850),
            Event::Minute(Err(Dcf77Error::MissedSyncGap))
        );
        assert!(signal.decoder.is_synchronized());
    }

    #[test]
    fn rejected_minutes_drop_lock_when_configured() {
        let config = Config {
            max_rejected_minutes: Some(2),
            ..Config::default()
        };
        let mut signal = Signal::new(Dcf77::new(config, NoIndicator).unwrap());
        signal.sync_gap();
        signal.sync_gap();
        assert!(signal.decoder.is_synchronized());
        assert!(matches!(signal.sync_gap(), Event::Minute(Err(_))));
        assert!(!signal.decoder.is_synchronized());
        assert_eq!(signal.sync_gap(), Event::Synchronized);
    }

    #[test]
    fn symbols() {
        assert_eq!(
            Event::Bit {
                second: 3,
                bit: Bit::One
            }
            .symbol(),
            Some('1')
        );
        assert_eq!(Event::Unsynchronized.symbol(), Some('*'));
        assert_eq!(Event::Overrun.symbol(), Some('?'));
        assert_eq!(Event::PulseStart.symbol(), None);
        assert!(!Event::PulseStart.is_minute_boundary());
        assert!(Event::Synchronized.is_minute_boundary());
    }

    #[test]
    fn verbosity_toggle() {
        let mut decoder = decoder();
        assert!(decoder.is_verbose());
        decoder.set_verbose(false);
        assert!(!decoder.is_verbose());
        decoder.set_verbose(false);
        assert!(!decoder.is_verbose());
    }
}
