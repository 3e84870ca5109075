use crate::consts;
use crate::error::ConfigError;

/// An inclusive range of widths in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub min: u32,
    pub max: u32,
}

impl Window {
    /// The window `[nominal - jitter, nominal + jitter]`, saturating at zero.
    pub fn around(nominal: u32, jitter: u32) -> Self {
        Self {
            min: nominal.saturating_sub(jitter),
            max: nominal.saturating_add(jitter),
        }
    }

    pub fn contains(&self, width: u32) -> bool {
        width >= self.min && width <= self.max
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Decoder configuration. The defaults are the nominal DCF77 timings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub pulse_zero_ms: u32,
    pub pulse_one_ms: u32,
    pub jitter_ms: u32,
    pub min_sync_gap_ms: u32,
    pub max_sync_gap_ms: u32,
    /// Drop synchronization after this many consecutive rejected minutes, at least 1. `None`
    /// keeps the lock forever once it has been acquired.
    pub max_rejected_minutes: Option<u8>,
    /// Echo every classified bit.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pulse_zero_ms: consts::PULSE_ZERO,
            pulse_one_ms: consts::PULSE_ONE,
            jitter_ms: consts::JITTER,
            min_sync_gap_ms: consts::MIN_SYNC_GAP,
            max_sync_gap_ms: consts::MAX_SYNC_GAP,
            max_rejected_minutes: None,
            verbose: true,
        }
    }
}

impl Config {
    pub fn zero_window(&self) -> Window {
        Window::around(self.pulse_zero_ms, self.jitter_ms)
    }

    pub fn one_window(&self) -> Window {
        Window::around(self.pulse_one_ms, self.jitter_ms)
    }

    pub fn sync_window(&self) -> Window {
        Window {
            min: self.min_sync_gap_ms.saturating_sub(self.jitter_ms),
            max: self.max_sync_gap_ms.saturating_add(self.jitter_ms),
        }
    }

    /// Checks that every width maps to at most one classification.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse_zero_ms == 0 || self.pulse_one_ms == 0 || self.min_sync_gap_ms == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.max_rejected_minutes == Some(0) {
            return Err(ConfigError::ZeroRejectLimit);
        }
        if self.min_sync_gap_ms > self.max_sync_gap_ms {
            return Err(ConfigError::InvertedSyncGap);
        }

        let zero = self.zero_window();
        let one = self.one_window();
        if zero.overlaps(&one) {
            return Err(ConfigError::OverlappingPulseWindows);
        }

        let sync = self.sync_window();
        if sync.overlaps(&zero) || sync.overlaps(&one) {
            return Err(ConfigError::OverlappingSyncWindow);
        }
        Ok(())
    }
}
