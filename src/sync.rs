use crate::consts::FRAME_LEN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Unsynchronized,
    Synchronized,
}

/// Tracks whether the second numbering can be trusted and which second of the minute the next
/// pulse belongs to.
pub struct SyncTracker {
    state: SyncState,
    second: u8,
    rejected: u8,
    max_rejected: Option<u8>,
}

impl SyncTracker {
    pub fn new(max_rejected: Option<u8>) -> Self {
        Self {
            state: SyncState::Unsynchronized,
            second: 0,
            rejected: 0,
            max_rejected,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_synchronized(&self) -> bool {
        self.state == SyncState::Synchronized
    }

    /// Number of pulses counted since the last sync gap.
    pub fn second(&self) -> u8 {
        self.second
    }

    /// A sync gap was seen: second 0 starts now. Returns the state before the gap.
    pub fn acquire(&mut self) -> SyncState {
        let prev = self.state;
        self.state = SyncState::Synchronized;
        self.second = 0;
        prev
    }

    /// Counts a pulse and returns its slot in the frame, or `None` if the minute already has
    /// all of its slots, which means a sync gap went missing.
    pub fn advance(&mut self) -> Option<usize> {
        let slot = usize::from(self.second);
        if slot >= FRAME_LEN {
            return None;
        }
        self.second += 1;
        Some(slot)
    }

    pub fn frame_accepted(&mut self) {
        self.rejected = 0;
    }

    /// Counts a rejected minute. Returns true if that dropped synchronization.
    pub fn frame_rejected(&mut self) -> bool {
        self.rejected = self.rejected.saturating_add(1);
        match self.max_rejected {
            Some(max) if self.rejected >= max => {
                self.lose();
                true
            }
            _ => false,
        }
    }

    pub fn lose(&mut self) {
        self.state = SyncState::Unsynchronized;
        self.second = 0;
        self.rejected = 0;
    }
}
