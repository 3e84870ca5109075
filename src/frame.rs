use core::fmt;
use core::str::FromStr;

use crate::classifier::Bit;
use crate::consts::FRAME_LEN;

/// Names every slot of the telegram, for lining up a printed frame.
pub const LEGEND: &str = "0--Meteo-Data--RazZA|mmmmmmmPhhhhhhPddddddwwwMMMMMyyyyyyyyP";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Unset,
    Zero,
    One,
}

impl From<Bit> for Symbol {
    fn from(bit: Bit) -> Self {
        match bit {
            Bit::Zero => Symbol::Zero,
            Bit::One => Symbol::One,
        }
    }
}

/// One minute of received bits, one slot per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    slots: [Symbol; FRAME_LEN],
    complete: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub const fn new() -> Self {
        Self {
            slots: [Symbol::Unset; FRAME_LEN],
            complete: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Stores the bit for `second`. Writing the last slot completes the frame.
    pub fn set(&mut self, second: usize, bit: Bit) {
        if let Some(slot) = self.slots.get_mut(second) {
            *slot = bit.into();
            if second == FRAME_LEN - 1 {
                self.complete = true;
            }
        }
    }

    pub fn get(&self, second: usize) -> Symbol {
        self.slots.get(second).copied().unwrap_or(Symbol::Unset)
    }

    /// The binary value of a slot, `None` while it is unset.
    pub fn bit(&self, second: usize) -> Option<u8> {
        match self.get(second) {
            Symbol::Zero => Some(0),
            Symbol::One => Some(1),
            Symbol::Unset => None,
        }
    }

    /// True once the slot of the last second has been written.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn received(&self) -> u8 {
        self.slots.iter().filter(|s| **s != Symbol::Unset).count() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| *s == Symbol::Unset)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in self.slots.iter() {
            let c = match slot {
                Symbol::Unset => '_',
                Symbol::Zero => '0',
                Symbol::One => '1',
            };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseFrameError {
    Length(usize),
    Symbol { index: usize, found: char },
}

impl fmt::Display for ParseFrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFrameError::Length(len) => write!(f, "expected 59 bits, got {}", len),
            ParseFrameError::Symbol { index, found } => {
                write!(f, "unexpected {:?} at bit {}", found, index)
            }
        }
    }
}

impl FromStr for Frame {
    type Err = ParseFrameError;

    /// Parses a telegram written as 59 `0`/`1` characters, optionally followed by the `_`
    /// marking the missing 59th second.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s.strip_suffix('_').unwrap_or(s);
        let len = bits.chars().count();
        if len != FRAME_LEN {
            return Err(ParseFrameError::Length(len));
        }

        let mut frame = Frame::new();
        for (index, c) in bits.chars().enumerate() {
            let bit = match c {
                '0' => Bit::Zero,
                '1' => Bit::One,
                found => return Err(ParseFrameError::Symbol { index, found }),
            };
            frame.set(index, bit);
        }
        Ok(frame)
    }
}
