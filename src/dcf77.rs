//! Validation and decoding of a received DCF77 telegram.
use core::ops::{Range, RangeInclusive};

use crate::classifier::Bit;
use crate::consts;
use crate::error::{Dcf77Error, Field, ParityGroup};
use crate::frame::Frame;
use crate::time::{weekday_to_wire, DateTime, Dst};

// Each group ends with its own even parity bit.
const PARITY_GROUPS: [(ParityGroup, Range<usize>); 3] = [
    (ParityGroup::Minute, consts::MINUTE..consts::P1 + 1),
    (ParityGroup::Hour, consts::HOUR..consts::P2 + 1),
    (ParityGroup::Date, consts::DAY..consts::P3 + 1),
];

/// True if the slots in `range` are all set and hold an even number of ones.
pub fn even_parity(frame: &Frame, range: Range<usize>) -> bool {
    let mut ones = 0;
    for second in range {
        match frame.bit(second) {
            Some(bit) => ones += bit,
            None => return false,
        }
    }
    ones % 2 == 0
}

pub fn check_parity(frame: &Frame) -> Result<(), Dcf77Error> {
    for (group, range) in PARITY_GROUPS.iter() {
        if !even_parity(frame, range.clone()) {
            return Err(Dcf77Error::Parity(*group));
        }
    }
    Ok(())
}

pub fn parity_ok(frame: &Frame) -> bool {
    check_parity(frame).is_ok()
}

/// Value of the BCD field of `len` bits starting at `first`. `None` if a slot is unset or the
/// ones digit is above 9.
pub fn bcd_value(frame: &Frame, first: usize, len: usize) -> Option<u8> {
    let mut value = 0;
    let mut ones = 0;
    for (i, weight) in consts::BCD_WEIGHTS.iter().take(len).enumerate() {
        let bit = frame.bit(first + i)?;
        value += bit * weight;
        if i < 4 {
            ones += bit * weight;
        }
    }
    if ones > 9 {
        None
    } else {
        Some(value)
    }
}

fn field(
    frame: &Frame,
    first: usize,
    len: usize,
    which: Field,
    valid: RangeInclusive<u8>,
) -> Result<u8, Dcf77Error> {
    bcd_value(frame, first, len)
        .filter(|value| valid.contains(value))
        .ok_or(Dcf77Error::InvalidField(which))
}

pub fn decode_dst(frame: &Frame) -> Dst {
    Dst::from_bits(frame.bit(consts::DST_BIT1), frame.bit(consts::DST_BIT0))
}

/// Decodes a complete telegram. The seconds of the result are 0: the telegram describes the
/// minute that begins with the sync gap ending it.
pub fn decode(frame: &Frame) -> Result<DateTime, Dcf77Error> {
    if !frame.is_complete() {
        return Err(Dcf77Error::Incomplete {
            received: frame.received(),
        });
    }
    check_parity(frame)?;

    if frame.bit(consts::START_OF_MINUTE) != Some(0) || frame.bit(consts::START_OF_TIME) != Some(1)
    {
        return Err(Dcf77Error::FrameMarker);
    }

    let minute = field(frame, consts::MINUTE, consts::MINUTE_BITS, Field::Minute, 0..=59)?;
    let hour = field(frame, consts::HOUR, consts::HOUR_BITS, Field::Hour, 0..=23)?;
    let day = field(frame, consts::DAY, consts::DAY_BITS, Field::Day, 1..=31)?;
    let weekday = field(
        frame,
        consts::WEEKDAY,
        consts::WEEKDAY_BITS,
        Field::Weekday,
        1..=7,
    )?;
    let month = field(frame, consts::MONTH, consts::MONTH_BITS, Field::Month, 1..=12)?;
    let year = field(frame, consts::YEAR, consts::YEAR_BITS, Field::Year, 0..=99)?;

    Ok(DateTime::from_wire(
        minute,
        hour,
        day,
        weekday,
        month,
        year,
        decode_dst(frame),
    ))
}

/// Builds the telegram that announces `time`. Meteo, call and announcement bits are left 0.
pub fn encode(time: &DateTime) -> Frame {
    let mut frame = Frame::new();
    for second in 0..consts::FRAME_LEN {
        frame.set(second, Bit::Zero);
    }

    let (bit17, bit18) = match time.dst {
        Dst::Daylight => (Bit::One, Bit::Zero),
        Dst::Standard => (Bit::Zero, Bit::One),
        Dst::Unknown => (Bit::Zero, Bit::Zero),
    };
    frame.set(consts::DST_BIT1, bit17);
    frame.set(consts::DST_BIT0, bit18);
    frame.set(consts::START_OF_TIME, Bit::One);

    put_bcd(&mut frame, consts::MINUTE, consts::MINUTE_BITS, time.minute);
    put_bcd(&mut frame, consts::HOUR, consts::HOUR_BITS, time.hour);
    put_bcd(&mut frame, consts::DAY, consts::DAY_BITS, time.day);
    put_bcd(
        &mut frame,
        consts::WEEKDAY,
        consts::WEEKDAY_BITS,
        weekday_to_wire(time.weekday),
    );
    put_bcd(&mut frame, consts::MONTH, consts::MONTH_BITS, time.wire_month());
    put_bcd(&mut frame, consts::YEAR, consts::YEAR_BITS, time.year_of_century());
    fill_parity(&mut frame);
    frame
}

fn put_bcd(frame: &mut Frame, first: usize, len: usize, value: u8) {
    let digits = ((value / 10) << 4) | (value % 10);
    for i in 0..len {
        let bit = if (digits >> i) & 1 == 1 { Bit::One } else { Bit::Zero };
        frame.set(first + i, bit);
    }
}

fn fill_parity(frame: &mut Frame) {
    for (_, range) in PARITY_GROUPS.iter() {
        let parity = range.end - 1;
        let ones: u8 = (range.start..parity).filter_map(|s| frame.bit(s)).sum();
        let bit = if ones % 2 == 1 { Bit::One } else { Bit::Zero };
        frame.set(parity, bit);
    }
}
