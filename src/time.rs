//! The calendar record produced from a decoded telegram, plus utility functions for handling
//! time.

use core::fmt;

use crate::consts;

const WEEKDAYS: [&str; 7] = ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"];

/// The time zone announced by bits 17 and 18.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dst {
    /// MEZ, UTC+1.
    Standard,
    /// MESZ, UTC+2.
    Daylight,
    Unknown,
}

impl Dst {
    /// Matches the two zone bits. `10` is daylight saving time and `01` is standard time,
    /// anything else carries no information.
    pub fn from_bits(bit17: Option<u8>, bit18: Option<u8>) -> Self {
        match (bit17, bit18) {
            (Some(1), Some(0)) => Dst::Daylight,
            (Some(0), Some(1)) => Dst::Standard,
            _ => Dst::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dst::Standard => "MEZ",
            Dst::Daylight => "MESZ",
            Dst::Unknown => "---",
        }
    }

    /// Seconds ahead of UTC.
    pub fn utc_offset(self) -> Option<u32> {
        match self {
            Dst::Standard => Some(consts::MEZ_OFFSET),
            Dst::Daylight => Some(consts::MESZ_OFFSET),
            Dst::Unknown => None,
        }
    }
}

/// Date and time as broadcast, in the numbering of C's `struct tm`: months count from 0, years
/// from 1900 and weeks start with Sunday = 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateTime {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    /// 1..=31
    pub day: u8,
    /// 0..=11
    pub month: u8,
    /// Years since 1900.
    pub year: u16,
    /// 0..=6, Sunday = 0.
    pub weekday: u8,
    pub dst: Dst,
}

/// Converts the broadcast weekday (Monday = 1 .. Sunday = 7) to Sunday = 0 .. Saturday = 6.
pub fn weekday_from_wire(weekday: u8) -> u8 {
    weekday % 7
}

/// Converts Sunday = 0 .. Saturday = 6 to the broadcast weekday (Monday = 1 .. Sunday = 7).
pub fn weekday_to_wire(weekday: u8) -> u8 {
    if weekday == 0 {
        7
    } else {
        weekday
    }
}

impl DateTime {
    /// Builds the record from field values as broadcast. The telegram carries no century, so
    /// the year is taken to be in the 2000s.
    pub fn from_wire(
        minute: u8,
        hour: u8,
        day: u8,
        weekday: u8,
        month: u8,
        year: u8,
        dst: Dst,
    ) -> Self {
        Self {
            second: 0,
            minute,
            hour,
            day,
            month: month.saturating_sub(1),
            year: u16::from(year) + 100,
            weekday: weekday_from_wire(weekday),
            dst,
        }
    }

    pub fn full_year(&self) -> u16 {
        self.year + 1900
    }

    pub fn year_of_century(&self) -> u8 {
        (self.full_year() % 100) as u8
    }

    /// Month as broadcast, 1..=12.
    pub fn wire_month(&self) -> u8 {
        self.month + 1
    }

    pub fn wire_weekday(&self) -> u8 {
        weekday_to_wire(self.weekday)
    }

    /// Day of the year, January 1st is day 1.
    pub fn day_of_year(&self) -> u16 {
        let mut days_in_month: [u16; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        if is_leap_year(self.full_year()) {
            days_in_month[1] += 1;
        }

        let elapsed: u16 = days_in_month
            .iter()
            .take(usize::from(self.month))
            .sum();
        elapsed + u16::from(self.day)
    }

    /// Seconds since the Unix epoch in UTC. `None` if the time zone is unknown.
    pub fn to_unix(&self) -> Option<u32> {
        let offset = self.dst.utc_offset()?;
        let days = days_before_year(self.full_year())? + u32::from(self.day_of_year()) - 1;
        let seconds =
            u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second);

        days.checked_mul(86_400)?
            .checked_add(seconds)?
            .checked_sub(offset)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let weekday = WEEKDAYS.get(usize::from(self.weekday)).unwrap_or(&"--");
        write!(
            f,
            "{} {:04}-{:02}-{:02} {:02}:{:02}:{:02} {}",
            weekday,
            self.full_year(),
            self.wire_month(),
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.dst.label()
        )
    }
}

/// Days from 1970-01-01 to January 1st of `year`. `None` before 1970.
fn days_before_year(year: u16) -> Option<u32> {
    if year < 1970 {
        return None;
    }
    Some(
        (1970..year)
            .map(|y| if is_leap_year(y) { 366u32 } else { 365 })
            .sum(),
    )
}

pub fn is_leap_year(year: u16) -> bool {
    (year % 400 == 0 || year % 100 != 0) && year % 4 == 0
}
