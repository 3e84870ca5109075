// A list of constants used to index into the DCF77 frame.
pub const FRAME_LEN: usize = 59;

pub const START_OF_MINUTE: usize = 0;
pub const DST_BIT1: usize = 17;
pub const DST_BIT0: usize = 18;
pub const START_OF_TIME: usize = 20;
pub const MINUTE: usize = 21;
pub const MINUTE_BITS: usize = 7;
pub const P1: usize = 28;
pub const HOUR: usize = 29;
pub const HOUR_BITS: usize = 6;
pub const P2: usize = 35;
pub const DAY: usize = 36;
pub const DAY_BITS: usize = 6;
pub const WEEKDAY: usize = 42;
pub const WEEKDAY_BITS: usize = 3;
pub const MONTH: usize = 45;
pub const MONTH_BITS: usize = 5;
pub const YEAR: usize = 50;
pub const YEAR_BITS: usize = 8;
pub const P3: usize = 58;

// Weights of the bits of a BCD field, least significant bit first.
pub const BCD_WEIGHTS: [u8; 8] = [1, 2, 4, 8, 10, 20, 40, 80];

// Nominal widths in milliseconds of the two pulse kinds and of the pause left by the missing
// 59th second.
pub const PULSE_ZERO: u32 = 100;
pub const PULSE_ONE: u32 = 200;
pub const JITTER: u32 = 35;
pub const MIN_SYNC_GAP: u32 = 1800;
pub const MAX_SYNC_GAP: u32 = 1900;

// DCF77 transmits central european time: MEZ is UTC+1, MESZ is UTC+2.
pub const MEZ_OFFSET: u32 = 3600;
pub const MESZ_OFFSET: u32 = 7200;
