use core::fmt;

/// A parity protected group of the telegram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParityGroup {
    Minute,
    Hour,
    Date,
}

/// A BCD coded field of the telegram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Minute,
    Hour,
    Day,
    Weekday,
    Month,
    Year,
}

/// Reasons a minute's telegram is rejected. None of these are fatal: the decoder drops the
/// frame and keeps collecting the next minute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dcf77Error {
    /// The minute ended before every slot was filled.
    Incomplete { received: u8 },
    /// Bit 0 is not 0 or bit 20 is not 1.
    FrameMarker,
    Parity(ParityGroup),
    /// A field holds a digit above 9 or a value outside its calendar range.
    InvalidField(Field),
    /// More than 59 pulses arrived since the last sync gap, so the numbering of the seconds is
    /// off.
    MissedSyncGap,
}

impl fmt::Display for Dcf77Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dcf77Error::Incomplete { received } => {
                write!(f, "incomplete telegram, {} of 59 bits received", received)
            }
            Dcf77Error::FrameMarker => f.write_str("invalid start of minute or start of time bit"),
            Dcf77Error::Parity(group) => write!(f, "{:?} parity check failed", group),
            Dcf77Error::InvalidField(field) => write!(f, "{:?} field out of range", field),
            Dcf77Error::MissedSyncGap => f.write_str("sync gap missing, pulses overran the frame"),
        }
    }
}

/// Timing configurations the classifier refuses to run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    ZeroWidth,
    /// The windows for a 0 pulse and a 1 pulse overlap, so a width could be both.
    OverlappingPulseWindows,
    /// The sync gap window reaches down into the pulse windows.
    OverlappingSyncWindow,
    InvertedSyncGap,
    /// `max_rejected_minutes` is `Some(0)`.
    ZeroRejectLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::ZeroWidth => "nominal widths must be non-zero",
            ConfigError::OverlappingPulseWindows => "pulse windows overlap",
            ConfigError::OverlappingSyncWindow => "sync gap window overlaps a pulse window",
            ConfigError::InvertedSyncGap => "minimum sync gap exceeds maximum sync gap",
            ConfigError::ZeroRejectLimit => "rejected minute limit must be at least 1",
        };
        f.write_str(msg)
    }
}
