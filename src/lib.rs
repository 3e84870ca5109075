//! Decoder for the DCF77 longwave time signal.
//!
//! The receiver module outputs one pulse per second: 100 ms for a 0, 200 ms for a 1. The pulse
//! of the 59th second is left out so the long pause marks the start of the next minute. The
//! 59 bits of a minute carry the date and time of the minute that follows, BCD coded and
//! protected by three even parity bits.
//!
//! The pin interrupt posts each edge to an [`EdgeMailbox`]; the main loop hands the mailbox to
//! [`Dcf77::poll`], which classifies the edge and decodes the telegram at every minute
//! boundary.

#![cfg_attr(not(test), no_std)]

pub mod classifier;
pub mod config;
pub mod consts;
pub mod dcf77;
pub mod decoder;
pub mod edge;
pub mod error;
pub mod frame;
pub mod sync;
pub mod time;

pub use classifier::{Bit, PulseClassifier};
pub use config::Config;
pub use decoder::{Dcf77, Event, NoIndicator};
pub use edge::{Edge, EdgeEvent, EdgeMailbox};
pub use error::{ConfigError, Dcf77Error};
pub use frame::Frame;
pub use time::{DateTime, Dst};
