//! Shared types for the normalized log event stream.
//!
//! The core never sees log text: an external parser produces [`LogEntry`]
//! values and hands them to the analyzer as an iterator. Everything here is
//! immutable after construction.

use serde::{Deserialize, Serialize};

use crate::can::frame::CanFrame;
use crate::lin::frame::LinFrame;

/// Seconds since trace start, monotonically non-decreasing after
/// normalization. Precision is at least one microsecond; all comparisons use
/// explicit tolerances, never equality.
pub type Timestamp = f64;

/// Smallest timestamp step the analyzer distinguishes (1 µs).
pub const TIMESTAMP_QUANTUM_S: f64 = 1e-6;

/// Which bus a frame or finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BusKind {
    /// Local Interconnect Network.
    Lin,
    /// Controller Area Network (classic or FD).
    Can,
}

/// Frame direction as captured by the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Received from the bus.
    Rx,
    /// Transmitted by the logging node.
    Tx,
}

/// CAN identifier width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdWidth {
    /// 11-bit base identifier.
    Standard,
    /// 29-bit extended identifier.
    Extended,
}

impl IdWidth {
    /// Number of identifier bits on the wire.
    pub const fn bits(self) -> u8 {
        match self {
            IdWidth::Standard => 11,
            IdWidth::Extended => 29,
        }
    }
}

/// A normalized log event: one frame observed on one channel.
#[derive(Debug, Clone)]
pub enum LogEntry {
    /// A LIN frame (header plus response).
    Lin(LinFrame),
    /// A CAN 2.0 or CAN FD frame.
    Can(CanFrame),
}

impl LogEntry {
    /// Timestamp of the event in seconds since trace start.
    pub fn ts(&self) -> Timestamp {
        match self {
            LogEntry::Lin(f) => f.ts,
            LogEntry::Can(f) => f.ts,
        }
    }

    /// Capture channel the event was observed on.
    pub fn channel(&self) -> u8 {
        match self {
            LogEntry::Lin(f) => f.channel,
            LogEntry::Can(f) => f.channel,
        }
    }

    /// Bus the event belongs to.
    pub fn bus(&self) -> BusKind {
        match self {
            LogEntry::Lin(_) => BusKind::Lin,
            LogEntry::Can(_) => BusKind::Can,
        }
    }

    pub(crate) fn set_ts(&mut self, ts: Timestamp) {
        match self {
            LogEntry::Lin(f) => f.ts = ts,
            LogEntry::Can(f) => f.ts = ts,
        }
    }
}

/// A decoded, scaled signal value with its timestamp.
///
/// Produced by the signal extractor and consumed by the gateway correlator.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSample {
    /// Timestamp of the carrying frame.
    pub ts: Timestamp,
    /// Signal name as declared in the LDF or DBC.
    pub name: String,
    /// Physical value (`raw * factor + offset`).
    pub value: f64,
}
