//! Findings: recoverable per-frame observations.
//!
//! Everything a frame can do wrong is captured as a [`Finding`] value and
//! appended to the report; analysis never unwinds over one. Findings order
//! deterministically by `(timestamp, kind, sequence)` so repeat runs are
//! diffable.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{BusKind, Timestamp};

/// Which report section a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FindingCategory {
    /// Frame-level protocol conformance (checksum, parity, lengths, signals).
    Frame,
    /// Stream-level timing (timestamps, inactivity, truncation).
    Timing,
    /// LIN physical layer (break, sync, bit rate).
    Physical,
    /// Schedule adherence.
    Schedule,
    /// Gateway correlation.
    Gateway,
}

/// One observed deviation, with its numeric context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FindingKind {
    /// PID parity bits do not match the identifier bits.
    PidParityError {
        /// PID with correct parity for the observed identifier.
        expected: u8,
        /// PID byte as observed.
        observed: u8,
    },
    /// Computed checksum differs from the observed byte.
    ChecksumError {
        /// Unprotected frame ID.
        frame_id: u8,
        /// Checksum the validator computed.
        expected: u8,
        /// Checksum byte on the wire.
        observed: u8,
    },
    /// Observed payload length differs from the declared length.
    LengthMismatch {
        /// Frame or message identifier.
        frame_id: u32,
        /// Length the description declares.
        expected: u8,
        /// Length observed on the wire.
        observed: u8,
    },
    /// The identifier is not present in the network description.
    UnknownFrameId {
        /// Frame or message identifier.
        frame_id: u32,
    },
    /// Payload length is not encodable for the frame kind.
    IllegalDlc {
        /// Observed payload length in bytes.
        len: u8,
        /// Whether the frame claimed to be CAN FD.
        is_fd: bool,
    },
    /// Break field shorter than 13 nominal bit times.
    BreakTooShort {
        /// Measured break duration in seconds.
        measured_s: f64,
        /// Minimum acceptable duration in seconds.
        min_s: f64,
    },
    /// Sync field byte is not `0x55`.
    SyncByteWrong {
        /// Byte observed in the sync field.
        observed: u8,
    },
    /// Break delimiter shorter than one bit time.
    BreakDelimiterShort {
        /// Measured delimiter duration in seconds.
        measured_s: f64,
        /// Minimum acceptable duration in seconds.
        min_s: f64,
    },
    /// Measured bit rate outside the configured tolerance.
    BitRateOutOfTolerance {
        /// Bit rate measured over the sync field, in Hz.
        measured_hz: f64,
        /// Configured nominal bit rate in Hz.
        nominal_hz: f64,
    },
    /// Timestamp regressed; clamped to the previous value plus one quantum.
    NonMonotonicTimestamp {
        /// Timestamp as it appeared in the log.
        observed: f64,
        /// Timestamp after clamping.
        clamped_to: f64,
    },
    /// Arrival deviates from the schedule anchor by more than the tolerance.
    ScheduleDrift {
        /// Unprotected frame ID.
        frame_id: u8,
        /// Signed deviation from the expected arrival, in seconds.
        deviation_s: f64,
    },
    /// Inter-arrival jitter beyond the configured maximum.
    JitterExceeded {
        /// Unprotected frame ID.
        frame_id: u8,
        /// Signed jitter (`t - t_prev - period`) in seconds.
        jitter_s: f64,
    },
    /// A gap of at least 1.5 periods contained no arrival.
    MissedSlot {
        /// Unprotected frame ID.
        frame_id: u8,
        /// Observed gap in seconds.
        gap_s: f64,
        /// Whole slots the gap swallowed.
        missed: u32,
    },
    /// A frame arrived whose ID the schedule does not list.
    UnexpectedFrame {
        /// Unprotected frame ID.
        frame_id: u8,
    },
    /// A declared signal window falls outside the observed payload.
    SignalFieldOutOfPayload {
        /// Signal name.
        signal: String,
        /// Declared start bit.
        start_bit: u16,
        /// Declared width in bits.
        length_bits: u16,
        /// Observed payload length in bytes.
        payload_len: u8,
    },
    /// Decoded physical value outside the declared `[min, max]` range.
    SignalOutOfRange {
        /// Signal name.
        signal: String,
        /// Decoded physical value.
        value: f64,
        /// Declared minimum.
        min: f64,
        /// Declared maximum.
        max: f64,
    },
    /// No source sample inside the correlation window for a target sample.
    NoLinSourceInWindow {
        /// Index of the gateway rule in the map.
        rule: usize,
        /// Target signal name.
        signal: String,
    },
    /// Transformed source value differs from the observed target value.
    GatewayValueMismatch {
        /// Index of the gateway rule in the map.
        rule: usize,
        /// Expected target value after applying the rule's transform.
        expected: f64,
        /// Target value observed on the bus.
        observed: f64,
        /// Join latency (`t_target - t_source`) in seconds.
        latency_s: f64,
    },
    /// The input ended before its natural end; statistics are partial.
    TruncatedInput,
    /// LIN bus silence longer than the inactivity threshold.
    BusInactive {
        /// Silent gap duration in seconds.
        gap_s: f64,
    },
}

impl FindingKind {
    /// Stable ordering code used for the report sort. New kinds append.
    pub fn code(&self) -> u8 {
        match self {
            FindingKind::PidParityError { .. } => 0,
            FindingKind::ChecksumError { .. } => 1,
            FindingKind::LengthMismatch { .. } => 2,
            FindingKind::UnknownFrameId { .. } => 3,
            FindingKind::IllegalDlc { .. } => 4,
            FindingKind::BreakTooShort { .. } => 5,
            FindingKind::SyncByteWrong { .. } => 6,
            FindingKind::BreakDelimiterShort { .. } => 7,
            FindingKind::BitRateOutOfTolerance { .. } => 8,
            FindingKind::NonMonotonicTimestamp { .. } => 9,
            FindingKind::ScheduleDrift { .. } => 10,
            FindingKind::JitterExceeded { .. } => 11,
            FindingKind::MissedSlot { .. } => 12,
            FindingKind::UnexpectedFrame { .. } => 13,
            FindingKind::SignalFieldOutOfPayload { .. } => 14,
            FindingKind::SignalOutOfRange { .. } => 15,
            FindingKind::NoLinSourceInWindow { .. } => 16,
            FindingKind::GatewayValueMismatch { .. } => 17,
            FindingKind::TruncatedInput => 18,
            FindingKind::BusInactive { .. } => 19,
        }
    }

    /// Kind name used for the per-kind counters.
    pub fn name(&self) -> &'static str {
        match self {
            FindingKind::PidParityError { .. } => "PidParityError",
            FindingKind::ChecksumError { .. } => "ChecksumError",
            FindingKind::LengthMismatch { .. } => "LengthMismatch",
            FindingKind::UnknownFrameId { .. } => "UnknownFrameId",
            FindingKind::IllegalDlc { .. } => "IllegalDlc",
            FindingKind::BreakTooShort { .. } => "BreakTooShort",
            FindingKind::SyncByteWrong { .. } => "SyncByteWrong",
            FindingKind::BreakDelimiterShort { .. } => "BreakDelimiterShort",
            FindingKind::BitRateOutOfTolerance { .. } => "BitRateOutOfTolerance",
            FindingKind::NonMonotonicTimestamp { .. } => "NonMonotonicTimestamp",
            FindingKind::ScheduleDrift { .. } => "ScheduleDrift",
            FindingKind::JitterExceeded { .. } => "JitterExceeded",
            FindingKind::MissedSlot { .. } => "MissedSlot",
            FindingKind::UnexpectedFrame { .. } => "UnexpectedFrame",
            FindingKind::SignalFieldOutOfPayload { .. } => "SignalFieldOutOfPayload",
            FindingKind::SignalOutOfRange { .. } => "SignalOutOfRange",
            FindingKind::NoLinSourceInWindow { .. } => "NoLinSourceInWindow",
            FindingKind::GatewayValueMismatch { .. } => "GatewayValueMismatch",
            FindingKind::TruncatedInput => "TruncatedInput",
            FindingKind::BusInactive { .. } => "BusInactive",
        }
    }

    /// Report section the kind belongs to.
    pub fn category(&self) -> FindingCategory {
        match self {
            FindingKind::PidParityError { .. }
            | FindingKind::ChecksumError { .. }
            | FindingKind::LengthMismatch { .. }
            | FindingKind::UnknownFrameId { .. }
            | FindingKind::IllegalDlc { .. }
            | FindingKind::SignalFieldOutOfPayload { .. }
            | FindingKind::SignalOutOfRange { .. } => FindingCategory::Frame,
            FindingKind::NonMonotonicTimestamp { .. }
            | FindingKind::TruncatedInput
            | FindingKind::BusInactive { .. } => FindingCategory::Timing,
            FindingKind::BreakTooShort { .. }
            | FindingKind::SyncByteWrong { .. }
            | FindingKind::BreakDelimiterShort { .. }
            | FindingKind::BitRateOutOfTolerance { .. } => FindingCategory::Physical,
            FindingKind::ScheduleDrift { .. }
            | FindingKind::JitterExceeded { .. }
            | FindingKind::MissedSlot { .. }
            | FindingKind::UnexpectedFrame { .. } => FindingCategory::Schedule,
            FindingKind::NoLinSourceInWindow { .. }
            | FindingKind::GatewayValueMismatch { .. } => FindingCategory::Gateway,
        }
    }
}

/// One finding, anchored to a timestamp and channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Timestamp of the triggering event.
    pub ts: Timestamp,
    /// Bus the finding belongs to.
    pub bus: BusKind,
    /// Capture channel of the triggering event.
    pub channel: u8,
    /// What was observed.
    pub kind: FindingKind,
    /// Stable sequence number assigned at emission, the sort tie-breaker.
    pub seq: u64,
}

impl Finding {
    /// Deterministic report ordering: `(timestamp, kind, sequence)`.
    pub fn report_order(&self, other: &Self) -> Ordering {
        self.ts
            .total_cmp(&other.ts)
            .then_with(|| self.kind.code().cmp(&other.kind.code()))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}
