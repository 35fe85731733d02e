//! LIN frame event type.

use crate::ldf::{MAX_LIN_DATA_LEN, MAX_LIN_ID};
use crate::types::{Direction, Timestamp};

/// Sub-frame timing captured by loggers that expose the physical layer.
///
/// All fields are optional: real log formats report whatever the hardware
/// measured. A frame without timing skips the physical-layer checks
/// entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinFrameTiming {
    /// Measured break field duration in seconds.
    pub break_s: Option<f64>,
    /// Measured break delimiter duration in seconds.
    pub break_delimiter_s: Option<f64>,
    /// Observed sync field byte (nominally `0x55`).
    pub sync_byte: Option<u8>,
    /// Bit rate measured over the sync field, in Hz.
    pub bit_rate_hz: Option<f64>,
}

/// One LIN frame as observed on the wire.
#[derive(Debug, Clone)]
pub struct LinFrame {
    /// Timestamp in seconds since trace start.
    pub ts: Timestamp,
    /// Capture channel.
    pub channel: u8,
    /// Protected identifier byte as observed, parity bits included.
    pub pid_byte: u8,
    /// Frame payload, zero-padded.
    pub payload: [u8; MAX_LIN_DATA_LEN],
    /// Observed payload length in bytes.
    pub dlc: u8,
    /// Checksum byte as observed.
    pub checksum_byte: u8,
    /// Frame direction.
    pub direction: Direction,
    /// Sub-frame timing, when the log carries it.
    pub timing: Option<LinFrameTiming>,
}

impl LinFrame {
    /// Create a frame from a payload slice. Payloads longer than 8 bytes are
    /// truncated.
    pub fn new(
        ts: Timestamp,
        channel: u8,
        pid_byte: u8,
        data: &[u8],
        checksum_byte: u8,
        direction: Direction,
    ) -> Self {
        let mut payload = [0u8; MAX_LIN_DATA_LEN];
        let len = data.len().min(MAX_LIN_DATA_LEN);
        payload[..len].copy_from_slice(&data[..len]);
        Self {
            ts,
            channel,
            pid_byte,
            payload,
            dlc: len as u8,
            checksum_byte,
            direction,
            timing: None,
        }
    }

    /// Attach sub-frame timing.
    pub fn with_timing(mut self, timing: LinFrameTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Unprotected frame ID: the PID with the parity bits stripped.
    #[inline]
    pub fn unprotected_id(&self) -> u8 {
        self.pid_byte & MAX_LIN_ID
    }

    /// The observed payload.
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.dlc as usize]
    }
}
