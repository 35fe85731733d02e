//! CAN frame event type.

use embedded_can::Id;

use crate::can::fd::MAX_FD_DATA_LEN;
use crate::types::{Direction, IdWidth, Timestamp};

/// One CAN 2.0 or CAN FD frame as observed on the wire.
#[derive(Debug, Clone)]
pub struct CanFrame {
    /// Timestamp in seconds since trace start.
    pub ts: Timestamp,
    /// Capture channel.
    pub channel: u8,
    /// Frame identifier (11- or 29-bit).
    pub id: Id,
    /// Whether the frame was transmitted as CAN FD.
    pub is_fd: bool,
    /// Bit Rate Switch: the data phase used the faster FD bit rate.
    pub brs: bool,
    /// Frame payload, zero-padded.
    pub payload: [u8; MAX_FD_DATA_LEN],
    /// Observed payload length in bytes.
    pub len: u8,
    /// Frame direction.
    pub direction: Direction,
}

impl CanFrame {
    /// Create a frame from a payload slice.
    ///
    /// Returns `None` when the payload exceeds 64 bytes. Length legality for
    /// the frame kind is a validator concern, not a construction error: the
    /// normalizer must be able to represent malformed captures.
    pub fn new(
        ts: Timestamp,
        channel: u8,
        id: impl Into<Id>,
        is_fd: bool,
        brs: bool,
        data: &[u8],
        direction: Direction,
    ) -> Option<Self> {
        if data.len() > MAX_FD_DATA_LEN {
            return None;
        }
        let mut payload = [0u8; MAX_FD_DATA_LEN];
        payload[..data.len()].copy_from_slice(data);
        Some(Self {
            ts,
            channel,
            id: id.into(),
            is_fd,
            brs,
            payload,
            len: data.len() as u8,
            direction,
        })
    }

    /// Raw identifier value without the width distinction.
    pub fn raw_id(&self) -> u32 {
        match self.id {
            Id::Standard(id) => id.as_raw() as u32,
            Id::Extended(id) => id.as_raw(),
        }
    }

    /// Identifier width of the frame.
    pub fn id_width(&self) -> IdWidth {
        match self.id {
            Id::Standard(_) => IdWidth::Standard,
            Id::Extended(_) => IdWidth::Extended,
        }
    }

    /// The observed payload.
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.len as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_can::{ExtendedId, StandardId};

    #[test]
    fn classic_frame_basics() {
        let id = StandardId::new(0x123).unwrap();
        let frame =
            CanFrame::new(0.5, 1, id, false, false, &[1, 2, 3], Direction::Rx).unwrap();
        assert_eq!(frame.raw_id(), 0x123);
        assert_eq!(frame.id_width(), IdWidth::Standard);
        assert_eq!(frame.data(), &[1, 2, 3]);
    }

    #[test]
    fn extended_id_width() {
        let id = ExtendedId::new(0x0CF0_0401).unwrap();
        let frame = CanFrame::new(0.0, 0, id, true, true, &[0; 64], Direction::Rx).unwrap();
        assert_eq!(frame.id_width(), IdWidth::Extended);
        assert_eq!(frame.len, 64);
    }

    #[test]
    fn oversized_payload_rejected() {
        let id = StandardId::new(1).unwrap();
        assert!(CanFrame::new(0.0, 0, id, true, false, &[0; 65], Direction::Rx).is_none());
    }
}
