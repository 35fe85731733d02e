//! CAN-side analysis: frame validation and bus-load estimation.
//!
//! Validation is stateless per frame: classify by identifier width and
//! FD-ness, check the payload length is encodable for that kind, and look
//! the message up in the database. Bus load is windowed and lives in
//! [`bus_load`].

pub(crate) mod bus_load;
pub mod fd;
pub mod frame;

use crate::dbc::{CanMessage, DbcDatabase};
use crate::findings::FindingKind;
use crate::report::ReportBuilder;
use crate::types::BusKind;

use fd::fd_len_is_legal;
use frame::CanFrame;

/// Per-frame CAN conformance checks.
pub(crate) struct CanValidator<'a> {
    dbc: &'a DbcDatabase,
}

impl<'a> CanValidator<'a> {
    pub fn new(dbc: &'a DbcDatabase) -> Self {
        Self { dbc }
    }

    /// Validate one frame. Returns the message layout when signal
    /// extraction can proceed.
    ///
    /// Unlike the LIN side, a declared-length mismatch does not stop
    /// analysis: CAN has no payload-dependent checksum to invalidate, and
    /// the extractor guards every signal window individually.
    pub fn validate(&self, frame: &CanFrame, report: &mut ReportBuilder) -> Option<&'a CanMessage> {
        let legal = if frame.is_fd {
            fd_len_is_legal(frame.len)
        } else {
            frame.len <= 8
        };
        if !legal {
            report.emit(
                frame.ts,
                BusKind::Can,
                frame.channel,
                FindingKind::IllegalDlc {
                    len: frame.len,
                    is_fd: frame.is_fd,
                },
            );
        }

        let message = self.dbc.message(frame.raw_id(), frame.id_width());
        let Some(message) = message else {
            report.emit(
                frame.ts,
                BusKind::Can,
                frame.channel,
                FindingKind::UnknownFrameId {
                    frame_id: frame.raw_id(),
                },
            );
            return None;
        };

        if message.length != frame.len {
            report.emit(
                frame.ts,
                BusKind::Can,
                frame.channel,
                FindingKind::LengthMismatch {
                    frame_id: frame.raw_id(),
                    expected: message.length,
                    observed: frame.len,
                },
            );
        }

        Some(message)
    }
}
