//! LIN-side analysis: frame validation, physical layer, schedule adherence.
//!
//! The validator checks each frame in isolation (parity, length, checksum);
//! the [`physical`] monitor tracks header conformance across frames; the
//! [`schedule`] analyzer checks the master's timing. All three report
//! through findings and never fail.

pub mod frame;
pub(crate) mod physical;
pub(crate) mod schedule;

use crate::bits::{classic_checksum, enhanced_checksum, protected_id};
use crate::findings::FindingKind;
use crate::ldf::{ChecksumKind, LdfDescription, LinFrameSpec};
use crate::report::ReportBuilder;
use crate::types::BusKind;

use frame::LinFrame;

/// Per-frame LIN conformance checks.
pub(crate) struct LinValidator<'a> {
    ldf: &'a LdfDescription,
}

impl<'a> LinValidator<'a> {
    pub fn new(ldf: &'a LdfDescription) -> Self {
        Self { ldf }
    }

    /// Validate one frame. Returns the frame's layout when signal
    /// extraction can proceed (spec known and length as declared).
    ///
    /// A parity failure does not stop validation: the unprotected ID is
    /// still usable, so downstream analysis continues on it. A length
    /// mismatch does stop: the checksum is undefined over a payload of the
    /// wrong size.
    pub fn validate(
        &self,
        frame: &LinFrame,
        report: &mut ReportBuilder,
    ) -> Option<&'a LinFrameSpec> {
        let id = frame.unprotected_id();

        let expected_pid = protected_id(id);
        if expected_pid != frame.pid_byte {
            report.emit(
                frame.ts,
                BusKind::Lin,
                frame.channel,
                FindingKind::PidParityError {
                    expected: expected_pid,
                    observed: frame.pid_byte,
                },
            );
        }

        let spec = self.ldf.frame(id);
        if spec.is_none() {
            report.emit(
                frame.ts,
                BusKind::Lin,
                frame.channel,
                FindingKind::UnknownFrameId {
                    frame_id: id as u32,
                },
            );
        }

        if let Some(spec) = spec {
            if spec.length != frame.dlc {
                report.emit(
                    frame.ts,
                    BusKind::Lin,
                    frame.channel,
                    FindingKind::LengthMismatch {
                        frame_id: id as u32,
                        expected: spec.length,
                        observed: frame.dlc,
                    },
                );
                return None;
            }
        }

        if let Some(kind) = self.ldf.checksum_kind_for(id) {
            // The enhanced sum uses the PID with *correct* parity; an
            // observed byte with broken parity must not poison the check.
            let expected = match kind {
                ChecksumKind::Classic => classic_checksum(frame.data()),
                ChecksumKind::Enhanced => enhanced_checksum(expected_pid, frame.data()),
            };
            if expected != frame.checksum_byte {
                report.emit(
                    frame.ts,
                    BusKind::Lin,
                    frame.channel,
                    FindingKind::ChecksumError {
                        frame_id: id,
                        expected,
                        observed: frame.checksum_byte,
                    },
                );
            }
        }

        spec
    }
}
