//! LIN physical-layer monitor.
//!
//! The only state-bearing check in the analyzer: per channel it walks a
//! header state machine `LookingForBreak -> LookingForSync -> LookingForPid
//! -> Payload`. Any violation emits a finding and resets the channel to
//! `LookingForBreak`. Frames without sub-frame timing leave the machine
//! untouched.
//!
//! Thresholds:
//! - break field >= 13 nominal bit times
//! - break delimiter >= 1 bit time
//! - sync byte == 0x55
//! - measured bit rate within the configured fractional tolerance
//!
//! Boundary values are in-bounds: a break of exactly 13 bit times passes.

use std::collections::BTreeMap;

use crate::config::AnalyzerConfig;
use crate::findings::FindingKind;
use crate::lin::frame::LinFrame;
use crate::report::ReportBuilder;
use crate::types::BusKind;

/// Nominal LIN sync field value.
pub const SYNC_BYTE: u8 = 0x55;

/// Minimum break length in nominal bit times.
pub const MIN_BREAK_BITS: f64 = 13.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum HeaderPhase {
    #[default]
    LookingForBreak,
    LookingForSync,
    LookingForPid,
    Payload,
}

pub(crate) struct PhysicalMonitor {
    bit_time_s: f64,
    nominal_rate_hz: f64,
    rate_tolerance: f64,
    phases: BTreeMap<u8, HeaderPhase>,
}

impl PhysicalMonitor {
    /// `bit_time_s` comes from the LDF's declared cluster rate; the
    /// measured-rate check compares against the configured nominal rate.
    pub fn new(bit_time_s: f64, config: &AnalyzerConfig) -> Self {
        Self {
            bit_time_s,
            nominal_rate_hz: config.bit_rate,
            rate_tolerance: config.bit_rate_tolerance,
            phases: BTreeMap::new(),
        }
    }

    pub fn observe(&mut self, frame: &LinFrame, report: &mut ReportBuilder) {
        let Some(timing) = frame.timing else {
            return;
        };
        let phase = self.phases.entry(frame.channel).or_default();
        *phase = HeaderPhase::LookingForBreak;

        // Break field.
        if let Some(break_s) = timing.break_s {
            let min_s = MIN_BREAK_BITS * self.bit_time_s;
            if break_s < min_s {
                report.emit(
                    frame.ts,
                    BusKind::Lin,
                    frame.channel,
                    FindingKind::BreakTooShort {
                        measured_s: break_s,
                        min_s,
                    },
                );
                return;
            }
        }
        *phase = HeaderPhase::LookingForSync;

        // Break delimiter and sync field.
        if let Some(delimiter_s) = timing.break_delimiter_s {
            if delimiter_s < self.bit_time_s {
                report.emit(
                    frame.ts,
                    BusKind::Lin,
                    frame.channel,
                    FindingKind::BreakDelimiterShort {
                        measured_s: delimiter_s,
                        min_s: self.bit_time_s,
                    },
                );
                *phase = HeaderPhase::LookingForBreak;
                return;
            }
        }
        if let Some(sync) = timing.sync_byte {
            if sync != SYNC_BYTE {
                report.emit(
                    frame.ts,
                    BusKind::Lin,
                    frame.channel,
                    FindingKind::SyncByteWrong { observed: sync },
                );
                *phase = HeaderPhase::LookingForBreak;
                return;
            }
        }
        if let Some(measured_hz) = timing.bit_rate_hz {
            let limit = self.nominal_rate_hz * self.rate_tolerance;
            if (measured_hz - self.nominal_rate_hz).abs() > limit {
                report.emit(
                    frame.ts,
                    BusKind::Lin,
                    frame.channel,
                    FindingKind::BitRateOutOfTolerance {
                        measured_hz,
                        nominal_hz: self.nominal_rate_hz,
                    },
                );
                *phase = HeaderPhase::LookingForBreak;
                return;
            }
        }
        *phase = HeaderPhase::LookingForPid;

        // The PID and payload are present by construction of the event, so
        // the remaining transitions always complete.
        *phase = HeaderPhase::Payload;
        *phase = HeaderPhase::LookingForBreak;
    }
}
