//! Log normalizer.
//!
//! Events arrive in capture order but real loggers occasionally emit
//! regressing timestamps (clock resync, multi-controller merge). Downstream
//! math assumes monotonicity, so the normalizer clamps a regressing
//! timestamp to the previous value plus one quantum and flags the event with
//! a `NonMonotonicTimestamp` finding.

use log::warn;

use crate::findings::FindingKind;
use crate::report::ReportBuilder;
use crate::types::{LogEntry, Timestamp, TIMESTAMP_QUANTUM_S};

#[derive(Debug, Default)]
pub(crate) struct Normalizer {
    last_ts: Option<Timestamp>,
    regressions: u64,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp the entry's timestamp into monotonic order, flagging a
    /// regression. Returns the entry with its normalized timestamp.
    pub fn normalize(&mut self, mut entry: LogEntry, report: &mut ReportBuilder) -> LogEntry {
        let ts = entry.ts();
        if let Some(last) = self.last_ts {
            if ts < last {
                let clamped = last + TIMESTAMP_QUANTUM_S;
                self.regressions += 1;
                if self.regressions == 1 {
                    warn!(
                        "non-monotonic timestamp {ts} after {last}, clamping; \
                         further regressions reported as findings only"
                    );
                }
                report.emit(
                    clamped,
                    entry.bus(),
                    entry.channel(),
                    FindingKind::NonMonotonicTimestamp {
                        observed: ts,
                        clamped_to: clamped,
                    },
                );
                entry.set_ts(clamped);
            }
        }
        self.last_ts = Some(entry.ts());
        entry
    }
}
