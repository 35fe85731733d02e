//! Schedule adherence analysis.
//!
//! The schedule table induces, for each frame ID, an expected arrival
//! sequence `t0 + k * period` anchored at the first observed arrival of
//! that ID (not at a wall clock). Each later arrival is compared against
//! the nearest expected slot; inter-arrival jitter and swallowed slots are
//! tracked separately. Diagnostic IDs bypass every check.
//!
//! Tolerances are inclusive: a deviation of exactly `schedule_tolerance`
//! is in-bounds.

use std::collections::BTreeMap;

use crate::config::AnalyzerConfig;
use crate::findings::FindingKind;
use crate::ldf::{is_diagnostic_id, LdfDescription};
use crate::report::{ReportBuilder, ScheduleFrameStats};
use crate::signal::stats::RollingStats;
use crate::types::{BusKind, Timestamp};

/// A gap of this many periods with no arrival counts as missed slots.
const MISSED_SLOT_FACTOR: f64 = 1.5;

/// Timestamps carry microsecond precision; a deviation that matches the
/// tolerance in decimal must not tip over it through binary rounding.
const BOUNDARY_SLACK_S: f64 = 1e-9;

#[derive(Debug, Default)]
struct FrameArrivals {
    t0: Timestamp,
    prev: Option<Timestamp>,
    periods: RollingStats,
    jitter_min: f64,
    jitter_max: f64,
    arrivals: u64,
}

pub(crate) struct ScheduleAnalyzer {
    periods: BTreeMap<u8, f64>,
    tolerance_s: f64,
    max_jitter_s: f64,
    state: BTreeMap<u8, FrameArrivals>,
}

impl ScheduleAnalyzer {
    pub fn new(ldf: &LdfDescription, config: &AnalyzerConfig) -> Self {
        let mut periods = BTreeMap::new();
        for slot in &ldf.schedule().slots {
            // The first slot listing an ID defines its period.
            periods.entry(slot.frame_id).or_insert(slot.period_s);
        }
        Self {
            periods,
            tolerance_s: config.schedule_tolerance,
            max_jitter_s: config.max_jitter,
            state: BTreeMap::new(),
        }
    }

    /// Record one observed header.
    pub fn observe(&mut self, ts: Timestamp, channel: u8, frame_id: u8, report: &mut ReportBuilder) {
        if is_diagnostic_id(frame_id) {
            return;
        }
        let Some(&period) = self.periods.get(&frame_id) else {
            report.emit(
                ts,
                BusKind::Lin,
                channel,
                FindingKind::UnexpectedFrame { frame_id },
            );
            return;
        };

        let entry = self.state.entry(frame_id).or_default();
        entry.arrivals += 1;
        let Some(prev) = entry.prev else {
            // First arrival anchors the expected sequence.
            entry.t0 = ts;
            entry.prev = Some(ts);
            return;
        };

        let expected_k = ((ts - entry.t0) / period).round();
        let deviation = ts - (entry.t0 + expected_k * period);
        if deviation.abs() > self.tolerance_s + BOUNDARY_SLACK_S {
            report.emit(
                ts,
                BusKind::Lin,
                channel,
                FindingKind::ScheduleDrift {
                    frame_id,
                    deviation_s: deviation,
                },
            );
        }

        let delta = ts - prev;
        let jitter = delta - period;
        if jitter.abs() > self.max_jitter_s + BOUNDARY_SLACK_S {
            report.emit(
                ts,
                BusKind::Lin,
                channel,
                FindingKind::JitterExceeded {
                    frame_id,
                    jitter_s: jitter,
                },
            );
        }
        if delta >= MISSED_SLOT_FACTOR * period {
            let missed = ((delta / period).round() as u32).saturating_sub(1).max(1);
            report.emit(
                ts,
                BusKind::Lin,
                channel,
                FindingKind::MissedSlot {
                    frame_id,
                    gap_s: delta,
                    missed,
                },
            );
        }

        entry.periods.push(delta);
        if entry.periods.count() == 1 {
            entry.jitter_min = jitter;
            entry.jitter_max = jitter;
        } else {
            entry.jitter_min = entry.jitter_min.min(jitter);
            entry.jitter_max = entry.jitter_max.max(jitter);
        }
        entry.prev = Some(ts);
    }

    /// Freeze per-frame statistics for the report.
    pub fn finish(self) -> BTreeMap<u8, ScheduleFrameStats> {
        self.state
            .into_iter()
            .map(|(frame_id, arrivals)| {
                (
                    frame_id,
                    ScheduleFrameStats {
                        mean_period_s: arrivals.periods.mean(),
                        stddev_s: arrivals.periods.stddev(),
                        min_jitter_s: arrivals.jitter_min,
                        max_jitter_s: arrivals.jitter_max,
                        arrivals: arrivals.arrivals,
                    },
                )
            })
            .collect()
    }
}
