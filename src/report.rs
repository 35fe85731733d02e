//! Report aggregation.
//!
//! Findings accumulate in a crate-internal builder during the pass and are
//! finalized exactly once into an [`AnalysisReport`]. Finalization sorts
//! findings by `(timestamp, kind, sequence)` and derives the global counters
//! last, so identical inputs always produce byte-identical serialized
//! reports.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::findings::{Finding, FindingCategory, FindingKind};
use crate::signal::stats::StatSummary;
use crate::types::{BusKind, Timestamp};

/// One bus-load measurement window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusLoadSample {
    /// Window start in seconds since trace start.
    pub start_s: f64,
    /// Estimated busy fraction of the window, 0..=1 (may exceed 1 when the
    /// estimate overshoots a saturated bus).
    pub load_ratio: f64,
    /// Estimated on-wire bits inside the window, stuffing included.
    pub bits_estimated: u64,
    /// Frames contributing to the window.
    pub frames: u32,
}

/// Arrival statistics for one scheduled LIN frame ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFrameStats {
    /// Mean observed period in seconds.
    pub mean_period_s: f64,
    /// Population standard deviation of the observed period.
    pub stddev_s: f64,
    /// Smallest observed jitter in seconds.
    pub min_jitter_s: f64,
    /// Largest observed jitter in seconds.
    pub max_jitter_s: f64,
    /// Number of observed arrivals.
    pub arrivals: u64,
}

/// Correlation statistics for one gateway rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRuleStats {
    /// Index of the rule in the gateway map.
    pub rule: usize,
    /// Target samples that attempted a join.
    pub comparisons: u64,
    /// Joins whose values agreed within tolerance.
    pub matches: u64,
    /// Joins whose values disagreed.
    pub mismatches: u64,
    /// Target samples with no source in the window.
    pub no_source: u64,
    /// Latency distribution over successful joins.
    pub latency: StatSummary,
}

/// Scalar summary counters, derived last during finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// LIN frames consumed.
    pub total_frames_lin: u64,
    /// CAN frames consumed.
    pub total_frames_can: u64,
    /// All findings across categories.
    pub total_findings: u64,
    /// Findings per kind name.
    pub error_count_by_kind: BTreeMap<String, u64>,
    /// Trace duration in seconds (last minus first normalized timestamp).
    pub duration_s: f64,
    /// Whether the input ended before its natural end.
    pub truncated: bool,
}

/// The finalized analysis result.
///
/// Serialization to HTML or any other format is the reporter's concern; the
/// core only promises this value is deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Frame-level conformance findings.
    pub frame_findings: Vec<Finding>,
    /// Stream timing findings.
    pub timing_findings: Vec<Finding>,
    /// LIN physical-layer findings.
    pub physical_findings: Vec<Finding>,
    /// Schedule adherence findings.
    pub schedule_findings: Vec<Finding>,
    /// Gateway correlation findings.
    pub gateway_findings: Vec<Finding>,
    /// Per-signal value statistics.
    pub signal_statistics: BTreeMap<String, StatSummary>,
    /// Per-frame-ID schedule statistics.
    pub schedule_statistics: BTreeMap<u8, ScheduleFrameStats>,
    /// Per-rule gateway statistics, in rule order.
    pub gateway_statistics: Vec<GatewayRuleStats>,
    /// CAN bus-load series.
    pub bus_load_series: Vec<BusLoadSample>,
    /// LIN bus-load series.
    pub lin_bus_load_series: Vec<BusLoadSample>,
    /// Scalar summary counters.
    pub summary: ReportSummary,
}

impl AnalysisReport {
    /// All findings in report order, across categories.
    pub fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        // Categories partition the sorted vector, so chaining preserves the
        // per-category order but not the global one; re-sort lazily.
        let mut all: Vec<&Finding> = self
            .frame_findings
            .iter()
            .chain(&self.timing_findings)
            .chain(&self.physical_findings)
            .chain(&self.schedule_findings)
            .chain(&self.gateway_findings)
            .collect();
        all.sort_by(|a, b| a.report_order(b));
        all.into_iter()
    }
}

/// Incremental report state. Built during the pass, finalized exactly once.
#[derive(Debug, Default)]
pub(crate) struct ReportBuilder {
    findings: Vec<Finding>,
    next_seq: u64,
    total_frames_lin: u64,
    total_frames_can: u64,
    first_ts: Option<Timestamp>,
    last_ts: Option<Timestamp>,
}

/// Component outputs merged in at finalization.
#[derive(Debug, Default)]
pub(crate) struct ReportParts {
    pub signal_statistics: BTreeMap<String, StatSummary>,
    pub schedule_statistics: BTreeMap<u8, ScheduleFrameStats>,
    pub gateway_statistics: Vec<GatewayRuleStats>,
    pub bus_load_series: Vec<BusLoadSample>,
    pub lin_bus_load_series: Vec<BusLoadSample>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding, assigning its sequence number.
    pub fn emit(&mut self, ts: Timestamp, bus: BusKind, channel: u8, kind: FindingKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.findings.push(Finding {
            ts,
            bus,
            channel,
            kind,
            seq,
        });
    }

    /// Record a consumed frame for the counters and the duration.
    pub fn count_frame(&mut self, bus: BusKind, ts: Timestamp) {
        match bus {
            BusKind::Lin => self.total_frames_lin += 1,
            BusKind::Can => self.total_frames_can += 1,
        }
        if self.first_ts.is_none() {
            self.first_ts = Some(ts);
        }
        self.last_ts = Some(ts);
    }

    /// Last normalized timestamp seen, for findings emitted at end of input.
    pub fn last_ts(&self) -> Timestamp {
        self.last_ts.unwrap_or(0.0)
    }

    /// Sort, partition, and derive counters. Consumes the builder so the
    /// report is finalized exactly once.
    pub fn finish(mut self, parts: ReportParts, truncated: bool) -> AnalysisReport {
        self.findings.sort_by(|a, b| a.report_order(b));

        let mut error_count_by_kind: BTreeMap<String, u64> = BTreeMap::new();
        for finding in &self.findings {
            *error_count_by_kind
                .entry(finding.kind.name().to_string())
                .or_default() += 1;
        }
        let total_findings = self.findings.len() as u64;

        let mut frame_findings = Vec::new();
        let mut timing_findings = Vec::new();
        let mut physical_findings = Vec::new();
        let mut schedule_findings = Vec::new();
        let mut gateway_findings = Vec::new();
        for finding in self.findings {
            match finding.kind.category() {
                FindingCategory::Frame => frame_findings.push(finding),
                FindingCategory::Timing => timing_findings.push(finding),
                FindingCategory::Physical => physical_findings.push(finding),
                FindingCategory::Schedule => schedule_findings.push(finding),
                FindingCategory::Gateway => gateway_findings.push(finding),
            }
        }

        let duration_s = match (self.first_ts, self.last_ts) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };

        debug!(
            "report finalized: {} findings over {} LIN / {} CAN frames",
            total_findings, self.total_frames_lin, self.total_frames_can
        );

        AnalysisReport {
            frame_findings,
            timing_findings,
            physical_findings,
            schedule_findings,
            gateway_findings,
            signal_statistics: parts.signal_statistics,
            schedule_statistics: parts.schedule_statistics,
            gateway_statistics: parts.gateway_statistics,
            bus_load_series: parts.bus_load_series,
            lin_bus_load_series: parts.lin_bus_load_series,
            summary: ReportSummary {
                total_frames_lin: self.total_frames_lin,
                total_frames_can: self.total_frames_can,
                total_findings,
                error_count_by_kind,
                duration_s,
                truncated,
            },
        }
    }
}
