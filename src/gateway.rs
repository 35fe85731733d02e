//! Gateway correlation.
//!
//! A gateway republishes signals between the LIN and CAN buses. For each
//! [`MapRule`] the correlator performs a windowed join between the two
//! signal streams: source samples are kept in a bounded queue covering
//! `[t_target - max_latency, t_target]`; each target sample joins with the
//! source sample closest in time. Ties between equidistant candidates
//! prefer the earlier sample, modelling gateway propagation delay.
//!
//! Joined values compare after the rule's transform with tolerance
//! `max(1e-6, 1e-3 * |expected|)` unless the rule overrides it. A reported
//! latency never exceeds the rule's window by construction.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::findings::FindingKind;
use crate::report::{GatewayRuleStats, ReportBuilder};
use crate::signal::stats::RollingStats;
use crate::types::{BusKind, IdWidth, SignalSample, Timestamp};

/// Value mapping applied to the source sample before comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    /// Target mirrors the source value.
    Identity,
    /// `expected = a * source + b`.
    Linear {
        /// Scale.
        a: f64,
        /// Offset.
        b: f64,
    },
    /// Discrete remapping keyed by the source value rounded to the nearest
    /// integer. A source value missing from the table cannot match.
    Enum(BTreeMap<i64, f64>),
}

impl Transform {
    /// Expected target value for a source value, `None` when an enum table
    /// has no entry.
    pub fn apply(&self, source: f64) -> Option<f64> {
        match self {
            Transform::Identity => Some(source),
            Transform::Linear { a, b } => Some(a * source + b),
            Transform::Enum(table) => table.get(&(source.round() as i64)).copied(),
        }
    }
}

/// Direction a rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapDirection {
    /// LIN publishes, the gateway mirrors onto CAN.
    LinToCan,
    /// CAN publishes, the gateway mirrors onto LIN.
    CanToLin,
}

/// One gateway mapping under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRule {
    /// Unprotected LIN frame ID carrying the LIN-side signal.
    pub lin_frame_id: u8,
    /// LIN-side signal name.
    pub lin_signal: String,
    /// CAN identifier carrying the CAN-side signal.
    pub can_id: u32,
    /// Width of the CAN identifier.
    pub can_id_width: IdWidth,
    /// CAN-side signal name.
    pub can_signal: String,
    /// Which side publishes.
    pub direction: MapDirection,
    /// Source-to-target value mapping.
    pub transform: Transform,
    /// Join window in seconds; `None` uses the configured
    /// `gateway_time_window`.
    pub max_latency_s: Option<f64>,
    /// Absolute comparison tolerance; `None` uses the relative default.
    pub tolerance: Option<f64>,
}

/// Ordered list of gateway rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayMap {
    /// Rules in evaluation order; indices identify rules in findings.
    pub rules: Vec<MapRule>,
}

impl GatewayMap {
    /// A map with no rules (gateway checking disabled).
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
struct RuleState {
    sources: VecDeque<(Timestamp, f64)>,
    comparisons: u64,
    matches: u64,
    mismatches: u64,
    no_source: u64,
    latency: RollingStats,
}

pub(crate) struct GatewayCorrelator {
    rules: Vec<MapRule>,
    windows: Vec<f64>,
    state: Vec<RuleState>,
    /// Rule indices with a LIN-side source, keyed by (frame id, signal).
    lin_sources: BTreeMap<(u8, String), Vec<usize>>,
    lin_targets: BTreeMap<(u8, String), Vec<usize>>,
    can_sources: BTreeMap<(u32, IdWidth, String), Vec<usize>>,
    can_targets: BTreeMap<(u32, IdWidth, String), Vec<usize>>,
}

impl GatewayCorrelator {
    pub fn new(map: &GatewayMap, config: &AnalyzerConfig) -> Self {
        let rules = map.rules.clone();
        let windows = rules
            .iter()
            .map(|rule| rule.max_latency_s.unwrap_or(config.gateway_time_window))
            .collect();
        let mut lin_sources: BTreeMap<(u8, String), Vec<usize>> = BTreeMap::new();
        let mut lin_targets: BTreeMap<(u8, String), Vec<usize>> = BTreeMap::new();
        let mut can_sources: BTreeMap<(u32, IdWidth, String), Vec<usize>> = BTreeMap::new();
        let mut can_targets: BTreeMap<(u32, IdWidth, String), Vec<usize>> = BTreeMap::new();
        for (index, rule) in rules.iter().enumerate() {
            let lin_key = (rule.lin_frame_id, rule.lin_signal.clone());
            let can_key = (rule.can_id, rule.can_id_width, rule.can_signal.clone());
            match rule.direction {
                MapDirection::LinToCan => {
                    lin_sources.entry(lin_key).or_default().push(index);
                    can_targets.entry(can_key).or_default().push(index);
                }
                MapDirection::CanToLin => {
                    can_sources.entry(can_key).or_default().push(index);
                    lin_targets.entry(lin_key).or_default().push(index);
                }
            }
        }
        let state = rules.iter().map(|_| RuleState::default()).collect();
        Self {
            rules,
            windows,
            state,
            lin_sources,
            lin_targets,
            can_sources,
            can_targets,
        }
    }

    /// Feed the samples decoded from one LIN frame.
    pub fn observe_lin(
        &mut self,
        frame_id: u8,
        channel: u8,
        samples: &[SignalSample],
        report: &mut ReportBuilder,
    ) {
        for sample in samples {
            let key = (frame_id, sample.name.clone());
            if let Some(rules) = self.lin_sources.get(&key).cloned() {
                for index in rules {
                    self.push_source(index, sample);
                }
            }
            if let Some(rules) = self.lin_targets.get(&key).cloned() {
                for index in rules {
                    self.join(index, BusKind::Lin, channel, sample, report);
                }
            }
        }
    }

    /// Feed the samples decoded from one CAN frame.
    pub fn observe_can(
        &mut self,
        can_id: u32,
        width: IdWidth,
        channel: u8,
        samples: &[SignalSample],
        report: &mut ReportBuilder,
    ) {
        for sample in samples {
            let key = (can_id, width, sample.name.clone());
            if let Some(rules) = self.can_sources.get(&key).cloned() {
                for index in rules {
                    self.push_source(index, sample);
                }
            }
            if let Some(rules) = self.can_targets.get(&key).cloned() {
                for index in rules {
                    self.join(index, BusKind::Can, channel, sample, report);
                }
            }
        }
    }

    /// Queue a source sample, dropping everything that can no longer join
    /// any future target. Keeps the queue bounded by the window even when
    /// the target side is silent.
    fn push_source(&mut self, index: usize, sample: &SignalSample) {
        let window = self.windows[index];
        let state = &mut self.state[index];
        while let Some(&(ts, _)) = state.sources.front() {
            if ts < sample.ts - window {
                state.sources.pop_front();
            } else {
                break;
            }
        }
        state.sources.push_back((sample.ts, sample.value));
    }

    fn join(
        &mut self,
        index: usize,
        bus: BusKind,
        channel: u8,
        target: &SignalSample,
        report: &mut ReportBuilder,
    ) {
        let window = self.windows[index];
        let rule = &self.rules[index];
        let state = &mut self.state[index];
        state.comparisons += 1;

        // Drop sources that fell out of the window. Samples newer than the
        // target stay queued for later targets but do not join; the queue
        // is bounded by the window either way.
        while let Some(&(ts, _)) = state.sources.front() {
            if ts < target.ts - window {
                state.sources.pop_front();
            } else {
                break;
            }
        }

        // Closest-in-time candidate at or before the target; strict
        // comparison keeps the earlier sample on a tie.
        let mut best: Option<(Timestamp, f64, f64)> = None;
        for &(ts, value) in state.sources.iter() {
            if ts > target.ts {
                break;
            }
            let distance = (target.ts - ts).abs();
            match best {
                Some((_, _, best_distance)) if distance >= best_distance => {}
                _ => best = Some((ts, value, distance)),
            }
        }

        let Some((source_ts, source_value, _)) = best else {
            state.no_source += 1;
            report.emit(
                target.ts,
                bus,
                channel,
                FindingKind::NoLinSourceInWindow {
                    rule: index,
                    signal: target.name.clone(),
                },
            );
            return;
        };

        let latency = target.ts - source_ts;
        state.latency.push(latency);

        // An enum table without an entry for the source value cannot
        // predict the target; compare against the untransformed source so
        // the finding still carries both sides.
        let expected = rule.transform.apply(source_value).unwrap_or(source_value);
        let tolerance = rule
            .tolerance
            .unwrap_or_else(|| (1e-3 * expected.abs()).max(1e-6));
        let matched = rule.transform.apply(source_value).is_some()
            && (expected - target.value).abs() <= tolerance;
        if matched {
            state.matches += 1;
        } else {
            state.mismatches += 1;
            report.emit(
                target.ts,
                bus,
                channel,
                FindingKind::GatewayValueMismatch {
                    rule: index,
                    expected,
                    observed: target.value,
                    latency_s: latency,
                },
            );
        }
    }

    /// Freeze per-rule statistics for the report.
    pub fn finish(self) -> Vec<GatewayRuleStats> {
        self.state
            .into_iter()
            .enumerate()
            .map(|(rule, state)| GatewayRuleStats {
                rule,
                comparisons: state.comparisons,
                matches: state.matches,
                mismatches: state.mismatches,
                no_source: state.no_source,
                latency: state.latency.summary(),
            })
            .collect()
    }
}
