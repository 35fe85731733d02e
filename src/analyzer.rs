//! Analysis orchestration.
//!
//! The [`Analyzer`] wires the pipeline together: normalized events flow
//! through the frame validators, the signal extractor, and the schedule and
//! gateway analyzers, with findings accumulating in one report builder.
//! The core is single-threaded and consumes a sequential iterator; results
//! are deterministic for identical inputs.
//!
//! Use [`analyze`] for the common run-to-completion case, or drive
//! [`Analyzer::feed`] manually and pick [`Analyzer::finish`] or
//! [`Analyzer::finish_truncated`] depending on whether the input ended
//! naturally.

use log::debug;

use crate::can::bus_load::{can_frame_cost, lin_frame_bits, BusLoadEstimator};
use crate::can::frame::CanFrame;
use crate::can::CanValidator;
use crate::config::AnalyzerConfig;
use crate::dbc::DbcDatabase;
use crate::error::{AnalysisError, Result};
use crate::findings::FindingKind;
use crate::gateway::{GatewayCorrelator, GatewayMap};
use crate::ldf::{LdfDescription, MAX_LIN_ID};
use crate::lin::frame::LinFrame;
use crate::lin::physical::PhysicalMonitor;
use crate::lin::schedule::ScheduleAnalyzer;
use crate::lin::LinValidator;
use crate::normalize::Normalizer;
use crate::report::{AnalysisReport, ReportBuilder, ReportParts};
use crate::signal::SignalExtractor;
use crate::types::{BusKind, LogEntry, Timestamp};

/// Streaming trace analyzer.
///
/// Feed normalized [`LogEntry`] events in capture order, then finalize
/// exactly once. All per-frame problems become findings in the report;
/// only structural problems (bad description, bad configuration) surface
/// as errors from [`Analyzer::new`].
pub struct Analyzer<'a> {
    lin_validator: LinValidator<'a>,
    can_validator: CanValidator<'a>,
    physical: PhysicalMonitor,
    schedule: ScheduleAnalyzer,
    extractor: SignalExtractor,
    gateway: GatewayCorrelator,
    lin_bus_load: BusLoadEstimator,
    can_bus_load: BusLoadEstimator,
    normalizer: Normalizer,
    report: ReportBuilder,
    config: AnalyzerConfig,
    lin_bit_rate_hz: f64,
    last_lin_ts: Option<Timestamp>,
}

impl<'a> Analyzer<'a> {
    /// Create an analyzer over validated descriptions.
    ///
    /// # Errors
    ///
    /// `ConfigError` for unusable thresholds, `MalformedDescription` for a
    /// gateway rule that cannot reference any LIN frame.
    pub fn new(
        ldf: &'a LdfDescription,
        dbc: &'a DbcDatabase,
        gateway: &GatewayMap,
        config: AnalyzerConfig,
    ) -> Result<Self> {
        config.validate()?;
        for (index, rule) in gateway.rules.iter().enumerate() {
            if rule.lin_frame_id > MAX_LIN_ID {
                return Err(AnalysisError::MalformedDescription(format!(
                    "gateway rule {index}: LIN frame ID {} out of 0..=63",
                    rule.lin_frame_id
                )));
            }
            if let Some(latency) = rule.max_latency_s {
                if !latency.is_finite() || latency < 0.0 {
                    return Err(AnalysisError::ConfigError(format!(
                        "gateway rule {index}: max latency must be finite and non-negative"
                    )));
                }
            }
        }

        let lin_bit_rate_hz = ldf.bit_rate_hz();
        debug!(
            "analyzer ready: {} LIN frames, {} gateway rules, LIN bit rate {lin_bit_rate_hz} Hz",
            ldf.iter().count(),
            gateway.rules.len()
        );
        Ok(Self {
            lin_validator: LinValidator::new(ldf),
            can_validator: CanValidator::new(dbc),
            physical: PhysicalMonitor::new(1.0 / lin_bit_rate_hz, &config),
            schedule: ScheduleAnalyzer::new(ldf, &config),
            extractor: SignalExtractor::new(),
            gateway: GatewayCorrelator::new(gateway, &config),
            lin_bus_load: BusLoadEstimator::new(&config),
            can_bus_load: BusLoadEstimator::new(&config),
            normalizer: Normalizer::new(),
            report: ReportBuilder::new(),
            config,
            lin_bit_rate_hz,
            last_lin_ts: None,
        })
    }

    /// Consume one event.
    pub fn feed(&mut self, entry: LogEntry) {
        let entry = self.normalizer.normalize(entry, &mut self.report);
        self.report.count_frame(entry.bus(), entry.ts());
        match entry {
            LogEntry::Lin(frame) => self.feed_lin(frame),
            LogEntry::Can(frame) => self.feed_can(frame),
        }
    }

    fn feed_lin(&mut self, frame: LinFrame) {
        if let Some(last) = self.last_lin_ts {
            let gap = frame.ts - last;
            if gap > self.config.inactivity_threshold && self.config.inactivity_threshold > 0.0 {
                self.report.emit(
                    frame.ts,
                    BusKind::Lin,
                    frame.channel,
                    FindingKind::BusInactive { gap_s: gap },
                );
            }
        }
        self.last_lin_ts = Some(frame.ts);

        let bits = lin_frame_bits(frame.dlc);
        self.lin_bus_load
            .add(frame.ts, bits as f64 / self.lin_bit_rate_hz, bits as u64);

        let spec = self.lin_validator.validate(&frame, &mut self.report);
        self.physical.observe(&frame, &mut self.report);
        self.schedule.observe(
            frame.ts,
            frame.channel,
            frame.unprotected_id(),
            &mut self.report,
        );

        if let Some(spec) = spec {
            let samples = self.extractor.extract_lin(&frame, spec, &mut self.report);
            self.gateway.observe_lin(
                frame.unprotected_id(),
                frame.channel,
                &samples,
                &mut self.report,
            );
        }
    }

    fn feed_can(&mut self, frame: CanFrame) {
        let (busy_s, bits) = can_frame_cost(
            frame.id_width(),
            frame.is_fd,
            frame.brs,
            frame.len,
            &self.config,
        );
        self.can_bus_load.add(frame.ts, busy_s, bits);

        let message = self.can_validator.validate(&frame, &mut self.report);
        if let Some(message) = message {
            let samples = self.extractor.extract_can(&frame, message, &mut self.report);
            self.gateway.observe_can(
                frame.raw_id(),
                frame.id_width(),
                frame.channel,
                &samples,
                &mut self.report,
            );
        }
    }

    /// Finalize after the input ended naturally.
    pub fn finish(self) -> AnalysisReport {
        self.finalize(false)
    }

    /// Finalize after the input was cut short. Partial statistics are
    /// reported and the report carries a `TruncatedInput` finding plus the
    /// `truncated` summary flag.
    pub fn finish_truncated(mut self) -> AnalysisReport {
        let ts = self.report.last_ts();
        self.report
            .emit(ts, BusKind::Lin, 0, FindingKind::TruncatedInput);
        self.finalize(true)
    }

    fn finalize(self, truncated: bool) -> AnalysisReport {
        let parts = ReportParts {
            signal_statistics: self.extractor.finish(),
            schedule_statistics: self.schedule.finish(),
            gateway_statistics: self.gateway.finish(),
            bus_load_series: self.can_bus_load.finish(),
            lin_bus_load_series: self.lin_bus_load.finish(),
        };
        self.report.finish(parts, truncated)
    }
}

/// Run a complete analysis over an event iterator.
///
/// Equivalent to constructing an [`Analyzer`], feeding every entry, and
/// calling [`Analyzer::finish`].
pub fn analyze<I>(
    entries: I,
    ldf: &LdfDescription,
    dbc: &DbcDatabase,
    gateway: &GatewayMap,
    config: AnalyzerConfig,
) -> Result<AnalysisReport>
where
    I: IntoIterator<Item = LogEntry>,
{
    let mut analyzer = Analyzer::new(ldf, dbc, gateway, config)?;
    for entry in entries {
        analyzer.feed(entry);
    }
    Ok(analyzer.finish())
}

/// Run an analysis over a fallible event iterator.
///
/// An `Err` item means the external collaborator could not read its input;
/// analysis stops immediately with [`AnalysisError::InputError`] and no
/// partial report, per the failure semantics for structural errors.
pub fn analyze_fallible<I>(
    entries: I,
    ldf: &LdfDescription,
    dbc: &DbcDatabase,
    gateway: &GatewayMap,
    config: AnalyzerConfig,
) -> Result<AnalysisReport>
where
    I: IntoIterator<Item = core::result::Result<LogEntry, String>>,
{
    let mut analyzer = Analyzer::new(ldf, dbc, gateway, config)?;
    for entry in entries {
        match entry {
            Ok(entry) => analyzer.feed(entry),
            Err(reason) => return Err(AnalysisError::InputError(reason)),
        }
    }
    Ok(analyzer.finish())
}
