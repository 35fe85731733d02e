//! Signal extraction and per-signal statistics.
//!
//! Decodes physical values from validated frames using the LDF (LIN side)
//! or DBC (CAN side) layouts. Multiplexed messages extract the multiplexor
//! field first and then only the signals whose group is selected. Every
//! extraction is total: a window outside the observed payload produces a
//! `SignalFieldOutOfPayload` finding, never undefined behavior.

pub mod stats;

use std::collections::BTreeMap;

use crate::bits::extract_raw;
use crate::can::frame::CanFrame;
use crate::dbc::{ByteOrder, CanMessage, CanSignal, MuxRole};
use crate::findings::FindingKind;
use crate::ldf::{LdfSignal, LinFrameSpec};
use crate::lin::frame::LinFrame;
use crate::report::ReportBuilder;
use crate::signal::stats::{RollingStats, StatSummary};
use crate::types::{BusKind, SignalSample, Timestamp};

/// Streaming signal decoder with per-signal rolling statistics.
#[derive(Debug, Default)]
pub(crate) struct SignalExtractor {
    stats: BTreeMap<String, RollingStats>,
}

impl SignalExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode all signals of a LIN frame. LIN payloads are little-endian
    /// with unsigned raw fields.
    pub fn extract_lin(
        &mut self,
        frame: &LinFrame,
        spec: &LinFrameSpec,
        report: &mut ReportBuilder,
    ) -> Vec<SignalSample> {
        let mut samples = Vec::with_capacity(spec.signals.len());
        for signal in &spec.signals {
            let raw = match extract_raw(
                frame.data(),
                signal.start_bit,
                signal.length_bits,
                ByteOrder::Intel,
                false,
            ) {
                Some(raw) => raw,
                None => {
                    report.emit(
                        frame.ts,
                        BusKind::Lin,
                        frame.channel,
                        FindingKind::SignalFieldOutOfPayload {
                            signal: signal.name.clone(),
                            start_bit: signal.start_bit,
                            length_bits: signal.length_bits,
                            payload_len: frame.dlc,
                        },
                    );
                    continue;
                }
            };
            let value = signal.physical(raw);
            self.check_lin_range(frame, signal, value, report);
            self.record(frame.ts, &signal.name, value, &mut samples);
        }
        samples
    }

    /// Decode all signals of a CAN frame, honoring multiplexing.
    pub fn extract_can(
        &mut self,
        frame: &CanFrame,
        message: &CanMessage,
        report: &mut ReportBuilder,
    ) -> Vec<SignalSample> {
        let mux_value = message.multiplexor().and_then(|mux| {
            let raw = extract_raw(
                frame.data(),
                mux.start_bit,
                mux.length_bits,
                mux.byte_order,
                false,
            );
            if raw.is_none() {
                report.emit(
                    frame.ts,
                    BusKind::Can,
                    frame.channel,
                    FindingKind::SignalFieldOutOfPayload {
                        signal: mux.name.clone(),
                        start_bit: mux.start_bit,
                        length_bits: mux.length_bits,
                        payload_len: frame.len,
                    },
                );
            }
            raw.map(|raw| raw as u64)
        });

        let mut samples = Vec::with_capacity(message.signals.len());
        for signal in &message.signals {
            match signal.mux_role {
                MuxRole::None => {}
                // The multiplexor itself was already decoded above; its
                // value is still reported as a sample below.
                MuxRole::Multiplexor => {}
                MuxRole::Multiplexed(group) => {
                    if mux_value != Some(group) {
                        continue;
                    }
                }
            }
            let raw = match extract_raw(
                frame.data(),
                signal.start_bit,
                signal.length_bits,
                signal.byte_order,
                signal.signed,
            ) {
                Some(raw) => raw,
                None => {
                    if signal.mux_role != MuxRole::Multiplexor {
                        report.emit(
                            frame.ts,
                            BusKind::Can,
                            frame.channel,
                            FindingKind::SignalFieldOutOfPayload {
                                signal: signal.name.clone(),
                                start_bit: signal.start_bit,
                                length_bits: signal.length_bits,
                                payload_len: frame.len,
                            },
                        );
                    }
                    continue;
                }
            };
            let value = signal.physical(raw);
            self.check_can_range(frame, signal, value, report);
            self.record(frame.ts, &signal.name, value, &mut samples);
        }
        samples
    }

    fn check_lin_range(
        &self,
        frame: &LinFrame,
        signal: &LdfSignal,
        value: f64,
        report: &mut ReportBuilder,
    ) {
        if let (Some(min), Some(max)) = (signal.min, signal.max) {
            if value < min || value > max {
                report.emit(
                    frame.ts,
                    BusKind::Lin,
                    frame.channel,
                    FindingKind::SignalOutOfRange {
                        signal: signal.name.clone(),
                        value,
                        min,
                        max,
                    },
                );
            }
        }
    }

    fn check_can_range(
        &self,
        frame: &CanFrame,
        signal: &CanSignal,
        value: f64,
        report: &mut ReportBuilder,
    ) {
        if let (Some(min), Some(max)) = (signal.min, signal.max) {
            if value < min || value > max {
                report.emit(
                    frame.ts,
                    BusKind::Can,
                    frame.channel,
                    FindingKind::SignalOutOfRange {
                        signal: signal.name.clone(),
                        value,
                        min,
                        max,
                    },
                );
            }
        }
    }

    fn record(&mut self, ts: Timestamp, name: &str, value: f64, samples: &mut Vec<SignalSample>) {
        self.stats.entry(name.to_string()).or_default().push(value);
        samples.push(SignalSample {
            ts,
            name: name.to_string(),
            value,
        });
    }

    /// Freeze per-signal statistics for the report.
    pub fn finish(self) -> BTreeMap<String, StatSummary> {
        self.stats
            .into_iter()
            .map(|(name, stats)| (name, stats.summary()))
            .collect()
    }
}
