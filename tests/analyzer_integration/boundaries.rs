//! Boundary cases: extreme payload lengths, long schedules, truncation,
//! and structural rejection.

use embedded_can::StandardId;
use linspector::{
    analyze, AnalysisError, Analyzer, AnalyzerConfig, CanFrame, DbcDatabase, Direction,
    GatewayMap, LogEntry,
};

use crate::common::{config, speed_frame, test_dbc, test_ldf, SPEED_FRAME_ID};

/// Payload length 0 and the kind's maximum both validate (classic CAN and
/// CAN FD).
#[test]
fn zero_and_maximum_payloads_validate() {
    let ldf = test_ldf();
    let mut messages = std::collections::BTreeMap::new();
    messages.insert(
        (0x200u32, linspector::IdWidth::Standard),
        linspector::CanMessage {
            name: "Empty".into(),
            length: 0,
            is_fd: false,
            signals: Vec::new(),
        },
    );
    messages.insert(
        (0x201u32, linspector::IdWidth::Standard),
        linspector::CanMessage {
            name: "Full".into(),
            length: 64,
            is_fd: true,
            signals: Vec::new(),
        },
    );
    let dbc = DbcDatabase::new(messages).unwrap();

    let empty = CanFrame::new(
        0.0,
        0,
        StandardId::new(0x200).unwrap(),
        false,
        false,
        &[],
        Direction::Rx,
    )
    .unwrap();
    let full = CanFrame::new(
        0.001,
        0,
        StandardId::new(0x201).unwrap(),
        true,
        true,
        &[0x55; 64],
        Direction::Rx,
    )
    .unwrap();
    let report = analyze(
        [LogEntry::Can(empty), LogEntry::Can(full)],
        &ldf,
        &dbc,
        &GatewayMap::empty(),
        config(),
    )
    .unwrap();
    assert_eq!(report.summary.total_findings, 0);
    assert_eq!(report.summary.total_frames_can, 2);
}

/// A single slot repeated ten thousand times on its period produces exactly
/// those arrivals and no schedule findings.
#[test]
fn long_schedule_run_is_clean() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let entries: Vec<LogEntry> = (0..10_000u32)
        .map(|k| speed_frame(k as f64 * 0.010, 80))
        .collect();
    let report = analyze(entries, &ldf, &dbc, &GatewayMap::empty(), config()).unwrap();

    assert!(report.schedule_findings.is_empty());
    let stats = &report.schedule_statistics[&SPEED_FRAME_ID];
    assert_eq!(stats.arrivals, 10_000);
    assert!((stats.mean_period_s - 0.010).abs() < 1e-9);
    // The speed signal was decoded once per frame.
    assert_eq!(report.signal_statistics["speed"].samples, 10_000);
}

/// Ending the iterator early still finalizes cleanly with partial
/// statistics and a truncation marker.
#[test]
fn truncated_input_reports_partial_statistics() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let mut analyzer =
        Analyzer::new(&ldf, &dbc, &GatewayMap::empty(), config()).unwrap();
    for k in 0..7u32 {
        analyzer.feed(speed_frame(k as f64 * 0.010, 42));
    }
    let report = analyzer.finish_truncated();
    assert!(report.summary.truncated);
    assert_eq!(report.summary.error_count_by_kind["TruncatedInput"], 1);
    assert_eq!(report.summary.total_frames_lin, 7);
    assert_eq!(report.signal_statistics["speed"].samples, 7);
    // The truncation marker sits at the last seen timestamp.
    let marker = report
        .timing_findings
        .iter()
        .find(|f| matches!(f.kind, linspector::FindingKind::TruncatedInput))
        .unwrap();
    assert!((marker.ts - 0.060).abs() < 1e-9);
}

/// Structural problems abort with no partial report.
#[test]
fn structural_rejection() {
    let ldf = test_ldf();
    let dbc = test_dbc();

    let bad_config = AnalyzerConfig {
        schedule_tolerance: -1.0,
        ..AnalyzerConfig::default()
    };
    assert!(matches!(
        Analyzer::new(&ldf, &dbc, &GatewayMap::empty(), bad_config),
        Err(AnalysisError::ConfigError(_))
    ));

    // Overlapping DBC signals are rejected at construction.
    let mut messages = std::collections::BTreeMap::new();
    messages.insert(
        (0x300u32, linspector::IdWidth::Standard),
        linspector::CanMessage {
            name: "Overlap".into(),
            length: 8,
            is_fd: false,
            signals: vec![
                linspector::CanSignal {
                    name: "A".into(),
                    start_bit: 0,
                    length_bits: 12,
                    byte_order: linspector::ByteOrder::Intel,
                    signed: false,
                    factor: 1.0,
                    offset: 0.0,
                    min: None,
                    max: None,
                    unit: String::new(),
                    mux_role: linspector::MuxRole::None,
                },
                linspector::CanSignal {
                    name: "B".into(),
                    start_bit: 8,
                    length_bits: 8,
                    byte_order: linspector::ByteOrder::Intel,
                    signed: false,
                    factor: 1.0,
                    offset: 0.0,
                    min: None,
                    max: None,
                    unit: String::new(),
                    mux_role: linspector::MuxRole::None,
                },
            ],
        },
    );
    assert!(matches!(
        DbcDatabase::new(messages),
        Err(AnalysisError::MalformedDescription(_))
    ));
}
