//! The canonical seed scenarios: checksum, parity, schedule drift, FD
//! lengths, Motorola extraction.

use linspector::bits::{classic_checksum, protected_id};
use linspector::{
    analyze, CanFrame, Direction, FindingKind, GatewayMap, LinFrame, LogEntry,
};

use crate::common::{self, config, speed_frame, test_dbc, test_ldf};

/// Classic checksum over `4A FF 01 02`: the end-around-carry sum is 0x4D,
/// complemented 0xB2. Diagnostic ID 0x3C uses classic regardless of the
/// LDF.
#[test]
fn classic_checksum_on_diagnostic_frame() {
    assert_eq!(classic_checksum(&[0x4A, 0xFF, 0x01, 0x02]), 0xB2);

    let ldf = test_ldf();
    let dbc = test_dbc();
    let data = [0x4A, 0xFF, 0x01, 0x02];
    let pid = protected_id(0x3C);

    // Correct byte: no finding.
    let good = LogEntry::Lin(LinFrame::new(0.0, 0, pid, &data, 0xB2, Direction::Rx));
    let report = analyze([good], &ldf, &dbc, &GatewayMap::empty(), config()).unwrap();
    assert!(!report
        .summary
        .error_count_by_kind
        .contains_key("ChecksumError"));

    // Off-by-one byte: exactly one checksum finding.
    let bad = LogEntry::Lin(LinFrame::new(0.0, 0, pid, &data, 0xB3, Direction::Rx));
    let report = analyze([bad], &ldf, &dbc, &GatewayMap::empty(), config()).unwrap();
    assert_eq!(report.summary.error_count_by_kind["ChecksumError"], 1);
    match &report.frame_findings[0].kind {
        FindingKind::ChecksumError {
            expected, observed, ..
        } => {
            assert_eq!(*expected, 0xB2);
            assert_eq!(*observed, 0xB3);
        }
        other => panic!("unexpected finding {other:?}"),
    }
}

/// Unprotected ID 0x10 protects to PID 0x90. The raw ID byte on the wire is
/// a parity error carrying both values.
#[test]
fn pid_parity_seed_case() {
    assert_eq!(protected_id(0x10), 0x90);

    let ldf = test_ldf();
    let dbc = test_dbc();

    let valid = LogEntry::Lin(LinFrame::new(0.0, 0, 0x90, &[0x00], 0xFF, Direction::Rx));
    let report = analyze([valid], &ldf, &dbc, &GatewayMap::empty(), config()).unwrap();
    assert!(!report
        .summary
        .error_count_by_kind
        .contains_key("PidParityError"));

    let invalid = LogEntry::Lin(LinFrame::new(0.0, 0, 0x10, &[0x00], 0xFF, Direction::Rx));
    let report = analyze([invalid], &ldf, &dbc, &GatewayMap::empty(), config()).unwrap();
    let finding = report
        .frame_findings
        .iter()
        .find_map(|f| match f.kind {
            FindingKind::PidParityError { expected, observed } => Some((expected, observed)),
            _ => None,
        })
        .expect("parity finding");
    assert_eq!(finding, (0x90, 0x10));
}

/// Period 10 ms, tolerance 500 us. A +500 us arrival sits exactly on the
/// boundary (in-bounds); +600 us is reported.
#[test]
fn schedule_drift_seed_case() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let entries: Vec<LogEntry> = [0.000, 0.0105, 0.0200, 0.0306]
        .iter()
        .map(|&ts| speed_frame(ts, 100))
        .collect();
    let report = analyze(entries, &ldf, &dbc, &GatewayMap::empty(), config()).unwrap();

    let drifts: Vec<(f64, f64)> = report
        .schedule_findings
        .iter()
        .filter_map(|f| match f.kind {
            FindingKind::ScheduleDrift { deviation_s, .. } => Some((f.ts, deviation_s)),
            _ => None,
        })
        .collect();
    assert_eq!(drifts.len(), 1);
    assert!((drifts[0].0 - 0.0306).abs() < 1e-9);
    assert!((drifts[0].1 - 0.0006).abs() < 1e-6);

    // Arrival statistics cover every observation.
    let stats = &report.schedule_statistics[&common::SPEED_FRAME_ID];
    assert_eq!(stats.arrivals, 4);
}

/// A 29-bit frame claiming FD with a 9-byte payload: no FD DLC encodes 9
/// bytes.
#[test]
fn can_fd_illegal_length_seed_case() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let id = embedded_can::ExtendedId::new(0x0ABC_DEF0).unwrap();
    let frame =
        CanFrame::new(0.0, 1, id, true, true, &[0u8; 9], Direction::Rx).unwrap();
    let report = analyze(
        [LogEntry::Can(frame)],
        &ldf,
        &dbc,
        &GatewayMap::empty(),
        config(),
    )
    .unwrap();
    assert_eq!(report.summary.error_count_by_kind["IllegalDlc"], 1);
}

/// Motorola extraction over `12 34 56 78`: a 16-bit field whose MSB sits at
/// byte 0 bit 7 reads 0x1234; with factor 0.1 and offset -10 the physical
/// value is 456.0. The same field anchored at byte 2 reads 0x5678.
#[test]
fn motorola_extraction_seed_case() {
    use linspector::bits::extract_raw;
    use linspector::ByteOrder;

    let payload = [0x12, 0x34, 0x56, 0x78];
    let raw = extract_raw(&payload, 7, 16, ByteOrder::Motorola, false).unwrap();
    assert_eq!(raw, 0x1234);
    let physical = raw as f64 * 0.1 + (-10.0);
    assert!((physical - 456.0).abs() < 1e-9);

    let raw = extract_raw(&payload, 23, 16, ByteOrder::Motorola, false).unwrap();
    assert_eq!(raw, 0x5678);
}
