//! Gateway correlation through the full pipeline.

use embedded_can::StandardId;
use linspector::{analyze, CanFrame, Direction, FindingKind, LogEntry};

use crate::common::{config, speed_frame, speed_gateway, test_dbc, test_ldf, SPEED_CAN_ID};

fn can_speed(ts: f64, speed_raw: u16) -> LogEntry {
    let id = StandardId::new(SPEED_CAN_ID as u16).unwrap();
    let data = [
        (speed_raw & 0xFF) as u8,
        (speed_raw >> 8) as u8,
        0,
        0,
        0,
        0,
        0,
        0,
    ];
    LogEntry::Can(CanFrame::new(ts, 1, id, false, false, &data, Direction::Rx).unwrap())
}

/// LIN publishes 60 km/h at t = 1.000, CAN mirrors it at t = 1.004: a clean
/// join with 4 ms latency.
#[test]
fn matching_gateway_pair() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let map = speed_gateway();
    let report = analyze(
        [speed_frame(1.000, 60), can_speed(1.004, 60)],
        &ldf,
        &dbc,
        &map,
        config(),
    )
    .unwrap();

    assert!(report.gateway_findings.is_empty());
    let stats = &report.gateway_statistics[0];
    assert_eq!(stats.comparisons, 1);
    assert_eq!(stats.matches, 1);
    assert!((stats.latency.mean - 0.004).abs() < 1e-9);
}

/// The same pair with a mirrored value of 62 km/h is a value mismatch
/// carrying both sides, and its latency stays inside the rule's window.
#[test]
fn mismatched_gateway_pair() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let map = speed_gateway();
    let report = analyze(
        [speed_frame(1.000, 60), can_speed(1.004, 62)],
        &ldf,
        &dbc,
        &map,
        config(),
    )
    .unwrap();

    assert_eq!(report.gateway_findings.len(), 1);
    match &report.gateway_findings[0].kind {
        FindingKind::GatewayValueMismatch {
            expected,
            observed,
            latency_s,
            ..
        } => {
            assert_eq!(*expected, 60.0);
            assert_eq!(*observed, 62.0);
            assert!(latency_s.abs() <= 0.010);
        }
        other => panic!("unexpected finding {other:?}"),
    }
}

/// A CAN sample with no LIN source inside the window is reported as such,
/// not silently matched against a stale sample.
#[test]
fn stale_source_is_not_joined() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let map = speed_gateway();
    let report = analyze(
        [speed_frame(1.000, 60), can_speed(1.050, 60)],
        &ldf,
        &dbc,
        &map,
        config(),
    )
    .unwrap();

    assert_eq!(report.gateway_findings.len(), 1);
    assert!(matches!(
        report.gateway_findings[0].kind,
        FindingKind::NoLinSourceInWindow { .. }
    ));
    assert_eq!(report.gateway_statistics[0].no_source, 1);
}
