//! Reproducibility: identical inputs yield byte-identical serialized
//! reports, and the normalizer keeps downstream math sane.

use linspector::{analyze, Direction, FindingKind, LinFrame, LogEntry};

use crate::common::{config, speed_frame, speed_gateway, test_dbc, test_ldf};

fn mixed_trace() -> Vec<LogEntry> {
    let mut entries = Vec::new();
    for k in 0..50u32 {
        entries.push(speed_frame(k as f64 * 0.010, 50 + k as u16));
    }
    // A malformed frame in the middle: broken parity and checksum.
    entries.insert(
        10,
        LogEntry::Lin(LinFrame::new(
            0.095,
            0,
            0x21,
            &[0xDE, 0xAD, 0xBE, 0xEF],
            0x00,
            Direction::Rx,
        )),
    );
    entries
}

#[test]
fn identical_inputs_serialize_identically() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let map = speed_gateway();

    let first = analyze(mixed_trace(), &ldf, &dbc, &map, config()).unwrap();
    let second = analyze(mixed_trace(), &ldf, &dbc, &map, config()).unwrap();

    assert_eq!(first, second);
    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn findings_are_sorted_by_timestamp() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let report = analyze(
        mixed_trace(),
        &ldf,
        &dbc,
        &speed_gateway(),
        config(),
    )
    .unwrap();
    let timestamps: Vec<f64> = report.all_findings().map(|f| f.ts).collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(timestamps, sorted);
    // Sequence numbers are unique.
    let mut seqs: Vec<u64> = report.all_findings().map(|f| f.seq).collect();
    seqs.sort_unstable();
    seqs.dedup();
    assert_eq!(seqs.len(), report.summary.total_findings as usize);
}

#[test]
fn regressing_timestamp_is_clamped_and_flagged() {
    let ldf = test_ldf();
    let dbc = test_dbc();
    let entries = vec![
        speed_frame(0.010, 60),
        speed_frame(0.002, 61), // regresses by 8 ms
        speed_frame(0.020, 62),
    ];
    let report = analyze(entries, &ldf, &dbc, &speed_gateway(), config()).unwrap();
    assert_eq!(
        report.summary.error_count_by_kind["NonMonotonicTimestamp"],
        1
    );
    let clamped = report
        .timing_findings
        .iter()
        .find_map(|f| match f.kind {
            FindingKind::NonMonotonicTimestamp { clamped_to, .. } => Some(clamped_to),
            _ => None,
        })
        .unwrap();
    // One quantum past the previous timestamp.
    assert!((clamped - 0.010001).abs() < 1e-9);
}
