//! Encode/decode round trips for the bit-field primitives.

use linspector::bits::{extract_raw, insert_raw};
use linspector::ByteOrder;

/// Encoding a physical value and decoding it back loses at most half a
/// scale step.
#[test]
fn physical_value_round_trip_within_half_step() {
    let factor: f64 = 0.25;
    let offset: f64 = -100.0;
    for order in [ByteOrder::Intel, ByteOrder::Motorola] {
        for &value in &[-100.0, -55.3, 0.0, 0.1, 17.77, 399.9] {
            let raw = ((value - offset) / factor).round() as u64;
            let mut payload = [0u8; 8];
            let start_bit = match order {
                ByteOrder::Intel => 4,
                ByteOrder::Motorola => 3,
            };
            assert!(insert_raw(&mut payload, start_bit, 16, order, raw));
            let decoded = extract_raw(&payload, start_bit, 16, order, false).unwrap();
            let physical = decoded as f64 * factor + offset;
            assert!(
                (value - physical).abs() <= factor / 2.0,
                "{order:?}: {value} decoded as {physical}"
            );
        }
    }
}

/// Every field position and width survives an insert/extract cycle.
#[test]
fn raw_round_trip_across_positions() {
    for order in [ByteOrder::Intel, ByteOrder::Motorola] {
        for start_bit in 0..32u16 {
            for length_bits in [1u16, 3, 8, 13, 16] {
                let mut payload = [0xFFu8; 8];
                let raw = 0x5A5A_5A5Au64 & ((1u64 << length_bits) - 1);
                if !insert_raw(&mut payload, start_bit, length_bits, order, raw) {
                    continue;
                }
                let decoded =
                    extract_raw(&payload, start_bit, length_bits, order, false).unwrap();
                assert_eq!(
                    decoded as u64, raw,
                    "{order:?} start {start_bit} len {length_bits}"
                );
            }
        }
    }
}

/// Signed fields sign-extend on extraction.
#[test]
fn signed_round_trip() {
    let mut payload = [0u8; 4];
    // -5 in a 12-bit field.
    let raw = (-5i64 as u64) & 0xFFF;
    assert!(insert_raw(&mut payload, 4, 12, ByteOrder::Intel, raw));
    assert_eq!(
        extract_raw(&payload, 4, 12, ByteOrder::Intel, true),
        Some(-5)
    );
}
