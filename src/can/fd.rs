//! CAN FD length and DLC handling.
//!
//! CAN FD keeps the 4-bit DLC field of classic CAN but maps values above 8
//! to discrete payload sizes. A frame is only well-formed when its on-wire
//! byte count is exactly one of those sizes; anything in between (say, 9
//! bytes) cannot be encoded and is reported as `IllegalDlc`.

/// Maximum CAN FD payload length in bytes.
pub const MAX_FD_DATA_LEN: usize = 64;

/// Maximum classic CAN payload length in bytes.
pub const MAX_CLASSIC_DATA_LEN: usize = 8;

/// The discrete payload sizes CAN FD can encode above 8 bytes.
pub const FD_LONG_LENGTHS: [u8; 7] = [12, 16, 20, 24, 32, 48, 64];

/// Whether a payload byte count is encodable as a CAN FD frame.
///
/// Legal lengths are 0..=8 plus the discrete set {12, 16, 20, 24, 32, 48,
/// 64}.
#[inline]
pub const fn fd_len_is_legal(len: u8) -> bool {
    matches!(len, 0..=8 | 12 | 16 | 20 | 24 | 32 | 48 | 64)
}

/// Payload length encoded by a DLC value.
#[inline]
pub const fn dlc_to_len(dlc: u8) -> usize {
    match dlc {
        0..=8 => dlc as usize,
        9 => 12,
        10 => 16,
        11 => 20,
        12 => 24,
        13 => 32,
        14 => 48,
        _ => 64,
    }
}

/// Smallest DLC whose encoded length holds `len` bytes.
#[inline]
pub const fn len_to_dlc(len: usize) -> u8 {
    match len {
        0..=8 => len as u8,
        9..=12 => 9,
        13..=16 => 10,
        17..=20 => 11,
        21..=24 => 12,
        25..=32 => 13,
        33..=48 => 14,
        _ => 15,
    }
}
