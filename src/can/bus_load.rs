//! Sliding-window bus-load estimation.
//!
//! The trace carries arrival times but not on-wire durations, so busy time
//! is estimated per frame: a fixed per-kind overhead plus the payload bits,
//! with worst-case stuffing (one bit per four) on the stuffed region and a
//! 3-bit inter-frame space folded into the overhead. Each window reports
//! the estimated bit count next to the derived load ratio so the estimator
//! is explicit in the output.
//!
//! Windows are `bus_load_window` long and stepped by a quarter of that, so
//! consecutive windows overlap and one frame contributes to up to four of
//! them. For CAN FD frames with BRS the payload is weighted at the data
//! bit rate while the overhead stays at the arbitration rate.

use std::collections::BTreeMap;

use crate::bits::worst_case_stuff_bits;
use crate::config::AnalyzerConfig;
use crate::report::BusLoadSample;
use crate::types::{IdWidth, Timestamp};

/// Nominal-phase overhead of a classic CAN frame with an 11-bit identifier:
/// arbitration, control, CRC, ACK, EOF, and a 3-bit inter-frame space.
pub const CLASSIC_STD_OVERHEAD_BITS: u32 = 47;

/// Classic CAN with a 29-bit identifier carries 20 extra arbitration bits.
pub const CLASSIC_EXT_OVERHEAD_BITS: u32 = 67;

/// CAN FD nominal-phase overhead (11-bit identifier), inter-frame space
/// included. The longer FD CRC is accounted here rather than in the data
/// phase.
pub const FD_STD_OVERHEAD_BITS: u32 = 49;

/// CAN FD nominal-phase overhead with a 29-bit identifier.
pub const FD_EXT_OVERHEAD_BITS: u32 = 69;

/// LIN frame bit cost: 34 header bit times plus 10 per byte (8 data bits,
/// start, stop) for payload and checksum.
pub(crate) fn lin_frame_bits(dlc: u8) -> u32 {
    34 + 10 * (dlc as u32 + 1)
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    busy_s: f64,
    bits: u64,
    frames: u32,
}

/// Accumulates per-step buckets and folds them into overlapping windows at
/// finalization. Memory is proportional to the trace duration divided by
/// the step, i.e. to the output series itself.
pub(crate) struct BusLoadEstimator {
    window_s: f64,
    step_s: f64,
    buckets: BTreeMap<u64, Bucket>,
}

/// Steps per window; windows overlap by three quarters.
const STEPS_PER_WINDOW: u64 = 4;

impl BusLoadEstimator {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            window_s: config.bus_load_window,
            step_s: config.bus_load_window / STEPS_PER_WINDOW as f64,
            buckets: BTreeMap::new(),
        }
    }

    /// Account one frame's estimated busy time at its arrival timestamp.
    pub fn add(&mut self, ts: Timestamp, busy_s: f64, bits: u64) {
        if ts < 0.0 {
            return;
        }
        let index = (ts / self.step_s) as u64;
        let bucket = self.buckets.entry(index).or_default();
        bucket.busy_s += busy_s;
        bucket.bits += bits;
        bucket.frames += 1;
    }

    /// Produce the `(window_start, load_ratio)` series.
    ///
    /// Windows start at every step from the trace start through the last
    /// occupied bucket; later starts can only be empty.
    pub fn finish(self) -> Vec<BusLoadSample> {
        if self.buckets.is_empty() {
            return Vec::new();
        }
        let last_bucket = *self.buckets.keys().next_back().expect("non-empty");
        let mut series = Vec::with_capacity(last_bucket as usize + 1);
        for start in 0..=last_bucket {
            let mut busy_s = 0.0;
            let mut bits = 0u64;
            let mut frames = 0u32;
            for step in start..start + STEPS_PER_WINDOW {
                if let Some(bucket) = self.buckets.get(&step) {
                    busy_s += bucket.busy_s;
                    bits += bucket.bits;
                    frames += bucket.frames;
                }
            }
            series.push(BusLoadSample {
                start_s: start as f64 * self.step_s,
                load_ratio: busy_s / self.window_s,
                bits_estimated: bits,
                frames,
            });
        }
        series
    }
}

/// Estimated on-wire cost of one CAN frame.
///
/// Returns `(busy_seconds, total_bits)`. With BRS the payload (and its
/// stuff bits) are clocked at the data bit rate while the overhead stays at
/// the arbitration rate, giving the weighted per-phase sum.
pub(crate) fn can_frame_cost(
    id_width: IdWidth,
    is_fd: bool,
    brs: bool,
    len: u8,
    config: &AnalyzerConfig,
) -> (f64, u64) {
    let overhead = match (is_fd, id_width) {
        (false, IdWidth::Standard) => CLASSIC_STD_OVERHEAD_BITS,
        (false, IdWidth::Extended) => CLASSIC_EXT_OVERHEAD_BITS,
        (true, IdWidth::Standard) => FD_STD_OVERHEAD_BITS,
        (true, IdWidth::Extended) => FD_EXT_OVERHEAD_BITS,
    };
    let data_bits = 8 * len as u32;
    let stuffed_data = data_bits + worst_case_stuff_bits(data_bits);
    let data_rate = if is_fd && brs {
        config.can_fd_data_bit_rate
    } else {
        config.can_bit_rate
    };
    let busy_s = overhead as f64 / config.can_bit_rate + stuffed_data as f64 / data_rate;
    (busy_s, (overhead + stuffed_data) as u64)
}
