//! Analyzer configuration.
//!
//! All thresholds live in one immutable [`AnalyzerConfig`] value that is
//! threaded through the analyzer's constructor. There is no process-wide
//! state, so independent analyses (and tests) can run concurrently with
//! different settings.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Tunable thresholds for a single analysis run.
///
/// Every field has a sensible default; construct with `AnalyzerConfig::default()`
/// and override what you need. [`AnalyzerConfig::validate`] rejects non-finite
/// or negative values before any frame is touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Nominal LIN bit rate in Hz.
    /// Default: 19 200
    pub bit_rate: f64,

    /// Fractional tolerance on the measured LIN bit rate.
    /// Default: 0.005 (±0.5 %)
    pub bit_rate_tolerance: f64,

    /// Default correlation window for gateway rules that omit
    /// `max_latency_s`, in seconds.
    /// Default: 0.010
    pub gateway_time_window: f64,

    /// Allowed drift from the schedule's expected arrival time, in seconds.
    /// Deviations exactly equal to the tolerance are in-bounds.
    /// Default: 0.0005
    pub schedule_tolerance: f64,

    /// Allowed inter-arrival jitter, in seconds.
    /// Default: 0.001
    pub max_jitter: f64,

    /// Window length for bus-load estimation, in seconds. Windows are
    /// stepped by a quarter of this length.
    /// Default: 0.100
    pub bus_load_window: f64,

    /// Nominal CAN arbitration-phase bit rate in Hz, used by the bus-load
    /// estimator.
    /// Default: 500 000
    pub can_bit_rate: f64,

    /// CAN FD data-phase bit rate in Hz, applied to the payload of frames
    /// transmitted with BRS.
    /// Default: 2 000 000
    pub can_fd_data_bit_rate: f64,

    /// LIN bus silence longer than this, between the first and last frame of
    /// the trace, is reported as `BusInactive`.
    /// Default: 0.5
    pub inactivity_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            bit_rate: 19_200.0,
            bit_rate_tolerance: 0.005,
            gateway_time_window: 0.010,
            schedule_tolerance: 0.0005,
            max_jitter: 0.001,
            bus_load_window: 0.100,
            can_bit_rate: 500_000.0,
            can_fd_data_bit_rate: 2_000_000.0,
            inactivity_threshold: 0.5,
        }
    }
}

impl AnalyzerConfig {
    /// Check that every threshold is finite and usable.
    ///
    /// Bit rates and windows must be strictly positive; tolerances may be
    /// zero but not negative.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("bit_rate", self.bit_rate),
            ("bus_load_window", self.bus_load_window),
            ("can_bit_rate", self.can_bit_rate),
            ("can_fd_data_bit_rate", self.can_fd_data_bit_rate),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::ConfigError(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        let non_negative = [
            ("bit_rate_tolerance", self.bit_rate_tolerance),
            ("gateway_time_window", self.gateway_time_window),
            ("schedule_tolerance", self.schedule_tolerance),
            ("max_jitter", self.max_jitter),
            ("inactivity_threshold", self.inactivity_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::ConfigError(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}
