//! Error types for trace analysis.
//!
//! Only structural failures surface here. Everything a frame can do wrong on
//! the wire is recoverable and lands in the report as a
//! [`Finding`](crate::Finding) instead; see the distinction documented on
//! [`AnalysisError`].

use thiserror::Error;

/// Hard failures that abort analysis with no partial report.
///
/// Per-frame problems (bad checksum, illegal DLC, schedule drift, ...) are
/// *findings*, not errors: they are appended to the report and analysis
/// continues. An `AnalysisError` means the analyzer cannot trust its own
/// inputs or state.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The LDF or DBC description violates an invariant the analyzer relies
    /// on, e.g. overlapping signal bit ranges or a multiplexed signal in a
    /// message without a multiplexor.
    #[error("malformed description: {0}")]
    MalformedDescription(String),

    /// A configuration value is non-finite, negative, or otherwise unusable.
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// The input stream could not be read by an external collaborator.
    #[error("input error: {0}")]
    InputError(String),

    /// A bug indicator: internal bookkeeping reached a state the analyzer
    /// promises is unreachable. Test-visible, never expected in the field.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolated(&'static str),
}

/// A specialized Result type for analysis operations.
pub type Result<T> = core::result::Result<T, AnalysisError>;
