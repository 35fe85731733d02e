#![forbid(unsafe_code)]

//! # linspector
//!
//! Offline validation of captured LIN and CAN bus traces against two
//! declarative network descriptions: a LIN Description File (LDF) and a CAN
//! database (DBC).
//!
//! The analyzer answers three questions about a trace:
//!
//! - were the frames on the wire well-formed at the protocol level
//!   (checksum, PID parity, payload lengths, physical-layer header timing);
//! - did the LIN master obey its schedule (drift, jitter, missed slots);
//! - did a gateway republishing signals between the buses preserve signal
//!   semantics and timing.
//!
//! ## Design
//!
//! The core is offline and deterministic: identical inputs yield
//! byte-identical serialized reports. Text parsing (log lines, LDF/DBC
//! grammars) lives outside the crate; external collaborators supply parsed
//! [`LdfDescription`] / [`DbcDatabase`] values and an iterator of
//! normalized [`LogEntry`] events, and get back a typed
//! [`AnalysisReport`].
//!
//! Per-frame problems are never fatal: they are recorded as [`Finding`]
//! values and analysis continues. Only structural problems (a malformed
//! description, an unusable configuration) abort with an
//! [`AnalysisError`].
//!
//! ## Quick start
//!
//! ```
//! use linspector::{analyze, AnalyzerConfig, DbcDatabase, GatewayMap, LdfDescription};
//! use linspector::{Direction, LinFrame, LogEntry};
//! use linspector::bits::{classic_checksum, protected_id};
//!
//! # fn main() -> linspector::Result<()> {
//! let ldf = LdfDescription::empty(19_200.0);
//! let dbc = DbcDatabase::empty();
//!
//! let data = [0x4A, 0xFF, 0x01, 0x02];
//! let frame = LinFrame::new(
//!     0.0,
//!     0,
//!     protected_id(0x3C),
//!     &data,
//!     classic_checksum(&data),
//!     Direction::Rx,
//! );
//!
//! let report = analyze(
//!     [LogEntry::Lin(frame)],
//!     &ldf,
//!     &dbc,
//!     &GatewayMap::empty(),
//!     AnalyzerConfig::default(),
//! )?;
//! assert_eq!(report.summary.total_frames_lin, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bits`] | Parity, checksum, and bit-field primitives |
//! | [`ldf`] | Parsed LIN description model |
//! | [`dbc`] | Parsed CAN database model |
//! | [`lin`] | LIN frame type, validator, physical layer, schedule |
//! | [`can`] | CAN frame type, validator, FD lengths, bus load |
//! | [`signal`] | Signal extraction and online statistics |
//! | [`gateway`] | Gateway map and windowed correlation |
//! | [`findings`] | Finding kinds and deterministic ordering |
//! | [`report`] | Report aggregation |
//! | [`analyzer`] | Pipeline orchestration |
//! | [`error`] | Error types and [`Result`] alias |

pub mod analyzer;
pub mod bits;
pub mod can;
pub mod config;
pub mod dbc;
pub mod error;
pub mod findings;
pub mod gateway;
pub mod ldf;
pub mod lin;
mod normalize;
pub mod report;
pub mod signal;
mod types;

// Re-export commonly used types at the crate root
pub use analyzer::{analyze, analyze_fallible, Analyzer};
pub use can::frame::CanFrame;
pub use config::AnalyzerConfig;
pub use dbc::{ByteOrder, CanMessage, CanSignal, DbcDatabase, MuxRole};
pub use error::{AnalysisError, Result};
pub use findings::{Finding, FindingCategory, FindingKind};
pub use gateway::{GatewayMap, MapDirection, MapRule, Transform};
pub use ldf::{ChecksumKind, LdfDescription, LdfSignal, LinFrameSpec, ScheduleSlot, ScheduleTable};
pub use lin::frame::{LinFrame, LinFrameTiming};
pub use report::{AnalysisReport, BusLoadSample, GatewayRuleStats, ReportSummary, ScheduleFrameStats};
pub use signal::stats::StatSummary;
pub use types::{BusKind, Direction, IdWidth, LogEntry, SignalSample, Timestamp};
