//! Parsed LIN description (LDF) model.
//!
//! As with the DBC side, the LDF textual grammar lives outside the core: an
//! external parser produces an [`LdfDescription`] and the analyzer consumes
//! it. Frames own their signals and the schedule table references frames by
//! unprotected ID, so cross references are stable indices rather than
//! ownership cycles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Maximum LIN payload length in bytes.
pub const MAX_LIN_DATA_LEN: usize = 8;

/// Largest unprotected LIN frame ID (6 bits).
pub const MAX_LIN_ID: u8 = 63;

/// Diagnostic master-request frame ID (0x3C). Always classic checksum and
/// exempt from schedule checks.
pub const DIAG_MASTER_REQUEST_ID: u8 = 60;

/// Diagnostic slave-response frame ID (0x3D). Same special treatment as the
/// master request.
pub const DIAG_SLAVE_RESPONSE_ID: u8 = 61;

/// Returns true for the two diagnostic frame IDs.
#[inline]
pub const fn is_diagnostic_id(id: u8) -> bool {
    id == DIAG_MASTER_REQUEST_ID || id == DIAG_SLAVE_RESPONSE_ID
}

/// LIN checksum kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChecksumKind {
    /// Classic checksum (LIN 1.x): sum of data bytes only.
    #[default]
    Classic,
    /// Enhanced checksum (LIN 2.x): sum of protected ID and data bytes.
    Enhanced,
}

/// One signal layout within a LIN frame.
///
/// LIN payloads are little-endian; raw fields are unsigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdfSignal {
    /// Signal name as declared in the LDF.
    pub name: String,
    /// Start bit within the frame payload, LSB numbering.
    pub start_bit: u16,
    /// Field width in bits.
    pub length_bits: u16,
    /// Physical scaling factor.
    pub factor: f64,
    /// Physical offset.
    pub offset: f64,
    /// Declared physical minimum, if any.
    pub min: Option<f64>,
    /// Declared physical maximum, if any.
    pub max: Option<f64>,
    /// Unit string, possibly empty.
    pub unit: String,
}

impl LdfSignal {
    /// Physical value for a raw field value.
    #[inline]
    pub fn physical(&self, raw: i64) -> f64 {
        raw as f64 * self.factor + self.offset
    }
}

/// One LIN frame layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinFrameSpec {
    /// Frame name as declared in the LDF.
    pub name: String,
    /// Declared payload length in bytes, 1..=8.
    pub length: u8,
    /// Checksum kind declared by the LDF. Overridden to classic for the
    /// diagnostic IDs regardless of this field.
    pub checksum_kind: ChecksumKind,
    /// Node publishing the frame response.
    pub publisher: String,
    /// Nodes subscribed to the frame.
    pub subscribers: Vec<String>,
    /// Signal layouts.
    pub signals: Vec<LdfSignal>,
}

/// One slot of the master's schedule table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Unprotected frame ID transmitted in this slot.
    pub frame_id: u8,
    /// Repetition period of the slot in seconds.
    pub period_s: f64,
    /// Delay from the previous slot in seconds.
    pub delay_s: f64,
}

/// Ordered schedule table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTable {
    /// Slots in transmission order.
    pub slots: Vec<ScheduleSlot>,
}

impl ScheduleTable {
    /// Period for a frame ID: the `period_s` of the first slot listing it.
    pub fn period_for(&self, frame_id: u8) -> Option<f64> {
        self.slots
            .iter()
            .find(|slot| slot.frame_id == frame_id)
            .map(|slot| slot.period_s)
    }
}

/// A validated LIN cluster description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdfDescription {
    frames: BTreeMap<u8, LinFrameSpec>,
    schedule: ScheduleTable,
    bit_rate_hz: f64,
}

impl LdfDescription {
    /// Build a description, validating the invariants the analyzer relies
    /// on.
    ///
    /// # Errors
    ///
    /// `MalformedDescription` when a frame ID exceeds 63, a declared length
    /// is outside 1..=8, signal scaling is unusable, signal windows within a
    /// frame overlap, or a schedule slot has a non-positive period.
    pub fn new(
        frames: BTreeMap<u8, LinFrameSpec>,
        schedule: ScheduleTable,
        bit_rate_hz: f64,
    ) -> Result<Self> {
        if !bit_rate_hz.is_finite() || bit_rate_hz <= 0.0 {
            return Err(AnalysisError::MalformedDescription(format!(
                "LIN bit rate must be positive, got {bit_rate_hz}"
            )));
        }
        for (&id, spec) in &frames {
            validate_frame(id, spec)?;
        }
        for slot in &schedule.slots {
            if slot.frame_id > MAX_LIN_ID {
                return Err(AnalysisError::MalformedDescription(format!(
                    "schedule slot references frame ID {} out of 0..=63",
                    slot.frame_id
                )));
            }
            if !slot.period_s.is_finite() || slot.period_s <= 0.0 {
                return Err(AnalysisError::MalformedDescription(format!(
                    "schedule slot for ID {} has non-positive period {}",
                    slot.frame_id, slot.period_s
                )));
            }
            if !slot.delay_s.is_finite() || slot.delay_s < 0.0 {
                return Err(AnalysisError::MalformedDescription(format!(
                    "schedule slot for ID {} has invalid delay {}",
                    slot.frame_id, slot.delay_s
                )));
            }
        }
        Ok(Self {
            frames,
            schedule,
            bit_rate_hz,
        })
    }

    /// A description with no frames and an empty schedule, for CAN-only
    /// traces.
    pub fn empty(bit_rate_hz: f64) -> Self {
        Self {
            frames: BTreeMap::new(),
            schedule: ScheduleTable::default(),
            bit_rate_hz,
        }
    }

    /// Look up the layout for an unprotected frame ID.
    pub fn frame(&self, id: u8) -> Option<&LinFrameSpec> {
        self.frames.get(&id)
    }

    /// Iterate over all frame layouts.
    pub fn iter(&self) -> impl Iterator<Item = (&u8, &LinFrameSpec)> {
        self.frames.iter()
    }

    /// The master's schedule table.
    pub fn schedule(&self) -> &ScheduleTable {
        &self.schedule
    }

    /// Configured LIN bit rate in Hz.
    pub fn bit_rate_hz(&self) -> f64 {
        self.bit_rate_hz
    }

    /// Checksum kind to verify a frame against: the diagnostic IDs are
    /// always classic, everything else follows the LDF declaration.
    pub fn checksum_kind_for(&self, id: u8) -> Option<ChecksumKind> {
        if is_diagnostic_id(id) {
            return Some(ChecksumKind::Classic);
        }
        self.frames.get(&id).map(|spec| spec.checksum_kind)
    }
}

fn validate_frame(id: u8, spec: &LinFrameSpec) -> Result<()> {
    if id > MAX_LIN_ID {
        return Err(AnalysisError::MalformedDescription(format!(
            "frame {}: ID {id} out of 0..=63",
            spec.name
        )));
    }
    if spec.length == 0 || spec.length as usize > MAX_LIN_DATA_LEN {
        return Err(AnalysisError::MalformedDescription(format!(
            "frame {}: length {} out of 1..=8",
            spec.name, spec.length
        )));
    }
    for signal in &spec.signals {
        if signal.length_bits == 0 || signal.length_bits > 64 {
            return Err(AnalysisError::MalformedDescription(format!(
                "signal {}: length {} bits out of 1..=64",
                signal.name, signal.length_bits
            )));
        }
        if !signal.factor.is_finite() || signal.factor == 0.0 || !signal.offset.is_finite() {
            return Err(AnalysisError::MalformedDescription(format!(
                "signal {}: scaling must be finite with non-zero factor",
                signal.name
            )));
        }
    }
    // LIN fields are consecutive LSB-first bit ranges; overlap is a plain
    // interval intersection.
    let mut windows: Vec<(u32, u32, &str)> = spec
        .signals
        .iter()
        .map(|s| {
            let start = s.start_bit as u32;
            (start, start + s.length_bits as u32 - 1, s.name.as_str())
        })
        .collect();
    windows.sort_unstable();
    for pair in windows.windows(2) {
        let (_, end_a, name_a) = pair[0];
        let (start_b, _, name_b) = pair[1];
        if start_b <= end_a {
            return Err(AnalysisError::MalformedDescription(format!(
                "frame {}: signals {name_a} and {name_b} overlap",
                spec.name
            )));
        }
    }
    Ok(())
}
