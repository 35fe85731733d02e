//! Parsed CAN database (DBC) model.
//!
//! The textual DBC grammar is an external collaborator's concern; the core
//! consumes an already-parsed [`DbcDatabase`]. Construction validates the
//! invariants the analyzer relies on (one multiplexor per message, no
//! overlapping signal windows within a mux group, sane scaling) and rejects
//! violations with [`MalformedDescription`](crate::AnalysisError::MalformedDescription).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::can::fd::fd_len_is_legal;
use crate::error::{AnalysisError, Result};
use crate::types::IdWidth;

/// Byte order of a signal's bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Little-endian: consecutive bit positions starting at the LSB.
    Intel,
    /// Big-endian, DBC convention: the start bit names the field's MSB.
    Motorola,
}

/// Role of a signal in message multiplexing.
///
/// A closed variant instead of the sentinel encoding DBC files use: a signal
/// is either plain, the multiplexor switch, or gated on one multiplexor
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MuxRole {
    /// Present in every frame of the message.
    None,
    /// The switch field selecting which multiplexed group is present.
    Multiplexor,
    /// Present only when the multiplexor holds this value.
    Multiplexed(u64),
}

/// One signal layout within a CAN message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanSignal {
    /// Signal name as declared in the database.
    pub name: String,
    /// Start bit in DBC numbering (see [`ByteOrder`]).
    pub start_bit: u16,
    /// Field width in bits, 1..=64.
    pub length_bits: u16,
    /// Bit field byte order.
    pub byte_order: ByteOrder,
    /// Two's-complement interpretation of the raw field.
    pub signed: bool,
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
    /// Multiplexing role.
    pub mux_role: MuxRole,
}

impl CanSignal {
    /// Physical value for a raw field value.
    #[inline]
    pub fn physical(&self, raw: i64) -> f64 {
        raw as f64 * self.factor + self.offset
    }
}

/// One CAN message layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanMessage {
    /// Message name as declared in the database.
    pub name: String,
    /// Declared payload length in bytes.
    pub length: u8,
    /// Whether the message is transmitted as CAN FD.
    pub is_fd: bool,
    /// Signal layouts.
    pub signals: Vec<CanSignal>,
}

impl CanMessage {
    /// The multiplexor switch signal, if the message is multiplexed.
    pub fn multiplexor(&self) -> Option<&CanSignal> {
        self.signals
            .iter()
            .find(|s| s.mux_role == MuxRole::Multiplexor)
    }
}

/// A validated database of CAN message layouts keyed by identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbcDatabase {
    messages: BTreeMap<(u32, IdWidth), CanMessage>,
}

impl DbcDatabase {
    /// Build a database, validating every message.
    ///
    /// # Errors
    ///
    /// `MalformedDescription` when a message declares an illegal length for
    /// its kind, more than one multiplexor, multiplexed signals without a
    /// multiplexor, non-finite or zero scaling, an inverted min/max range,
    /// or overlapping signal windows that can be present in the same frame.
    pub fn new(messages: BTreeMap<(u32, IdWidth), CanMessage>) -> Result<Self> {
        for ((id, width), message) in &messages {
            validate_message(*id, *width, message)?;
        }
        Ok(Self { messages })
    }

    /// An empty database (no CAN-side analysis).
    pub fn empty() -> Self {
        Self {
            messages: BTreeMap::new(),
        }
    }

    /// Look up a message layout by raw identifier and width.
    pub fn message(&self, id: u32, width: IdWidth) -> Option<&CanMessage> {
        self.messages.get(&(id, width))
    }

    /// Iterate over all message layouts.
    pub fn iter(&self) -> impl Iterator<Item = (&(u32, IdWidth), &CanMessage)> {
        self.messages.iter()
    }
}

fn validate_message(id: u32, width: IdWidth, message: &CanMessage) -> Result<()> {
    let name = &message.name;
    let length_ok = if message.is_fd {
        fd_len_is_legal(message.length)
    } else {
        message.length <= 8
    };
    if !length_ok {
        return Err(AnalysisError::MalformedDescription(format!(
            "message {name} (0x{id:X}, {}-bit): illegal length {} for its kind",
            width.bits(),
            message.length
        )));
    }

    let mux_count = message
        .signals
        .iter()
        .filter(|s| s.mux_role == MuxRole::Multiplexor)
        .count();
    if mux_count > 1 {
        return Err(AnalysisError::MalformedDescription(format!(
            "message {name}: {mux_count} multiplexor signals, at most one allowed"
        )));
    }
    let has_multiplexed = message
        .signals
        .iter()
        .any(|s| matches!(s.mux_role, MuxRole::Multiplexed(_)));
    if has_multiplexed && mux_count == 0 {
        return Err(AnalysisError::MalformedDescription(format!(
            "message {name}: multiplexed signals without a multiplexor"
        )));
    }

    for signal in &message.signals {
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
        if let (Some(min), Some(max)) = (signal.min, signal.max) {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(AnalysisError::MalformedDescription(format!(
                    "signal {}: invalid range [{min}, {max}]",
                    signal.name
                )));
            }
        }
    }

    // Signals that can appear in the same frame must not overlap. Signals
    // gated on different multiplexor values may share bits.
    for (i, a) in message.signals.iter().enumerate() {
        for b in message.signals.iter().skip(i + 1) {
            if let (MuxRole::Multiplexed(ga), MuxRole::Multiplexed(gb)) = (a.mux_role, b.mux_role) {
                if ga != gb {
                    continue;
                }
            }
            if windows_overlap(a, b) {
                return Err(AnalysisError::MalformedDescription(format!(
                    "message {name}: signals {} and {} overlap",
                    a.name, b.name
                )));
            }
        }
    }
    Ok(())
}

/// Linearized bit interval of a signal in sawtooth (MSB-walk) numbering for
/// Motorola fields, plain positions for Intel.
fn bit_interval(signal: &CanSignal) -> (usize, usize) {
    let start = signal.start_bit as usize;
    let len = signal.length_bits as usize;
    match signal.byte_order {
        ByteOrder::Intel => (start, start + len - 1),
        ByteOrder::Motorola => {
            let first = 8 * (start / 8) + (7 - start % 8);
            (first, first + len - 1)
        }
    }
}

fn windows_overlap(a: &CanSignal, b: &CanSignal) -> bool {
    if a.byte_order != b.byte_order {
        // Mixed orders index different linearizations; compare physical bit
        // positions exactly.
        return bits_of(a).any(|bit| bits_of(b).any(|other| bit == other));
    }
    let (a0, a1) = bit_interval(a);
    let (b0, b1) = bit_interval(b);
    a0 <= b1 && b0 <= a1
}

fn bits_of(signal: &CanSignal) -> impl Iterator<Item = usize> + '_ {
    let start = signal.start_bit as usize;
    let len = signal.length_bits as usize;
    (0..len).map(move |i| match signal.byte_order {
        ByteOrder::Intel => start + i,
        ByteOrder::Motorola => {
            let index = 8 * (start / 8) + (7 - start % 8) + i;
            8 * (index / 8) + (7 - index % 8)
        }
    })
}
