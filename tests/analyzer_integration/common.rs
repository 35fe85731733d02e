//! Shared fixtures: a small LIN cluster, a CAN database, and a gateway map
//! mirroring a speed signal from LIN onto CAN.

use std::collections::BTreeMap;

use linspector::bits::{enhanced_checksum, protected_id};
use linspector::{
    AnalyzerConfig, ByteOrder, CanMessage, CanSignal, ChecksumKind, DbcDatabase, Direction,
    GatewayMap, IdWidth, LdfDescription, LdfSignal, LinFrame, LinFrameSpec, LogEntry,
    MapDirection, MapRule, MuxRole, ScheduleSlot, ScheduleTable, Transform,
};

/// Frame 0x21 carries a 16-bit `speed` signal and repeats every 10 ms.
pub const SPEED_FRAME_ID: u8 = 0x21;

/// CAN message 0x100 carries the mirrored `veh_speed` signal.
pub const SPEED_CAN_ID: u32 = 0x100;

pub fn test_ldf() -> LdfDescription {
    let mut frames = BTreeMap::new();
    frames.insert(
        SPEED_FRAME_ID,
        LinFrameSpec {
            name: "VehicleStatus".into(),
            length: 4,
            checksum_kind: ChecksumKind::Enhanced,
            publisher: "BodyEcu".into(),
            subscribers: vec!["Gateway".into()],
            signals: vec![
                LdfSignal {
                    name: "speed".into(),
                    start_bit: 0,
                    length_bits: 16,
                    factor: 1.0,
                    offset: 0.0,
                    min: Some(0.0),
                    max: Some(300.0),
                    unit: "km/h".into(),
                },
                LdfSignal {
                    name: "mode".into(),
                    start_bit: 16,
                    length_bits: 4,
                    factor: 1.0,
                    offset: 0.0,
                    min: None,
                    max: None,
                    unit: String::new(),
                },
            ],
        },
    );
    let schedule = ScheduleTable {
        slots: vec![ScheduleSlot {
            frame_id: SPEED_FRAME_ID,
            period_s: 0.010,
            delay_s: 0.010,
        }],
    };
    LdfDescription::new(frames, schedule, 19_200.0).unwrap()
}

pub fn test_dbc() -> DbcDatabase {
    let mut messages = BTreeMap::new();
    messages.insert(
        (SPEED_CAN_ID, IdWidth::Standard),
        CanMessage {
            name: "GatewayStatus".into(),
            length: 8,
            is_fd: false,
            signals: vec![CanSignal {
                name: "veh_speed".into(),
                start_bit: 0,
                length_bits: 16,
                byte_order: ByteOrder::Intel,
                signed: false,
                factor: 1.0,
                offset: 0.0,
                min: Some(0.0),
                max: Some(300.0),
                unit: "km/h".into(),
                mux_role: MuxRole::None,
            }],
        },
    );
    DbcDatabase::new(messages).unwrap()
}

pub fn speed_gateway() -> GatewayMap {
    GatewayMap {
        rules: vec![MapRule {
            lin_frame_id: SPEED_FRAME_ID,
            lin_signal: "speed".into(),
            can_id: SPEED_CAN_ID,
            can_id_width: IdWidth::Standard,
            can_signal: "veh_speed".into(),
            direction: MapDirection::LinToCan,
            transform: Transform::Linear { a: 1.0, b: 0.0 },
            max_latency_s: Some(0.010),
            tolerance: None,
        }],
    }
}

pub fn config() -> AnalyzerConfig {
    AnalyzerConfig::default()
}

/// A well-formed speed frame: correct parity, declared length, enhanced
/// checksum.
pub fn speed_frame(ts: f64, speed_raw: u16) -> LogEntry {
    let data = [
        (speed_raw & 0xFF) as u8,
        (speed_raw >> 8) as u8,
        0x01, // mode
        0x00,
    ];
    let pid = protected_id(SPEED_FRAME_ID);
    LogEntry::Lin(LinFrame::new(
        ts,
        0,
        pid,
        &data,
        enhanced_checksum(pid, &data),
        Direction::Rx,
    ))
}
