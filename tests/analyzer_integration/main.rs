//! End-to-end analyzer integration tests.

mod common;

mod boundaries;
mod determinism;
mod gateway_mapping;
mod seed_scenarios;
mod signal_roundtrip;
