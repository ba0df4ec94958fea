//! Deterministic binary serialization for ledgr.
//!
//! Entry signing payloads, block content hashes and persisted snapshots all
//! go through the same bincode configuration, so identical values always
//! produce identical bytes on every platform.

mod bincode_config;

pub use bincode_config::{deserialize, serialize};
