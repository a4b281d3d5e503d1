//! Netforge — Rust-native network topology descriptors.
//!
//! Typed resource declarations issued through a provisioning-runtime seam,
//! recorded into a deterministic desired-state graph. BLAKE3 fingerprints.

pub mod cli;
pub mod core;
pub mod logging;
pub mod tripwire;
