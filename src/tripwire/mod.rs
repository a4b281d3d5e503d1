//! Tripwire — BLAKE3 fingerprints and drift detection against snapshots.

pub mod drift;
pub mod hasher;
