//! Core topology logic — types, runtime seam, parameters, descriptor, rendering, snapshots.

pub mod error;
pub mod params;
pub mod render;
pub mod runtime;
pub mod state;
pub mod topology;
pub mod types;
