//! Tabletop campaign manager — application host.
//!
//! Wires the record stores, clock and RNG into [`state::AppState`], sets up
//! tracing, persists user settings, debounces session note edits and keeps
//! live encounter snapshots for a rendering layer.

pub mod config;
pub mod error;
pub mod notes;
pub mod settings;
pub mod state;
pub mod telemetry;
pub mod tracker;
