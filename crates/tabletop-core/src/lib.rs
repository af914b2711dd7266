//! Tabletop Core — shared domain abstractions.
//!
//! This crate defines the record, store and determinism traits that every
//! context crate depends on. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod record;
pub mod rng;
pub mod store;
