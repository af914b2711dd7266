//! Tabletop — Combat context.
//!
//! Encounters, the combatants taking part in them, and the turn-order
//! engine that walks initiative order round after round.

pub mod application;
pub mod domain;
