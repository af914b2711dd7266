//! Tabletop — Campaign context.
//!
//! Responsible for campaigns, their play sessions, and the characters, NPCs
//! and monsters that combatants are copied from.

pub mod application;
pub mod domain;
