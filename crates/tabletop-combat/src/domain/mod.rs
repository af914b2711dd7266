//! Domain layer for the Combat context.

pub mod commands;
pub mod records;
pub mod turn_order;
