//! Domain layer for the Campaign context.

pub mod commands;
pub mod records;
