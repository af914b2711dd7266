//! Commands issued against the record stores.

use uuid::Uuid;

use crate::record::RecordId;

/// A request to change records. Every command names the record it acts on
/// and carries a correlation id for tracing.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable dotted name, e.g. `combat.advance_turn`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The record the command creates or changes.
    fn target_id(&self) -> &RecordId;
}
