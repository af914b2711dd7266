//! Query handlers for the Combat context.
//!
//! Views are derived from records on every read: combatants are sorted by
//! initiative and the acting index is resolved from the turn pointer.

use serde::Serialize;
use tabletop_core::error::DomainError;
use tabletop_core::record::{Filter, RecordId};
use tabletop_core::store::RecordStore;

use crate::application::command_handlers::sorted_combatants;
use crate::domain::records::{Combatant, Encounter};
use crate::domain::turn_order;

/// Read-only view of an encounter in initiative order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterView {
    /// The encounter record.
    pub encounter: Encounter,
    /// Combatants, highest initiative first.
    pub combatants: Vec<Combatant>,
    /// Index of the acting combatant, `None` when there are no combatants.
    pub current_index: Option<usize>,
}

impl EncounterView {
    /// Builds a view from an encounter and its combatants in any order.
    #[must_use]
    pub fn from_parts(encounter: Encounter, mut combatants: Vec<Combatant>) -> Self {
        turn_order::sort_by_initiative(&mut combatants);
        let current_index = turn_order::resolve_index(
            encounter.active_combatant_id.as_ref(),
            encounter.current_turn,
            &combatants,
        );
        Self {
            encounter,
            combatants,
            current_index,
        }
    }

    /// The combatant whose turn it is.
    #[must_use]
    pub fn acting(&self) -> Option<&Combatant> {
        self.current_index.and_then(|i| self.combatants.get(i))
    }

    /// Combatants not flagged dead.
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.combatants.iter().filter(|c| !c.is_dead).count()
    }
}

/// Retrieves an encounter with its combatants in initiative order.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the encounter does not exist.
pub async fn get_encounter(
    encounter_id: &RecordId,
    encounters: &dyn RecordStore<Encounter>,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<EncounterView, DomainError> {
    let encounter = encounters
        .find_one(encounter_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(encounter_id.clone()))?;
    let order = sorted_combatants(encounter_id, combatants).await?;
    Ok(EncounterView::from_parts(encounter, order))
}

/// Lists a campaign's encounters, newest first.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_encounters(
    campaign_id: &RecordId,
    encounters: &dyn RecordStore<Encounter>,
) -> Result<Vec<Encounter>, DomainError> {
    let mut list = encounters
        .find(&Filter::Parent(campaign_id.clone()))
        .await?;
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(list)
}
