//! Commands for the Combat context.

use tabletop_core::command::Command;
use tabletop_core::record::RecordId;
use uuid::Uuid;

use super::records::{CombatantDraft, CombatantEdit};
use super::turn_order::Direction;

/// Command to open a new encounter in a campaign.
#[derive(Debug, Clone)]
pub struct CreateEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new encounter's identifier.
    pub encounter_id: RecordId,
    /// Owning campaign.
    pub campaign_id: RecordId,
    /// Display name.
    pub name: String,
}

impl Command for CreateEncounter {
    fn command_type(&self) -> &'static str {
        "combat.create_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.encounter_id
    }
}

/// Command to mark an encounter running or finished.
#[derive(Debug, Clone)]
pub struct SetEncounterActive {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter to update.
    pub encounter_id: RecordId,
    /// New state.
    pub active: bool,
}

impl Command for SetEncounterActive {
    fn command_type(&self) -> &'static str {
        "combat.set_encounter_active"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.encounter_id
    }
}

/// Command to delete an encounter together with its combatants.
#[derive(Debug, Clone)]
pub struct DeleteEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter to delete.
    pub encounter_id: RecordId,
}

impl Command for DeleteEncounter {
    fn command_type(&self) -> &'static str {
        "combat.delete_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.encounter_id
    }
}

/// Command to move the turn to the next or previous living combatant.
#[derive(Debug, Clone)]
pub struct AdvanceTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter whose turn moves.
    pub encounter_id: RecordId,
    /// Which way to move.
    pub direction: Direction,
}

impl Command for AdvanceTurn {
    fn command_type(&self) -> &'static str {
        "combat.advance_turn"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.encounter_id
    }
}

/// Command to add one or more combatants to an encounter.
#[derive(Debug, Clone)]
pub struct AddCombatant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter to join.
    pub encounter_id: RecordId,
    /// Template values.
    pub draft: CombatantDraft,
    /// Number of copies. Above 1 only for NPCs and monsters.
    pub quantity: usize,
}

impl Command for AddCombatant {
    fn command_type(&self) -> &'static str {
        "combat.add_combatant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.encounter_id
    }
}

/// Command to take a combatant out of its encounter.
#[derive(Debug, Clone)]
pub struct RemoveCombatant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The combatant to remove.
    pub combatant_id: RecordId,
}

impl Command for RemoveCombatant {
    fn command_type(&self) -> &'static str {
        "combat.remove_combatant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.combatant_id
    }
}

/// Command to overwrite a combatant's editable fields.
#[derive(Debug, Clone)]
pub struct EditCombatant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The combatant to edit.
    pub combatant_id: RecordId,
    /// Replacement values.
    pub edit: CombatantEdit,
}

impl Command for EditCombatant {
    fn command_type(&self) -> &'static str {
        "combat.edit_combatant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.combatant_id
    }
}

/// Command to damage (negative) or heal (positive) a combatant.
#[derive(Debug, Clone)]
pub struct ApplyHpDelta {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The combatant hit or healed.
    pub combatant_id: RecordId,
    /// Change in hit points.
    pub delta: i32,
}

impl Command for ApplyHpDelta {
    fn command_type(&self) -> &'static str {
        "combat.apply_hp_delta"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.combatant_id
    }
}

/// Command to flag a combatant dead or alive.
#[derive(Debug, Clone)]
pub struct SetDead {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The combatant to update.
    pub combatant_id: RecordId,
    /// New state.
    pub dead: bool,
}

impl Command for SetDead {
    fn command_type(&self) -> &'static str {
        "combat.set_dead"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.combatant_id
    }
}

/// Command to replace a combatant's condition list.
#[derive(Debug, Clone)]
pub struct SetConditions {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The combatant to update.
    pub combatant_id: RecordId,
    /// The complete new list.
    pub conditions: Vec<String>,
}

impl Command for SetConditions {
    fn command_type(&self) -> &'static str {
        "combat.set_conditions"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.combatant_id
    }
}

/// Command to apply one condition to a combatant.
#[derive(Debug, Clone)]
pub struct AddCondition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The combatant to update.
    pub combatant_id: RecordId,
    /// Condition name.
    pub condition: String,
}

impl Command for AddCondition {
    fn command_type(&self) -> &'static str {
        "combat.add_condition"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.combatant_id
    }
}

/// Command to lift one condition from a combatant.
#[derive(Debug, Clone)]
pub struct RemoveCondition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The combatant to update.
    pub combatant_id: RecordId,
    /// Condition name.
    pub condition: String,
}

impl Command for RemoveCondition {
    fn command_type(&self) -> &'static str {
        "combat.remove_condition"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.combatant_id
    }
}
