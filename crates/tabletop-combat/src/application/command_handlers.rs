//! Command handlers for the Combat context.
//!
//! Turn changes are computed from a snapshot of the encounter and its sorted
//! combatants, then written with compare-and-set on the encounter version.
//! Combatant mutations are store-side patches, so rapid successive changes
//! never overwrite each other.

use std::sync::Mutex;

use tabletop_core::clock::Clock;
use tabletop_core::error::DomainError;
use tabletop_core::record::{Filter, RecordId};
use tabletop_core::rng::DeterministicRng;
use tabletop_core::store::RecordStore;
use tracing::{debug, info, instrument, warn};

use crate::domain::commands::{
    AddCombatant, AddCondition, AdvanceTurn, ApplyHpDelta, CreateEncounter, DeleteEncounter,
    EditCombatant, RemoveCombatant, RemoveCondition, SetConditions, SetDead, SetEncounterActive,
};
use crate::domain::records::{
    Combatant, CombatantKind, Encounter, clamp_initiative, hp_after_delta,
};
use crate::domain::turn_order::{self, TurnCursor};

/// Identifier prefix of encounter records.
pub const ENCOUNTER_ID_PREFIX: &str = "enc";

/// Identifier prefix of combatant records.
pub const COMBATANT_ID_PREFIX: &str = "cbt";

fn required_name(value: &str, what: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_owned())
}

fn roll_d20(rng: &mut dyn DeterministicRng) -> i32 {
    i32::try_from(rng.roll_die(20)).unwrap_or(20)
}

async fn load_encounter(
    encounter_id: &RecordId,
    encounters: &dyn RecordStore<Encounter>,
) -> Result<Encounter, DomainError> {
    encounters
        .find_one(encounter_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(encounter_id.clone()))
}

async fn load_combatant(
    combatant_id: &RecordId,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Combatant, DomainError> {
    combatants
        .find_one(combatant_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(combatant_id.clone()))
}

/// Loads an encounter's combatants in initiative order.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn sorted_combatants(
    encounter_id: &RecordId,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Vec<Combatant>, DomainError> {
    let mut order = combatants
        .find(&Filter::Parent(encounter_id.clone()))
        .await?;
    turn_order::sort_by_initiative(&mut order);
    Ok(order)
}

/// Re-points the encounter's turn after its combatant list changed.
/// `before` is the sorted list as it was prior to the change.
async fn realign_turn(
    encounter_id: &RecordId,
    before: &[Combatant],
    encounters: &dyn RecordStore<Encounter>,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Encounter, DomainError> {
    let encounter = load_encounter(encounter_id, encounters).await?;
    let after = sorted_combatants(encounter_id, combatants).await?;
    let pointer = turn_order::realign(
        encounter.active_combatant_id.as_ref(),
        encounter.current_turn,
        before,
        &after,
    );

    if pointer.active_combatant_id == encounter.active_combatant_id
        && pointer.current_turn == encounter.current_turn
    {
        return Ok(encounter);
    }

    debug!(
        encounter_id = %encounter_id,
        current_turn = pointer.current_turn,
        "turn pointer realigned"
    );
    encounters
        .update(encounter_id, Some(encounter.version), &|e: &mut Encounter| {
            e.active_combatant_id.clone_from(&pointer.active_combatant_id);
            e.current_turn = pointer.current_turn;
        })
        .await
}

/// Realigns after a committed write, logging a failure instead of
/// returning it.
async fn realign_after_write(
    encounter_id: &RecordId,
    before: &[Combatant],
    encounters: &dyn RecordStore<Encounter>,
    combatants: &dyn RecordStore<Combatant>,
) {
    if let Err(e) = realign_turn(encounter_id, before, encounters, combatants).await {
        warn!(encounter_id = %encounter_id, error = %e, "turn pointer not realigned");
    }
}

/// Handles the `CreateEncounter` command: round 1, first turn, running.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the name is blank, or a store error
/// if the insert fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, encounter_id = %command.encounter_id))]
pub async fn handle_create_encounter(
    command: &CreateEncounter,
    clock: &dyn Clock,
    encounters: &dyn RecordStore<Encounter>,
) -> Result<Encounter, DomainError> {
    let name = required_name(&command.name, "encounter name")?;
    let now = clock.now();

    let encounter = encounters
        .insert(Encounter {
            id: command.encounter_id.clone(),
            campaign_id: command.campaign_id.clone(),
            name,
            round: 1,
            current_turn: 0,
            active_combatant_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            version: 0,
        })
        .await?;

    info!(campaign_id = %encounter.campaign_id, "encounter created");
    Ok(encounter)
}

/// Handles the `SetEncounterActive` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the encounter does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, encounter_id = %command.encounter_id))]
pub async fn handle_set_encounter_active(
    command: &SetEncounterActive,
    encounters: &dyn RecordStore<Encounter>,
) -> Result<Encounter, DomainError> {
    let active = command.active;
    encounters
        .update(&command.encounter_id, None, &|e: &mut Encounter| {
            e.is_active = active;
        })
        .await
}

/// Handles the `DeleteEncounter` command. Combatants go first, then the
/// encounter itself.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the encounter does not exist, or a
/// store error if any removal fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, encounter_id = %command.encounter_id))]
pub async fn handle_delete_encounter(
    command: &DeleteEncounter,
    encounters: &dyn RecordStore<Encounter>,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<(), DomainError> {
    load_encounter(&command.encounter_id, encounters).await?;

    let members = combatants
        .find(&Filter::Parent(command.encounter_id.clone()))
        .await?;
    for combatant in &members {
        combatants.remove(&combatant.id).await?;
    }
    encounters.remove(&command.encounter_id).await?;

    info!(removed_combatants = members.len(), "encounter deleted");
    Ok(())
}

/// Handles the `AdvanceTurn` command: moves to the next (or previous)
/// living combatant and persists round, index and acting combatant.
///
/// An encounter without combatants is returned unchanged.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the encounter does not exist,
/// `DomainError::ConcurrencyConflict` if it changed since it was read.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, encounter_id = %command.encounter_id, direction = ?command.direction))]
pub async fn handle_advance_turn(
    command: &AdvanceTurn,
    clock: &dyn Clock,
    encounters: &dyn RecordStore<Encounter>,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Encounter, DomainError> {
    let encounter = load_encounter(&command.encounter_id, encounters).await?;
    let order = sorted_combatants(&command.encounter_id, combatants).await?;

    let Some(index) = turn_order::resolve_index(
        encounter.active_combatant_id.as_ref(),
        encounter.current_turn,
        &order,
    ) else {
        debug!("no combatants, turn unchanged");
        return Ok(encounter);
    };

    let dead: Vec<bool> = order.iter().map(|c| c.is_dead).collect();
    let next = turn_order::advance(
        TurnCursor {
            round: encounter.round,
            index,
        },
        &dead,
        command.direction,
    );
    let acting = order[next.index].id.clone();
    let now = clock.now();

    let updated = encounters
        .update(
            &command.encounter_id,
            Some(encounter.version),
            &|e: &mut Encounter| {
                e.round = next.round;
                e.current_turn = next.index;
                e.active_combatant_id = Some(acting.clone());
                e.updated_at = now;
            },
        )
        .await?;

    info!(
        round = updated.round,
        current_turn = updated.current_turn,
        acting = %acting,
        "turn advanced"
    );
    Ok(updated)
}

/// Handles the `AddCombatant` command: inserts `quantity` combatants built
/// from the draft. Missing initiative rolls are rolled on a d20.
///
/// The `Mutex` is locked only while rolling, never across an await.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name, zero max hp, zero
/// quantity, or several copies of a player character.
/// Returns `DomainError::NotFound` if the encounter does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, encounter_id = %command.encounter_id))]
pub async fn handle_add_combatant(
    command: &AddCombatant,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng>,
    encounters: &dyn RecordStore<Encounter>,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Vec<Combatant>, DomainError> {
    let draft = &command.draft;
    let name = required_name(&draft.name, "combatant name")?;
    if draft.max_hp == 0 {
        return Err(DomainError::Validation(
            "combatant max hp must be at least 1".into(),
        ));
    }
    if command.quantity == 0 {
        return Err(DomainError::Validation(
            "quantity must be at least 1".into(),
        ));
    }
    if command.quantity > 1 && draft.kind == CombatantKind::Character {
        return Err(DomainError::Validation(
            "only NPCs and monsters can be added in bulk".into(),
        ));
    }

    load_encounter(&command.encounter_id, encounters).await?;

    let rolls: Vec<i32> = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        (0..command.quantity)
            .map(|_| draft.initiative_roll.unwrap_or_else(|| roll_d20(&mut *rng_guard)))
            .collect()
    };

    let ids = if command.quantity == 1 {
        vec![RecordId::generate(COMBATANT_ID_PREFIX)]
    } else {
        RecordId::generate_batch(COMBATANT_ID_PREFIX, command.quantity)
    };
    let now = clock.now();

    let mut added = Vec::with_capacity(command.quantity);
    for (n, (id, roll)) in ids.into_iter().zip(rolls).enumerate() {
        let display_name = if command.quantity > 1 {
            format!("{name} {}", n + 1)
        } else {
            name.clone()
        };
        let combatant = combatants
            .insert(Combatant {
                id,
                encounter_id: command.encounter_id.clone(),
                name: display_name,
                initiative: clamp_initiative(roll.saturating_add(draft.initiative_bonus)),
                hp: draft.hp,
                max_hp: draft.max_hp,
                ac: draft.ac,
                is_npc: draft.is_npc,
                kind: draft.kind,
                is_hostile: draft.is_hostile,
                is_dead: false,
                attacks: draft.attacks.clone(),
                conditions: Vec::new(),
                notes: draft.notes.clone(),
                image_data: draft.image_data.clone(),
                created_at: now,
                version: 0,
            })
            .await?;
        added.push(combatant);
    }

    realign_after_write(&command.encounter_id, &[], encounters, combatants).await;

    info!(count = added.len(), "combatants added");
    Ok(added)
}

/// Handles the `RemoveCombatant` command, re-points the turn and returns
/// the removed combatant.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the combatant does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, combatant_id = %command.combatant_id))]
pub async fn handle_remove_combatant(
    command: &RemoveCombatant,
    encounters: &dyn RecordStore<Encounter>,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Combatant, DomainError> {
    let combatant = load_combatant(&command.combatant_id, combatants).await?;
    let before = sorted_combatants(&combatant.encounter_id, combatants).await?;

    combatants.remove(&command.combatant_id).await?;
    info!(encounter_id = %combatant.encounter_id, "combatant removed");

    realign_after_write(&combatant.encounter_id, &before, encounters, combatants).await;
    Ok(combatant)
}

/// Handles the `EditCombatant` command: overwrites the editable fields,
/// clamping hp to the new max and initiative to 0 to 99.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name or zero max hp,
/// `DomainError::NotFound` if the combatant does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, combatant_id = %command.combatant_id))]
pub async fn handle_edit_combatant(
    command: &EditCombatant,
    encounters: &dyn RecordStore<Encounter>,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Combatant, DomainError> {
    let edit = &command.edit;
    let name = required_name(&edit.name, "combatant name")?;
    if edit.max_hp == 0 {
        return Err(DomainError::Validation(
            "combatant max hp must be at least 1".into(),
        ));
    }

    let existing = load_combatant(&command.combatant_id, combatants).await?;
    let before = sorted_combatants(&existing.encounter_id, combatants).await?;

    let initiative = clamp_initiative(edit.initiative);
    let hp = edit.hp.min(edit.max_hp);
    let updated = combatants
        .update(&command.combatant_id, None, &|c: &mut Combatant| {
            c.name.clone_from(&name);
            c.initiative = initiative;
            c.hp = hp;
            c.max_hp = edit.max_hp;
            c.ac = edit.ac;
            c.is_npc = edit.is_npc;
            c.kind = edit.kind;
            c.is_hostile = edit.is_hostile;
            c.attacks.clone_from(&edit.attacks);
            c.notes.clone_from(&edit.notes);
        })
        .await?;

    realign_after_write(&updated.encounter_id, &before, encounters, combatants).await;
    Ok(updated)
}

/// Handles the `ApplyHpDelta` command. Hit points floor at zero; the
/// death flag is left alone.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the combatant does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, combatant_id = %command.combatant_id, delta = command.delta))]
pub async fn handle_apply_hp_delta(
    command: &ApplyHpDelta,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Combatant, DomainError> {
    let delta = command.delta;
    let updated = combatants
        .update(&command.combatant_id, None, &|c: &mut Combatant| {
            c.hp = hp_after_delta(c.hp, delta);
        })
        .await?;

    debug!(hp = updated.hp, "hit points changed");
    Ok(updated)
}

/// Handles the `SetDead` command. Hit points are left alone.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the combatant does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, combatant_id = %command.combatant_id))]
pub async fn handle_set_dead(
    command: &SetDead,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Combatant, DomainError> {
    let dead = command.dead;
    combatants
        .update(&command.combatant_id, None, &|c: &mut Combatant| {
            c.is_dead = dead;
        })
        .await
}

/// Handles the `SetConditions` command: the list is replaced as given.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the combatant does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, combatant_id = %command.combatant_id))]
pub async fn handle_set_conditions(
    command: &SetConditions,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Combatant, DomainError> {
    combatants
        .update(&command.combatant_id, None, &|c: &mut Combatant| {
            c.conditions.clone_from(&command.conditions);
        })
        .await
}

/// Handles the `AddCondition` command: appends the trimmed condition unless
/// it is already present. A blank condition changes nothing.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the combatant does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, combatant_id = %command.combatant_id))]
pub async fn handle_add_condition(
    command: &AddCondition,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Combatant, DomainError> {
    let condition = command.condition.trim().to_owned();
    if condition.is_empty() {
        return load_combatant(&command.combatant_id, combatants).await;
    }

    combatants
        .update(&command.combatant_id, None, &|c: &mut Combatant| {
            if !c.conditions.contains(&condition) {
                c.conditions.push(condition.clone());
            }
        })
        .await
}

/// Handles the `RemoveCondition` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the combatant does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, combatant_id = %command.combatant_id))]
pub async fn handle_remove_condition(
    command: &RemoveCondition,
    combatants: &dyn RecordStore<Combatant>,
) -> Result<Combatant, DomainError> {
    let condition = command.condition.trim().to_owned();
    combatants
        .update(&command.combatant_id, None, &|c: &mut Combatant| {
            c.conditions.retain(|existing| existing != &condition);
        })
        .await
}
