//! Live view of one encounter.
//!
//! The tracker subscribes to an encounter and its combatants, keeps the
//! latest pushed records and re-derives initiative order and the acting
//! combatant on every push. Commands are forwarded to the combat handlers;
//! a failed command is logged and the last snapshot is kept.

use tabletop_combat::application::command_handlers::{
    handle_add_combatant, handle_add_condition, handle_advance_turn, handle_apply_hp_delta,
    handle_edit_combatant, handle_remove_combatant, handle_remove_condition,
    handle_set_conditions, handle_set_dead,
};
use tabletop_combat::application::query_handlers::EncounterView;
use tabletop_combat::domain::commands::{
    AddCombatant, AddCondition, AdvanceTurn, ApplyHpDelta, EditCombatant, RemoveCombatant,
    RemoveCondition, SetConditions, SetDead,
};
use tabletop_combat::domain::records::{Combatant, CombatantDraft, CombatantEdit, Encounter};
use tabletop_combat::domain::turn_order::Direction;
use tabletop_core::command::Command;
use tabletop_core::error::DomainError;
use tabletop_core::record::{Filter, RecordId};
use tabletop_core::store::Subscription;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Reactive snapshot of one encounter.
#[derive(Debug)]
pub struct EncounterTracker {
    state: AppState,
    encounter_id: RecordId,
    encounter_updates: Subscription<Encounter>,
    combatant_updates: Subscription<Combatant>,
    encounter: Option<Encounter>,
    combatants: Vec<Combatant>,
    view: Option<EncounterView>,
}

impl EncounterTracker {
    /// Subscribes to `encounter_id` and its combatants and takes the
    /// initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Domain` if either subscription cannot be opened.
    pub async fn open(state: AppState, encounter_id: RecordId) -> Result<Self, AppError> {
        let encounter_updates = state
            .stores
            .encounters
            .subscribe(Filter::Id(encounter_id.clone()))
            .await?;
        let combatant_updates = state
            .stores
            .combatants
            .subscribe(Filter::Parent(encounter_id.clone()))
            .await?;

        let mut tracker = Self {
            state,
            encounter_id,
            encounter_updates,
            combatant_updates,
            encounter: None,
            combatants: Vec::new(),
            view: None,
        };
        tracker.refresh();
        Ok(tracker)
    }

    /// The encounter this tracker follows.
    #[must_use]
    pub fn encounter_id(&self) -> &RecordId {
        &self.encounter_id
    }

    /// The state the tracker issues commands against.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The latest derived view, `None` once the encounter is gone.
    #[must_use]
    pub fn view(&self) -> Option<&EncounterView> {
        self.view.as_ref()
    }

    /// Applies every push that has already arrived. Returns `true` if the
    /// snapshot changed.
    pub fn refresh(&mut self) -> bool {
        let changed = self.drain();
        if changed {
            self.rebuild();
        }
        changed
    }

    fn drain(&mut self) -> bool {
        let mut changed = false;
        if let Some(set) = self.encounter_updates.latest() {
            self.encounter = set.into_iter().next();
            changed = true;
        }
        if let Some(set) = self.combatant_updates.latest() {
            self.combatants = set;
            changed = true;
        }
        changed
    }

    /// Waits for the next push on either subscription, then applies it along
    /// with anything else already queued. Returns `false` once both
    /// subscriptions have closed.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            Some(set) = self.encounter_updates.next() => {
                self.encounter = set.into_iter().next();
            }
            Some(set) = self.combatant_updates.next() => {
                self.combatants = set;
            }
            else => return false,
        }
        self.drain();
        self.rebuild();
        true
    }

    fn rebuild(&mut self) {
        self.view = self
            .encounter
            .clone()
            .map(|encounter| EncounterView::from_parts(encounter, self.combatants.clone()));
        if let Some(view) = &self.view {
            debug!(
                encounter_id = %self.encounter_id,
                round = view.encounter.round,
                current_index = ?view.current_index,
                combatants = view.combatants.len(),
                "encounter snapshot updated"
            );
        }
    }

    fn report<C: Command, T>(&mut self, command: &C, result: Result<T, DomainError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.refresh();
                Some(value)
            }
            Err(e) => {
                warn!(
                    encounter_id = %self.encounter_id,
                    command = command.command_type(),
                    correlation_id = %command.correlation_id(),
                    target_id = %command.target_id(),
                    error = %e,
                    "combat command failed"
                );
                None
            }
        }
    }

    /// Moves the turn to the next living combatant.
    pub async fn next_turn(&mut self) -> Option<Encounter> {
        self.advance(Direction::Forward).await
    }

    /// Moves the turn back to the previous living combatant.
    pub async fn previous_turn(&mut self) -> Option<Encounter> {
        self.advance(Direction::Backward).await
    }

    async fn advance(&mut self, direction: Direction) -> Option<Encounter> {
        let command = AdvanceTurn {
            correlation_id: Uuid::new_v4(),
            encounter_id: self.encounter_id.clone(),
            direction,
        };
        let stores = &self.state.stores;
        let result = handle_advance_turn(
            &command,
            self.state.clock.as_ref(),
            stores.encounters.as_ref(),
            stores.combatants.as_ref(),
        )
        .await;
        self.report(&command, result)
    }

    /// Subtracts `amount` hit points.
    pub async fn damage(&mut self, combatant_id: &RecordId, amount: u32) -> Option<Combatant> {
        let delta = i32::try_from(amount).unwrap_or(i32::MAX);
        self.apply_hp_delta(combatant_id, -delta).await
    }

    /// Adds `amount` hit points.
    pub async fn heal(&mut self, combatant_id: &RecordId, amount: u32) -> Option<Combatant> {
        let delta = i32::try_from(amount).unwrap_or(i32::MAX);
        self.apply_hp_delta(combatant_id, delta).await
    }

    async fn apply_hp_delta(&mut self, combatant_id: &RecordId, delta: i32) -> Option<Combatant> {
        let command = ApplyHpDelta {
            correlation_id: Uuid::new_v4(),
            combatant_id: combatant_id.clone(),
            delta,
        };
        let result = handle_apply_hp_delta(&command, self.state.stores.combatants.as_ref()).await;
        self.report(&command, result)
    }

    /// Flips a combatant's death flag.
    pub async fn toggle_dead(&mut self, combatant_id: &RecordId) -> Option<Combatant> {
        let Some(current) = self.combatants.iter().find(|c| &c.id == combatant_id) else {
            warn!(combatant_id = %combatant_id, "toggle_dead on a combatant not in this encounter");
            return None;
        };
        let command = SetDead {
            correlation_id: Uuid::new_v4(),
            combatant_id: combatant_id.clone(),
            dead: !current.is_dead,
        };
        let result = handle_set_dead(&command, self.state.stores.combatants.as_ref()).await;
        self.report(&command, result)
    }

    /// Applies a condition.
    pub async fn add_condition(
        &mut self,
        combatant_id: &RecordId,
        condition: &str,
    ) -> Option<Combatant> {
        let command = AddCondition {
            correlation_id: Uuid::new_v4(),
            combatant_id: combatant_id.clone(),
            condition: condition.to_owned(),
        };
        let result = handle_add_condition(&command, self.state.stores.combatants.as_ref()).await;
        self.report(&command, result)
    }

    /// Lifts a condition.
    pub async fn remove_condition(
        &mut self,
        combatant_id: &RecordId,
        condition: &str,
    ) -> Option<Combatant> {
        let command = RemoveCondition {
            correlation_id: Uuid::new_v4(),
            combatant_id: combatant_id.clone(),
            condition: condition.to_owned(),
        };
        let result =
            handle_remove_condition(&command, self.state.stores.combatants.as_ref()).await;
        self.report(&command, result)
    }

    /// Replaces a combatant's whole condition list.
    pub async fn set_conditions(
        &mut self,
        combatant_id: &RecordId,
        conditions: Vec<String>,
    ) -> Option<Combatant> {
        let command = SetConditions {
            correlation_id: Uuid::new_v4(),
            combatant_id: combatant_id.clone(),
            conditions,
        };
        let result = handle_set_conditions(&command, self.state.stores.combatants.as_ref()).await;
        self.report(&command, result)
    }

    /// Saves the edit form for one combatant.
    pub async fn edit_combatant(
        &mut self,
        combatant_id: &RecordId,
        edit: CombatantEdit,
    ) -> Option<Combatant> {
        let command = EditCombatant {
            correlation_id: Uuid::new_v4(),
            combatant_id: combatant_id.clone(),
            edit,
        };
        let stores = &self.state.stores;
        let result =
            handle_edit_combatant(&command, stores.encounters.as_ref(), stores.combatants.as_ref())
                .await;
        self.report(&command, result)
    }

    /// Adds `quantity` combatants built from `draft`.
    pub async fn add_combatant(
        &mut self,
        draft: CombatantDraft,
        quantity: usize,
    ) -> Option<Vec<Combatant>> {
        let command = AddCombatant {
            correlation_id: Uuid::new_v4(),
            encounter_id: self.encounter_id.clone(),
            draft,
            quantity,
        };
        let stores = &self.state.stores;
        let result = handle_add_combatant(
            &command,
            self.state.clock.as_ref(),
            &self.state.rng,
            stores.encounters.as_ref(),
            stores.combatants.as_ref(),
        )
        .await;
        self.report(&command, result)
    }

    /// Removes a combatant from the encounter.
    pub async fn remove_combatant(&mut self, combatant_id: &RecordId) -> Option<Combatant> {
        let command = RemoveCombatant {
            correlation_id: Uuid::new_v4(),
            combatant_id: combatant_id.clone(),
        };
        let stores = &self.state.stores;
        let result =
            handle_remove_combatant(&command, stores.encounters.as_ref(), stores.combatants.as_ref())
                .await;
        self.report(&command, result)
    }
}
