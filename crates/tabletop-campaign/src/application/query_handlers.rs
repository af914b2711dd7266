//! Query handlers for the Campaign context.

use serde::Serialize;
use tabletop_core::error::DomainError;
use tabletop_core::record::{Filter, RecordId};
use tabletop_core::store::RecordStore;

use crate::domain::records::{Campaign, Character, Npc, NpcKind, Session};

/// Templates a combatant can be added from, split the way the quick-add
/// picker shows them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    /// Living player characters, by name.
    pub characters: Vec<Character>,
    /// Named NPCs, by name.
    pub npcs: Vec<Npc>,
    /// Monsters, by name.
    pub monsters: Vec<Npc>,
}

/// Lists every campaign, newest first.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_campaigns(
    store: &dyn RecordStore<Campaign>,
) -> Result<Vec<Campaign>, DomainError> {
    let mut campaigns = store.find(&Filter::All).await?;
    campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(campaigns)
}

/// Retrieves a campaign by its identifier.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no campaign has the identifier.
pub async fn get_campaign(
    campaign_id: &RecordId,
    store: &dyn RecordStore<Campaign>,
) -> Result<Campaign, DomainError> {
    store
        .find_one(campaign_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(campaign_id.clone()))
}

/// Lists a campaign's characters, by name.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_characters(
    campaign_id: &RecordId,
    store: &dyn RecordStore<Character>,
) -> Result<Vec<Character>, DomainError> {
    let mut characters = store.find(&Filter::Parent(campaign_id.clone())).await?;
    characters.sort_by(|a, b| a.sheet.name.cmp(&b.sheet.name));
    Ok(characters)
}

/// Lists a campaign's NPCs and monsters, by name.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_npcs(
    campaign_id: &RecordId,
    store: &dyn RecordStore<Npc>,
) -> Result<Vec<Npc>, DomainError> {
    let mut npcs = store.find(&Filter::Parent(campaign_id.clone())).await?;
    npcs.sort_by(|a, b| a.profile.name.cmp(&b.profile.name));
    Ok(npcs)
}

/// Builds the quick-add roster of a campaign. Dead characters are left out.
///
/// # Errors
///
/// Returns a store error if either query fails.
pub async fn roster(
    campaign_id: &RecordId,
    characters: &dyn RecordStore<Character>,
    npcs: &dyn RecordStore<Npc>,
) -> Result<Roster, DomainError> {
    let characters = list_characters(campaign_id, characters)
        .await?
        .into_iter()
        .filter(|character| character.is_alive)
        .collect();
    let (monsters, npcs) = list_npcs(campaign_id, npcs)
        .await?
        .into_iter()
        .partition(|npc| npc.profile.kind == NpcKind::Monster);

    Ok(Roster {
        characters,
        npcs,
        monsters,
    })
}

/// Lists a campaign's play sessions, latest date first.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn list_sessions(
    campaign_id: &RecordId,
    store: &dyn RecordStore<Session>,
) -> Result<Vec<Session>, DomainError> {
    let mut sessions = store.find(&Filter::Parent(campaign_id.clone())).await?;
    sessions.sort_by(|a, b| b.plan.date.cmp(&a.plan.date));
    Ok(sessions)
}

/// Number suggested for the next session of a campaign: one past the
/// session count.
///
/// # Errors
///
/// Returns a store error if the query fails.
pub async fn next_session_number(
    campaign_id: &RecordId,
    store: &dyn RecordStore<Session>,
) -> Result<u32, DomainError> {
    let count = store.find(&Filter::Parent(campaign_id.clone())).await?.len();
    Ok(u32::try_from(count).unwrap_or(u32::MAX).saturating_add(1))
}
