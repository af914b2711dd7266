//! Command handlers for the Campaign context.
//!
//! Each handler validates its command, then writes through the record store.
//! Updates are store-side patches so concurrent edits never read stale
//! records.

use tabletop_core::clock::Clock;
use tabletop_core::error::DomainError;
use tabletop_core::record::RecordId;
use tabletop_core::store::RecordStore;
use tracing::{debug, info, instrument};

use crate::domain::commands::{
    CreateCampaign, CreateCharacter, CreateNpc, CreateSession, DeleteCampaign, DeleteCharacter,
    DeleteNpc, DeleteSession, LinkEncounter, LinkNpc, SaveSessionNotes, SetCharacterAlive,
    SetSessionStatus, UnlinkEncounter, UnlinkNpc, UpdateCampaign, UpdateCharacter, UpdateNpc,
    UpdateSession,
};
use crate::domain::records::{
    Campaign, Character, CharacterSheet, DEFAULT_SYSTEM_COLOR, Npc, NpcProfile, Session,
    SessionPlan,
};

/// Prefix for generated campaign ids.
pub const CAMPAIGN_ID_PREFIX: &str = "cmp";
/// Prefix for generated character ids.
pub const CHARACTER_ID_PREFIX: &str = "chr";
/// Prefix for generated NPC and monster ids.
pub const NPC_ID_PREFIX: &str = "npc";
/// Prefix for generated session ids.
pub const SESSION_ID_PREFIX: &str = "ses";

fn required_name(value: &str, what: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_owned())
}

fn validated_sheet(sheet: &CharacterSheet) -> Result<CharacterSheet, DomainError> {
    let name = required_name(&sheet.name, "character name")?;
    if sheet.level == 0 {
        return Err(DomainError::Validation(
            "character level must be at least 1".into(),
        ));
    }
    if sheet.max_hp == 0 {
        return Err(DomainError::Validation(
            "character max hp must be at least 1".into(),
        ));
    }
    Ok(CharacterSheet {
        name,
        player_name: sheet.player_name.trim().to_owned(),
        class_name: sheet.class_name.trim().to_owned(),
        race: sheet.race.trim().to_owned(),
        ..sheet.clone()
    })
}

fn validated_profile(profile: &NpcProfile) -> Result<NpcProfile, DomainError> {
    let name = required_name(&profile.name, "npc name")?;
    Ok(NpcProfile {
        name,
        race: profile.race.trim().to_owned(),
        role: profile.role.trim().to_owned(),
        ..profile.clone()
    })
}

fn dedup_ids(ids: &[RecordId]) -> Vec<RecordId> {
    let mut unique: Vec<RecordId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    unique
}

fn validated_plan(plan: &SessionPlan) -> Result<SessionPlan, DomainError> {
    let title = required_name(&plan.title, "session title")?;
    if plan.session_number == 0 {
        return Err(DomainError::Validation(
            "session number must be at least 1".into(),
        ));
    }
    Ok(SessionPlan {
        title,
        linked_combat_ids: dedup_ids(&plan.linked_combat_ids),
        linked_npc_ids: dedup_ids(&plan.linked_npc_ids),
        ..plan.clone()
    })
}

/// Handles the `CreateCampaign` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the name is blank, or a store error
/// if the insert fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, campaign_id = %command.campaign_id))]
pub async fn handle_create_campaign(
    command: &CreateCampaign,
    clock: &dyn Clock,
    store: &dyn RecordStore<Campaign>,
) -> Result<Campaign, DomainError> {
    let name = required_name(&command.name, "campaign name")?;

    let campaign = store
        .insert(Campaign {
            id: command.campaign_id.clone(),
            name,
            system: command.system.trim().to_owned(),
            system_color: DEFAULT_SYSTEM_COLOR.to_owned(),
            description: command.description.clone(),
            background_image: String::new(),
            created_at: clock.now(),
            version: 0,
        })
        .await?;

    info!("campaign created");
    Ok(campaign)
}

/// Handles the `UpdateCampaign` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the name is blank,
/// `DomainError::NotFound` if the campaign does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, campaign_id = %command.campaign_id))]
pub async fn handle_update_campaign(
    command: &UpdateCampaign,
    store: &dyn RecordStore<Campaign>,
) -> Result<Campaign, DomainError> {
    let name = required_name(&command.name, "campaign name")?;
    let system = command.system.trim().to_owned();
    let system_color = if command.system_color.trim().is_empty() {
        DEFAULT_SYSTEM_COLOR.to_owned()
    } else {
        command.system_color.trim().to_owned()
    };

    store
        .update(&command.campaign_id, None, &|campaign: &mut Campaign| {
            campaign.name.clone_from(&name);
            campaign.system.clone_from(&system);
            campaign.system_color.clone_from(&system_color);
            campaign.description.clone_from(&command.description);
            campaign
                .background_image
                .clone_from(&command.background_image);
        })
        .await
}

/// Handles the `DeleteCampaign` command. Characters, NPCs and encounters of
/// the campaign are left in place.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the campaign does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, campaign_id = %command.campaign_id))]
pub async fn handle_delete_campaign(
    command: &DeleteCampaign,
    store: &dyn RecordStore<Campaign>,
) -> Result<(), DomainError> {
    store.remove(&command.campaign_id).await?;
    info!("campaign deleted");
    Ok(())
}

/// Handles the `CreateCharacter` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the sheet is invalid, or a store
/// error if the insert fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, character_id = %command.character_id))]
pub async fn handle_create_character(
    command: &CreateCharacter,
    clock: &dyn Clock,
    store: &dyn RecordStore<Character>,
) -> Result<Character, DomainError> {
    let sheet = validated_sheet(&command.sheet)?;

    let character = store
        .insert(Character {
            id: command.character_id.clone(),
            campaign_id: command.campaign_id.clone(),
            sheet,
            is_alive: true,
            created_at: clock.now(),
            version: 0,
        })
        .await?;

    info!(campaign_id = %character.campaign_id, "character created");
    Ok(character)
}

/// Handles the `UpdateCharacter` command: replaces the whole sheet.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the sheet is invalid,
/// `DomainError::NotFound` if the character does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, character_id = %command.character_id))]
pub async fn handle_update_character(
    command: &UpdateCharacter,
    store: &dyn RecordStore<Character>,
) -> Result<Character, DomainError> {
    let sheet = validated_sheet(&command.sheet)?;

    store
        .update(&command.character_id, None, &|character: &mut Character| {
            character.sheet = sheet.clone();
        })
        .await
}

/// Handles the `SetCharacterAlive` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the character does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, character_id = %command.character_id))]
pub async fn handle_set_character_alive(
    command: &SetCharacterAlive,
    store: &dyn RecordStore<Character>,
) -> Result<Character, DomainError> {
    let alive = command.alive;
    let character = store
        .update(&command.character_id, None, &|character: &mut Character| {
            character.is_alive = alive;
        })
        .await?;

    info!(alive, "character life state changed");
    Ok(character)
}

/// Handles the `DeleteCharacter` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the character does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, character_id = %command.character_id))]
pub async fn handle_delete_character(
    command: &DeleteCharacter,
    store: &dyn RecordStore<Character>,
) -> Result<(), DomainError> {
    store.remove(&command.character_id).await
}

/// Handles the `CreateNpc` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the name is blank, or a store error
/// if the insert fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, npc_id = %command.npc_id))]
pub async fn handle_create_npc(
    command: &CreateNpc,
    clock: &dyn Clock,
    store: &dyn RecordStore<Npc>,
) -> Result<Npc, DomainError> {
    let profile = validated_profile(&command.profile)?;

    let npc = store
        .insert(Npc {
            id: command.npc_id.clone(),
            campaign_id: command.campaign_id.clone(),
            profile,
            created_at: clock.now(),
            version: 0,
        })
        .await?;

    info!(campaign_id = %npc.campaign_id, kind = ?npc.profile.kind, "npc created");
    Ok(npc)
}

/// Handles the `UpdateNpc` command: replaces the whole profile.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the name is blank,
/// `DomainError::NotFound` if the NPC does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, npc_id = %command.npc_id))]
pub async fn handle_update_npc(
    command: &UpdateNpc,
    store: &dyn RecordStore<Npc>,
) -> Result<Npc, DomainError> {
    let profile = validated_profile(&command.profile)?;

    store
        .update(&command.npc_id, None, &|npc: &mut Npc| {
            npc.profile = profile.clone();
        })
        .await
}

/// Handles the `DeleteNpc` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the NPC does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, npc_id = %command.npc_id))]
pub async fn handle_delete_npc(
    command: &DeleteNpc,
    store: &dyn RecordStore<Npc>,
) -> Result<(), DomainError> {
    store.remove(&command.npc_id).await
}

/// Handles the `CreateSession` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the title is blank or the session
/// number is 0, or a store error if the insert fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id))]
pub async fn handle_create_session(
    command: &CreateSession,
    clock: &dyn Clock,
    store: &dyn RecordStore<Session>,
) -> Result<Session, DomainError> {
    let plan = validated_plan(&command.plan)?;
    let now = clock.now();

    let session = store
        .insert(Session {
            id: command.session_id.clone(),
            campaign_id: command.campaign_id.clone(),
            plan,
            created_at: now,
            updated_at: now,
            version: 0,
        })
        .await?;

    info!(
        campaign_id = %session.campaign_id,
        session_number = session.plan.session_number,
        "session created"
    );
    Ok(session)
}

/// Handles the `UpdateSession` command: replaces every plan field.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the plan is invalid,
/// `DomainError::NotFound` if the session does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id))]
pub async fn handle_update_session(
    command: &UpdateSession,
    clock: &dyn Clock,
    store: &dyn RecordStore<Session>,
) -> Result<Session, DomainError> {
    let plan = validated_plan(&command.plan)?;
    let now = clock.now();

    store
        .update(&command.session_id, None, &|session: &mut Session| {
            session.plan = plan.clone();
            session.updated_at = now;
        })
        .await
}

/// Handles the `DeleteSession` command. Linked encounters and NPCs are left
/// in place.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the session does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id))]
pub async fn handle_delete_session(
    command: &DeleteSession,
    store: &dyn RecordStore<Session>,
) -> Result<(), DomainError> {
    store.remove(&command.session_id).await?;
    info!("session deleted");
    Ok(())
}

/// Handles the `SetSessionStatus` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the session does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id))]
pub async fn handle_set_session_status(
    command: &SetSessionStatus,
    clock: &dyn Clock,
    store: &dyn RecordStore<Session>,
) -> Result<Session, DomainError> {
    let status = command.status;
    let now = clock.now();
    let session = store
        .update(&command.session_id, None, &|session: &mut Session| {
            session.plan.status = status;
            session.updated_at = now;
        })
        .await?;

    info!(status = ?status, "session status changed");
    Ok(session)
}

/// Handles the `SaveSessionNotes` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the session does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id))]
pub async fn handle_save_session_notes(
    command: &SaveSessionNotes,
    clock: &dyn Clock,
    store: &dyn RecordStore<Session>,
) -> Result<Session, DomainError> {
    let now = clock.now();
    let session = store
        .update(&command.session_id, None, &|session: &mut Session| {
            session.plan.notes.clone_from(&command.notes);
            session.updated_at = now;
        })
        .await?;

    debug!(length = session.plan.notes.len(), "session notes saved");
    Ok(session)
}

fn link(ids: &mut Vec<RecordId>, id: &RecordId) {
    if !ids.contains(id) {
        ids.push(id.clone());
    }
}

fn unlink(ids: &mut Vec<RecordId>, id: &RecordId) {
    ids.retain(|linked| linked != id);
}

/// Handles the `LinkEncounter` command. Linking an encounter twice keeps a
/// single entry.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the session does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id, encounter_id = %command.encounter_id))]
pub async fn handle_link_encounter(
    command: &LinkEncounter,
    clock: &dyn Clock,
    store: &dyn RecordStore<Session>,
) -> Result<Session, DomainError> {
    let now = clock.now();
    store
        .update(&command.session_id, None, &|session: &mut Session| {
            link(&mut session.plan.linked_combat_ids, &command.encounter_id);
            session.updated_at = now;
        })
        .await
}

/// Handles the `UnlinkEncounter` command. Unlinking an encounter that is not
/// linked still succeeds.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the session does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id, encounter_id = %command.encounter_id))]
pub async fn handle_unlink_encounter(
    command: &UnlinkEncounter,
    clock: &dyn Clock,
    store: &dyn RecordStore<Session>,
) -> Result<Session, DomainError> {
    let now = clock.now();
    store
        .update(&command.session_id, None, &|session: &mut Session| {
            unlink(&mut session.plan.linked_combat_ids, &command.encounter_id);
            session.updated_at = now;
        })
        .await
}

/// Handles the `LinkNpc` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the session does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id, npc_id = %command.npc_id))]
pub async fn handle_link_npc(
    command: &LinkNpc,
    clock: &dyn Clock,
    store: &dyn RecordStore<Session>,
) -> Result<Session, DomainError> {
    let now = clock.now();
    store
        .update(&command.session_id, None, &|session: &mut Session| {
            link(&mut session.plan.linked_npc_ids, &command.npc_id);
            session.updated_at = now;
        })
        .await
}

/// Handles the `UnlinkNpc` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the session does not exist.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, session_id = %command.session_id, npc_id = %command.npc_id))]
pub async fn handle_unlink_npc(
    command: &UnlinkNpc,
    clock: &dyn Clock,
    store: &dyn RecordStore<Session>,
) -> Result<Session, DomainError> {
    let now = clock.now();
    store
        .update(&command.session_id, None, &|session: &mut Session| {
            unlink(&mut session.plan.linked_npc_ids, &command.npc_id);
            session.updated_at = now;
        })
        .await
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tabletop_core::error::DomainError;
    use tabletop_core::record::{Filter, RecordId};
    use tabletop_core::store::RecordStore;
    use tabletop_store::MemoryRecordStore;
    use tabletop_test_support::{FailingRecordStore, FixedClock, fixed_now};
    use uuid::Uuid;

    use super::*;
    use crate::domain::records::{NpcKind, SessionStatus};

    fn create_campaign_command(name: &str) -> CreateCampaign {
        CreateCampaign {
            correlation_id: Uuid::new_v4(),
            campaign_id: RecordId::from("cmp_1"),
            name: name.to_owned(),
            system: " D&D 5e ".to_owned(),
            description: String::new(),
        }
    }

    fn create_character_command(name: &str) -> CreateCharacter {
        CreateCharacter {
            correlation_id: Uuid::new_v4(),
            character_id: RecordId::from("chr_1"),
            campaign_id: RecordId::from("cmp_1"),
            sheet: CharacterSheet {
                name: name.to_owned(),
                max_hp: 24,
                initiative_bonus: 3,
                ..CharacterSheet::default()
            },
        }
    }

    #[tokio::test]
    async fn test_handle_create_campaign_stores_trimmed_fields() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Campaign>::new();
        let command = create_campaign_command("  Curse of Strahd ");

        // Act
        let campaign = handle_create_campaign(&command, &clock, &store)
            .await
            .unwrap();

        // Assert
        assert_eq!(campaign.name, "Curse of Strahd");
        assert_eq!(campaign.system, "D&D 5e");
        assert_eq!(campaign.system_color, DEFAULT_SYSTEM_COLOR);
        assert_eq!(campaign.created_at, fixed_now());
        assert_eq!(campaign.version, 1);
        assert_eq!(store.find(&Filter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generated_ids_keep_their_collection_prefix() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Npc>::new();
        let command = CreateNpc {
            correlation_id: Uuid::new_v4(),
            npc_id: RecordId::generate(NPC_ID_PREFIX),
            campaign_id: RecordId::generate(CAMPAIGN_ID_PREFIX),
            profile: NpcProfile {
                name: "Goblin".to_owned(),
                ..NpcProfile::default()
            },
        };

        // Act
        let npc = handle_create_npc(&command, &clock, &store).await.unwrap();

        // Assert
        assert!(npc.id.as_str().starts_with("npc_"));
        assert!(npc.campaign_id.as_str().starts_with("cmp_"));
        assert!(
            RecordId::generate(CHARACTER_ID_PREFIX)
                .as_str()
                .starts_with("chr_")
        );
    }

    #[tokio::test]
    async fn test_handle_create_campaign_rejects_blank_name() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Campaign>::new();
        let command = create_campaign_command("   ");

        // Act
        let result = handle_create_campaign(&command, &clock, &store).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => {
                assert_eq!(msg, "campaign name must not be empty");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_create_campaign_propagates_store_error() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let command = create_campaign_command("Strahd");

        // Act
        let result = handle_create_campaign(&command, &clock, &FailingRecordStore).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }

    #[tokio::test]
    async fn test_handle_update_campaign_blank_color_falls_back_to_default() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Campaign>::new();
        handle_create_campaign(&create_campaign_command("Strahd"), &clock, &store)
            .await
            .unwrap();
        let command = UpdateCampaign {
            correlation_id: Uuid::new_v4(),
            campaign_id: RecordId::from("cmp_1"),
            name: "Barovia".to_owned(),
            system: "5e".to_owned(),
            system_color: " ".to_owned(),
            description: "Mists".to_owned(),
            background_image: String::new(),
        };

        // Act
        let campaign = handle_update_campaign(&command, &store).await.unwrap();

        // Assert
        assert_eq!(campaign.name, "Barovia");
        assert_eq!(campaign.system_color, DEFAULT_SYSTEM_COLOR);
        assert_eq!(campaign.description, "Mists");
        assert_eq!(campaign.version, 2);
    }

    #[tokio::test]
    async fn test_handle_delete_campaign_leaves_characters_in_place() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let campaigns = MemoryRecordStore::<Campaign>::new();
        let characters = MemoryRecordStore::<Character>::new();
        handle_create_campaign(&create_campaign_command("Strahd"), &clock, &campaigns)
            .await
            .unwrap();
        handle_create_character(&create_character_command("Ireena"), &clock, &characters)
            .await
            .unwrap();

        // Act
        handle_delete_campaign(
            &DeleteCampaign {
                correlation_id: Uuid::new_v4(),
                campaign_id: RecordId::from("cmp_1"),
            },
            &campaigns,
        )
        .await
        .unwrap();

        // Assert
        assert!(campaigns.find(&Filter::All).await.unwrap().is_empty());
        assert_eq!(characters.find(&Filter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_create_character_starts_alive() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Character>::new();

        // Act
        let character = handle_create_character(&create_character_command(" Ireena "), &clock, &store)
            .await
            .unwrap();

        // Assert
        assert!(character.is_alive);
        assert_eq!(character.sheet.name, "Ireena");
        assert_eq!(character.sheet.max_hp, 24);
        assert_eq!(character.campaign_id.as_str(), "cmp_1");
    }

    #[tokio::test]
    async fn test_handle_create_character_rejects_zero_max_hp() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Character>::new();
        let mut command = create_character_command("Ireena");
        command.sheet.max_hp = 0;

        // Act
        let result = handle_create_character(&command, &clock, &store).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("max hp")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_update_character_replaces_sheet() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Character>::new();
        handle_create_character(&create_character_command("Ireena"), &clock, &store)
            .await
            .unwrap();
        let command = UpdateCharacter {
            correlation_id: Uuid::new_v4(),
            character_id: RecordId::from("chr_1"),
            sheet: CharacterSheet {
                name: "Ireena Kolyana".to_owned(),
                level: 4,
                ..CharacterSheet::default()
            },
        };

        // Act
        let character = handle_update_character(&command, &store).await.unwrap();

        // Assert
        assert_eq!(character.sheet.name, "Ireena Kolyana");
        assert_eq!(character.sheet.level, 4);
        assert_eq!(character.sheet.initiative_bonus, 0);
        assert!(character.is_alive);
    }

    #[tokio::test]
    async fn test_handle_set_character_alive_toggles_flag() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Character>::new();
        handle_create_character(&create_character_command("Ireena"), &clock, &store)
            .await
            .unwrap();
        let command = SetCharacterAlive {
            correlation_id: Uuid::new_v4(),
            character_id: RecordId::from("chr_1"),
            alive: false,
        };

        // Act
        let character = handle_set_character_alive(&command, &store).await.unwrap();

        // Assert
        assert!(!character.is_alive);
    }

    #[tokio::test]
    async fn test_handle_delete_character_missing_returns_not_found() {
        // Arrange
        let store = MemoryRecordStore::<Character>::new();
        let command = DeleteCharacter {
            correlation_id: Uuid::new_v4(),
            character_id: RecordId::from("chr_missing"),
        };

        // Act
        let result = handle_delete_character(&command, &store).await;

        // Assert
        match result.unwrap_err() {
            DomainError::NotFound(id) => assert_eq!(id.as_str(), "chr_missing"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_create_npc_keeps_monster_kind_and_hostility() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Npc>::new();
        let command = CreateNpc {
            correlation_id: Uuid::new_v4(),
            npc_id: RecordId::from("npc_1"),
            campaign_id: RecordId::from("cmp_1"),
            profile: NpcProfile {
                name: "Dire Wolf".to_owned(),
                kind: NpcKind::Monster,
                hp: 37,
                is_hostile: true,
                ..NpcProfile::default()
            },
        };

        // Act
        let npc = handle_create_npc(&command, &clock, &store).await.unwrap();

        // Assert
        assert_eq!(npc.profile.kind, NpcKind::Monster);
        assert_eq!(npc.profile.hp, 37);
        assert!(npc.profile.is_hostile);
    }

    #[tokio::test]
    async fn test_handle_update_npc_rejects_blank_name() {
        // Arrange
        let store = MemoryRecordStore::<Npc>::new();
        let command = UpdateNpc {
            correlation_id: Uuid::new_v4(),
            npc_id: RecordId::from("npc_1"),
            profile: NpcProfile::default(),
        };

        // Act
        let result = handle_update_npc(&command, &store).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "npc name must not be empty"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_delete_npc_removes_record() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Npc>::new();
        handle_create_npc(
            &CreateNpc {
                correlation_id: Uuid::new_v4(),
                npc_id: RecordId::from("npc_1"),
                campaign_id: RecordId::from("cmp_1"),
                profile: NpcProfile {
                    name: "Strahd".to_owned(),
                    ..NpcProfile::default()
                },
            },
            &clock,
            &store,
        )
        .await
        .unwrap();

        // Act
        handle_delete_npc(
            &DeleteNpc {
                correlation_id: Uuid::new_v4(),
                npc_id: RecordId::from("npc_1"),
            },
            &store,
        )
        .await
        .unwrap();

        // Assert
        assert!(store.find_one(&RecordId::from("npc_1")).await.unwrap().is_none());
    }

    fn session_plan(title: &str) -> SessionPlan {
        SessionPlan {
            title: title.to_owned(),
            session_number: 1,
            date: fixed_now(),
            notes: String::new(),
            linked_combat_ids: Vec::new(),
            linked_npc_ids: Vec::new(),
            status: SessionStatus::Planned,
        }
    }

    async fn seeded_session(store: &MemoryRecordStore<Session>) -> Session {
        handle_create_session(
            &CreateSession {
                correlation_id: Uuid::new_v4(),
                session_id: RecordId::from("ses_1"),
                campaign_id: RecordId::from("cmp_1"),
                plan: session_plan("Into the Mists"),
            },
            &FixedClock(fixed_now()),
            store,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_handle_create_session_trims_title_and_stamps_times() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Session>::new();
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            session_id: RecordId::generate(SESSION_ID_PREFIX),
            campaign_id: RecordId::from("cmp_1"),
            plan: SessionPlan {
                linked_npc_ids: vec![RecordId::from("npc_1"), RecordId::from("npc_1")],
                ..session_plan("  Death House ")
            },
        };

        // Act
        let session = handle_create_session(&command, &clock, &store)
            .await
            .unwrap();

        // Assert
        assert_eq!(session.plan.title, "Death House");
        assert_eq!(session.plan.status, SessionStatus::Planned);
        assert_eq!(session.plan.linked_npc_ids, vec![RecordId::from("npc_1")]);
        assert_eq!(session.created_at, fixed_now());
        assert_eq!(session.updated_at, fixed_now());
        assert!(session.id.as_str().starts_with("ses_"));
    }

    #[tokio::test]
    async fn test_handle_create_session_rejects_blank_title() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Session>::new();
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            session_id: RecordId::from("ses_1"),
            campaign_id: RecordId::from("cmp_1"),
            plan: session_plan("   "),
        };

        // Act
        let result = handle_create_session(&command, &clock, &store).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "session title must not be empty"),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(store.find(&Filter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_create_session_rejects_session_number_zero() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Session>::new();
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            session_id: RecordId::from("ses_1"),
            campaign_id: RecordId::from("cmp_1"),
            plan: SessionPlan {
                session_number: 0,
                ..session_plan("Session Zero")
            },
        };

        // Act
        let result = handle_create_session(&command, &clock, &store).await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(msg) => {
                assert_eq!(msg, "session number must be at least 1");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_update_session_replaces_plan_and_bumps_updated_at() {
        // Arrange
        let store = MemoryRecordStore::<Session>::new();
        seeded_session(&store).await;
        let later = fixed_now() + Duration::minutes(30);
        let command = UpdateSession {
            correlation_id: Uuid::new_v4(),
            session_id: RecordId::from("ses_1"),
            plan: SessionPlan {
                session_number: 2,
                notes: "Ireena joins".to_owned(),
                ..session_plan("Village of Barovia")
            },
        };

        // Act
        let session = handle_update_session(&command, &FixedClock(later), &store)
            .await
            .unwrap();

        // Assert
        assert_eq!(session.plan.title, "Village of Barovia");
        assert_eq!(session.plan.session_number, 2);
        assert_eq!(session.plan.notes, "Ireena joins");
        assert_eq!(session.created_at, fixed_now());
        assert_eq!(session.updated_at, later);
    }

    #[tokio::test]
    async fn test_handle_update_session_missing_returns_not_found() {
        // Arrange
        let store = MemoryRecordStore::<Session>::new();
        let command = UpdateSession {
            correlation_id: Uuid::new_v4(),
            session_id: RecordId::from("ses_missing"),
            plan: session_plan("Nowhere"),
        };

        // Act
        let result = handle_update_session(&command, &FixedClock(fixed_now()), &store).await;

        // Assert
        match result.unwrap_err() {
            DomainError::NotFound(id) => assert_eq!(id.as_str(), "ses_missing"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_set_session_status_marks_completed() {
        // Arrange
        let store = MemoryRecordStore::<Session>::new();
        seeded_session(&store).await;
        let later = fixed_now() + Duration::hours(4);

        // Act
        let session = handle_set_session_status(
            &SetSessionStatus {
                correlation_id: Uuid::new_v4(),
                session_id: RecordId::from("ses_1"),
                status: SessionStatus::Completed,
            },
            &FixedClock(later),
            &store,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(session.plan.status, SessionStatus::Completed);
        assert_eq!(session.plan.title, "Into the Mists");
        assert_eq!(session.updated_at, later);
    }

    #[tokio::test]
    async fn test_handle_save_session_notes_overwrites_notes_only() {
        // Arrange
        let store = MemoryRecordStore::<Session>::new();
        seeded_session(&store).await;

        // Act
        let session = handle_save_session_notes(
            &SaveSessionNotes {
                correlation_id: Uuid::new_v4(),
                session_id: RecordId::from("ses_1"),
                notes: "The party fled the manor.".to_owned(),
            },
            &FixedClock(fixed_now()),
            &store,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(session.plan.notes, "The party fled the manor.");
        assert_eq!(session.plan.status, SessionStatus::Planned);
    }

    #[tokio::test]
    async fn test_handle_link_encounter_twice_keeps_one_entry() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Session>::new();
        seeded_session(&store).await;
        let command = LinkEncounter {
            correlation_id: Uuid::new_v4(),
            session_id: RecordId::from("ses_1"),
            encounter_id: RecordId::from("enc_1"),
        };

        // Act
        handle_link_encounter(&command, &clock, &store).await.unwrap();
        let session = handle_link_encounter(&command, &clock, &store).await.unwrap();

        // Assert
        assert_eq!(session.plan.linked_combat_ids, vec![RecordId::from("enc_1")]);
    }

    #[tokio::test]
    async fn test_handle_unlink_encounter_removes_only_that_encounter() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Session>::new();
        seeded_session(&store).await;
        for encounter in ["enc_1", "enc_2"] {
            handle_link_encounter(
                &LinkEncounter {
                    correlation_id: Uuid::new_v4(),
                    session_id: RecordId::from("ses_1"),
                    encounter_id: RecordId::from(encounter),
                },
                &clock,
                &store,
            )
            .await
            .unwrap();
        }

        // Act
        let session = handle_unlink_encounter(
            &UnlinkEncounter {
                correlation_id: Uuid::new_v4(),
                session_id: RecordId::from("ses_1"),
                encounter_id: RecordId::from("enc_1"),
            },
            &clock,
            &store,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(session.plan.linked_combat_ids, vec![RecordId::from("enc_2")]);
    }

    #[tokio::test]
    async fn test_handle_link_and_unlink_npc() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = MemoryRecordStore::<Session>::new();
        seeded_session(&store).await;
        handle_link_npc(
            &LinkNpc {
                correlation_id: Uuid::new_v4(),
                session_id: RecordId::from("ses_1"),
                npc_id: RecordId::from("npc_strahd"),
            },
            &clock,
            &store,
        )
        .await
        .unwrap();

        // Act
        let session = handle_unlink_npc(
            &UnlinkNpc {
                correlation_id: Uuid::new_v4(),
                session_id: RecordId::from("ses_1"),
                npc_id: RecordId::from("npc_strahd"),
            },
            &clock,
            &store,
        )
        .await
        .unwrap();

        // Assert
        assert!(session.plan.linked_npc_ids.is_empty());
    }

    #[tokio::test]
    async fn test_handle_link_npc_missing_session_returns_not_found() {
        // Arrange
        let store = MemoryRecordStore::<Session>::new();

        // Act
        let result = handle_link_npc(
            &LinkNpc {
                correlation_id: Uuid::new_v4(),
                session_id: RecordId::from("ses_x"),
                npc_id: RecordId::from("npc_1"),
            },
            &FixedClock(fixed_now()),
            &store,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_handle_delete_session_removes_record() {
        // Arrange
        let store = MemoryRecordStore::<Session>::new();
        seeded_session(&store).await;

        // Act
        handle_delete_session(
            &DeleteSession {
                correlation_id: Uuid::new_v4(),
                session_id: RecordId::from("ses_1"),
            },
            &store,
        )
        .await
        .unwrap();

        // Assert
        assert!(store.find_one(&RecordId::from("ses_1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_handle_create_session_propagates_store_error() {
        // Arrange
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            session_id: RecordId::from("ses_1"),
            campaign_id: RecordId::from("cmp_1"),
            plan: session_plan("Doomed"),
        };

        // Act
        let result =
            handle_create_session(&command, &FixedClock(fixed_now()), &FailingRecordStore).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
