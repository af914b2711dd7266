//! Commands for the Campaign context.

use tabletop_core::command::Command;
use tabletop_core::record::RecordId;
use uuid::Uuid;

use super::records::{CharacterSheet, NpcProfile, SessionPlan, SessionStatus};

/// Command to create a campaign.
#[derive(Debug, Clone)]
pub struct CreateCampaign {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new campaign's identifier.
    pub campaign_id: RecordId,
    /// Display name.
    pub name: String,
    /// Game system.
    pub system: String,
    /// Free-form description.
    pub description: String,
}

impl Command for CreateCampaign {
    fn command_type(&self) -> &'static str {
        "campaign.create_campaign"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.campaign_id
    }
}

/// Command to edit a campaign's details.
#[derive(Debug, Clone)]
pub struct UpdateCampaign {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The campaign to update.
    pub campaign_id: RecordId,
    /// Display name.
    pub name: String,
    /// Game system.
    pub system: String,
    /// Accent colour for the system tag.
    pub system_color: String,
    /// Free-form description.
    pub description: String,
    /// Encoded background image, empty to clear.
    pub background_image: String,
}

impl Command for UpdateCampaign {
    fn command_type(&self) -> &'static str {
        "campaign.update_campaign"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.campaign_id
    }
}

/// Command to delete a campaign.
#[derive(Debug, Clone)]
pub struct DeleteCampaign {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The campaign to delete.
    pub campaign_id: RecordId,
}

impl Command for DeleteCampaign {
    fn command_type(&self) -> &'static str {
        "campaign.delete_campaign"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.campaign_id
    }
}

/// Command to create a player character.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new character's identifier.
    pub character_id: RecordId,
    /// Owning campaign.
    pub campaign_id: RecordId,
    /// Sheet fields.
    pub sheet: CharacterSheet,
}

impl Command for CreateCharacter {
    fn command_type(&self) -> &'static str {
        "campaign.create_character"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.character_id
    }
}

/// Command to replace a character's sheet.
#[derive(Debug, Clone)]
pub struct UpdateCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The character to update.
    pub character_id: RecordId,
    /// New sheet fields.
    pub sheet: CharacterSheet,
}

impl Command for UpdateCharacter {
    fn command_type(&self) -> &'static str {
        "campaign.update_character"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.character_id
    }
}

/// Command to mark a character alive or dead.
#[derive(Debug, Clone)]
pub struct SetCharacterAlive {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The character to update.
    pub character_id: RecordId,
    /// New state.
    pub alive: bool,
}

impl Command for SetCharacterAlive {
    fn command_type(&self) -> &'static str {
        "campaign.set_character_alive"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.character_id
    }
}

/// Command to delete a character.
#[derive(Debug, Clone)]
pub struct DeleteCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The character to delete.
    pub character_id: RecordId,
}

impl Command for DeleteCharacter {
    fn command_type(&self) -> &'static str {
        "campaign.delete_character"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.character_id
    }
}

/// Command to create an NPC or monster.
#[derive(Debug, Clone)]
pub struct CreateNpc {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new NPC's identifier.
    pub npc_id: RecordId,
    /// Owning campaign.
    pub campaign_id: RecordId,
    /// Profile fields.
    pub profile: NpcProfile,
}

impl Command for CreateNpc {
    fn command_type(&self) -> &'static str {
        "campaign.create_npc"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.npc_id
    }
}

/// Command to replace an NPC's profile.
#[derive(Debug, Clone)]
pub struct UpdateNpc {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The NPC to update.
    pub npc_id: RecordId,
    /// New profile fields.
    pub profile: NpcProfile,
}

impl Command for UpdateNpc {
    fn command_type(&self) -> &'static str {
        "campaign.update_npc"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.npc_id
    }
}

/// Command to delete an NPC or monster.
#[derive(Debug, Clone)]
pub struct DeleteNpc {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The NPC to delete.
    pub npc_id: RecordId,
}

impl Command for DeleteNpc {
    fn command_type(&self) -> &'static str {
        "campaign.delete_npc"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.npc_id
    }
}

/// Command to schedule a play session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new session's identifier.
    pub session_id: RecordId,
    /// Owning campaign.
    pub campaign_id: RecordId,
    /// Session fields.
    pub plan: SessionPlan,
}

impl Command for CreateSession {
    fn command_type(&self) -> &'static str {
        "campaign.create_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}

/// Command to replace a session's fields.
#[derive(Debug, Clone)]
pub struct UpdateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to update.
    pub session_id: RecordId,
    /// Replacement fields.
    pub plan: SessionPlan,
}

impl Command for UpdateSession {
    fn command_type(&self) -> &'static str {
        "campaign.update_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}

/// Command to delete a session.
#[derive(Debug, Clone)]
pub struct DeleteSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to delete.
    pub session_id: RecordId,
}

impl Command for DeleteSession {
    fn command_type(&self) -> &'static str {
        "campaign.delete_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}

/// Command to mark a session planned, completed or cancelled.
#[derive(Debug, Clone)]
pub struct SetSessionStatus {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to update.
    pub session_id: RecordId,
    /// New status.
    pub status: SessionStatus,
}

impl Command for SetSessionStatus {
    fn command_type(&self) -> &'static str {
        "campaign.set_session_status"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}

/// Command to overwrite a session's notes.
#[derive(Debug, Clone)]
pub struct SaveSessionNotes {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to update.
    pub session_id: RecordId,
    /// Full notes text.
    pub notes: String,
}

impl Command for SaveSessionNotes {
    fn command_type(&self) -> &'static str {
        "campaign.save_session_notes"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}

/// Command to attach an encounter to a session.
#[derive(Debug, Clone)]
pub struct LinkEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to update.
    pub session_id: RecordId,
    /// The encounter to attach.
    pub encounter_id: RecordId,
}

impl Command for LinkEncounter {
    fn command_type(&self) -> &'static str {
        "campaign.link_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}

/// Command to detach an encounter from a session.
#[derive(Debug, Clone)]
pub struct UnlinkEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to update.
    pub session_id: RecordId,
    /// The encounter to detach.
    pub encounter_id: RecordId,
}

impl Command for UnlinkEncounter {
    fn command_type(&self) -> &'static str {
        "campaign.unlink_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}

/// Command to attach an NPC to a session.
#[derive(Debug, Clone)]
pub struct LinkNpc {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to update.
    pub session_id: RecordId,
    /// The NPC to attach.
    pub npc_id: RecordId,
}

impl Command for LinkNpc {
    fn command_type(&self) -> &'static str {
        "campaign.link_npc"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}

/// Command to detach an NPC from a session.
#[derive(Debug, Clone)]
pub struct UnlinkNpc {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to update.
    pub session_id: RecordId,
    /// The NPC to detach.
    pub npc_id: RecordId,
}

impl Command for UnlinkNpc {
    fn command_type(&self) -> &'static str {
        "campaign.unlink_npc"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn target_id(&self) -> &RecordId {
        &self.session_id
    }
}
