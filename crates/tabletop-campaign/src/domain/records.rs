//! Records for the Campaign context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabletop_core::record::{Record, RecordId};

/// Default accent colour of a campaign's game system tag.
pub const DEFAULT_SYSTEM_COLOR: &str = "indigo";

/// A campaign: the root every other record hangs off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Record identifier.
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Game system, e.g. "D&D 5e".
    #[serde(default)]
    pub system: String,
    /// Accent colour for the system tag.
    #[serde(default = "default_system_color")]
    pub system_color: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Encoded background image, empty when unset.
    #[serde(default)]
    pub background_image: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Store-managed version.
    #[serde(default)]
    pub version: i64,
}

fn default_system_color() -> String {
    DEFAULT_SYSTEM_COLOR.to_owned()
}

impl Record for Campaign {
    const COLLECTION: &'static str = "campaigns";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn parent_id(&self) -> Option<&RecordId> {
        None
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

/// Editable fields of a player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    /// Character name.
    pub name: String,
    /// Name of the player running the character.
    #[serde(default)]
    pub player_name: String,
    /// Character class.
    #[serde(default, rename = "class")]
    pub class_name: String,
    /// Character race/ancestry.
    #[serde(default)]
    pub race: String,
    /// Character level, at least 1.
    #[serde(default = "one")]
    pub level: u32,
    /// Maximum hit points, at least 1.
    #[serde(default = "ten")]
    pub max_hp: u32,
    /// Armour class.
    #[serde(default = "ten")]
    pub ac: u32,
    /// Added to every initiative roll.
    #[serde(default)]
    pub initiative_bonus: i32,
    /// Encoded portrait, empty when unset.
    #[serde(default)]
    pub image_data: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self {
            name: String::new(),
            player_name: String::new(),
            class_name: String::new(),
            race: String::new(),
            level: 1,
            max_hp: 10,
            ac: 10,
            initiative_bonus: 0,
            image_data: String::new(),
            notes: String::new(),
        }
    }
}

fn one() -> u32 {
    1
}

fn ten() -> u32 {
    10
}

/// A player character belonging to a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Record identifier.
    pub id: RecordId,
    /// Owning campaign.
    pub campaign_id: RecordId,
    /// Sheet fields.
    #[serde(flatten)]
    pub sheet: CharacterSheet,
    /// Dead characters are hidden from the combat roster.
    #[serde(default = "alive")]
    pub is_alive: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Store-managed version.
    #[serde(default)]
    pub version: i64,
}

fn alive() -> bool {
    true
}

impl Record for Character {
    const COLLECTION: &'static str = "characters";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn parent_id(&self) -> Option<&RecordId> {
        Some(&self.campaign_id)
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

/// Whether a non-player template is a named NPC or a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpcKind {
    /// A named non-player character.
    #[default]
    Npc,
    /// A monster stat block.
    Monster,
}

/// Editable fields of an NPC or monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcProfile {
    /// Display name.
    pub name: String,
    /// NPC or monster.
    #[serde(default, rename = "type")]
    pub kind: NpcKind,
    /// Race/creature type.
    #[serde(default)]
    pub race: String,
    /// Narrative role, e.g. "innkeeper".
    #[serde(default)]
    pub role: String,
    /// Hit points of the stat block.
    #[serde(default = "ten")]
    pub hp: u32,
    /// Armour class.
    #[serde(default = "ten")]
    pub ac: u32,
    /// Attack descriptions.
    #[serde(default)]
    pub attacks: String,
    /// Encoded portrait, empty when unset.
    #[serde(default)]
    pub image_data: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Hostile templates enter combat flagged hostile.
    #[serde(default)]
    pub is_hostile: bool,
}

impl Default for NpcProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: NpcKind::Npc,
            race: String::new(),
            role: String::new(),
            hp: 10,
            ac: 10,
            attacks: String::new(),
            image_data: String::new(),
            notes: String::new(),
            is_hostile: false,
        }
    }
}

/// An NPC or monster belonging to a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    /// Record identifier.
    pub id: RecordId,
    /// Owning campaign.
    pub campaign_id: RecordId,
    /// Profile fields.
    #[serde(flatten)]
    pub profile: NpcProfile,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Store-managed version.
    #[serde(default)]
    pub version: i64,
}

impl Record for Npc {
    const COLLECTION: &'static str = "npcs";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn parent_id(&self) -> Option<&RecordId> {
        Some(&self.campaign_id)
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

/// Where a play session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Scheduled, not yet played.
    #[default]
    Planned,
    /// Played.
    Completed,
    /// Called off.
    Cancelled,
}

/// Editable fields of a play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    /// Session title.
    pub title: String,
    /// Running number within the campaign, at least 1.
    #[serde(default = "one")]
    pub session_number: u32,
    /// When the session is (or was) played.
    pub date: DateTime<Utc>,
    /// Game master's notes.
    #[serde(default)]
    pub notes: String,
    /// Encounters run during the session.
    #[serde(default)]
    pub linked_combat_ids: Vec<RecordId>,
    /// NPCs who appear in the session.
    #[serde(default)]
    pub linked_npc_ids: Vec<RecordId>,
    /// Planned, completed or cancelled.
    #[serde(default)]
    pub status: SessionStatus,
}

/// A play session belonging to a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Record identifier.
    pub id: RecordId,
    /// Owning campaign.
    pub campaign_id: RecordId,
    /// Plan fields.
    #[serde(flatten)]
    pub plan: SessionPlan,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
    /// Store-managed version.
    #[serde(default)]
    pub version: i64,
}

impl Record for Session {
    const COLLECTION: &'static str = "sessions";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn parent_id(&self) -> Option<&RecordId> {
        Some(&self.campaign_id)
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
