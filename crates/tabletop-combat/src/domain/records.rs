//! Records for the Combat context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabletop_campaign::domain::records::{Character, Npc, NpcKind};
use tabletop_core::record::{Record, RecordId};

/// Highest initiative a combatant can carry.
pub const MAX_INITIATIVE: i32 = 99;

/// Initiative roll used for NPC and monster templates when none is given.
pub const DEFAULT_NPC_ROLL: i32 = 10;

/// Clamps a summed initiative into `0..=MAX_INITIATIVE`.
#[must_use]
pub fn clamp_initiative(value: i32) -> u32 {
    value.clamp(0, MAX_INITIATIVE).unsigned_abs()
}

/// Applies damage (negative) or healing (positive). Never goes below zero
/// and has no upper bound.
#[must_use]
pub fn hp_after_delta(hp: u32, delta: i32) -> u32 {
    let next = i64::from(hp) + i64::from(delta);
    u32::try_from(next.max(0)).unwrap_or(u32::MAX)
}

/// One combat session within a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    /// Record identifier.
    pub id: RecordId,
    /// Owning campaign.
    pub campaign_id: RecordId,
    /// Display name.
    pub name: String,
    /// Current round, starting at 1.
    pub round: u32,
    /// Index of the acting combatant in initiative order.
    pub current_turn: usize,
    /// The combatant whose turn it is. `None` until the first advance, in
    /// which case the top of the initiative order acts.
    #[serde(default)]
    pub active_combatant_id: Option<RecordId>,
    /// Whether the encounter is still running.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last turn change.
    pub updated_at: DateTime<Utc>,
    /// Store-managed version.
    #[serde(default)]
    pub version: i64,
}

impl Record for Encounter {
    const COLLECTION: &'static str = "encounters";

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

/// What a combatant was copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatantKind {
    /// A player character.
    Character,
    /// A named NPC.
    Npc,
    /// A monster.
    Monster,
}

impl From<NpcKind> for CombatantKind {
    fn from(kind: NpcKind) -> Self {
        match kind {
            NpcKind::Npc => Self::Npc,
            NpcKind::Monster => Self::Monster,
        }
    }
}

/// A participant in an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    /// Record identifier.
    pub id: RecordId,
    /// Owning encounter.
    pub encounter_id: RecordId,
    /// Display name.
    pub name: String,
    /// Initiative, 0 to 99. Higher acts first.
    pub initiative: u32,
    /// Current hit points. Never negative, may exceed `max_hp`.
    pub hp: u32,
    /// Maximum hit points, at least 1.
    pub max_hp: u32,
    /// Armour class.
    pub ac: u32,
    /// Run by the game master.
    pub is_npc: bool,
    /// Template kind.
    #[serde(rename = "type")]
    pub kind: CombatantKind,
    /// Fights against the party.
    pub is_hostile: bool,
    /// Dead combatants are skipped by turn advancement.
    #[serde(default)]
    pub is_dead: bool,
    /// Attack descriptions.
    #[serde(default)]
    pub attacks: String,
    /// Active conditions, in the order they were applied.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Encoded portrait, empty when unset.
    #[serde(default)]
    pub image_data: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Store-managed version.
    #[serde(default)]
    pub version: i64,
}

impl Record for Combatant {
    const COLLECTION: &'static str = "combatants";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn parent_id(&self) -> Option<&RecordId> {
        Some(&self.encounter_id)
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

/// Everything needed to put a new combatant into an encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatantDraft {
    /// Display name. Copies get a ` <n>` suffix.
    pub name: String,
    /// Natural initiative roll. Rolled on a d20 when `None`.
    pub initiative_roll: Option<i32>,
    /// Added to the roll.
    pub initiative_bonus: i32,
    /// Starting hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Armour class.
    pub ac: u32,
    /// Run by the game master.
    pub is_npc: bool,
    /// Template kind.
    pub kind: CombatantKind,
    /// Fights against the party.
    pub is_hostile: bool,
    /// Attack descriptions.
    pub attacks: String,
    /// Free-form notes.
    pub notes: String,
    /// Encoded portrait.
    pub image_data: String,
}

impl CombatantDraft {
    /// A draft copied from a player character: full health, friendly,
    /// initiative rolled on a d20 plus the character's bonus.
    #[must_use]
    pub fn from_character(character: &Character) -> Self {
        let sheet = &character.sheet;
        Self {
            name: sheet.name.clone(),
            initiative_roll: None,
            initiative_bonus: sheet.initiative_bonus,
            hp: sheet.max_hp,
            max_hp: sheet.max_hp,
            ac: sheet.ac,
            is_npc: false,
            kind: CombatantKind::Character,
            is_hostile: false,
            attacks: String::new(),
            notes: sheet.notes.clone(),
            image_data: sheet.image_data.clone(),
        }
    }

    /// A draft copied from an NPC or monster template.
    #[must_use]
    pub fn from_npc(npc: &Npc) -> Self {
        let profile = &npc.profile;
        Self {
            name: profile.name.clone(),
            initiative_roll: Some(DEFAULT_NPC_ROLL),
            initiative_bonus: 0,
            hp: profile.hp,
            max_hp: profile.hp.max(1),
            ac: profile.ac,
            is_npc: true,
            kind: profile.kind.into(),
            is_hostile: profile.is_hostile,
            attacks: profile.attacks.clone(),
            notes: profile.notes.clone(),
            image_data: profile.image_data.clone(),
        }
    }
}

/// Replacement values from the combatant edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatantEdit {
    /// Display name.
    pub name: String,
    /// Initiative, clamped to 0 to 99.
    pub initiative: i32,
    /// Hit points, clamped to `max_hp`.
    pub hp: u32,
    /// Maximum hit points, at least 1.
    pub max_hp: u32,
    /// Armour class.
    pub ac: u32,
    /// Run by the game master.
    pub is_npc: bool,
    /// Template kind.
    pub kind: CombatantKind,
    /// Fights against the party.
    pub is_hostile: bool,
    /// Attack descriptions.
    pub attacks: String,
    /// Free-form notes.
    pub notes: String,
}
