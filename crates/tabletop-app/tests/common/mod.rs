//! Shared test helpers for application integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use tabletop_app::settings::SettingsStore;
use tabletop_app::state::{AppState, Stores};
use tabletop_campaign::domain::records::{Campaign, Character, Npc, Session};
use tabletop_combat::domain::records::{Combatant, CombatantDraft, CombatantKind, Encounter};
use tabletop_core::clock::Clock;
use tabletop_core::rng::DeterministicRng;
use tabletop_store::MemoryRecordStore;
use tabletop_test_support::{FixedClock, SequenceRng, fixed_now};

/// Build app state over in-memory stores with a fixed clock and scripted
/// dice.
pub async fn build_test_state(settings_path: &Path, rolls: Vec<u32>) -> AppState {
    let stores = Stores {
        campaigns: Arc::new(MemoryRecordStore::<Campaign>::new()),
        characters: Arc::new(MemoryRecordStore::<Character>::new()),
        npcs: Arc::new(MemoryRecordStore::<Npc>::new()),
        sessions: Arc::new(MemoryRecordStore::<Session>::new()),
        encounters: Arc::new(MemoryRecordStore::<Encounter>::new()),
        combatants: Arc::new(MemoryRecordStore::<Combatant>::new()),
    };
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(fixed_now()));
    let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(SequenceRng::new(rolls)));
    let settings = SettingsStore::load(settings_path).await.unwrap();

    AppState::new(stores, clock, rng, Arc::new(settings))
}

/// A monster draft with a fixed initiative roll.
pub fn monster(name: &str, roll: i32) -> CombatantDraft {
    CombatantDraft {
        name: name.to_owned(),
        initiative_roll: Some(roll),
        initiative_bonus: 0,
        hp: 15,
        max_hp: 15,
        ac: 13,
        is_npc: true,
        kind: CombatantKind::Monster,
        is_hostile: true,
        attacks: String::new(),
        notes: String::new(),
        image_data: String::new(),
    }
}
