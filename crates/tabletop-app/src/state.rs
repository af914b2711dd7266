//! Shared application state.

use std::sync::{Arc, Mutex};

use tabletop_campaign::domain::records::{Campaign, Character, Npc, Session};
use tabletop_combat::domain::records::{Combatant, Encounter};
use tabletop_core::clock::{Clock, SystemClock};
use tabletop_core::rng::{DeterministicRng, StdRngSource};
use tabletop_core::store::RecordStore;
use tabletop_store::{SqliteRecordStore, connect};
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::settings::SettingsStore;

/// One store per record collection.
#[derive(Clone)]
pub struct Stores {
    /// Campaign records.
    pub campaigns: Arc<dyn RecordStore<Campaign>>,
    /// Player characters.
    pub characters: Arc<dyn RecordStore<Character>>,
    /// NPC and monster templates.
    pub npcs: Arc<dyn RecordStore<Npc>>,
    /// Play sessions.
    pub sessions: Arc<dyn RecordStore<Session>>,
    /// Encounters.
    pub encounters: Arc<dyn RecordStore<Encounter>>,
    /// Combatants.
    pub combatants: Arc<dyn RecordStore<Combatant>>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

/// Application state shared by every view.
#[derive(Clone)]
pub struct AppState {
    /// Record stores.
    pub stores: Stores,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Dice.
    pub rng: Arc<Mutex<dyn DeterministicRng>>,
    /// User settings.
    pub settings: Arc<SettingsStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("stores", &self.stores)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        stores: Stores,
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng>>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            stores,
            clock,
            rng,
            settings,
        }
    }

    /// Opens the database and settings named by `config`, with the system
    /// clock and an OS-seeded RNG.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Domain` if the database cannot be opened, or a
    /// settings error if the settings file cannot be loaded.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let pool = connect(&config.database_url).await?;
        let stores = Stores {
            campaigns: Arc::new(SqliteRecordStore::<Campaign>::new(pool.clone())),
            characters: Arc::new(SqliteRecordStore::<Character>::new(pool.clone())),
            npcs: Arc::new(SqliteRecordStore::<Npc>::new(pool.clone())),
            sessions: Arc::new(SqliteRecordStore::<Session>::new(pool.clone())),
            encounters: Arc::new(SqliteRecordStore::<Encounter>::new(pool.clone())),
            combatants: Arc::new(SqliteRecordStore::<Combatant>::new(pool)),
        };
        let settings = SettingsStore::load(config.settings_path.clone()).await?;

        info!(
            database_url = %config.database_url,
            settings_path = %config.settings_path.display(),
            "application state ready"
        );
        Ok(Self::new(
            stores,
            Arc::new(SystemClock),
            Arc::new(Mutex::new(StdRngSource::from_os())),
            Arc::new(settings),
        ))
    }
}
