//! SQLite implementation of the `RecordStore` trait.
//!
//! Every collection lives in the shared `records` table as JSON bodies,
//! keyed by `(collection, id)` and read back in insertion order.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tabletop_core::error::DomainError;
use tabletop_core::record::{Filter, Record, RecordId};
use tabletop_core::store::{RecordStore, Subscription};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::hub::SubscriptionHub;
use crate::schema::CREATE_RECORDS_TABLE;

fn infrastructure(context: &str, err: &impl std::fmt::Display) -> DomainError {
    DomainError::Infrastructure(format!("{context}: {err}"))
}

/// Opens (creating if missing) the SQLite database at `database_url` and
/// applies the schema.
///
/// In-memory databases are limited to one connection so every store sees
/// the same data.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the URL is invalid, the
/// database cannot be opened, or the schema cannot be applied.
pub async fn connect(database_url: &str) -> Result<SqlitePool, DomainError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| infrastructure("invalid database url", &e))?
        .create_if_missing(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };
    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| infrastructure("failed to open database", &e))?;

    sqlx::raw_sql(CREATE_RECORDS_TABLE)
        .execute(&pool)
        .await
        .map_err(|e| infrastructure("failed to apply schema", &e))?;

    info!(database_url, "document store ready");
    Ok(pool)
}

/// SQLite-backed store for one record collection.
pub struct SqliteRecordStore<R> {
    pool: SqlitePool,
    hub: SubscriptionHub<R>,
    /// Serializes writes with subscription registration so pushes follow
    /// write order and no write slips between a snapshot and its register.
    write_gate: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R> std::fmt::Debug for SqliteRecordStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRecordStore")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl<R: Record> SqliteRecordStore<R> {
    /// Creates a store over an already-migrated pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            hub: SubscriptionHub::new(),
            write_gate: Mutex::new(()),
            _record: PhantomData,
        }
    }

    async fn select(&self, filter: &Filter) -> Result<Vec<R>, DomainError> {
        let rows: Vec<(String,)> = match filter {
            Filter::All => {
                sqlx::query_as("SELECT body FROM records WHERE collection = ? ORDER BY seq")
                    .bind(R::COLLECTION)
                    .fetch_all(&self.pool)
                    .await
            }
            Filter::Id(id) => {
                sqlx::query_as(
                    "SELECT body FROM records WHERE collection = ? AND id = ? ORDER BY seq",
                )
                .bind(R::COLLECTION)
                .bind(id.as_str())
                .fetch_all(&self.pool)
                .await
            }
            Filter::Parent(parent) => {
                sqlx::query_as(
                    "SELECT body FROM records WHERE collection = ? AND parent_id = ? ORDER BY seq",
                )
                .bind(R::COLLECTION)
                .bind(parent.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| infrastructure("record query failed", &e))?;

        rows.iter().map(|(body,)| decode(body)).collect()
    }

    /// Pushes refreshed sets after a committed write. A failed refresh is
    /// logged and skipped.
    async fn notify(&self, changed: &[&R]) {
        for filter in self.hub.interested(changed) {
            match self.select(&filter).await {
                Ok(set) => self.hub.publish(&filter, &set),
                Err(e) => warn!(
                    collection = R::COLLECTION,
                    filter = ?filter,
                    error = %e,
                    "failed to refresh subscription after write"
                ),
            }
        }
    }
}

fn decode<R: Record>(body: &str) -> Result<R, DomainError> {
    serde_json::from_str(body)
        .map_err(|e| infrastructure(&format!("failed to decode {} record", R::COLLECTION), &e))
}

fn encode<R: Record>(record: &R) -> Result<String, DomainError> {
    serde_json::to_string(record)
        .map_err(|e| infrastructure(&format!("failed to encode {} record", R::COLLECTION), &e))
}

#[async_trait]
impl<R: Record> RecordStore<R> for SqliteRecordStore<R> {
    async fn find(&self, filter: &Filter) -> Result<Vec<R>, DomainError> {
        self.select(filter).await
    }

    async fn find_one(&self, id: &RecordId) -> Result<Option<R>, DomainError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM records WHERE collection = ? AND id = ?")
                .bind(R::COLLECTION)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| infrastructure("record query failed", &e))?;

        row.map(|(body,)| decode(&body)).transpose()
    }

    async fn insert(&self, mut record: R) -> Result<R, DomainError> {
        let _gate = self.write_gate.lock().await;

        record.set_version(1);
        let body = encode(&record)?;
        let result = sqlx::query(
            "INSERT INTO records (collection, id, parent_id, version, body) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(R::COLLECTION)
        .bind(record.id().as_str())
        .bind(record.parent_id().map(RecordId::as_str))
        .bind(record.version())
        .bind(body)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(DomainError::DuplicateRecord(record.id().clone()));
            }
            Err(e) => return Err(infrastructure("record insert failed", &e)),
        }
        debug!(collection = R::COLLECTION, id = %record.id(), "record inserted");

        self.notify(&[&record]).await;
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        expected_version: Option<i64>,
        patch: &(dyn for<'p> Fn(&'p mut R) + Send + Sync),
    ) -> Result<R, DomainError> {
        let _gate = self.write_gate.lock().await;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| infrastructure("failed to begin transaction", &e))?;

        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT body, version FROM records WHERE collection = ? AND id = ?")
                .bind(R::COLLECTION)
                .bind(id.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| infrastructure("record query failed", &e))?;
        let (body, actual) = row.ok_or_else(|| DomainError::NotFound(id.clone()))?;

        if let Some(expected) = expected_version {
            if actual != expected {
                return Err(DomainError::ConcurrencyConflict {
                    id: id.clone(),
                    expected,
                    actual,
                });
            }
        }

        let before: R = decode(&body)?;
        let mut updated = before.clone();
        patch(&mut updated);
        if updated.id() != id {
            return Err(DomainError::Validation(
                "a patch must not change the record id".to_owned(),
            ));
        }
        updated.set_version(actual + 1);

        sqlx::query(
            "UPDATE records SET parent_id = ?, version = ?, body = ? WHERE collection = ? AND id = ?",
        )
        .bind(updated.parent_id().map(RecordId::as_str))
        .bind(updated.version())
        .bind(encode(&updated)?)
        .bind(R::COLLECTION)
        .bind(id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| infrastructure("record update failed", &e))?;

        tx.commit()
            .await
            .map_err(|e| infrastructure("failed to commit transaction", &e))?;
        debug!(
            collection = R::COLLECTION,
            id = %id,
            version = updated.version(),
            "record updated"
        );

        self.notify(&[&before, &updated]).await;
        Ok(updated)
    }

    async fn remove(&self, id: &RecordId) -> Result<(), DomainError> {
        let _gate = self.write_gate.lock().await;

        let Some(removed) = self.find_one(id).await? else {
            return Err(DomainError::NotFound(id.clone()));
        };

        sqlx::query("DELETE FROM records WHERE collection = ? AND id = ?")
            .bind(R::COLLECTION)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| infrastructure("record delete failed", &e))?;
        debug!(collection = R::COLLECTION, id = %id, "record removed");

        self.notify(&[&removed]).await;
        Ok(())
    }

    async fn subscribe(&self, filter: Filter) -> Result<Subscription<R>, DomainError> {
        let _gate = self.write_gate.lock().await;
        let initial = self.select(&filter).await?;
        Ok(self.hub.register(filter, initial))
    }
}
