//! In-memory implementation of the `RecordStore` trait.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tabletop_core::error::DomainError;
use tabletop_core::record::{Filter, Record, RecordId};
use tabletop_core::store::{RecordStore, Subscription};
use tracing::debug;

use crate::hub::SubscriptionHub;

/// Process-local record store. Records keep insertion order.
#[derive(Debug)]
pub struct MemoryRecordStore<R> {
    records: Mutex<Vec<R>>,
    hub: SubscriptionHub<R>,
}

impl<R> Default for MemoryRecordStore<R> {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            hub: SubscriptionHub::default(),
        }
    }
}

impl<R: Record> MemoryRecordStore<R> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<R>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes refreshed sets to subscribers selecting any of `changed`.
    /// Called with the records lock held so pushes follow write order.
    fn notify(&self, records: &[R], changed: &[&R]) {
        for filter in self.hub.interested(changed) {
            let set = select(records, &filter);
            self.hub.publish(&filter, &set);
        }
    }
}

fn select<R: Record>(records: &[R], filter: &Filter) -> Vec<R> {
    records
        .iter()
        .filter(|record| filter.matches(*record))
        .cloned()
        .collect()
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryRecordStore<R> {
    async fn find(&self, filter: &Filter) -> Result<Vec<R>, DomainError> {
        Ok(select(&self.lock(), filter))
    }

    async fn find_one(&self, id: &RecordId) -> Result<Option<R>, DomainError> {
        Ok(self.lock().iter().find(|record| record.id() == id).cloned())
    }

    async fn insert(&self, mut record: R) -> Result<R, DomainError> {
        let mut records = self.lock();
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(DomainError::DuplicateRecord(record.id().clone()));
        }
        record.set_version(1);
        records.push(record.clone());
        debug!(collection = R::COLLECTION, id = %record.id(), "record inserted");

        self.notify(&records, &[&record]);
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        expected_version: Option<i64>,
        patch: &(dyn for<'p> Fn(&'p mut R) + Send + Sync),
    ) -> Result<R, DomainError> {
        let mut records = self.lock();
        let position = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| DomainError::NotFound(id.clone()))?;

        let before = records[position].clone();
        if let Some(expected) = expected_version {
            if before.version() != expected {
                return Err(DomainError::ConcurrencyConflict {
                    id: id.clone(),
                    expected,
                    actual: before.version(),
                });
            }
        }

        let mut updated = before.clone();
        patch(&mut updated);
        if updated.id() != id {
            return Err(DomainError::Validation(
                "a patch must not change the record id".to_owned(),
            ));
        }
        updated.set_version(before.version() + 1);
        records[position] = updated.clone();
        debug!(
            collection = R::COLLECTION,
            id = %id,
            version = updated.version(),
            "record updated"
        );

        self.notify(&records, &[&before, &updated]);
        Ok(updated)
    }

    async fn remove(&self, id: &RecordId) -> Result<(), DomainError> {
        let mut records = self.lock();
        let position = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| DomainError::NotFound(id.clone()))?;

        let removed = records.remove(position);
        debug!(collection = R::COLLECTION, id = %id, "record removed");

        self.notify(&records, &[&removed]);
        Ok(())
    }

    async fn subscribe(&self, filter: Filter) -> Result<Subscription<R>, DomainError> {
        let records = self.lock();
        let initial = select(&records, &filter);
        Ok(self.hub.register(filter, initial))
    }
}
