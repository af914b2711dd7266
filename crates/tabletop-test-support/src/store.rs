//! Stores that fail on purpose, for error-path tests.

use async_trait::async_trait;
use tabletop_core::error::DomainError;
use tabletop_core::record::{Filter, Record, RecordId};
use tabletop_core::store::{RecordStore, Subscription};

/// A record store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingRecordStore;

fn refused() -> DomainError {
    DomainError::Infrastructure("database is locked".into())
}

#[async_trait]
impl<R: Record> RecordStore<R> for FailingRecordStore {
    async fn find(&self, _filter: &Filter) -> Result<Vec<R>, DomainError> {
        Err(refused())
    }

    async fn find_one(&self, _id: &RecordId) -> Result<Option<R>, DomainError> {
        Err(refused())
    }

    async fn insert(&self, _record: R) -> Result<R, DomainError> {
        Err(refused())
    }

    async fn update(
        &self,
        _id: &RecordId,
        _expected_version: Option<i64>,
        _patch: &(dyn for<'p> Fn(&'p mut R) + Send + Sync),
    ) -> Result<R, DomainError> {
        Err(refused())
    }

    async fn remove(&self, _id: &RecordId) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn subscribe(&self, _filter: Filter) -> Result<Subscription<R>, DomainError> {
        Err(refused())
    }
}
