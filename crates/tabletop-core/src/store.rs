//! Record store abstraction.
//!
//! The store is the only persistence collaborator the context crates see.
//! Every write pushes the refreshed matching set to live subscriptions.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::DomainError;
use crate::record::{Filter, Record, RecordId};

/// Repository trait for a single record collection.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Returns every record matching `filter`, in insertion order.
    async fn find(&self, filter: &Filter) -> Result<Vec<R>, DomainError>;

    /// Returns the record with `id`, if present.
    async fn find_one(&self, id: &RecordId) -> Result<Option<R>, DomainError>;

    /// Inserts a new record at version 1 and returns the stored copy.
    async fn insert(&self, record: R) -> Result<R, DomainError>;

    /// Reads, patches and writes a record as one step, bumping its version.
    ///
    /// When `expected_version` is given the write only happens if the stored
    /// version still matches (compare-and-set).
    async fn update(
        &self,
        id: &RecordId,
        expected_version: Option<i64>,
        patch: &(dyn for<'p> Fn(&'p mut R) + Send + Sync),
    ) -> Result<R, DomainError>;

    /// Removes the record with `id`.
    async fn remove(&self, id: &RecordId) -> Result<(), DomainError>;

    /// Opens a live view of the records matching `filter`.
    ///
    /// The current set is delivered immediately, then again after every
    /// write that touches a matching record.
    async fn subscribe(&self, filter: Filter) -> Result<Subscription<R>, DomainError>;
}

/// Receiving end of a store subscription.
#[derive(Debug)]
pub struct Subscription<R> {
    filter: Filter,
    receiver: mpsc::UnboundedReceiver<Vec<R>>,
}

impl<R> Subscription<R> {
    /// Wraps a channel receiver. Stores construct subscriptions.
    #[must_use]
    pub fn new(filter: Filter, receiver: mpsc::UnboundedReceiver<Vec<R>>) -> Self {
        Self { filter, receiver }
    }

    /// The filter this subscription was opened with.
    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Waits for the next pushed set. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Vec<R>> {
        self.receiver.recv().await
    }

    /// Returns the most recent pending set without waiting, discarding any
    /// older ones queued before it.
    pub fn latest(&mut self) -> Option<Vec<R>> {
        let mut latest = None;
        while let Ok(set) = self.receiver.try_recv() {
            latest = Some(set);
        }
        latest
    }
}
