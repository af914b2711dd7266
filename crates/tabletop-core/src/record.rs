//! Record abstractions shared by every document collection.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque string identifier of a stored record.
///
/// Generated identifiers carry a collection prefix followed by a
/// time-ordered UUID, e.g. `enc_01926b...`. The prefix has no meaning
/// beyond uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a new identifier with the given prefix.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}_{}", Uuid::now_v7().simple()))
    }

    /// Generates one identifier per batch member: `<prefix>_<uuid>_<index>`.
    #[must_use]
    pub fn generate_batch(prefix: &str, count: usize) -> Vec<Self> {
        let stem = Uuid::now_v7().simple();
        (0..count)
            .map(|index| Self(format!("{prefix}_{stem}_{index}")))
            .collect()
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A document stored in a named collection.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + fmt::Debug + 'static {
    /// Collection name (also the storage partition key).
    const COLLECTION: &'static str;

    /// Returns the record identifier.
    fn id(&self) -> &RecordId;

    /// Returns the owning record's identifier, if any (campaign or encounter).
    fn parent_id(&self) -> Option<&RecordId>;

    /// Returns the store-managed version.
    fn version(&self) -> i64;

    /// Overwrites the store-managed version. Only stores call this.
    fn set_version(&mut self, version: i64);
}

/// Selects the records a query or subscription is interested in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Every record in the collection.
    All,
    /// The single record with this identifier.
    Id(RecordId),
    /// Every record owned by this parent.
    Parent(RecordId),
}

impl Filter {
    /// Returns `true` if `record` is selected by this filter.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => record.id() == id,
            Self::Parent(parent) => record.parent_id() == Some(parent),
        }
    }
}
