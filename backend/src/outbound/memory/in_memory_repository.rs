//! Process-local implementation of the generic repository contract.
//!
//! Mirrors the PostgreSQL adapter's observable behaviour: sequential ids
//! starting at 1, unique natural keys rejected as `UNPROCESSABLE`, missing
//! rows reported as `NOT_FOUND`, idempotent deletes.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Error;
use crate::domain::ports::{Entity, FieldUpdates, Repository};
use crate::observability::{RepositoryOperation, in_span};

/// Entities the in-memory store can create and patch.
pub trait MemoryRecord: Entity<Id: Ord> {
    /// Typed form of a decoded update map.
    type Changes: Send;

    /// Build a stored record from a draft and the next sequence value.
    fn materialise(sequence: u64, draft: Self::Draft, now: DateTime<Utc>) -> Result<Self, Error>;

    /// Decode and validate a partial update.
    fn changes(updates: &FieldUpdates) -> Result<Self::Changes, Error>;

    fn is_noop(changes: &Self::Changes) -> bool;

    fn apply(&mut self, changes: Self::Changes, now: DateTime<Utc>);

    /// Natural key that must stay unique across records, if any.
    fn unique_key(&self) -> Option<&str> {
        None
    }

    /// Natural key of a draft, compared against [`Self::unique_key`].
    fn draft_unique_key(_draft: &Self::Draft) -> Option<&str> {
        None
    }

    /// Error reported when a natural key clashes.
    fn unique_violation(key: &str) -> Error {
        Error::unprocessable("").with_meta("key", key)
    }
}

struct Table<E: MemoryRecord> {
    last_sequence: u64,
    rows: BTreeMap<E::Id, E>,
}

impl<E: MemoryRecord> Table<E> {
    fn key_taken(&self, key: &str, except: Option<&E::Id>) -> bool {
        self.rows
            .iter()
            .filter(|(id, _)| Some(*id) != except)
            .any(|(_, row)| row.unique_key() == Some(key))
    }
}

/// Thread-safe in-memory store for `E`.
pub struct InMemoryRepository<E: MemoryRecord> {
    entity: &'static str,
    table: Mutex<Table<E>>,
}

impl<E: MemoryRecord> InMemoryRepository<E> {
    /// Create an empty store. `entity` names spans and error messages.
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            table: Mutex::new(Table {
                last_sequence: 0,
                rows: BTreeMap::new(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table<E>>, Error> {
        self.table.lock().map_err(|_| {
            Error::internal("")
                .with_meta("entity", self.entity)
                .with_meta("cause", "in-memory store lock poisoned")
        })
    }

    fn not_found(&self, id: &E::Id) -> Error {
        Error::not_found(format!("{} not found", self.entity)).with_meta("id", id.to_string())
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.lock()?.rows.is_empty())
    }

    /// Scan stored records for the first match.
    pub(crate) fn find_first<P>(&self, predicate: P) -> Result<Option<E>, Error>
    where
        P: Fn(&E) -> bool,
    {
        Ok(self.lock()?.rows.values().find(|row| predicate(row)).cloned())
    }

    fn insert(&self, draft: E::Draft) -> Result<E, Error> {
        let mut table = self.lock()?;
        if let Some(key) = E::draft_unique_key(&draft) {
            if table.key_taken(key, None) {
                return Err(E::unique_violation(key));
            }
        }
        let sequence = table.last_sequence + 1;
        let record = E::materialise(sequence, draft, Utc::now())?;
        table.last_sequence = sequence;
        table.rows.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn patch(&self, id: &E::Id, updates: &FieldUpdates) -> Result<E, Error> {
        let changes = E::changes(updates)?;
        let mut table = self.lock()?;
        let current = table.rows.get(id).cloned().ok_or_else(|| self.not_found(id))?;
        if E::is_noop(&changes) {
            return Ok(current);
        }
        let mut updated = current;
        updated.apply(changes, Utc::now());
        if let Some(key) = updated.unique_key() {
            if table.key_taken(key, Some(id)) {
                return Err(E::unique_violation(key));
            }
        }
        table.rows.insert(id.clone(), updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl<E> Repository<E, E::Id> for InMemoryRepository<E>
where
    E: MemoryRecord,
{
    async fn add(&self, draft: E::Draft) -> Result<E, Error> {
        let span = RepositoryOperation::Add.span(self.entity);
        in_span(span, async { self.insert(draft) }).await
    }

    async fn get_by_id(&self, id: &E::Id) -> Result<E, Error> {
        let span = RepositoryOperation::GetById.span(self.entity);
        in_span(span, async {
            let table = self.lock()?;
            table.rows.get(id).cloned().ok_or_else(|| self.not_found(id))
        })
        .await
    }

    async fn update_by_id(&self, id: &E::Id, updates: FieldUpdates) -> Result<E, Error> {
        let span = RepositoryOperation::UpdateById.span(self.entity);
        in_span(span, async { self.patch(id, &updates) }).await
    }

    async fn delete_by_id(&self, id: &E::Id) -> Result<(), Error> {
        let span = RepositoryOperation::DeleteById.span(self.entity);
        in_span(span, async {
            self.lock()?.rows.remove(id);
            Ok(())
        })
        .await
    }

    async fn delete_all(&self) -> Result<(), Error> {
        let span = RepositoryOperation::DeleteAll.span(self.entity);
        in_span(span, async {
            self.lock()?.rows.clear();
            Ok(())
        })
        .await
    }
}
