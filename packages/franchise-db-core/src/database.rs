//! Snapshot store serving every read and write of the engine.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::cascade::{self, DeleteOutcome};
use crate::config::DbConfig;
use crate::dataset::Dataset;
use crate::entity::{with_entity, Entity, EntityKind};
use crate::error::{DbError, Result};
use crate::projection::{self, Narrative};
use crate::table::QueryOptions;
use crate::validation;

/// Copy-on-write store for the franchise dataset.
///
/// Readers load the current `Arc<Dataset>` without locking. Writers are
/// serialized by `writer`, mutate a private clone, and publish it only if the
/// whole operation succeeded, so a failed operation leaves no trace.
#[derive(Debug)]
pub struct Database {
    /// Published snapshot
    current: ArcSwap<Dataset>,
    /// Serializes writers
    writer: Mutex<()>,
    /// Shared configuration
    config: Arc<DbConfig>,
}

impl Database {
    /// Creates an empty database.
    pub fn new(config: DbConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(Dataset::new()),
            writer: Mutex::new(()),
            config: Arc::new(config),
        }
    }

    /// Creates a database serving `dataset`.
    ///
    /// # Returns
    /// `DbError::DataCorruption` if the dataset fails the integrity audit.
    pub fn with_dataset(dataset: Dataset, config: DbConfig) -> Result<Self> {
        dataset.check_integrity()?;
        Ok(Self {
            current: ArcSwap::from_pointee(dataset),
            writer: Mutex::new(()),
            config: Arc::new(config),
        })
    }

    /// Loads a JSON seed snapshot and serves it.
    ///
    /// # Arguments
    /// * `path` - JSON file holding one array per table in identifier order
    /// * `config` - Database configuration
    pub fn load_seed(path: impl AsRef<Path>, config: DbConfig) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DbError::IoError(format!("{}: {}", path.display(), e)))?;
        let dataset: Dataset = serde_json::from_str(&raw)
            .map_err(|e| DbError::SerializationError(format!("{}: {}", path.display(), e)))?;
        let database = Self::with_dataset(dataset, config)?;
        tracing::info!(
            "Loaded seed snapshot {} ({} records)",
            path.display(),
            database.total_records()
        );
        Ok(database)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Arc<DbConfig> {
        &self.config
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<Dataset> {
        self.current.load_full()
    }

    /// Number of records in `kind`'s table.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.current.load().table(kind).len()
    }

    /// Returns `true` if no table holds a record.
    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }

    fn total_records(&self) -> usize {
        let dataset = self.current.load();
        EntityKind::ALL
            .into_iter()
            .map(|kind| dataset.table(kind).len())
            .sum()
    }

    /// Runs `op` against a clone of the current snapshot and publishes the
    /// clone if `op` succeeds.
    ///
    /// With a `deadline`, the clone is dropped and `DbError::Timeout`
    /// returned if the deadline passes before publication. The check runs
    /// under the writer lock, so a timed-out write never becomes visible.
    fn write<R>(
        &self,
        deadline: Option<Instant>,
        op: impl FnOnce(&mut Dataset, &DbConfig) -> Result<R>,
    ) -> Result<R> {
        let expired = || deadline.is_some_and(|deadline| Instant::now() >= deadline);

        let _guard = self.writer.lock().map_err(|_| DbError::LockPoisoned)?;
        if expired() {
            return Err(DbError::Timeout);
        }
        let mut draft = Dataset::clone(&self.current.load());
        let result = op(&mut draft, &self.config)?;
        if expired() {
            tracing::warn!("Write deadline passed, discarding draft snapshot");
            return Err(DbError::Timeout);
        }
        self.current.store(Arc::new(draft));
        Ok(result)
    }

    /// Mutations that are discarded unless they publish before `deadline`.
    pub fn until(&self, deadline: Instant) -> WriteScope<'_> {
        WriteScope {
            db: self,
            deadline,
        }
    }

    /// Validates and inserts `record`, returning its identifier.
    pub fn create<E: Entity>(&self, record: E) -> Result<u64> {
        let id = self.write(None, |dataset, config| {
            validation::check_record(dataset, &record, None, config)?;
            Ok(E::table_mut(dataset).insert(record))
        })?;
        tracing::info!("Created {} {}", E::KIND, id);
        Ok(id)
    }

    /// Validates `record` and replaces record `id` with it.
    pub fn update<E: Entity>(&self, id: u64, record: E) -> Result<()> {
        self.write(None, |dataset, config| {
            validation::check_record(dataset, &record, Some(id), config)?;
            E::table_mut(dataset).replace(id, record);
            Ok(())
        })?;
        tracing::info!("Updated {} {}", E::KIND, id);
        Ok(())
    }

    /// Returns a copy of record `id`.
    pub fn get<E: Entity>(&self, id: u64) -> Result<E> {
        E::table(&self.current.load())
            .get(id)
            .cloned()
            .ok_or(DbError::NotFound {
                entity: E::KIND,
                id,
            })
    }

    /// Deletes record `id` of `kind` according to its delete policy.
    pub fn delete(&self, kind: EntityKind, id: u64) -> Result<DeleteOutcome> {
        self.delete_by(kind, id, None)
    }

    fn delete_by(
        &self,
        kind: EntityKind,
        id: u64,
        deadline: Option<Instant>,
    ) -> Result<DeleteOutcome> {
        let outcome =
            self.write(deadline, |dataset, config| cascade::delete(dataset, kind, id, config))?;
        tracing::info!("Deleted {} {}: {:?}", kind, id, outcome);
        Ok(outcome)
    }

    fn create_value<E: Entity>(&self, body: Value, deadline: Option<Instant>) -> Result<Value> {
        let record: E = validation::decode(body)?;
        let (id, created) = self.write(deadline, |dataset, config| {
            validation::check_record(dataset, &record, None, config)?;
            let created = projection::basic(E::table(dataset).len() as u64 + 1, &record)?;
            Ok((E::table_mut(dataset).insert(record), created))
        })?;
        tracing::info!("Created {} {}", E::KIND, id);
        Ok(created)
    }

    fn update_value<E: Entity>(
        &self,
        id: u64,
        body: Value,
        deadline: Option<Instant>,
    ) -> Result<Value> {
        let snapshot = self.current.load();
        if !E::table(&snapshot).contains(id) {
            return Err(DbError::NotFound {
                entity: E::KIND,
                id,
            });
        }
        drop(snapshot);

        let record: E = validation::decode(body)?;
        let updated = self.write(deadline, |dataset, config| {
            validation::check_record(dataset, &record, Some(id), config)?;
            let updated = projection::basic(id, &record)?;
            E::table_mut(dataset).replace(id, record);
            Ok(updated)
        })?;
        tracing::info!("Updated {} {}", E::KIND, id);
        Ok(updated)
    }

    /// Decodes a JSON body, creates the record and returns its basic
    /// projection.
    pub fn create_json(&self, kind: EntityKind, body: Value) -> Result<Value> {
        with_entity!(kind, E => self.create_value::<E>(body, None))
    }

    /// Decodes a JSON body, replaces record `id` and returns its basic
    /// projection. Unknown identifiers fail with `NotFound` before the body
    /// is inspected.
    pub fn update_json(&self, kind: EntityKind, id: u64, body: Value) -> Result<Value> {
        with_entity!(kind, E => self.update_value::<E>(id, body, None))
    }

    /// Basic projection of record `id`.
    pub fn basic(&self, kind: EntityKind, id: u64) -> Result<Value> {
        self.current.load().table(kind).basic(id)
    }

    /// Narrative projection of record `id`.
    pub fn narrative(&self, kind: EntityKind, id: u64) -> Result<Narrative> {
        let dataset = self.current.load();
        dataset.table(kind).narrative(id, &dataset)
    }

    /// Narrative projections of every record of `kind`.
    pub fn list(&self, kind: EntityKind) -> Vec<Narrative> {
        let dataset = self.current.load();
        dataset.table(kind).list(&dataset)
    }

    /// Runs the filter/sort/page pipeline over `kind`.
    pub fn query(&self, kind: EntityKind, options: &QueryOptions) -> Vec<Narrative> {
        let dataset = self.current.load();
        dataset.table(kind).query(&dataset, options)
    }

    /// Narratives of the records under `/{kind}/{id}/{segment}`.
    pub fn nested(&self, kind: EntityKind, id: u64, segment: &str) -> Result<Vec<Narrative>> {
        projection::dependents(&self.current.load(), kind, id, segment)
    }
}

/// Deadline-bound view of a [`Database`], created by [`Database::until`].
///
/// Every mutation either publishes before the deadline or fails with
/// `DbError::Timeout` and leaves the store untouched.
#[derive(Debug, Clone, Copy)]
pub struct WriteScope<'a> {
    db: &'a Database,
    deadline: Instant,
}

impl WriteScope<'_> {
    /// See [`Database::create_json`].
    pub fn create_json(&self, kind: EntityKind, body: Value) -> Result<Value> {
        with_entity!(kind, E => self.db.create_value::<E>(body, Some(self.deadline)))
    }

    /// See [`Database::update_json`].
    pub fn update_json(&self, kind: EntityKind, id: u64, body: Value) -> Result<Value> {
        with_entity!(kind, E => self.db.update_value::<E>(id, body, Some(self.deadline)))
    }

    /// See [`Database::delete`].
    pub fn delete(&self, kind: EntityKind, id: u64) -> Result<DeleteOutcome> {
        self.db.delete_by(kind, id, Some(self.deadline))
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(DbConfig::default())
    }
}
