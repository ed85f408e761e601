//! Type-erased view over a table, used wherever an operation has to walk
//! every table that may reference another.

use std::collections::HashSet;

use serde_json::Value;

use super::{query, QueryOptions, Table};
use crate::dataset::Dataset;
use crate::entity::{Category, Entity, EntityKind};
use crate::error::{DbError, Result};
use crate::projection::{self, Narrative};

/// Object-safe operations shared by every table.
pub trait RecordSet: Send + Sync {
    /// Table kind.
    fn kind(&self) -> EntityKind;

    /// Number of live records.
    fn len(&self) -> usize;

    /// Returns `true` if the table holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `id` names a live record.
    fn contains(&self, id: u64) -> bool;

    /// Removes `id`, moving the last record into the freed slot. Returns the
    /// old identifier of the moved record, if any.
    fn remove_compacting(&mut self, id: u64) -> Result<Option<u64>>;

    /// Rewrites every foreign key into `target` equal to `from` so it
    /// becomes `to`. Returns the number of keys rewritten.
    fn rewrite_references(&mut self, target: EntityKind, from: u64, to: u64) -> usize;

    /// Identifiers of records referencing `target` record `id`.
    fn referencing(&self, target: EntityKind, id: u64) -> Vec<u64>;

    /// Value of record `id`'s foreign key into `target`.
    fn reference(&self, id: u64, target: EntityKind) -> Option<u64>;

    /// Resets the descriptive fields of `id` to a sentinel starting with
    /// `prefix`. Returns `false` if the entity has nothing to clear.
    fn soft_clear(&mut self, id: u64, prefix: &str) -> Result<bool>;

    /// Basic projection of `id`.
    fn basic(&self, id: u64) -> Result<Value>;

    /// Narrative projection of `id`.
    fn narrative(&self, id: u64, dataset: &Dataset) -> Result<Narrative>;

    /// Narrative projections of every record, in identifier order.
    fn list(&self, dataset: &Dataset) -> Vec<Narrative>;

    /// Narrative projections selected by the query pipeline.
    fn query(&self, dataset: &Dataset, options: &QueryOptions) -> Vec<Narrative>;

    /// Describes every dangling key, duplicate pair and duplicate unique
    /// value in the table.
    fn audit(&self, dataset: &Dataset) -> Vec<String>;
}

impl<E: Entity> Table<E> {
    fn not_found(id: u64) -> DbError {
        DbError::NotFound {
            entity: E::KIND,
            id,
        }
    }

    fn key_positions(target: EntityKind) -> impl Iterator<Item = usize> {
        E::KIND
            .foreign_keys()
            .iter()
            .enumerate()
            .filter(move |(_, key)| key.target == target)
            .map(|(position, _)| position)
    }
}

impl<E: Entity> RecordSet for Table<E> {
    fn kind(&self) -> EntityKind {
        E::KIND
    }

    fn len(&self) -> usize {
        Table::len(self)
    }

    fn contains(&self, id: u64) -> bool {
        Table::contains(self, id)
    }

    fn remove_compacting(&mut self, id: u64) -> Result<Option<u64>> {
        Table::remove_compacting(self, id)
            .map(|(_, relocated_from)| relocated_from)
            .ok_or_else(|| Self::not_found(id))
    }

    fn rewrite_references(&mut self, target: EntityKind, from: u64, to: u64) -> usize {
        let positions: Vec<usize> = Self::key_positions(target).collect();
        if positions.is_empty() {
            return 0;
        }

        let mut rewritten = 0;
        for record in self.records_mut() {
            let mut keys = record.foreign_keys_mut();
            for &position in &positions {
                if let Some(key) = keys.get_mut(position) {
                    if **key == from {
                        **key = to;
                        rewritten += 1;
                    }
                }
            }
        }
        rewritten
    }

    fn referencing(&self, target: EntityKind, id: u64) -> Vec<u64> {
        let mut ids: Vec<u64> = Self::key_positions(target)
            .flat_map(|position| self.referencing_at(position, id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn reference(&self, id: u64, target: EntityKind) -> Option<u64> {
        let record = self.get(id)?;
        let position = Self::key_positions(target).next()?;
        record.foreign_keys().get(position).copied()
    }

    fn soft_clear(&mut self, id: u64, prefix: &str) -> Result<bool> {
        if !Table::contains(self, id) {
            return Err(Self::not_found(id));
        }

        let taken: HashSet<String> = self
            .iter()
            .filter(|(other, _)| *other != id)
            .filter_map(|(_, record)| record.unique_field().map(|(_, value)| value.to_string()))
            .collect();
        let base = format!("{} {} {}", prefix, E::KIND.name().to_lowercase(), id);
        let mut sentinel = base.clone();
        let mut attempt = 2;
        while taken.contains(&sentinel) {
            sentinel = format!("{} ({})", base, attempt);
            attempt += 1;
        }

        let record = self.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        Ok(record.clear_descriptive(&sentinel))
    }

    fn basic(&self, id: u64) -> Result<Value> {
        let record = self.get(id).ok_or_else(|| Self::not_found(id))?;
        projection::basic(id, record)
    }

    fn narrative(&self, id: u64, dataset: &Dataset) -> Result<Narrative> {
        let record = self.get(id).ok_or_else(|| Self::not_found(id))?;
        Ok(projection::narrative(id, record, dataset))
    }

    fn list(&self, dataset: &Dataset) -> Vec<Narrative> {
        self.iter()
            .map(|(id, record)| projection::narrative(id, record, dataset))
            .collect()
    }

    fn query(&self, dataset: &Dataset, options: &QueryOptions) -> Vec<Narrative> {
        query::run(self, dataset, options)
            .into_iter()
            .filter_map(|id| self.get(id).map(|record| projection::narrative(id, record, dataset)))
            .collect()
    }

    fn audit(&self, dataset: &Dataset) -> Vec<String> {
        let mut problems = Vec::new();
        let keys = E::KIND.foreign_keys();
        let mut pairs = HashSet::new();
        let mut unique_values = HashSet::new();

        for (id, record) in self.iter() {
            let values = record.foreign_keys();
            for (key, value) in keys.iter().zip(&values) {
                if !dataset.table(key.target).contains(*value) {
                    problems.push(format!(
                        "{} {}: {} = {} does not reference a live {}",
                        E::KIND,
                        id,
                        key.field,
                        value,
                        key.target
                    ));
                }
            }
            if E::KIND.category() == Category::Junction && !pairs.insert(values.clone()) {
                problems.push(format!("{} {}: duplicate pair {:?}", E::KIND, id, values));
            }
            if let Some((field, value)) = record.unique_field() {
                if !unique_values.insert(value.to_string()) {
                    problems.push(format!(
                        "{} {}: duplicate {} '{}'",
                        E::KIND,
                        id,
                        field,
                        value
                    ));
                }
            }
        }
        problems
    }
}
