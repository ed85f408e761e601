//! Record arena with a dense identifier space.
//!
//! Each table has:
//! - Records stored contiguously in identifier order
//! - Identifiers derived from slots (`id == index + 1`), never stored
//! - A single removal primitive that keeps the identifiers `{1..N}`

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Record arena whose live identifiers are always exactly `{1..len}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<E> {
    rows: Vec<E>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<E: Entity> Table<E> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live records, which is also the last identifier.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` if `id` names a live record.
    pub fn contains(&self, id: u64) -> bool {
        self.slot(id).is_some()
    }

    fn slot(&self, id: u64) -> Option<usize> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        (index < self.rows.len()).then_some(index)
    }

    /// Returns the record stored under `id`.
    pub fn get(&self, id: u64) -> Option<&E> {
        self.slot(id).map(|index| &self.rows[index])
    }

    /// Returns the record stored under `id` for in-place mutation.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut E> {
        let index = self.slot(id)?;
        Some(&mut self.rows[index])
    }

    /// Appends a record and returns its identifier (`len + 1`).
    pub fn insert(&mut self, record: E) -> u64 {
        self.rows.push(record);
        self.rows.len() as u64
    }

    /// Replaces the record under `id`, returning the previous value.
    pub fn replace(&mut self, id: u64, record: E) -> Option<E> {
        self.get_mut(id)
            .map(|slot| std::mem::replace(slot, record))
    }

    /// Iterates `(id, record)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &E)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, record)| (index as u64 + 1, record))
    }

    /// Iterates records mutably in identifier order.
    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut E> + '_ {
        self.rows.iter_mut()
    }

    /// Removes `id` by moving the last record into its slot.
    ///
    /// Returns the removed record and, when a move happened, the identifier
    /// the moved record held before (the old last identifier). Callers are
    /// responsible for rewriting foreign keys from that identifier to `id`.
    pub(crate) fn remove_compacting(&mut self, id: u64) -> Option<(E, Option<u64>)> {
        let index = self.slot(id)?;
        let last = self.rows.len() as u64;
        let removed = self.rows.swap_remove(index);
        let relocated_from = (id != last).then_some(last);
        Some((removed, relocated_from))
    }

    /// Identifiers of records whose foreign key at `position` equals `target_id`.
    pub fn referencing_at(&self, position: usize, target_id: u64) -> Vec<u64> {
        self.iter()
            .filter(|(_, record)| record.foreign_keys().get(position) == Some(&target_id))
            .map(|(id, _)| id)
            .collect()
    }
}

impl<E: Entity> FromIterator<E> for Table<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
