//! Compaction: the only operation that renumbers identifiers.
//!
//! Removing a record moves the table's last record into the freed slot and
//! rewrites every foreign key that pointed at the old last identifier, so
//! identifiers stay `{1..N}` and no key dangles.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::entity::EntityKind;
use crate::error::{DbError, Result};

/// Outcome of a compacting delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Compaction {
    /// Table compacted
    pub table: EntityKind,
    /// Identifier freed (now held by the relocated record, if any)
    pub removed: u64,
    /// Identifier the relocated record held before the move
    pub relocated_from: Option<u64>,
    /// Foreign keys rewritten from `relocated_from` to `removed`
    pub rewritten: usize,
}

impl Dataset {
    /// Deletes `kind` record `id` and restores the dense identifier space.
    ///
    /// Must run inside a single write scope: between the move and the key
    /// rewrite the dataset is not referentially sound.
    pub fn compact_delete(&mut self, kind: EntityKind, id: u64) -> Result<Compaction> {
        if !self.table(kind).contains(id) {
            return Err(DbError::NotFound { entity: kind, id });
        }

        let relocated_from = self.table_mut(kind).remove_compacting(id)?;
        let mut rewritten = 0;
        if let Some(from) = relocated_from {
            for source in kind.referenced_by() {
                rewritten += self.table_mut(source).rewrite_references(kind, from, id);
            }
        }

        let compaction = Compaction {
            table: kind,
            removed: id,
            relocated_from,
            rewritten,
        };
        tracing::debug!(
            "Compacted {}: removed {}, relocated {:?}, rewrote {} key(s)",
            kind,
            id,
            relocated_from,
            rewritten
        );
        Ok(compaction)
    }
}
