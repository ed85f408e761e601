//! Per-category delete policies.

use serde::Serialize;

use crate::compaction::Compaction;
use crate::config::DbConfig;
use crate::dataset::Dataset;
use crate::entity::{DeletePolicy, EntityKind};
use crate::error::{DbError, Result};

/// What a successful delete did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Record removed and the table compacted
    Removed(Compaction),
    /// Record kept with its descriptive fields reset
    SoftCleared {
        table: EntityKind,
        id: u64,
        dependents: usize,
    },
}

/// Deletes `kind` record `id` according to the table's delete policy.
///
/// Leaves `dataset` untouched on error.
pub fn delete(
    dataset: &mut Dataset,
    kind: EntityKind,
    id: u64,
    config: &DbConfig,
) -> Result<DeleteOutcome> {
    if !dataset.table(kind).contains(id) {
        return Err(DbError::NotFound { entity: kind, id });
    }

    match kind.delete_policy() {
        DeletePolicy::Compact => dataset.compact_delete(kind, id).map(DeleteOutcome::Removed),
        DeletePolicy::Block => {
            let dependents = dataset.dependents_count(kind, id);
            if dependents > 0 {
                return Err(DbError::DeleteBlocked {
                    entity: kind,
                    id,
                    dependents,
                });
            }
            dataset.compact_delete(kind, id).map(DeleteOutcome::Removed)
        }
        DeletePolicy::SoftClear => {
            let dependents = dataset.dependents_count(kind, id);
            if dependents == 0 {
                return dataset.compact_delete(kind, id).map(DeleteOutcome::Removed);
            }
            if !dataset
                .table_mut(kind)
                .soft_clear(id, &config.soft_clear_prefix)?
            {
                return Err(DbError::DataCorruption(format!(
                    "{} has no descriptive fields to clear",
                    kind
                )));
            }
            tracing::debug!(
                "Soft-cleared {} {} kept for {} dependent(s)",
                kind,
                id,
                dependents
            );
            Ok(DeleteOutcome::SoftCleared {
                table: kind,
                id,
                dependents,
            })
        }
    }
}
