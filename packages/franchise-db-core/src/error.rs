//! Database error types.

use thiserror::Error;

use crate::entity::EntityKind;

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, DbError>;

/// Database operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// Record not found
    #[error("{entity} with id {id} not found")]
    NotFound { entity: EntityKind, id: u64 },

    /// Create/update payload rejected before any write
    #[error("Validation failed for {entity}: {reason}")]
    Validation {
        entity: EntityKind,
        reason: ValidationReason,
    },

    /// Delete refused because other records still reference the target
    #[error("Cannot delete {entity} {id}: {dependents} dependent record(s) still reference it")]
    DeleteBlocked {
        entity: EntityKind,
        id: u64,
        dependents: usize,
    },

    /// Collection path does not name an entity
    #[error("Collection '{0}' not found")]
    UnknownCollection(String),

    /// Nested resource path does not exist for the entity
    #[error("{entity} has no related collection '{relation}'")]
    UnknownRelation {
        entity: EntityKind,
        relation: String,
    },

    /// Write deadline passed before the new snapshot was published
    #[error("Operation timed out before it was applied")]
    Timeout,

    /// Lock poisoned (writer mutex poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,

    /// Data corruption detected
    #[error("Data corruption detected: {0}")]
    DataCorruption(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error while reading a seed snapshot
    #[error("I/O error: {0}")]
    IoError(String),
}

impl DbError {
    /// Shorthand for a validation failure on `entity`.
    pub fn validation(entity: EntityKind, reason: ValidationReason) -> Self {
        DbError::Validation { entity, reason }
    }

    /// Returns the validation reason, if this is a validation failure.
    pub fn reason(&self) -> Option<&ValidationReason> {
        match self {
            DbError::Validation { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Stable machine-readable name of the failure.
    pub fn code(&self) -> &'static str {
        match self {
            DbError::NotFound { .. } => "NotFound",
            DbError::Validation { reason, .. } => reason.code(),
            DbError::DeleteBlocked { .. } => "DeleteBlocked",
            DbError::UnknownCollection(_) => "UnknownCollection",
            DbError::UnknownRelation { .. } => "UnknownRelation",
            DbError::Timeout => "Timeout",
            DbError::LockPoisoned => "LockPoisoned",
            DbError::DataCorruption(_) => "DataCorruption",
            DbError::SerializationError(_) => "SerializationError",
            DbError::IoError(_) => "IoError",
        }
    }
}

/// Why a create/update payload was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    #[error("identifiers are assigned by the server and cannot be supplied")]
    IdentifierSupplied,

    #[error("relation '{field}' cannot be supplied as a nested object")]
    RelationObjectSupplied { field: String },

    #[error("relation collection '{field}' must be an empty array when present")]
    RelationCollectionInvalid { field: String },

    #[error("foreign key '{field}' does not reference an existing record")]
    ForeignKeyNotFound { field: String },

    #[error("value of '{field}' already exists")]
    UniquenessViolation { field: String },

    #[error("field '{field}' {detail}")]
    FieldConstraintViolation { field: String, detail: String },

    #[error("cardinality rule violated: {0}")]
    CardinalityViolation(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl ValidationReason {
    /// Stable machine-readable name of the reason.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationReason::IdentifierSupplied => "IdentifierSupplied",
            ValidationReason::RelationObjectSupplied { .. } => "RelationObjectSupplied",
            ValidationReason::RelationCollectionInvalid { .. } => "RelationCollectionInvalid",
            ValidationReason::ForeignKeyNotFound { .. } => "ForeignKeyNotFound",
            ValidationReason::UniquenessViolation { .. } => "UniquenessViolation",
            ValidationReason::FieldConstraintViolation { .. } => "FieldConstraintViolation",
            ValidationReason::CardinalityViolation(_) => "CardinalityViolation",
            ValidationReason::MalformedPayload(_) => "MalformedPayload",
        }
    }
}
