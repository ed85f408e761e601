//! Create/update validation.
//!
//! Checks run in a fixed order and the first failure wins:
//! field constraints, foreign-key existence, uniqueness, then table-specific
//! cardinality rules. Nothing here mutates the dataset.

mod payload;

pub use payload::decode;

use crate::config::DbConfig;
use crate::dataset::Dataset;
use crate::entity::{Category, Employee, Entity, EntityKind, Management};
use crate::error::{DbError, Result, ValidationReason};

/// Longest week an employee can be scheduled for.
const MAX_WEEKLY_HOURS: i32 = 168;

fn constraint(entity: EntityKind, field: &str, detail: impl Into<String>) -> DbError {
    DbError::validation(
        entity,
        ValidationReason::FieldConstraintViolation {
            field: field.to_string(),
            detail: detail.into(),
        },
    )
}

/// Text must be non-blank and at most `config.max_text_len` characters.
pub fn check_text(entity: EntityKind, field: &str, value: &str, config: &DbConfig) -> Result<()> {
    if value.trim().is_empty() {
        return Err(constraint(entity, field, "must not be empty or whitespace"));
    }
    let length = value.chars().count();
    if length > config.max_text_len {
        return Err(constraint(
            entity,
            field,
            format!(
                "is {} characters long, limit is {}",
                length, config.max_text_len
            ),
        ));
    }
    Ok(())
}

/// Numbers such as wages must be finite and not negative.
pub fn check_non_negative(entity: EntityKind, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(constraint(entity, field, "must be a non-negative number"));
    }
    Ok(())
}

/// Weekly hours must fit in a week.
pub fn check_weekly_hours(entity: EntityKind, field: &str, value: i32) -> Result<()> {
    if !(0..=MAX_WEEKLY_HOURS).contains(&value) {
        return Err(constraint(
            entity,
            field,
            format!("must be between 0 and {}", MAX_WEEKLY_HOURS),
        ));
    }
    Ok(())
}

fn check_foreign_keys<E: Entity>(dataset: &Dataset, record: &E) -> Result<()> {
    for (key, value) in E::KIND.foreign_keys().iter().zip(record.foreign_keys()) {
        if !dataset.table(key.target).contains(value) {
            return Err(DbError::validation(
                E::KIND,
                ValidationReason::ForeignKeyNotFound {
                    field: key.field.to_string(),
                },
            ));
        }
    }
    Ok(())
}

fn check_uniqueness<E: Entity>(dataset: &Dataset, record: &E, slot: Option<u64>) -> Result<()> {
    let others = || E::table(dataset).iter().filter(move |(id, _)| Some(*id) != slot);

    if E::KIND.category() == Category::Junction {
        let pair = record.foreign_keys();
        if others().any(|(_, other)| other.foreign_keys() == pair) {
            let fields: Vec<&str> = E::KIND.foreign_keys().iter().map(|key| key.field).collect();
            return Err(DbError::validation(
                E::KIND,
                ValidationReason::UniquenessViolation {
                    field: fields.join("+"),
                },
            ));
        }
    }

    if let Some((field, value)) = record.unique_field() {
        let duplicate = others().any(|(_, other)| {
            other
                .unique_field()
                .is_some_and(|(_, existing)| existing == value)
        });
        if duplicate {
            return Err(DbError::validation(
                E::KIND,
                ValidationReason::UniquenessViolation {
                    field: field.to_string(),
                },
            ));
        }
    }
    Ok(())
}

/// Cardinality rules for manager assignments.
///
/// An employee manages at most one location, a location has at most one
/// manager, and the employee must hold the configured manager position.
/// `slot` excludes the row being updated.
pub fn check_management(
    management: &Management,
    dataset: &Dataset,
    slot: Option<u64>,
    config: &DbConfig,
) -> Result<()> {
    let violation = |detail: String| {
        DbError::validation(
            EntityKind::Management,
            ValidationReason::CardinalityViolation(detail),
        )
    };

    for (id, other) in dataset.managements.iter() {
        if Some(id) == slot {
            continue;
        }
        if other.manager_id == management.manager_id
            && other.location_id != management.location_id
        {
            return Err(violation(format!(
                "employee {} already manages location {}",
                management.manager_id, other.location_id
            )));
        }
        if other.location_id == management.location_id {
            return Err(violation(format!(
                "location {} already has a manager",
                management.location_id
            )));
        }
    }

    let employee: &Employee = dataset
        .employees
        .get(management.manager_id)
        .ok_or_else(|| {
            DbError::validation(
                EntityKind::Management,
                ValidationReason::ForeignKeyNotFound {
                    field: "manager_id".to_string(),
                },
            )
        })?;
    let qualified = dataset
        .positions
        .get(employee.position_id)
        .is_some_and(|position| position.title == config.manager_position_title);
    if !qualified {
        return Err(violation(format!(
            "employee {} does not hold the '{}' position",
            management.manager_id, config.manager_position_title
        )));
    }
    Ok(())
}

/// Runs every check for `record` as a new row (`slot == None`) or as the
/// replacement of row `slot`.
pub fn check_record<E: Entity>(
    dataset: &Dataset,
    record: &E,
    slot: Option<u64>,
    config: &DbConfig,
) -> Result<()> {
    if let Some(id) = slot {
        if !E::table(dataset).contains(id) {
            return Err(DbError::NotFound {
                entity: E::KIND,
                id,
            });
        }
    }
    record.check_fields(config)?;
    check_foreign_keys(dataset, record)?;
    check_uniqueness(dataset, record, slot)?;
    record.check_rules(dataset, slot, config)
}
