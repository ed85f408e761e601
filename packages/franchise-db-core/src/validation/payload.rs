//! Decoding of create/update request bodies into record drafts.

use serde_json::{Map, Value};

use crate::entity::{normalize_field, Entity, RelationShape};
use crate::error::{DbError, Result, ValidationReason};

fn malformed<E: Entity>(detail: impl Into<String>) -> DbError {
    DbError::validation(E::KIND, ValidationReason::MalformedPayload(detail.into()))
}

/// Converts `startedOn` / `StartedOn` / `started_on` to `started_on`.
fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (index, c) in key.chars().enumerate() {
        if c == '-' {
            out.push('_');
        } else if c.is_uppercase() {
            if index > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Decodes a JSON request body into an `E` draft.
///
/// Identifier keys (`id`, or the entity's own `<entity>Id` such as
/// `positionId`) are rejected before anything else. Relation fields may
/// appear only as `null` (object relations) or `[]` (collection relations)
/// and are then dropped. Remaining keys are decoded strictly: unknown keys
/// and wrongly typed values fail with `MalformedPayload`.
pub fn decode<E: Entity>(body: Value) -> Result<E> {
    let Value::Object(fields) = body else {
        return Err(malformed::<E>("request body must be a JSON object"));
    };

    let own_id = format!("{}id", normalize_field(E::KIND.name()));
    if fields.keys().any(|key| {
        let key = normalize_field(key);
        key == "id" || key == own_id
    }) {
        return Err(DbError::validation(
            E::KIND,
            ValidationReason::IdentifierSupplied,
        ));
    }

    let relations = E::KIND.relation_fields();
    let mut draft = Map::with_capacity(fields.len());
    for (key, value) in fields {
        let normalized = normalize_field(&key);
        let relation = relations
            .iter()
            .find(|relation| normalize_field(relation.name) == normalized);

        match (relation, value) {
            (Some(relation), value) => match (relation.shape, value) {
                (RelationShape::Object, Value::Null) => {}
                (RelationShape::Object, Value::Object(_)) => {
                    return Err(DbError::validation(
                        E::KIND,
                        ValidationReason::RelationObjectSupplied {
                            field: relation.name.to_string(),
                        },
                    ));
                }
                (RelationShape::Object, _) => {
                    return Err(malformed::<E>(format!(
                        "relation '{}' must be set through its key field",
                        relation.name
                    )));
                }
                (RelationShape::Collection, Value::Array(items)) if items.is_empty() => {}
                (RelationShape::Collection, _) => {
                    return Err(DbError::validation(
                        E::KIND,
                        ValidationReason::RelationCollectionInvalid {
                            field: relation.name.to_string(),
                        },
                    ));
                }
            },
            (None, value) => {
                let field = to_snake_case(&key);
                if draft.insert(field.clone(), value).is_some() {
                    return Err(malformed::<E>(format!("field '{}' given twice", field)));
                }
            }
        }
    }

    serde_json::from_value(Value::Object(draft)).map_err(|e| malformed::<E>(e.to_string()))
}
