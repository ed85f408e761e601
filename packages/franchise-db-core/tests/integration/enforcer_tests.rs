//! Create/update validation through the store.

use ntest::timeout;
use serde_json::json;

use franchise_db_core::entity::{Employee, Management, MenuItem, Position};
use franchise_db_core::{DbError, EntityKind, ValidationReason};

use super::helpers::{employee, franchise, position};

fn reason(err: DbError) -> ValidationReason {
    match err {
        DbError::Validation { reason, .. } => reason,
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_create_round_trip() -> anyhow::Result<()> {
    let db = franchise();
    let created = db.create_json(
        EntityKind::Employee,
        json!({
            "firstName": "Marta",
            "lastName": "Lopes",
            "startedOn": "2023-09-04",
            "weeklyHours": 20,
            "positionId": 4,
            "locationId": 2
        }),
    )?;
    assert_eq!(created["id"], json!(5));

    let fetched = db.basic(EntityKind::Employee, 5)?;
    assert_eq!(
        fetched,
        json!({
            "id": 5,
            "first_name": "Marta",
            "last_name": "Lopes",
            "started_on": "2023-09-04",
            "weekly_hours": 20,
            "position_id": 4,
            "location_id": 2
        })
    );
    assert_eq!(fetched, created);
    Ok(())
}

#[timeout(2000)]
#[test]
fn test_manager_of_other_location_is_rejected() {
    let db = franchise();
    let before = db.len(EntityKind::Management);

    // Ana already manages Lisbon.
    let err = db
        .create(Management {
            location_id: 2,
            manager_id: 1,
        })
        .unwrap_err();
    assert!(matches!(
        reason(err),
        ValidationReason::CardinalityViolation(_)
    ));
    assert_eq!(db.len(EntityKind::Management), before);
}

#[timeout(2000)]
#[test]
fn test_managed_location_rejects_second_manager() {
    let db = franchise();
    let err = db
        .create(Management {
            location_id: 1,
            manager_id: 3,
        })
        .unwrap_err();
    assert!(matches!(
        reason(err),
        ValidationReason::CardinalityViolation(_)
    ));
}

#[timeout(2000)]
#[test]
fn test_manager_must_hold_manager_position() {
    let db = franchise();
    // Luis is a waiter.
    let err = db
        .create(Management {
            location_id: 2,
            manager_id: 4,
        })
        .unwrap_err();
    assert!(matches!(
        reason(err),
        ValidationReason::CardinalityViolation(_)
    ));

    let id = db
        .create(Management {
            location_id: 2,
            manager_id: 3,
        })
        .unwrap();
    assert_eq!(id, 2);
}

#[timeout(2000)]
#[test]
fn test_management_update_may_keep_its_own_pair() {
    let db = franchise();
    db.update(
        1,
        Management {
            location_id: 1,
            manager_id: 1,
        },
    )
    .unwrap();
}

#[timeout(2000)]
#[test]
fn test_duplicate_junction_pair_is_rejected() {
    let db = franchise();
    let err = db
        .create(MenuItem {
            dish_id: 1,
            menu_id: 1,
        })
        .unwrap_err();
    assert!(matches!(
        reason(err),
        ValidationReason::UniquenessViolation { .. }
    ));
}

#[timeout(2000)]
#[test]
fn test_dangling_foreign_key_is_rejected() {
    let db = franchise();
    let err = db.create(employee("Zé", "Nobody", 9, 1)).unwrap_err();
    assert_eq!(
        reason(err),
        ValidationReason::ForeignKeyNotFound {
            field: "position_id".to_string()
        }
    );
}

#[timeout(2000)]
#[test]
fn test_field_constraints() {
    let db = franchise();
    for bad in [
        position("", 1.0),
        position("   ", 1.0),
        position(&"x".repeat(51), 1.0),
        position("Dishwasher", -1.0),
    ] {
        let err = db.create(bad).unwrap_err();
        assert!(matches!(
            reason(err),
            ValidationReason::FieldConstraintViolation { .. }
        ));
    }

    let overworked = Employee {
        weekly_hours: -1,
        ..employee("Ana", "Neves", 2, 1)
    };
    assert!(matches!(
        reason(db.create(overworked).unwrap_err()),
        ValidationReason::FieldConstraintViolation { .. }
    ));
}

#[timeout(2000)]
#[test]
fn test_payload_gate_reasons() {
    let db = franchise();
    let cases = [
        (
            json!({"id": 9, "title": "Barista", "wage": 10.0}),
            ValidationReason::IdentifierSupplied,
        ),
        (
            json!({"PositionId": 3, "title": "Barista", "wage": 10.0}),
            ValidationReason::IdentifierSupplied,
        ),
        (
            json!({"title": "Barista", "wage": 10.0, "employees": [{"firstName": "A"}]}),
            ValidationReason::RelationCollectionInvalid {
                field: "employees".to_string(),
            },
        ),
        (
            json!({"title": "Barista", "wage": 10.0, "employees": null}),
            ValidationReason::RelationCollectionInvalid {
                field: "employees".to_string(),
            },
        ),
    ];
    for (body, expected) in cases {
        let err = db.create_json(EntityKind::Position, body).unwrap_err();
        assert_eq!(reason(err), expected);
    }

    let err = db
        .create_json(
            EntityKind::MenuItem,
            json!({"dishId": 3, "menuId": 1, "menu": {"id": 1}}),
        )
        .unwrap_err();
    assert_eq!(
        reason(err),
        ValidationReason::RelationObjectSupplied {
            field: "menu".to_string()
        }
    );
    assert_eq!(db.len(EntityKind::Position), 5);
    assert_eq!(db.len(EntityKind::MenuItem), 3);
}

#[timeout(2000)]
#[test]
fn test_title_uniqueness_is_case_sensitive() {
    let db = franchise();
    assert!(matches!(
        reason(db.create(position("Cook", 1.0)).unwrap_err()),
        ValidationReason::UniquenessViolation { .. }
    ));
    db.create(position("cook", 1.0)).unwrap();
}

#[test]
fn test_update_replaces_scalars() -> anyhow::Result<()> {
    let db = franchise();
    let updated = db.update_json(
        EntityKind::Position,
        2,
        json!({"title": "Line Cook", "wage": 16.25, "employees": []}),
    )?;
    assert_eq!(updated, json!({"id": 2, "title": "Line Cook", "wage": 16.25}));
    let cook: Position = db.get(2)?;
    assert_eq!(cook.title, "Line Cook");

    // Renaming to an existing title collides, keeping its own does not.
    let err = db
        .update_json(EntityKind::Position, 2, json!({"title": "Waiter", "wage": 1.0}))
        .unwrap_err();
    assert!(matches!(
        reason(err),
        ValidationReason::UniquenessViolation { .. }
    ));
    db.update_json(
        EntityKind::Position,
        2,
        json!({"title": "Line Cook", "wage": 17.0}),
    )?;
    Ok(())
}

#[timeout(2000)]
#[test]
fn test_update_rejects_identifier_and_unknown_target() {
    let db = franchise();
    let err = db
        .update_json(EntityKind::Position, 2, json!({"Id": 2, "title": "Cook", "wage": 1.0}))
        .unwrap_err();
    assert_eq!(reason(err), ValidationReason::IdentifierSupplied);

    let err = db
        .update_json(EntityKind::Position, 99, json!({"title": "Cook", "wage": 1.0}))
        .unwrap_err();
    assert_eq!(
        err,
        DbError::NotFound {
            entity: EntityKind::Position,
            id: 99
        }
    );
}
