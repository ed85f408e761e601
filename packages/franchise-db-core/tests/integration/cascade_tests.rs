//! Delete policies: soft-clear, block, and migrate-on-compact.

use ntest::timeout;

use franchise_db_core::cascade::DeleteOutcome;
use franchise_db_core::entity::{Employee, Location, Menu, MenuItem, Position};
use franchise_db_core::{DbError, EntityKind};

use super::helpers::{assert_sound, franchise, location, position};

#[timeout(2000)]
#[test]
fn test_referenced_position_is_soft_cleared() {
    let db = franchise();
    let employees_before: Vec<Employee> = (1..=4).map(|id| db.get(id).unwrap()).collect();

    let outcome = db.delete(EntityKind::Position, 1).unwrap();
    assert_eq!(
        outcome,
        DeleteOutcome::SoftCleared {
            table: EntityKind::Position,
            id: 1,
            dependents: 2
        }
    );

    let cleared: Position = db.get(1).unwrap();
    assert!(cleared.title.contains("Unassigned"));
    assert_eq!(cleared.wage, 0.0);
    assert_eq!(db.len(EntityKind::Position), 5);

    let employees_after: Vec<Employee> = (1..=4).map(|id| db.get(id).unwrap()).collect();
    assert_eq!(employees_before, employees_after);
    assert_sound(&db);
}

#[timeout(2000)]
#[test]
fn test_soft_cleared_title_stays_unique() {
    let db = franchise();
    db.create(position("Unassigned position 2", 1.0)).unwrap();
    db.delete(EntityKind::Position, 2).unwrap();
    let cleared: Position = db.get(2).unwrap();
    assert_eq!(cleared.title, "Unassigned position 2 (2)");
    assert_sound(&db);
}

#[timeout(2000)]
#[test]
fn test_unreferenced_position_compacts_and_rewrites_employees() {
    let db = franchise();
    // Waiter (3) is held by Luis; Host (4) and Sous Chef (5) by nobody.
    let luis: Employee = db.get(4).unwrap();
    assert_eq!(luis.position_id, 3);

    db.update(
        4,
        Employee {
            position_id: 5,
            ..luis
        },
    )
    .unwrap();
    let outcome = db.delete(EntityKind::Position, 4).unwrap();
    assert!(matches!(outcome, DeleteOutcome::Removed(_)));

    assert_eq!(db.len(EntityKind::Position), 4);
    let moved: Position = db.get(4).unwrap();
    assert_eq!(moved.title, "Sous Chef");
    let luis: Employee = db.get(4).unwrap();
    assert_eq!(luis.position_id, 4);
    assert_sound(&db);
}

#[timeout(2000)]
#[test]
fn test_referenced_menu_delete_is_blocked() {
    let db = franchise();
    let before = db.snapshot();

    let err = db.delete(EntityKind::Menu, 1).unwrap_err();
    assert_eq!(
        err,
        DbError::DeleteBlocked {
            entity: EntityKind::Menu,
            id: 1,
            // Lisbon plus two menu items
            dependents: 3
        }
    );
    assert_eq!(*before, *db.snapshot());
}

#[timeout(2000)]
#[test]
fn test_menu_referenced_only_by_menu_item_is_blocked() {
    let db = franchise();
    db.create(MenuItem {
        dish_id: 1,
        menu_id: 3,
    })
    .unwrap();
    assert!(matches!(
        db.delete(EntityKind::Menu, 3),
        Err(DbError::DeleteBlocked { dependents: 1, .. })
    ));
}

#[timeout(2000)]
#[test]
fn test_menu_delete_migrates_dependents_of_relocated_menu() {
    let db = franchise();
    // Menu 4 becomes the last menu and is referenced; menu 3 is not.
    let last = db.create(Menu {}).unwrap();
    assert_eq!(last, 4);
    db.create(location("Faro", 1, 4)).unwrap();
    db.create(MenuItem {
        dish_id: 2,
        menu_id: 4,
    })
    .unwrap();

    let outcome = db.delete(EntityKind::Menu, 3).unwrap();
    match outcome {
        DeleteOutcome::Removed(compaction) => {
            assert_eq!(compaction.relocated_from, Some(4));
            assert_eq!(compaction.rewritten, 2);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    assert_eq!(db.len(EntityKind::Menu), 3);
    let faro: Location = db.get(3).unwrap();
    assert_eq!(faro.menu_id, 3);
    let item: MenuItem = db.get(4).unwrap();
    assert_eq!(item.menu_id, 3);
    assert_sound(&db);
}

#[timeout(2000)]
#[test]
fn test_other_referenced_parents_block() {
    let db = franchise();
    for (kind, id) in [
        (EntityKind::Schedule, 1),
        (EntityKind::Dish, 1),
        (EntityKind::Supplier, 1),
        (EntityKind::SupplyCategory, 2),
        (EntityKind::Location, 2),
        (EntityKind::Employee, 1),
    ] {
        assert!(
            matches!(db.delete(kind, id), Err(DbError::DeleteBlocked { .. })),
            "{} {}",
            kind,
            id
        );
    }
    assert_sound(&db);
}

#[timeout(2000)]
#[test]
fn test_unmanaged_employee_can_be_deleted() {
    let db = franchise();
    db.delete(EntityKind::Employee, 2).unwrap();
    assert_eq!(db.len(EntityKind::Employee), 3);
    // Luis moved from 4 to 2.
    let moved: Employee = db.get(2).unwrap();
    assert_eq!(moved.first_name, "Luis");
    assert_sound(&db);
}
