//! Compaction and identifier density.

use ntest::timeout;

use franchise_db_core::cascade::DeleteOutcome;
use franchise_db_core::entity::{MenuItem, SupplierStock};
use franchise_db_core::{Database, DbError, EntityKind};

use super::helpers::{assert_sound, dish, franchise};

fn five_menu_items() -> Database {
    let db = Database::default();
    db.create(franchise_db_core::entity::Menu {}).unwrap();
    for name in ["A", "B", "C", "D", "E"] {
        db.create(dish(name)).unwrap();
    }
    for dish_id in 1..=5 {
        db.create(MenuItem { dish_id, menu_id: 1 }).unwrap();
    }
    db
}

/// Deleting an interior junction row moves the last row into its slot.
#[timeout(2000)]
#[test]
fn test_junction_delete_moves_last_pair_into_slot() {
    let db = five_menu_items();
    let previous_last: MenuItem = db.get(5).unwrap();

    let outcome = db.delete(EntityKind::MenuItem, 2).unwrap();
    match outcome {
        DeleteOutcome::Removed(compaction) => {
            assert_eq!(compaction.removed, 2);
            assert_eq!(compaction.relocated_from, Some(5));
            assert_eq!(compaction.rewritten, 0);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    assert_eq!(db.len(EntityKind::MenuItem), 4);
    let moved: MenuItem = db.get(2).unwrap();
    assert_eq!(moved, previous_last);
    assert!(matches!(
        db.get::<MenuItem>(5),
        Err(DbError::NotFound { id: 5, .. })
    ));
    assert_sound(&db);
}

#[timeout(2000)]
#[test]
fn test_delete_last_and_only_rows() {
    let db = five_menu_items();
    for expected in (0..5).rev() {
        db.delete(EntityKind::MenuItem, expected as u64 + 1).unwrap();
        assert_eq!(db.len(EntityKind::MenuItem), expected);
        assert_sound(&db);
    }
}

#[timeout(2000)]
#[test]
fn test_delete_is_not_idempotent() {
    let db = franchise();
    db.delete(EntityKind::SupplierStock, 2).unwrap();
    assert_eq!(
        db.delete(EntityKind::SupplierStock, 2).unwrap_err(),
        DbError::NotFound {
            entity: EntityKind::SupplierStock,
            id: 2
        }
    );
}

#[timeout(2000)]
#[test]
fn test_repeated_delete_of_first_row_drains_table() {
    let db = franchise();
    let stock: SupplierStock = db.get(2).unwrap();
    db.delete(EntityKind::SupplierStock, 1).unwrap();
    // The old second row is now the first.
    assert_eq!(db.get::<SupplierStock>(1).unwrap(), stock);
    db.delete(EntityKind::SupplierStock, 1).unwrap();
    assert_eq!(db.len(EntityKind::SupplierStock), 0);
}

#[timeout(2000)]
#[test]
fn test_invalid_ids_leave_tables_untouched() {
    let db = franchise();
    let before = db.snapshot();
    for id in [0, 4, u64::MAX] {
        assert!(matches!(
            db.delete(EntityKind::MenuItem, id),
            Err(DbError::NotFound { .. })
        ));
    }
    assert_eq!(*before, *db.snapshot());
}
