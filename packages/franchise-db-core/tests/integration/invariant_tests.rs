//! Property tests: any sequence of creates and deletes keeps every table
//! dense and every foreign key live.

use proptest::prelude::*;

use franchise_db_core::entity::{Menu, MenuItem};
use franchise_db_core::{Database, EntityKind};

use super::helpers::{assert_sound, dish, franchise, location};

#[derive(Debug, Clone)]
enum Op {
    AddMenu,
    AddDish,
    AddMenuItem { dish: u64, menu: u64 },
    AddLocation { menu: u64 },
    Delete { kind: EntityKind, id: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    let kinds = prop::sample::select(vec![
        EntityKind::Menu,
        EntityKind::Dish,
        EntityKind::MenuItem,
        EntityKind::Location,
        EntityKind::Position,
        EntityKind::Employee,
        EntityKind::Management,
    ]);
    prop_oneof![
        Just(Op::AddMenu),
        Just(Op::AddDish),
        (1u64..8, 1u64..8).prop_map(|(dish, menu)| Op::AddMenuItem { dish, menu }),
        (1u64..8).prop_map(|menu| Op::AddLocation { menu }),
        (kinds, 0u64..10).prop_map(|(kind, id)| Op::Delete { kind, id }),
    ]
}

fn apply(db: &Database, op: &Op, counter: usize) {
    // Failures (dangling keys, blocked deletes, unknown ids) are expected;
    // only the invariants matter.
    let _ = match op {
        Op::AddMenu => db.create(Menu {}).map(|_| ()),
        Op::AddDish => db.create(dish(&format!("Dish {}", counter))).map(|_| ()),
        Op::AddMenuItem { dish, menu } => db
            .create(MenuItem {
                dish_id: *dish,
                menu_id: *menu,
            })
            .map(|_| ()),
        Op::AddLocation { menu } => db
            .create(location(&format!("Town {}", counter), 1, *menu))
            .map(|_| ()),
        Op::Delete { kind, id } => db.delete(*kind, *id).map(|_| ()),
    };
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tables_stay_dense_and_sound(ops in prop::collection::vec(op(), 1..40)) {
        let db = franchise();
        for (counter, op) in ops.iter().enumerate() {
            apply(&db, op, counter);
            assert_sound(&db);
        }
    }

    #[test]
    fn prop_delete_then_delete_again_fails(id in 1u64..4) {
        let db = franchise();
        let len = db.len(EntityKind::MenuItem) as u64;
        db.delete(EntityKind::MenuItem, id).unwrap();
        // The freed id is re-occupied unless it was the last one.
        prop_assert_eq!(db.delete(EntityKind::MenuItem, id).is_ok(), id < len);
    }
}
