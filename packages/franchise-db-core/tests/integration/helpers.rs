//! Shared fixtures.

use chrono::NaiveDate;

use franchise_db_core::config::DbConfig;
use franchise_db_core::entity::{
    Dish, DishRequirement, Employee, Location, Menu, MenuItem, Position, Schedule, Supplier,
    SupplierStock, SupplyCategory,
};
use franchise_db_core::{Database, Dataset, EntityKind};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn position(title: &str, wage: f64) -> Position {
    Position {
        title: title.to_string(),
        wage,
    }
}

pub fn dish(name: &str) -> Dish {
    Dish {
        name: name.to_string(),
    }
}

pub fn location(city: &str, schedule_id: u64, menu_id: u64) -> Location {
    Location {
        country: "Portugal".to_string(),
        country_code: "PT".to_string(),
        state: "Lisboa".to_string(),
        state_code: "LI".to_string(),
        city: city.to_string(),
        street: format!("Rua Central, {}", city),
        open_since: date(2019, 5, 1),
        schedule_id,
        menu_id,
    }
}

pub fn employee(first: &str, last: &str, position_id: u64, location_id: u64) -> Employee {
    Employee {
        first_name: first.to_string(),
        last_name: last.to_string(),
        started_on: date(2021, 3, 1),
        weekly_hours: 40,
        position_id,
        location_id,
    }
}

/// A small franchise:
///
/// - positions: 1 Manager (30.0), 2 Cook (15.0), 3 Waiter (11.5), 4 Host (12.0), 5 Sous Chef (22.0)
/// - schedules: 1, 2
/// - menus: 1, 2, 3 (menu 3 unreferenced)
/// - dishes: 1 Soup, 2 Bread, 3 Pie
/// - locations: 1 Lisbon (schedule 1, menu 1), 2 Porto (schedule 2, menu 2)
/// - employees: 1 Ana (Manager @1), 2 Rui (Cook @1), 3 Eva (Manager @2), 4 Luis (Waiter @2)
/// - managements: 1 (location 1, Ana)
/// - menu items: 1 (Soup, menu 1), 2 (Bread, menu 1), 3 (Pie, menu 2)
/// - suppliers: 1 Fresh Farms; categories: 1 Vegetables, 2 Flour
/// - supplier stocks: (1, 1), (1, 2); dish requirements: (Soup, 1), (Bread, 2)
pub fn franchise_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    for (title, wage) in [
        ("Manager", 30.0),
        ("Cook", 15.0),
        ("Waiter", 11.5),
        ("Host", 12.0),
        ("Sous Chef", 22.0),
    ] {
        dataset.positions.insert(position(title, wage));
    }
    for time_table in ["Mon-Fri 08:00-22:00", "Daily 10:00-23:00"] {
        dataset.schedules.insert(Schedule {
            time_table: time_table.to_string(),
        });
    }
    for _ in 0..3 {
        dataset.menus.insert(Menu {});
    }
    for name in ["Soup", "Bread", "Pie"] {
        dataset.dishes.insert(dish(name));
    }
    dataset.locations.insert(location("Lisbon", 1, 1));
    dataset.locations.insert(location("Porto", 2, 2));
    dataset.employees.insert(employee("Ana", "Silva", 1, 1));
    dataset.employees.insert(employee("Rui", "Costa", 2, 1));
    dataset.employees.insert(employee("Eva", "Sousa", 1, 2));
    dataset.employees.insert(employee("Luis", "Pereira", 3, 2));
    dataset.managements.insert(franchise_db_core::entity::Management {
        location_id: 1,
        manager_id: 1,
    });
    for (dish_id, menu_id) in [(1, 1), (2, 1), (3, 2)] {
        dataset.menu_items.insert(MenuItem { dish_id, menu_id });
    }
    dataset.suppliers.insert(Supplier {
        name: "Fresh Farms".to_string(),
        country_code: "PT".to_string(),
        state_code: "LI".to_string(),
        city: "Sintra".to_string(),
    });
    for name in ["Vegetables", "Flour"] {
        dataset.supply_categories.insert(SupplyCategory {
            name: name.to_string(),
        });
    }
    for supply_category_id in [1, 2] {
        dataset.supplier_stocks.insert(SupplierStock {
            supplier_id: 1,
            supply_category_id,
        });
    }
    for (dish_id, supply_category_id) in [(1, 1), (2, 2)] {
        dataset.dish_requirements.insert(DishRequirement {
            dish_id,
            supply_category_id,
        });
    }
    dataset
}

pub fn franchise() -> Database {
    Database::with_dataset(franchise_dataset(), DbConfig::default()).unwrap()
}

/// Asserts the whole dataset is dense and referentially sound.
pub fn assert_sound(db: &Database) {
    let snapshot = db.snapshot();
    if let Err(e) = snapshot.check_integrity() {
        panic!("integrity audit failed: {}", e);
    }
    for kind in EntityKind::ALL {
        let table = snapshot.table(kind);
        for id in 1..=table.len() as u64 {
            assert!(table.contains(id), "{} {} missing", kind, id);
        }
        assert!(!table.contains(table.len() as u64 + 1));
    }
}
