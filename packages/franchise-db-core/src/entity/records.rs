//! Record types for every table.
//!
//! Records hold scalar fields and foreign-key scalars only. They are also the
//! create/update payload schema, so a payload cannot express an identifier or
//! a nested related object.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, SortKey};
use crate::config::DbConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::table::Table;
use crate::validation;

macro_rules! stored_in {
    ($field:ident) => {
        fn table(dataset: &Dataset) -> &Table<Self> {
            &dataset.$field
        }

        fn table_mut(dataset: &mut Dataset) -> &mut Table<Self> {
            &mut dataset.$field
        }
    };
}

/// Renders a related record, or a placeholder when the key dangles.
fn describe<E: Entity>(dataset: &Dataset, id: u64, render: impl Fn(&E) -> String) -> String {
    E::table(dataset)
        .get(id)
        .map(render)
        .unwrap_or_else(|| format!("unknown {} #{}", E::KIND.name().to_lowercase(), id))
}

fn joined(names: Vec<String>) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Job title with an hourly wage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Position {
    pub title: String,
    pub wage: f64,
}

impl Entity for Position {
    const KIND: EntityKind = EntityKind::Position;
    const SORT_FIELDS: &'static [&'static str] = &["title", "wage"];

    stored_in!(positions);

    fn display_field(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn unique_field(&self) -> Option<(&'static str, &str)> {
        Some(("title", &self.title))
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "title" => Some(SortKey::text(&self.title)),
            "wage" => Some(SortKey::Real(self.wage)),
            _ => None,
        }
    }

    fn check_fields(&self, config: &DbConfig) -> Result<()> {
        validation::check_text(Self::KIND, "title", &self.title, config)?;
        validation::check_non_negative(Self::KIND, "wage", self.wage)
    }

    fn clear_descriptive(&mut self, sentinel: &str) -> bool {
        self.title = sentinel.to_string();
        self.wage = 0.0;
        true
    }

    fn summary(&self, id: u64, dataset: &Dataset) -> String {
        let holders = dataset
            .employees
            .iter()
            .filter(|(_, employee)| employee.position_id == id)
            .count();
        format!(
            "{} earning {:.2} per hour, held by {} employee(s)",
            self.title, self.wage, holders
        )
    }
}

/// Restaurant location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub country: String,
    pub country_code: String,
    pub state: String,
    pub state_code: String,
    pub city: String,
    pub street: String,
    pub open_since: NaiveDate,
    pub schedule_id: u64,
    pub menu_id: u64,
}

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Location;
    const SORT_FIELDS: &'static [&'static str] = &[
        "country",
        "state",
        "city",
        "street",
        "opensince",
        "scheduleid",
        "menuid",
    ];

    stored_in!(locations);

    fn foreign_keys(&self) -> Vec<u64> {
        vec![self.schedule_id, self.menu_id]
    }

    fn foreign_keys_mut(&mut self) -> Vec<&mut u64> {
        vec![&mut self.schedule_id, &mut self.menu_id]
    }

    fn display_field(&self) -> Option<&str> {
        Some(&self.city)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "country" => Some(SortKey::text(&self.country)),
            "state" => Some(SortKey::text(&self.state)),
            "city" => Some(SortKey::text(&self.city)),
            "street" => Some(SortKey::text(&self.street)),
            "opensince" => Some(SortKey::Date(self.open_since)),
            "scheduleid" => Some(SortKey::Int(self.schedule_id as i64)),
            "menuid" => Some(SortKey::Int(self.menu_id as i64)),
            _ => None,
        }
    }

    fn check_fields(&self, config: &DbConfig) -> Result<()> {
        for (field, value) in [
            ("country", &self.country),
            ("country_code", &self.country_code),
            ("state", &self.state),
            ("state_code", &self.state_code),
            ("city", &self.city),
            ("street", &self.street),
        ] {
            validation::check_text(Self::KIND, field, value, config)?;
        }
        Ok(())
    }

    fn summary(&self, _id: u64, dataset: &Dataset) -> String {
        let schedule = describe(dataset, self.schedule_id, |s: &Schedule| {
            s.time_table.clone()
        });
        format!(
            "{}, {}, {} ({}), {} ({}); open since {}; schedule \"{}\"; menu #{}",
            self.street,
            self.city,
            self.state,
            self.state_code,
            self.country,
            self.country_code,
            self.open_since,
            schedule,
            self.menu_id
        )
    }
}

/// Employee working at one location in one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Employee {
    pub first_name: String,
    pub last_name: String,
    pub started_on: NaiveDate,
    pub weekly_hours: i32,
    pub position_id: u64,
    pub location_id: u64,
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;
    const SORT_FIELDS: &'static [&'static str] = &[
        "firstname",
        "lastname",
        "startedon",
        "weeklyhours",
        "positionid",
        "locationid",
    ];

    stored_in!(employees);

    fn foreign_keys(&self) -> Vec<u64> {
        vec![self.position_id, self.location_id]
    }

    fn foreign_keys_mut(&mut self) -> Vec<&mut u64> {
        vec![&mut self.position_id, &mut self.location_id]
    }

    fn display_field(&self) -> Option<&str> {
        Some(&self.last_name)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "firstname" => Some(SortKey::text(&self.first_name)),
            "lastname" => Some(SortKey::text(&self.last_name)),
            "startedon" => Some(SortKey::Date(self.started_on)),
            "weeklyhours" => Some(SortKey::Int(self.weekly_hours as i64)),
            "positionid" => Some(SortKey::Int(self.position_id as i64)),
            "locationid" => Some(SortKey::Int(self.location_id as i64)),
            _ => None,
        }
    }

    fn check_fields(&self, config: &DbConfig) -> Result<()> {
        validation::check_text(Self::KIND, "first_name", &self.first_name, config)?;
        validation::check_text(Self::KIND, "last_name", &self.last_name, config)?;
        validation::check_weekly_hours(Self::KIND, "weekly_hours", self.weekly_hours)
    }

    fn summary(&self, _id: u64, dataset: &Dataset) -> String {
        let position = describe(dataset, self.position_id, |p: &Position| p.title.clone());
        let location = describe(dataset, self.location_id, |l: &Location| {
            format!("{}, {}", l.street, l.city)
        });
        format!(
            "{} {}, {} at {}, since {}, {} hours per week",
            self.first_name, self.last_name, position, location, self.started_on, self.weekly_hours
        )
    }
}

/// Assignment of a manager to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Management {
    pub location_id: u64,
    pub manager_id: u64,
}

impl Entity for Management {
    const KIND: EntityKind = EntityKind::Management;
    const SORT_FIELDS: &'static [&'static str] = &["locationid", "managerid"];

    stored_in!(managements);

    fn foreign_keys(&self) -> Vec<u64> {
        vec![self.location_id, self.manager_id]
    }

    fn foreign_keys_mut(&mut self) -> Vec<&mut u64> {
        vec![&mut self.location_id, &mut self.manager_id]
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "locationid" => Some(SortKey::Int(self.location_id as i64)),
            "managerid" => Some(SortKey::Int(self.manager_id as i64)),
            _ => None,
        }
    }

    fn check_rules(&self, dataset: &Dataset, slot: Option<u64>, config: &DbConfig) -> Result<()> {
        validation::check_management(self, dataset, slot, config)
    }

    fn summary(&self, _id: u64, dataset: &Dataset) -> String {
        let manager = describe(dataset, self.manager_id, |e: &Employee| {
            format!("{} {}", e.first_name, e.last_name)
        });
        let location = describe(dataset, self.location_id, |l: &Location| {
            format!("{}, {}", l.street, l.city)
        });
        format!("{} manages {}", manager, location)
    }
}

/// Opening hours shared by locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schedule {
    pub time_table: String,
}

impl Entity for Schedule {
    const KIND: EntityKind = EntityKind::Schedule;
    const SORT_FIELDS: &'static [&'static str] = &["timetable"];

    stored_in!(schedules);

    fn display_field(&self) -> Option<&str> {
        Some(&self.time_table)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        (field == "timetable").then(|| SortKey::text(&self.time_table))
    }

    fn check_fields(&self, config: &DbConfig) -> Result<()> {
        validation::check_text(Self::KIND, "time_table", &self.time_table, config)
    }

    fn summary(&self, id: u64, dataset: &Dataset) -> String {
        let locations = dataset
            .locations
            .iter()
            .filter(|(_, location)| location.schedule_id == id)
            .count();
        format!("{} ({} location(s))", self.time_table, locations)
    }
}

/// Menu; its content lives in menu items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Menu {}

impl Entity for Menu {
    const KIND: EntityKind = EntityKind::Menu;

    stored_in!(menus);

    fn summary(&self, id: u64, dataset: &Dataset) -> String {
        let dishes = dataset
            .menu_items
            .iter()
            .filter(|(_, item)| item.menu_id == id)
            .map(|(_, item)| describe(dataset, item.dish_id, |d: &Dish| d.name.clone()))
            .collect();
        format!("Menu #{}: {}", id, joined(dishes))
    }
}

/// Dish served on menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dish {
    pub name: String,
}

impl Entity for Dish {
    const KIND: EntityKind = EntityKind::Dish;
    const SORT_FIELDS: &'static [&'static str] = &["name"];

    stored_in!(dishes);

    fn display_field(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        (field == "name").then(|| SortKey::text(&self.name))
    }

    fn check_fields(&self, config: &DbConfig) -> Result<()> {
        validation::check_text(Self::KIND, "name", &self.name, config)
    }

    fn summary(&self, id: u64, dataset: &Dataset) -> String {
        let menus = dataset
            .menu_items
            .iter()
            .filter(|(_, item)| item.dish_id == id)
            .count();
        let requirements = dataset
            .dish_requirements
            .iter()
            .filter(|(_, requirement)| requirement.dish_id == id)
            .map(|(_, requirement)| {
                describe(dataset, requirement.supply_category_id, |c: &SupplyCategory| {
                    c.name.clone()
                })
            })
            .collect();
        format!(
            "{}, on {} menu(s), requires: {}",
            self.name,
            menus,
            joined(requirements)
        )
    }
}

/// Dish listed on a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuItem {
    pub dish_id: u64,
    pub menu_id: u64,
}

impl Entity for MenuItem {
    const KIND: EntityKind = EntityKind::MenuItem;
    const SORT_FIELDS: &'static [&'static str] = &["dishid", "menuid"];

    stored_in!(menu_items);

    fn foreign_keys(&self) -> Vec<u64> {
        vec![self.dish_id, self.menu_id]
    }

    fn foreign_keys_mut(&mut self) -> Vec<&mut u64> {
        vec![&mut self.dish_id, &mut self.menu_id]
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "dishid" => Some(SortKey::Int(self.dish_id as i64)),
            "menuid" => Some(SortKey::Int(self.menu_id as i64)),
            _ => None,
        }
    }

    fn summary(&self, _id: u64, dataset: &Dataset) -> String {
        let dish = describe(dataset, self.dish_id, |d: &Dish| d.name.clone());
        format!("{} on menu #{}", dish, self.menu_id)
    }
}

/// Supplier of goods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Supplier {
    pub name: String,
    pub country_code: String,
    pub state_code: String,
    pub city: String,
}

impl Entity for Supplier {
    const KIND: EntityKind = EntityKind::Supplier;
    const SORT_FIELDS: &'static [&'static str] = &["name", "city"];

    stored_in!(suppliers);

    fn display_field(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::text(&self.name)),
            "city" => Some(SortKey::text(&self.city)),
            _ => None,
        }
    }

    fn check_fields(&self, config: &DbConfig) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("country_code", &self.country_code),
            ("state_code", &self.state_code),
            ("city", &self.city),
        ] {
            validation::check_text(Self::KIND, field, value, config)?;
        }
        Ok(())
    }

    fn summary(&self, id: u64, dataset: &Dataset) -> String {
        let stocked = dataset
            .supplier_stocks
            .iter()
            .filter(|(_, stock)| stock.supplier_id == id)
            .map(|(_, stock)| {
                describe(dataset, stock.supply_category_id, |c: &SupplyCategory| {
                    c.name.clone()
                })
            })
            .collect();
        format!(
            "{} of {}, {}, {}; stocks: {}",
            self.name,
            self.city,
            self.state_code,
            self.country_code,
            joined(stocked)
        )
    }
}

/// Category of supplies a dish needs and a supplier stocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupplyCategory {
    pub name: String,
}

impl Entity for SupplyCategory {
    const KIND: EntityKind = EntityKind::SupplyCategory;
    const SORT_FIELDS: &'static [&'static str] = &["name"];

    stored_in!(supply_categories);

    fn display_field(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        (field == "name").then(|| SortKey::text(&self.name))
    }

    fn check_fields(&self, config: &DbConfig) -> Result<()> {
        validation::check_text(Self::KIND, "name", &self.name, config)
    }

    fn summary(&self, id: u64, dataset: &Dataset) -> String {
        let suppliers = dataset
            .supplier_stocks
            .iter()
            .filter(|(_, stock)| stock.supply_category_id == id)
            .count();
        format!("{}, stocked by {} supplier(s)", self.name, suppliers)
    }
}

/// Supply category stocked by a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupplierStock {
    pub supplier_id: u64,
    pub supply_category_id: u64,
}

impl Entity for SupplierStock {
    const KIND: EntityKind = EntityKind::SupplierStock;
    const SORT_FIELDS: &'static [&'static str] = &["supplierid", "supplycategoryid"];

    stored_in!(supplier_stocks);

    fn foreign_keys(&self) -> Vec<u64> {
        vec![self.supplier_id, self.supply_category_id]
    }

    fn foreign_keys_mut(&mut self) -> Vec<&mut u64> {
        vec![&mut self.supplier_id, &mut self.supply_category_id]
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "supplierid" => Some(SortKey::Int(self.supplier_id as i64)),
            "supplycategoryid" => Some(SortKey::Int(self.supply_category_id as i64)),
            _ => None,
        }
    }

    fn summary(&self, _id: u64, dataset: &Dataset) -> String {
        let supplier = describe(dataset, self.supplier_id, |s: &Supplier| s.name.clone());
        let category = describe(dataset, self.supply_category_id, |c: &SupplyCategory| {
            c.name.clone()
        });
        format!("{} stocks {}", supplier, category)
    }
}

/// Supply category a dish requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DishRequirement {
    pub dish_id: u64,
    pub supply_category_id: u64,
}

impl Entity for DishRequirement {
    const KIND: EntityKind = EntityKind::DishRequirement;
    const SORT_FIELDS: &'static [&'static str] = &["dishid", "supplycategoryid"];

    stored_in!(dish_requirements);

    fn foreign_keys(&self) -> Vec<u64> {
        vec![self.dish_id, self.supply_category_id]
    }

    fn foreign_keys_mut(&mut self) -> Vec<&mut u64> {
        vec![&mut self.dish_id, &mut self.supply_category_id]
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "dishid" => Some(SortKey::Int(self.dish_id as i64)),
            "supplycategoryid" => Some(SortKey::Int(self.supply_category_id as i64)),
            _ => None,
        }
    }

    fn summary(&self, _id: u64, dataset: &Dataset) -> String {
        let dish = describe(dataset, self.dish_id, |d: &Dish| d.name.clone());
        let category = describe(dataset, self.supply_category_id, |c: &SupplyCategory| {
            c.name.clone()
        });
        format!("{} requires {}", dish, category)
    }
}
