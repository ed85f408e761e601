//! Entity kinds, schema descriptors, and the record trait.
//!
//! Every table is described statically by its [`EntityKind`]: the foreign
//! keys it owns, the relation fields a payload must not populate, and the
//! delete policy applied when one of its rows is removed.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::DbConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::table::Table;

mod records;

pub use records::{
    Dish, DishRequirement, Employee, Location, Management, Menu, MenuItem, Position, Schedule,
    Supplier, SupplierStock, SupplyCategory,
};

/// Every table in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Position,
    Location,
    Employee,
    Management,
    Schedule,
    Menu,
    Dish,
    MenuItem,
    Supplier,
    SupplyCategory,
    SupplierStock,
    DishRequirement,
}

/// Structural role of a table in the reference graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Referenced by other tables, owns no foreign keys
    Parent,
    /// Owns foreign keys and is referenced by other tables
    ParentChild,
    /// Pairing of two foreign keys with no dependents
    Junction,
}

/// What happens to dependents when a row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Compact immediately; the table has no dependents
    Compact,
    /// Refuse while any row references the target
    Block,
    /// Reset descriptive fields while referenced, compact otherwise
    SoftClear,
}

/// Foreign key owned by a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Field name in the owning record
    pub field: &'static str,
    /// Table the key points into
    pub target: EntityKind,
}

/// Shape of a navigation field that payloads must leave unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationShape {
    Object,
    Collection,
}

/// Navigation field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationField {
    pub name: &'static str,
    pub shape: RelationShape,
}

// Expands to struct literals so schema slices stay promotable to `'static`.
macro_rules! fk {
    ($field:literal, $target:expr) => {
        ForeignKey {
            field: $field,
            target: $target,
        }
    };
}

macro_rules! object {
    ($name:literal) => {
        RelationField {
            name: $name,
            shape: RelationShape::Object,
        }
    };
}

macro_rules! collection {
    ($name:literal) => {
        RelationField {
            name: $name,
            shape: RelationShape::Collection,
        }
    };
}

impl EntityKind {
    /// All kinds in table order.
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Position,
        EntityKind::Location,
        EntityKind::Employee,
        EntityKind::Management,
        EntityKind::Schedule,
        EntityKind::Menu,
        EntityKind::Dish,
        EntityKind::MenuItem,
        EntityKind::Supplier,
        EntityKind::SupplyCategory,
        EntityKind::SupplierStock,
        EntityKind::DishRequirement,
    ];

    /// Display name of the entity.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Position => "Position",
            EntityKind::Location => "Location",
            EntityKind::Employee => "Employee",
            EntityKind::Management => "Management",
            EntityKind::Schedule => "Schedule",
            EntityKind::Menu => "Menu",
            EntityKind::Dish => "Dish",
            EntityKind::MenuItem => "MenuItem",
            EntityKind::Supplier => "Supplier",
            EntityKind::SupplyCategory => "SupplyCategory",
            EntityKind::SupplierStock => "SupplierStock",
            EntityKind::DishRequirement => "DishRequirement",
        }
    }

    /// URL path segment of the collection.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Position => "positions",
            EntityKind::Location => "locations",
            EntityKind::Employee => "employees",
            EntityKind::Management => "managements",
            EntityKind::Schedule => "schedules",
            EntityKind::Menu => "menus",
            EntityKind::Dish => "dishes",
            EntityKind::MenuItem => "menu-items",
            EntityKind::Supplier => "suppliers",
            EntityKind::SupplyCategory => "supply-categories",
            EntityKind::SupplierStock => "supplier-stocks",
            EntityKind::DishRequirement => "dish-requirements",
        }
    }

    /// Resolves a collection path segment.
    pub fn from_collection(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection().eq_ignore_ascii_case(name))
    }

    /// Foreign keys owned by rows of this table, in record field order.
    pub fn foreign_keys(self) -> &'static [ForeignKey] {
        use EntityKind::*;
        match self {
            Location => &[fk!("schedule_id", Schedule), fk!("menu_id", Menu)],
            Employee => &[fk!("position_id", Position), fk!("location_id", Location)],
            Management => &[fk!("location_id", Location), fk!("manager_id", Employee)],
            MenuItem => &[fk!("dish_id", Dish), fk!("menu_id", Menu)],
            SupplierStock => &[
                fk!("supplier_id", Supplier),
                fk!("supply_category_id", SupplyCategory),
            ],
            DishRequirement => &[
                fk!("dish_id", Dish),
                fk!("supply_category_id", SupplyCategory),
            ],
            Position | Schedule | Menu | Dish | Supplier | SupplyCategory => &[],
        }
    }

    /// Navigation fields a create/update payload may not populate.
    pub fn relation_fields(self) -> &'static [RelationField] {
        match self {
            EntityKind::Position => &[collection!("employees")],
            EntityKind::Location => &[
                object!("schedule"),
                object!("menu"),
                collection!("employees"),
                collection!("managements"),
            ],
            EntityKind::Employee => &[
                object!("position"),
                object!("location"),
                collection!("managements"),
            ],
            EntityKind::Management => &[object!("location"), object!("manager")],
            EntityKind::Schedule => &[collection!("locations")],
            EntityKind::Menu => &[collection!("locations"), collection!("menu_items")],
            EntityKind::Dish => &[
                collection!("menu_items"),
                collection!("dish_requirements"),
            ],
            EntityKind::MenuItem => &[object!("dish"), object!("menu")],
            EntityKind::Supplier => &[collection!("supplier_stocks")],
            EntityKind::SupplyCategory => &[
                collection!("supplier_stocks"),
                collection!("dish_requirements"),
            ],
            EntityKind::SupplierStock => &[object!("supplier"), object!("supply_category")],
            EntityKind::DishRequirement => &[object!("dish"), object!("supply_category")],
        }
    }

    /// Tables owning a foreign key into this one.
    pub fn referenced_by(self) -> impl Iterator<Item = EntityKind> {
        Self::ALL.into_iter().filter(move |source| {
            source
                .foreign_keys()
                .iter()
                .any(|key| key.target == self)
        })
    }

    /// Structural category derived from the reference graph.
    pub fn category(self) -> Category {
        let owns_keys = !self.foreign_keys().is_empty();
        let referenced = self.referenced_by().next().is_some();
        match (owns_keys, referenced) {
            (true, false) => Category::Junction,
            (true, true) => Category::ParentChild,
            (false, _) => Category::Parent,
        }
    }

    /// Delete policy applied to rows of this table.
    pub fn delete_policy(self) -> DeletePolicy {
        match self {
            EntityKind::Position => DeletePolicy::SoftClear,
            EntityKind::Management
            | EntityKind::MenuItem
            | EntityKind::SupplierStock
            | EntityKind::DishRequirement => DeletePolicy::Compact,
            EntityKind::Location
            | EntityKind::Employee
            | EntityKind::Schedule
            | EntityKind::Menu
            | EntityKind::Dish
            | EntityKind::Supplier
            | EntityKind::SupplyCategory => DeletePolicy::Block,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercases a field name and drops separators so `started_on`,
/// `startedOn` and `StartedOn` compare equal.
pub fn normalize_field(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Comparable projection of a sortable field.
#[derive(Debug, Clone)]
pub enum SortKey {
    Int(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Int(_) => 0,
            SortKey::Real(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Date(_) => 3,
        }
    }

    /// Case-insensitive text key.
    pub fn text(value: &str) -> Self {
        SortKey::Text(value.to_lowercase())
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Int(a), SortKey::Int(b)) => a.cmp(b),
            (SortKey::Real(a), SortKey::Real(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A record stored in one of the dataset tables.
///
/// Records never carry their own identifier: a record's identifier is its
/// slot in the owning [`Table`]. Foreign keys are exposed positionally, in
/// the order of [`EntityKind::foreign_keys`].
pub trait Entity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Table this record lives in.
    const KIND: EntityKind;

    /// Normalized names accepted by `sortby`.
    const SORT_FIELDS: &'static [&'static str] = &[];

    /// Typed table accessor.
    fn table(dataset: &Dataset) -> &Table<Self>;

    /// Typed mutable table accessor.
    fn table_mut(dataset: &mut Dataset) -> &mut Table<Self>;

    /// Foreign key values, aligned with `KIND.foreign_keys()`.
    fn foreign_keys(&self) -> Vec<u64> {
        Vec::new()
    }

    /// Mutable foreign key slots, aligned with `KIND.foreign_keys()`.
    fn foreign_keys_mut(&mut self) -> Vec<&mut u64> {
        Vec::new()
    }

    /// Field matched by the `filter` query option. `None` falls back to the
    /// narrative summary.
    fn display_field(&self) -> Option<&str> {
        None
    }

    /// Scalar field that must be unique across the table.
    fn unique_field(&self) -> Option<(&'static str, &str)> {
        None
    }

    /// Sort key for a normalized field name listed in `SORT_FIELDS`.
    fn sort_key(&self, _field: &str) -> Option<SortKey> {
        None
    }

    /// Field-level constraints (text length, non-negative numbers).
    fn check_fields(&self, _config: &DbConfig) -> Result<()> {
        Ok(())
    }

    /// Table-specific business rules, checked after keys and uniqueness.
    /// `slot` is the record's own identifier on update.
    fn check_rules(&self, _dataset: &Dataset, _slot: Option<u64>, _config: &DbConfig) -> Result<()> {
        Ok(())
    }

    /// Replaces descriptive fields with `sentinel`. Returns `false` when the
    /// entity has nothing to clear.
    fn clear_descriptive(&mut self, _sentinel: &str) -> bool {
        false
    }

    /// Human-readable description joined with related records.
    fn summary(&self, id: u64, dataset: &Dataset) -> String;
}

/// Expands `$body` once per entity kind with `$e` bound to the record type.
macro_rules! with_entity {
    ($kind:expr, $e:ident => $body:expr) => {
        match $kind {
            $crate::entity::EntityKind::Position => {
                type $e = $crate::entity::Position;
                $body
            }
            $crate::entity::EntityKind::Location => {
                type $e = $crate::entity::Location;
                $body
            }
            $crate::entity::EntityKind::Employee => {
                type $e = $crate::entity::Employee;
                $body
            }
            $crate::entity::EntityKind::Management => {
                type $e = $crate::entity::Management;
                $body
            }
            $crate::entity::EntityKind::Schedule => {
                type $e = $crate::entity::Schedule;
                $body
            }
            $crate::entity::EntityKind::Menu => {
                type $e = $crate::entity::Menu;
                $body
            }
            $crate::entity::EntityKind::Dish => {
                type $e = $crate::entity::Dish;
                $body
            }
            $crate::entity::EntityKind::MenuItem => {
                type $e = $crate::entity::MenuItem;
                $body
            }
            $crate::entity::EntityKind::Supplier => {
                type $e = $crate::entity::Supplier;
                $body
            }
            $crate::entity::EntityKind::SupplyCategory => {
                type $e = $crate::entity::SupplyCategory;
                $body
            }
            $crate::entity::EntityKind::SupplierStock => {
                type $e = $crate::entity::SupplierStock;
                $body
            }
            $crate::entity::EntityKind::DishRequirement => {
                type $e = $crate::entity::DishRequirement;
                $body
            }
        }
    };
}

pub(crate) use with_entity;
