//! The full set of tables, addressable by kind.

use serde::{Deserialize, Serialize};

use crate::entity::{
    with_entity, Dish, DishRequirement, Employee, Entity, EntityKind, Location, Management, Menu,
    MenuItem, Position, Schedule, Supplier, SupplierStock, SupplyCategory,
};
use crate::error::{DbError, Result};
use crate::table::{RecordSet, Table};

/// Every table of the franchise dataset.
///
/// Serializes as one JSON array per table in identifier order, which is also
/// the seed snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dataset {
    pub positions: Table<Position>,
    pub locations: Table<Location>,
    pub employees: Table<Employee>,
    pub managements: Table<Management>,
    pub schedules: Table<Schedule>,
    pub menus: Table<Menu>,
    pub dishes: Table<Dish>,
    pub menu_items: Table<MenuItem>,
    pub suppliers: Table<Supplier>,
    pub supply_categories: Table<SupplyCategory>,
    pub supplier_stocks: Table<SupplierStock>,
    pub dish_requirements: Table<DishRequirement>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Type-erased table for `kind`.
    pub fn table(&self, kind: EntityKind) -> &dyn RecordSet {
        with_entity!(kind, E => E::table(self) as &dyn RecordSet)
    }

    /// Mutable type-erased table for `kind`.
    pub fn table_mut(&mut self, kind: EntityKind) -> &mut dyn RecordSet {
        with_entity!(kind, E => E::table_mut(self) as &mut dyn RecordSet)
    }

    /// Number of records, across all tables, that reference `kind` record `id`.
    pub fn dependents_count(&self, kind: EntityKind, id: u64) -> usize {
        kind.referenced_by()
            .map(|source| self.table(source).referencing(kind, id).len())
            .sum()
    }

    /// Verifies referential soundness, junction uniqueness, unique fields and
    /// management cardinality over the whole dataset.
    ///
    /// Identifier density holds structurally and is not re-checked.
    pub fn check_integrity(&self) -> Result<()> {
        let mut problems: Vec<String> = EntityKind::ALL
            .into_iter()
            .flat_map(|kind| self.table(kind).audit(self))
            .collect();

        let mut managed_locations = std::collections::HashSet::new();
        let mut managers = std::collections::HashSet::new();
        for (id, management) in self.managements.iter() {
            if !managed_locations.insert(management.location_id) {
                problems.push(format!(
                    "Management {}: location {} already has a manager",
                    id, management.location_id
                ));
            }
            if !managers.insert(management.manager_id) {
                problems.push(format!(
                    "Management {}: employee {} already manages a location",
                    id, management.manager_id
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DbError::DataCorruption(problems.join("; ")))
        }
    }
}
