//! Basic and narrative projections, and nested-resource listings.

use serde::Serialize;
use serde_json::Value;

use crate::dataset::Dataset;
use crate::entity::{Entity, EntityKind};
use crate::error::{DbError, Result};

/// Display-oriented projection of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub id: u64,
    pub summary: String,
}

#[derive(Serialize)]
struct Basic<'a, E> {
    id: u64,
    #[serde(flatten)]
    record: &'a E,
}

/// Raw scalar fields of a record plus its identifier.
pub fn basic<E: Entity>(id: u64, record: &E) -> Result<Value> {
    serde_json::to_value(Basic { id, record })
        .map_err(|e| DbError::SerializationError(e.to_string()))
}

/// Narrative projection of one record.
pub fn narrative<E: Entity>(id: u64, record: &E, dataset: &Dataset) -> Narrative {
    Narrative {
        id,
        summary: record.summary(id, dataset),
    }
}

/// How a nested resource reaches its records from the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependents {
    /// Rows of `child` holding a foreign key to the parent
    Direct { child: EntityKind },
    /// Rows of `far` paired with the parent through `junction`
    Through {
        junction: EntityKind,
        far: EntityKind,
    },
}

/// Nested collection reachable under `/{parent}/{id}/{segment}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestedResource {
    pub parent: EntityKind,
    pub segment: &'static str,
    pub via: Dependents,
}

const fn direct(parent: EntityKind, segment: &'static str, child: EntityKind) -> NestedResource {
    NestedResource {
        parent,
        segment,
        via: Dependents::Direct { child },
    }
}

const fn through(
    parent: EntityKind,
    segment: &'static str,
    junction: EntityKind,
    far: EntityKind,
) -> NestedResource {
    NestedResource {
        parent,
        segment,
        via: Dependents::Through { junction, far },
    }
}

/// Every nested resource exposed by the store.
pub const NESTED_RESOURCES: &[NestedResource] = &[
    direct(EntityKind::Position, "employees", EntityKind::Employee),
    direct(EntityKind::Location, "employees", EntityKind::Employee),
    through(
        EntityKind::Location,
        "managers",
        EntityKind::Management,
        EntityKind::Employee,
    ),
    direct(EntityKind::Schedule, "locations", EntityKind::Location),
    direct(EntityKind::Menu, "locations", EntityKind::Location),
    through(
        EntityKind::Menu,
        "dishes",
        EntityKind::MenuItem,
        EntityKind::Dish,
    ),
    through(
        EntityKind::Dish,
        "menus",
        EntityKind::MenuItem,
        EntityKind::Menu,
    ),
    through(
        EntityKind::Dish,
        "requirements",
        EntityKind::DishRequirement,
        EntityKind::SupplyCategory,
    ),
    through(
        EntityKind::Supplier,
        "categories",
        EntityKind::SupplierStock,
        EntityKind::SupplyCategory,
    ),
    through(
        EntityKind::SupplyCategory,
        "suppliers",
        EntityKind::SupplierStock,
        EntityKind::Supplier,
    ),
    through(
        EntityKind::SupplyCategory,
        "dishes",
        EntityKind::DishRequirement,
        EntityKind::Dish,
    ),
];

/// Looks up the nested resource `segment` of `parent`.
pub fn nested_resource(parent: EntityKind, segment: &str) -> Option<&'static NestedResource> {
    NESTED_RESOURCES
        .iter()
        .find(|nested| nested.parent == parent && nested.segment.eq_ignore_ascii_case(segment))
}

/// Narratives of the records under `/{parent}/{id}/{segment}`.
pub fn dependents(
    dataset: &Dataset,
    parent: EntityKind,
    id: u64,
    segment: &str,
) -> Result<Vec<Narrative>> {
    let nested = nested_resource(parent, segment).ok_or_else(|| DbError::UnknownRelation {
        entity: parent,
        relation: segment.to_string(),
    })?;
    if !dataset.table(parent).contains(id) {
        return Err(DbError::NotFound { entity: parent, id });
    }

    let (target, ids) = match nested.via {
        Dependents::Direct { child } => (child, dataset.table(child).referencing(parent, id)),
        Dependents::Through { junction, far } => {
            let pairs = dataset.table(junction);
            let mut ids = Vec::new();
            for row in pairs.referencing(parent, id) {
                if let Some(far_id) = pairs.reference(row, far) {
                    if !ids.contains(&far_id) {
                        ids.push(far_id);
                    }
                }
            }
            (far, ids)
        }
    };

    let table = dataset.table(target);
    ids.into_iter()
        .map(|id| table.narrative(id, dataset))
        .collect()
}
