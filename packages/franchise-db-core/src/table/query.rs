//! Filter, sort and page pipeline for collection listings.

use std::borrow::Cow;

use super::Table;
use crate::dataset::Dataset;
use crate::entity::{normalize_field, Entity};

/// Collections at least this large are filtered in parallel.
#[cfg(feature = "parallel")]
const PARALLEL_FILTER_THRESHOLD: usize = 1024;

/// Options parsed from a `query:opt=val&opt=val` path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Case-insensitive substring matched against the display field
    pub filter: Option<String>,
    /// Normalized field name to sort by
    pub sort_by: Option<String>,
    /// Reverse the selected order
    pub descending: bool,
    /// Page size (absolute value of `pgsz`)
    pub page_size: Option<u64>,
    /// One-based page index (absolute value of `pgind`)
    pub page_index: Option<u64>,
}

impl QueryOptions {
    /// Parses the option list of a query segment.
    ///
    /// The `query:` prefix is optional. Option names are case-insensitive;
    /// unknown options and values that fail to parse are ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = match raw.get(..6) {
            Some(prefix) if prefix.eq_ignore_ascii_case("query:") => &raw[6..],
            _ => raw,
        };

        let mut options = Self::default();
        for pair in raw.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "filter" => options.filter = Some(value.to_string()),
                "sortby" => options.sort_by = Some(normalize_field(value)),
                "desc" => {
                    if let Ok(flag) = value.to_ascii_lowercase().parse::<bool>() {
                        options.descending = flag;
                    }
                }
                "pgsz" => {
                    if let Ok(size) = value.parse::<i64>() {
                        options.page_size = Some(size.unsigned_abs());
                    }
                }
                "pgind" => {
                    if let Ok(index) = value.parse::<i64>() {
                        options.page_index = Some(index.unsigned_abs());
                    }
                }
                _ => {}
            }
        }
        options
    }

    /// Returns `(skip, take)` for the page stage, or `None` when no page
    /// size was given.
    pub fn page_window(&self) -> Option<(usize, usize)> {
        let size = self.page_size?;
        let index = self.page_index.unwrap_or(1);
        let start = index.saturating_sub(1).saturating_mul(size);
        Some((
            usize::try_from(start).unwrap_or(usize::MAX),
            usize::try_from(size).unwrap_or(usize::MAX),
        ))
    }
}

fn matches<E: Entity>(id: u64, record: &E, dataset: &Dataset, needle: &str) -> bool {
    let text = match record.display_field() {
        Some(field) => Cow::Borrowed(field),
        None => Cow::Owned(record.summary(id, dataset)),
    };
    text.to_lowercase().contains(needle)
}

#[cfg(feature = "parallel")]
fn filter_ids<E: Entity>(table: &Table<E>, dataset: &Dataset, needle: &str) -> Vec<u64> {
    use rayon::prelude::*;

    if table.len() < PARALLEL_FILTER_THRESHOLD {
        return table
            .iter()
            .filter(|(id, record)| matches(*id, *record, dataset, needle))
            .map(|(id, _)| id)
            .collect();
    }
    let rows: Vec<(u64, &E)> = table.iter().collect();
    rows.par_iter()
        .filter(|(id, record)| matches(*id, *record, dataset, needle))
        .map(|(id, _)| *id)
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn filter_ids<E: Entity>(table: &Table<E>, dataset: &Dataset, needle: &str) -> Vec<u64> {
    table
        .iter()
        .filter(|(id, record)| matches(*id, *record, dataset, needle))
        .map(|(id, _)| id)
        .collect()
}

/// Runs filter → sort → page and returns the selected identifiers in order.
pub(crate) fn run<E: Entity>(table: &Table<E>, dataset: &Dataset, options: &QueryOptions) -> Vec<u64> {
    let mut ids = match &options.filter {
        Some(needle) => filter_ids(table, dataset, &needle.to_lowercase()),
        None => table.iter().map(|(id, _)| id).collect(),
    };

    if let Some(field) = options.sort_by.as_deref() {
        if E::SORT_FIELDS.contains(&field) {
            ids.sort_by_cached_key(|id| table.get(*id).and_then(|record| record.sort_key(field)));
        }
    }

    if options.descending {
        ids.reverse();
    }

    match options.page_window() {
        Some((skip, take)) => ids.into_iter().skip(skip).take(take).collect(),
        None => ids,
    }
}
