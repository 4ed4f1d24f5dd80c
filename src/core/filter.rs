use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::task::{canonical_date, Attribute, TaskRecord};
use crate::txt::parser::parse_date;

/// One selection condition on a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub value: String,
    #[serde(default)]
    pub exclude: bool,
}

impl FilterClause {
    pub fn include(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            exclude: false,
        }
    }

    pub fn exclude(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            exclude: true,
        }
    }
}

/// Active filters, keyed by attribute. Every clause must hold for a
/// record to pass; clauses never relax each other, so two include
/// clauses on one attribute select only records carrying both values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    clauses: BTreeMap<Attribute, Vec<FilterClause>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clause list for one attribute. An empty list is the
    /// same as no entry at all.
    pub fn set(&mut self, attribute: Attribute, clauses: Vec<FilterClause>) {
        if clauses.is_empty() {
            self.clauses.remove(&attribute);
        } else {
            self.clauses.insert(attribute, clauses);
        }
    }

    pub fn get(&self, attribute: Attribute) -> &[FilterClause] {
        self.clauses
            .get(&attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.values().all(|clauses| clauses.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &[FilterClause])> {
        self.clauses
            .iter()
            .map(|(attribute, clauses)| (*attribute, clauses.as_slice()))
    }
}

// Stored filters may predate the current attribute list; entries under
// keys that are no attribute are dropped rather than failing the whole
// document.
impl<'de> Deserialize<'de> for FilterSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: BTreeMap<String, Vec<FilterClause>> = BTreeMap::deserialize(deserializer)?;
        let mut set = FilterSet::new();
        for (key, clauses) in raw {
            match Attribute::from_key(&key) {
                Some(attribute) => set.set(attribute, clauses),
                None => log::debug!("dropping filter entry for unknown attribute `{key}`"),
            }
        }
        Ok(set)
    }
}

/// Totals shown above the list: how many records exist at all and how
/// many survived search, filters, and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCounts {
    pub available: usize,
    pub visible: usize,
}

/// Select the records passing every clause of every filtered attribute.
/// Relative order is preserved; an empty filter set selects everything.
pub fn apply_filters(records: &[TaskRecord], filters: &FilterSet) -> Vec<TaskRecord> {
    if filters.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| passes_filters(record, filters))
        .cloned()
        .collect()
}

pub fn passes_filters(record: &TaskRecord, filters: &FilterSet) -> bool {
    filters.iter().all(|(attribute, clauses)| {
        clauses
            .iter()
            .all(|clause| clause_matches(record, attribute, clause))
    })
}

/// A record with no value for the attribute passes exclude clauses and
/// fails include clauses. Otherwise an include clause wants the target
/// among the record's values, an exclude clause wants it absent.
fn clause_matches(record: &TaskRecord, attribute: Attribute, clause: &FilterClause) -> bool {
    let values = record.attribute_values(attribute);
    if values.is_empty() {
        return clause.exclude;
    }
    let target = normalize_target(attribute, &clause.value);
    let matched = values.iter().any(|value| *value == target);
    matched != clause.exclude
}

/// Clause targets on date attributes go through the same canonical date
/// spelling as record values, so `2024-3-1` selects `due:2024-03-01`.
fn normalize_target(attribute: Attribute, value: &str) -> String {
    if attribute.is_date() {
        if let Some(date) = parse_date(value) {
            return canonical_date(date);
        }
    }
    value.to_string()
}
