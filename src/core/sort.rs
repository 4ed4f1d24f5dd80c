use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::task::{locale_cmp, Attribute, TaskRecord};

/// One sorting level: an attribute and its direction. The serialized
/// field is named `value`, matching stored settings documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    #[serde(rename = "value")]
    pub attribute: Attribute,
    #[serde(default)]
    pub invert: bool,
}

pub fn default_sorting() -> Vec<SortKey> {
    [
        Attribute::Priority,
        Attribute::Projects,
        Attribute::Contexts,
        Attribute::Due,
        Attribute::Threshold,
        Attribute::Completed,
        Attribute::Created,
    ]
    .into_iter()
    .map(|attribute| SortKey {
        attribute,
        invert: false,
    })
    .collect()
}

/// Stable multi-level sort; ties at every level keep file order.
/// `file_order` skips sorting entirely and leaves records as read.
pub fn sort_records(records: &mut [TaskRecord], keys: &[SortKey], file_order: bool) {
    if file_order || keys.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_records(a, b, keys));
}

fn compare_records(a: &TaskRecord, b: &TaskRecord, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_by(a, b, key);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Records without a value for the attribute sort after those with one;
/// `invert` reverses the whole level, absence placement included.
fn compare_by(a: &TaskRecord, b: &TaskRecord, key: &SortKey) -> Ordering {
    let a_values = a.attribute_values(key.attribute);
    let b_values = b.attribute_values(key.attribute);
    let ordering = match (a_values.first(), b_values.first()) {
        (Some(left), Some(right)) => locale_cmp(left, right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    if key.invert {
        ordering.reverse()
    } else {
        ordering
    }
}
