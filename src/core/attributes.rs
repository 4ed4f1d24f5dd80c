use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::task::{locale_cmp, Attribute, TaskRecord};

/// One distinct attribute value and the number of records carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub value: String,
    pub count: usize,
}

/// Facet lists for all nine attributes. Every bucket is always present,
/// empty when no record carries the attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetMap {
    pub priority: Vec<Facet>,
    pub projects: Vec<Facet>,
    pub contexts: Vec<Facet>,
    pub due: Vec<Facet>,
    pub t: Vec<Facet>,
    pub rec: Vec<Facet>,
    pub pm: Vec<Facet>,
    pub created: Vec<Facet>,
    pub completed: Vec<Facet>,
}

impl FacetMap {
    pub fn bucket(&self, attribute: Attribute) -> &[Facet] {
        match attribute {
            Attribute::Priority => &self.priority,
            Attribute::Projects => &self.projects,
            Attribute::Contexts => &self.contexts,
            Attribute::Due => &self.due,
            Attribute::Threshold => &self.t,
            Attribute::Rec => &self.rec,
            Attribute::Pm => &self.pm,
            Attribute::Created => &self.created,
            Attribute::Completed => &self.completed,
        }
    }

    fn set_bucket(&mut self, attribute: Attribute, facets: Vec<Facet>) {
        match attribute {
            Attribute::Priority => self.priority = facets,
            Attribute::Projects => self.projects = facets,
            Attribute::Contexts => self.contexts = facets,
            Attribute::Due => self.due = facets,
            Attribute::Threshold => self.t = facets,
            Attribute::Rec => self.rec = facets,
            Attribute::Pm => self.pm = facets,
            Attribute::Created => self.created = facets,
            Attribute::Completed => self.completed = facets,
        }
    }
}

/// Count every attribute value across the record set in one scan.
///
/// A record contributes at most once per distinct value (a line naming
/// `+home` twice is still one `home`), and date values group by calendar
/// day regardless of their source spelling. Each bucket comes back
/// sorted ascending by value.
pub fn aggregate_attributes(records: &[TaskRecord]) -> FacetMap {
    let mut counts: [(Attribute, HashMap<String, usize>); 9] =
        Attribute::ALL.map(|attribute| (attribute, HashMap::new()));

    for record in records {
        for (attribute, bucket) in counts.iter_mut() {
            for value in record.attribute_values(*attribute) {
                *bucket.entry(value).or_insert(0) += 1;
            }
        }
    }

    let mut facets = FacetMap::default();
    for (attribute, bucket) in counts {
        let mut sorted: Vec<Facet> = bucket
            .into_iter()
            .map(|(value, count)| Facet { value, count })
            .collect();
        sorted.sort_by(|a, b| locale_cmp(&a.value, &b.value));
        facets.set_bucket(attribute, sorted);
    }
    facets
}
