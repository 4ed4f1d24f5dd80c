use serde::Serialize;

use super::attributes::{aggregate_attributes, FacetMap};
use super::filter::{apply_filters, FilterSet, HeaderCounts};
use super::search::apply_search;
use super::sort::sort_records;
use super::task::TaskRecord;
use crate::config::Settings;
use crate::txt::parser::parse_source;

/// Everything a view needs after one pass over the source text.
#[derive(Debug, Clone, Serialize)]
pub struct RequestOutcome {
    pub records: Vec<TaskRecord>,
    pub facets: FacetMap,
    pub headers: HeaderCounts,
}

/// The full pipeline: parse, count facets over the complete record set,
/// then narrow by search text, filters, and visibility settings, and
/// finally sort what is left.
///
/// Facets deliberately ignore the narrowing steps; the drawer keeps
/// offering values from records that are currently filtered away.
pub fn process_request(
    content: &str,
    filters: &FilterSet,
    query: &str,
    settings: &Settings,
) -> RequestOutcome {
    let records = parse_source(content);
    let facets = aggregate_attributes(&records);
    let available = records.len();

    let searched = apply_search(&records, query);
    let mut visible = apply_filters(&searched, filters);
    visible.retain(|record| {
        (settings.show_completed || !record.completed) && (settings.show_hidden || !record.hidden)
    });
    sort_records(&mut visible, &settings.sorting, settings.file_sorting);

    log::debug!(
        "data request: {} of {} records visible",
        visible.len(),
        available
    );

    RequestOutcome {
        headers: HeaderCounts {
            available,
            visible: visible.len(),
        },
        facets,
        records: visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::FilterClause;
    use crate::core::task::Attribute;

    const SOURCE: &str =
        "(A) Buy milk +home\nx (B) Clean +home\nCall mom +errands due:2024-03-01\n";

    #[test]
    fn headers_track_available_and_visible() {
        let mut filters = FilterSet::new();
        filters.set(Attribute::Projects, vec![FilterClause::include("home")]);
        let outcome = process_request(SOURCE, &filters, "", &Settings::default());
        assert_eq!(outcome.headers.available, 3);
        assert_eq!(outcome.headers.visible, 2);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn facets_ignore_filters_and_search() {
        let mut filters = FilterSet::new();
        filters.set(Attribute::Projects, vec![FilterClause::include("errands")]);
        let outcome = process_request(SOURCE, &filters, "milk", &Settings::default());
        assert!(outcome.records.is_empty());
        // Both projects still offered, with full counts.
        assert_eq!(outcome.facets.projects.len(), 2);
        assert_eq!(outcome.facets.projects[1].value, "home");
        assert_eq!(outcome.facets.projects[1].count, 2);
    }

    #[test]
    fn visibility_settings_hide_without_unregistering() {
        let mut settings = Settings::default();
        settings.show_completed = false;
        settings.show_hidden = false;
        let source = "x (B) Clean +home\nsecret +vault h:1\nopen task\n";
        let outcome = process_request(source, &FilterSet::new(), "", &settings);
        assert_eq!(outcome.headers.visible, 1);
        assert_eq!(outcome.records[0].raw, "open task");
        let projects: Vec<&str> = outcome
            .facets
            .projects
            .iter()
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(projects, vec!["home", "vault"]);
    }

    #[test]
    fn search_narrows_before_filters() {
        let outcome = process_request(SOURCE, &FilterSet::new(), "mom", &Settings::default());
        assert_eq!(outcome.headers.visible, 1);
        assert_eq!(outcome.records[0].raw, "Call mom +errands due:2024-03-01");
    }

    #[test]
    fn default_settings_sort_by_priority_first() {
        let source = "plain chore\n(B) beta\n(A) alpha\n";
        let outcome = process_request(source, &FilterSet::new(), "", &Settings::default());
        let raws: Vec<&str> = outcome.records.iter().map(|r| r.raw.as_str()).collect();
        assert_eq!(raws, vec!["(A) alpha", "(B) beta", "plain chore"]);
    }

    #[test]
    fn file_sorting_presents_records_as_read() {
        let mut settings = Settings::default();
        settings.file_sorting = true;
        let source = "(B) beta\n(A) alpha\n";
        let outcome = process_request(source, &FilterSet::new(), "", &settings);
        let raws: Vec<&str> = outcome.records.iter().map(|r| r.raw.as_str()).collect();
        assert_eq!(raws, vec!["(B) beta", "(A) alpha"]);
    }
}
