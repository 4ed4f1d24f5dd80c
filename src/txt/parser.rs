use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::core::recurrence::Recurrence;
use crate::core::task::TaskRecord;

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<complete>x) )?(?:\((?P<priority>[A-Z])\) )?(?:(?:(?P<completed>\d{4}-\d{2}-\d{2}) )?(?P<created>\d{4}-\d{2}-\d{2}) )?(?P<body>.*)$").unwrap()
});

pub(crate) static KEY_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?P<key>[A-Za-z][A-Za-z0-9_-]*):(?P<value>\S+)").unwrap()
});

static PROJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)\+(?P<name>\S+)").unwrap());

static CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)@(?P<name>\S+)").unwrap());

/// Parse one source line into a [`TaskRecord`]. Total: any line yields a
/// record, and anything that fails its own sub-grammar is simply absent
/// from the structured fields while staying verbatim in `raw` and `body`.
///
/// Line grammar, all parts optional except the body:
///
/// ```text
/// x (A) 2024-01-15 2024-01-10 body with +projects @contexts key:value
/// ```
///
/// With two leading dates the first is the completion date and the second
/// the creation date; a single date is the creation date. A date-shaped
/// token that is not a real calendar day is left in the body.
pub fn parse_line(id: usize, raw: &str) -> TaskRecord {
    let Some(caps) = LINE_RE.captures(raw) else {
        // Only embedded line breaks defeat the grammar. Keep the text.
        return TaskRecord {
            id,
            raw: raw.to_string(),
            completed: raw.starts_with("x "),
            completed_on: None,
            created: None,
            priority: None,
            body: raw.to_string(),
            projects: Vec::new(),
            contexts: Vec::new(),
            due: None,
            threshold: None,
            rec: None,
            pm: None,
            hidden: false,
        };
    };

    let completed = caps.name("complete").is_some();
    let priority = caps
        .name("priority")
        .and_then(|m| m.as_str().chars().next());

    let body_start = caps.name("body").map(|m| m.start()).unwrap_or(raw.len());
    let (completed_on, created, body_start) =
        resolve_prefix_dates(caps.name("completed"), caps.name("created"), body_start);
    let body = raw[body_start..].to_string();

    let projects: Vec<String> = PROJECT_RE
        .captures_iter(&body)
        .map(|c| c["name"].to_string())
        .collect();
    let contexts: Vec<String> = CONTEXT_RE
        .captures_iter(&body)
        .map(|c| c["name"].to_string())
        .collect();

    let due = first_value(&body, "due").and_then(parse_date);
    let threshold = first_value(&body, "t").and_then(parse_date);
    let rec = first_value(&body, "rec")
        .filter(|v| Recurrence::parse(v).is_some())
        .map(str::to_string);
    let pm = first_value(&body, "pm").map(str::to_string);
    let hidden = first_value(&body, "h") == Some("1");

    TaskRecord {
        id,
        raw: raw.to_string(),
        completed,
        completed_on,
        created,
        priority,
        body,
        projects,
        contexts,
        due,
        threshold,
        rec,
        pm,
        hidden,
    }
}

/// Parse a whole file. Blank lines produce no record but still advance
/// the id numbering, so ids always address source lines.
pub fn parse_source(content: &str) -> Vec<TaskRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(id, line)| parse_line(id, line))
        .collect()
}

/// First `key:value` token for `key`, whether or not its value is usable.
/// Later duplicates of the same key are ignored.
fn first_value<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    KEY_VALUE_RE
        .captures_iter(body)
        .find(|caps| &caps["key"] == key)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str())
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    // Lenient on zero padding: "2024-3-1" is the same day as "2024-03-01".
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Validate regex-captured prefix dates against the calendar. When either
/// captured token is not a real date, both rejoin the body so no text is
/// dropped from the line.
fn resolve_prefix_dates(
    first: Option<regex::Match<'_>>,
    second: Option<regex::Match<'_>>,
    body_start: usize,
) -> (Option<NaiveDate>, Option<NaiveDate>, usize) {
    match (first, second) {
        (None, None) => (None, None, body_start),
        (None, Some(created)) => match parse_date(created.as_str()) {
            Some(date) => (None, Some(date), body_start),
            None => (None, None, created.start()),
        },
        (Some(completed), Some(created)) => {
            match (parse_date(completed.as_str()), parse_date(created.as_str())) {
                (Some(first_date), Some(second_date)) => {
                    (Some(first_date), Some(second_date), body_start)
                }
                _ => (None, None, completed.start()),
            }
        }
        // The completion date group only matches nested inside the
        // creation date group, so this arm cannot fire.
        (Some(stray), None) => (None, None, stray.start()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_fully_loaded_line() {
        let record = parse_line(
            4,
            "x (B) 2024-01-15 2024-01-10 Clean garage +home @weekend due:2024-01-20 rec:1w pm:4 h:1",
        );
        assert!(record.completed);
        assert_eq!(record.priority, Some('B'));
        assert_eq!(record.completed_on, Some(date(2024, 1, 15)));
        assert_eq!(record.created, Some(date(2024, 1, 10)));
        assert_eq!(
            record.body,
            "Clean garage +home @weekend due:2024-01-20 rec:1w pm:4 h:1"
        );
        assert_eq!(record.projects, vec!["home"]);
        assert_eq!(record.contexts, vec!["weekend"]);
        assert_eq!(record.due, Some(date(2024, 1, 20)));
        assert_eq!(record.rec.as_deref(), Some("1w"));
        assert_eq!(record.pm.as_deref(), Some("4"));
        assert!(record.hidden);
        assert_eq!(record.id, 4);
    }

    #[test]
    fn single_prefix_date_is_creation() {
        let record = parse_line(0, "2024-01-10 Call mom @phone");
        assert_eq!(record.created, Some(date(2024, 1, 10)));
        assert_eq!(record.completed_on, None);
        assert_eq!(record.body, "Call mom @phone");
    }

    #[test]
    fn completion_marker_needs_trailing_space() {
        assert!(!parse_line(0, "xylophone lesson").completed);
        assert!(!parse_line(0, "x").completed);
        assert!(!parse_line(0, "X shout").completed);
        assert!(parse_line(0, "x done thing").completed);
    }

    #[test]
    fn priority_only_at_line_head() {
        let record = parse_line(0, "Call (A) mom");
        assert_eq!(record.priority, None);
        // After the marker but behind a date it is body text too.
        let record = parse_line(0, "x 2024-01-15 (A) thing");
        assert_eq!(record.priority, None);
        assert_eq!(record.created, Some(date(2024, 1, 15)));
        assert_eq!(record.body, "(A) thing");
    }

    #[test]
    fn lowercase_priority_is_body_text() {
        let record = parse_line(0, "(a) too quiet");
        assert_eq!(record.priority, None);
        assert_eq!(record.body, "(a) too quiet");
    }

    #[test]
    fn due_accepts_unpadded_spelling() {
        let padded = parse_line(0, "Pay rent due:2024-03-01");
        let bare = parse_line(1, "Pay rent due:2024-3-1");
        assert_eq!(padded.due, Some(date(2024, 3, 1)));
        assert_eq!(bare.due, padded.due);
    }

    #[test]
    fn malformed_values_are_absent_not_fatal() {
        let record = parse_line(0, "Pay rent due:soon rec:weekly t:tomorrow");
        assert_eq!(record.due, None);
        assert_eq!(record.threshold, None);
        assert_eq!(record.rec, None);
        // The tokens survive untouched in the body.
        assert_eq!(record.body, "Pay rent due:soon rec:weekly t:tomorrow");
    }

    #[test]
    fn first_key_occurrence_wins() {
        let record = parse_line(0, "thing due:junk due:2024-05-05");
        assert_eq!(record.due, None);
        let record = parse_line(0, "thing due:2024-05-05 due:2024-06-06");
        assert_eq!(record.due, Some(date(2024, 5, 5)));
    }

    #[test]
    fn hidden_flag_requires_one() {
        assert!(parse_line(0, "secret h:1").hidden);
        assert!(!parse_line(0, "not secret h:0").hidden);
        assert!(!parse_line(0, "not secret h:yes").hidden);
    }

    #[test]
    fn markers_inside_words_do_not_count() {
        let record = parse_line(0, "mail sam@example.org about a+b");
        assert!(record.contexts.is_empty());
        assert!(record.projects.is_empty());
        let record = parse_line(0, "ship +crate mail @sam");
        assert_eq!(record.projects, vec!["crate"]);
        assert_eq!(record.contexts, vec!["sam"]);
    }

    #[test]
    fn impossible_prefix_date_stays_in_body() {
        let record = parse_line(0, "2024-13-01 not a date");
        assert_eq!(record.created, None);
        assert_eq!(record.body, "2024-13-01 not a date");
    }

    #[test]
    fn embedded_newline_falls_back_to_raw() {
        let record = parse_line(0, "first\nsecond");
        assert!(!record.completed);
        assert_eq!(record.raw, "first\nsecond");
        assert_eq!(record.body, record.raw);
    }

    #[test]
    fn source_ids_skip_blank_lines_but_keep_numbering() {
        let records = parse_source("First task\n\n   \nx Second task\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 0);
        assert_eq!(records[1].id, 3);
        assert!(records[1].completed);
    }

    #[test]
    fn duplicate_projects_are_kept_in_order() {
        let record = parse_line(0, "tidy +home garage +home +garden");
        assert_eq!(record.projects, vec!["home", "home", "garden"]);
    }
}
