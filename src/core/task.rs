use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The nine attributes recognized for facet counting, filtering, and
/// sorting. Everything else in a line is opaque body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Priority,
    Projects,
    Contexts,
    Due,
    #[serde(rename = "t")]
    Threshold,
    Rec,
    Pm,
    Created,
    Completed,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Self::Priority,
        Self::Projects,
        Self::Contexts,
        Self::Due,
        Self::Threshold,
        Self::Rec,
        Self::Pm,
        Self::Created,
        Self::Completed,
    ];

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Projects => "projects",
            Self::Contexts => "contexts",
            Self::Due => "due",
            Self::Threshold => "t",
            Self::Rec => "rec",
            Self::Pm => "pm",
            Self::Created => "created",
            Self::Completed => "completed",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s {
            "priority" => Some(Self::Priority),
            "projects" => Some(Self::Projects),
            "contexts" => Some(Self::Contexts),
            "due" => Some(Self::Due),
            "t" => Some(Self::Threshold),
            "rec" => Some(Self::Rec),
            "pm" => Some(Self::Pm),
            "created" => Some(Self::Created),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Attributes whose values are calendar dates and compare through
    /// [`canonical_date`] rather than as exact strings.
    pub fn is_date(&self) -> bool {
        matches!(
            self,
            Self::Due | Self::Threshold | Self::Created | Self::Completed
        )
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// One parsed todo.txt line.
///
/// Records are rebuilt from scratch on every data request and never
/// mutated in place; edits rewrite the source line and re-parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Source line index. Blank lines keep their slot in the numbering so
    /// the id stays usable for line rewrites.
    pub id: usize,
    /// The line exactly as read.
    pub raw: String,
    pub completed: bool,
    pub completed_on: Option<NaiveDate>,
    pub created: Option<NaiveDate>,
    /// Uppercase `A..=Z`, only from a `(X)` token at the head of the line.
    pub priority: Option<char>,
    /// Everything after the structural prefix, markup tokens included.
    pub body: String,
    /// `+project` tokens in order of appearance, duplicates kept.
    pub projects: Vec<String>,
    /// `@context` tokens in order of appearance, duplicates kept.
    pub contexts: Vec<String>,
    pub due: Option<NaiveDate>,
    pub threshold: Option<NaiveDate>,
    /// Raw `rec:` token value, present only when it parses as a recurrence.
    pub rec: Option<String>,
    /// Raw `pm:` token value (pomodoro counter).
    pub pm: Option<String>,
    /// `h:1` marker; hidden lines still register facets but stay out of
    /// the visible list.
    pub hidden: bool,
}

impl TaskRecord {
    /// The record's comparable values for one attribute.
    ///
    /// Dates come back as canonical date strings, everything else as the
    /// exact token text. Multi-valued attributes are deduplicated here
    /// (the record's own sequences keep duplicates for rewriting); an
    /// absent attribute is an empty list. The aggregator, the filter
    /// evaluator, and the sorter all compare through this method only.
    pub fn attribute_values(&self, attribute: Attribute) -> Vec<String> {
        match attribute {
            Attribute::Priority => self.priority.iter().map(char::to_string).collect(),
            Attribute::Projects => dedup_in_order(&self.projects),
            Attribute::Contexts => dedup_in_order(&self.contexts),
            Attribute::Due => date_values(self.due),
            Attribute::Threshold => date_values(self.threshold),
            Attribute::Rec => self.rec.clone().into_iter().collect(),
            Attribute::Pm => self.pm.clone().into_iter().collect(),
            Attribute::Created => date_values(self.created),
            Attribute::Completed => date_values(self.completed_on),
        }
    }
}

fn date_values(date: Option<NaiveDate>) -> Vec<String> {
    date.map(canonical_date).into_iter().collect()
}

fn dedup_in_order(values: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}

/// The one textual form dates take everywhere downstream. Two source
/// spellings of the same calendar day canonicize to the same string.
pub fn canonical_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Deterministic stand-in for locale collation: case-insensitive primary
/// ordering with an exact-string tie break, total over all strings.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}
