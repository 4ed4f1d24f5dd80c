use chrono::NaiveDate;
use thiserror::Error;

use super::parser::{parse_date, parse_line, KEY_VALUE_RE};
use crate::core::recurrence::Recurrence;
use crate::core::task::{canonical_date, Attribute, TaskRecord};

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("`{0}` is not a single uppercase priority letter")]
    InvalidPriority(String),
    #[error("`{0}` is not a calendar date")]
    InvalidDate(String),
    #[error("`{0}` is not a recurrence token")]
    InvalidRecurrence(String),
    #[error("`{0}` cannot be a key:value token value")]
    InvalidToken(String),
    #[error("attribute `{0}` has no single-line edit")]
    UnsupportedAttribute(Attribute),
}

/// Serialize a record back to one source line: marker, priority,
/// completion date, creation date, then the body verbatim. Dates take
/// their canonical spelling; the body already carries all markup tokens.
/// The body slot is always emitted, a bodyless prefix keeps its trailing
/// separator and still reads back as structure.
pub fn write_line(record: &TaskRecord) -> String {
    let mut parts: Vec<String> = Vec::new();
    if record.completed {
        parts.push("x".to_string());
    }
    if let Some(priority) = record.priority {
        parts.push(format!("({})", priority));
    }
    if let Some(completed_on) = record.completed_on {
        parts.push(canonical_date(completed_on));
    }
    if let Some(created) = record.created {
        parts.push(canonical_date(created));
    }
    parts.push(record.body.clone());
    parts.join(" ")
}

/// Rewrite one attribute on a line and re-parse the result.
///
/// Only the attributes with a single editable slot are supported:
/// priority plus the `due:`, `t:`, `rec:` and `pm:` tokens. `None` (or a
/// blank string) removes the attribute. Everything else on the line stays
/// byte-identical.
pub fn update_attribute(
    id: usize,
    raw: &str,
    attribute: Attribute,
    value: Option<&str>,
) -> Result<TaskRecord, EditError> {
    let value = value.map(str::trim).filter(|v| !v.is_empty());
    let mut record = parse_line(id, raw);

    match attribute {
        Attribute::Priority => {
            record.priority = match value {
                Some(v) => {
                    let mut chars = v.chars();
                    match (chars.next(), chars.next()) {
                        (Some(letter), None) if letter.is_ascii_uppercase() => Some(letter),
                        _ => return Err(EditError::InvalidPriority(v.to_string())),
                    }
                }
                None => None,
            };
        }
        Attribute::Due | Attribute::Threshold => {
            let canonical = match value {
                Some(v) => match parse_date(v) {
                    Some(date) => Some(canonical_date(date)),
                    None => return Err(EditError::InvalidDate(v.to_string())),
                },
                None => None,
            };
            record.body = replace_key_token(&record.body, attribute.as_key(), canonical.as_deref());
        }
        Attribute::Rec => {
            if let Some(v) = value {
                if Recurrence::parse(v).is_none() {
                    return Err(EditError::InvalidRecurrence(v.to_string()));
                }
            }
            record.body = replace_key_token(&record.body, "rec", value);
        }
        Attribute::Pm => {
            if let Some(v) = value {
                if v.contains(char::is_whitespace) {
                    return Err(EditError::InvalidToken(v.to_string()));
                }
            }
            record.body = replace_key_token(&record.body, "pm", value);
        }
        _ => return Err(EditError::UnsupportedAttribute(attribute)),
    }

    Ok(parse_line(id, &write_line(&record)))
}

/// Swap, remove, or append a `key:value` token inside a body string.
///
/// With a value, the first occurrence is rewritten in place (or the token
/// appended when the key is absent); duplicate occurrences of the key are
/// dropped either way. All other text keeps its exact spacing.
pub fn replace_key_token(body: &str, key: &str, value: Option<&str>) -> String {
    let mut out = String::with_capacity(body.len() + 16);
    let mut cursor = 0;
    let mut replaced = false;
    let mut removed_at_start = false;

    for caps in KEY_VALUE_RE.captures_iter(body) {
        let (Some(whole), Some(k), Some(v)) = (caps.get(0), caps.name("key"), caps.name("value"))
        else {
            continue;
        };
        if k.as_str() != key {
            continue;
        }
        match value {
            Some(new_value) if !replaced => {
                out.push_str(&body[cursor..v.start()]);
                out.push_str(new_value);
                cursor = v.end();
                replaced = true;
            }
            _ => {
                if whole.start() == 0 {
                    removed_at_start = true;
                }
                out.push_str(&body[cursor..whole.start()]);
                cursor = whole.end();
            }
        }
    }
    out.push_str(&body[cursor..]);

    // A token removed from position zero leaves its separator behind.
    if removed_at_start {
        if let Some(stripped) = out.strip_prefix(' ') {
            out = stripped.to_string();
        }
    }
    if !replaced {
        if let Some(new_value) = value {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(key);
            out.push(':');
            out.push_str(new_value);
        }
    }
    out
}

/// Result of a completion toggle: the rewritten line's record, plus a
/// brand new line when a recurrence token spawned the next occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionChange {
    pub record: TaskRecord,
    pub next: Option<String>,
}

/// Toggle the completion state of a line.
///
/// Completing stamps today as the completion date (only when the line
/// has a creation date, a completion date cannot stand alone) and, for
/// lines with a `rec:` token, produces the follow-up line. Un-completing
/// clears both the marker and the completion date.
pub fn set_complete_state(
    id: usize,
    raw: &str,
    state: bool,
    today: NaiveDate,
    append_creation_date: bool,
) -> CompletionChange {
    let mut record = parse_line(id, raw);
    let mut next = None;

    if state {
        record.completed = true;
        if record.created.is_some() {
            record.completed_on = Some(today);
        }
        if let Some(token) = record.rec.clone() {
            next = next_occurrence(&record, &token, today, append_creation_date);
        }
    } else {
        record.completed = false;
        record.completed_on = None;
    }

    let record = parse_line(id, &write_line(&record));
    CompletionChange { record, next }
}

/// Build the next occurrence line for a completed recurring task.
///
/// Strict tokens (`+`) count from the existing due and threshold dates,
/// plain ones from the completion day. The new line drops completion
/// state and gets a fresh creation date only when the caller appends
/// creation dates to new tasks.
fn next_occurrence(
    record: &TaskRecord,
    token: &str,
    today: NaiveDate,
    append_creation_date: bool,
) -> Option<String> {
    let recurrence = Recurrence::parse(token)?;

    let due_base = if recurrence.strict {
        record.due.unwrap_or(today)
    } else {
        today
    };
    let mut body = replace_key_token(
        &record.body,
        "due",
        Some(&canonical_date(recurrence.next_date(due_base))),
    );
    if let Some(threshold) = record.threshold {
        let threshold_base = if recurrence.strict { threshold } else { today };
        body = replace_key_token(
            &body,
            "t",
            Some(&canonical_date(recurrence.next_date(threshold_base))),
        );
    }

    let mut next = record.clone();
    next.completed = false;
    next.completed_on = None;
    next.created = append_creation_date.then_some(today);
    next.body = body;
    Some(write_line(&next))
}
