use super::task::TaskRecord;

/// Case-insensitive substring search over raw lines.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    /// `None` when the query is blank, there is nothing to narrow by.
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    pub fn matches(&self, record: &TaskRecord) -> bool {
        record.raw.to_lowercase().contains(&self.needle)
    }
}

pub fn apply_search(records: &[TaskRecord], query: &str) -> Vec<TaskRecord> {
    match SearchQuery::new(query) {
        Some(matcher) => records
            .iter()
            .filter(|record| matcher.matches(record))
            .cloned()
            .collect(),
        None => records.to_vec(),
    }
}
