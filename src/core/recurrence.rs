use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// todo.txt recurrence tokens (`rec:` values).
///
/// - `1d`, `2w`, `3m`: next occurrence counted from the completion day
/// - `+1w`: strict, counted from the existing due date instead
/// - unit `b` counts business days, skipping Saturday and Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub strict: bool,
    pub interval: RecurrenceInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceInterval {
    pub count: u32,
    pub unit: RecurrenceUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceUnit {
    Day,
    BusinessDay,
    Week,
    Month,
    Year,
}

impl RecurrenceInterval {
    /// Add the interval to `date`, saturating at the calendar's end.
    pub fn add_to(&self, date: NaiveDate) -> NaiveDate {
        let next = match self.unit {
            RecurrenceUnit::Day => {
                date.checked_add_signed(chrono::Duration::days(self.count as i64))
            }
            RecurrenceUnit::BusinessDay => Some(add_business_days(date, self.count)),
            RecurrenceUnit::Week => {
                date.checked_add_signed(chrono::Duration::weeks(self.count as i64))
            }
            RecurrenceUnit::Month => add_months(date, self.count),
            RecurrenceUnit::Year => add_months(date, self.count.saturating_mul(12)),
        };
        next.unwrap_or(NaiveDate::MAX)
    }
}

fn add_business_days(date: NaiveDate, count: u32) -> NaiveDate {
    let mut date = date;
    let mut remaining = count;
    while remaining > 0 {
        let Some(next) = date.succ_opt() else {
            return date;
        };
        date = next;
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total_months = date.month0().checked_add(months)?;
    let new_year = date.year().checked_add((total_months / 12) as i32)?;
    let new_month = (total_months % 12) + 1;
    // Clamp day to valid range for the new month
    let max_day = days_in_month(new_year, new_month)?;
    let new_day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(new_year, new_month, new_day)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first_of_next = NaiveDate::from_ymd_opt(
        if month == 12 { year.checked_add(1)? } else { year },
        if month == 12 { 1 } else { month + 1 },
        1,
    )?;
    Some(first_of_next.pred_opt()?.day())
}

impl Recurrence {
    /// Next occurrence counted from `base` (the due date for strict
    /// tokens, the completion day otherwise; the caller picks).
    pub fn next_date(&self, base: NaiveDate) -> NaiveDate {
        self.interval.add_to(base)
    }

    /// Parse a recurrence token like "1d", "2b", "+1m". Counts run to at
    /// most four digits; anything that is not `[+]<count><unit>` is no
    /// recurrence at all.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (strict, rest) = match s.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if rest.len() < 2 || !rest.is_ascii() {
            return None;
        }

        let (count_str, unit_char) = rest.split_at(rest.len() - 1);
        if count_str.len() > 4 || !count_str.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let count: u32 = count_str.parse().ok()?;
        let unit = match unit_char {
            "d" => RecurrenceUnit::Day,
            "b" => RecurrenceUnit::BusinessDay,
            "w" => RecurrenceUnit::Week,
            "m" => RecurrenceUnit::Month,
            "y" => RecurrenceUnit::Year,
            _ => return None,
        };

        Some(Self {
            strict,
            interval: RecurrenceInterval { count, unit },
        })
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.interval.unit {
            RecurrenceUnit::Day => "d",
            RecurrenceUnit::BusinessDay => "b",
            RecurrenceUnit::Week => "w",
            RecurrenceUnit::Month => "m",
            RecurrenceUnit::Year => "y",
        };
        let prefix = if self.strict { "+" } else { "" };
        write!(f, "{}{}{}", prefix, self.interval.count, unit)
    }
}
