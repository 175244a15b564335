//! Turns irregular dated amounts into a contiguous per-day spend series.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::DatedAmount;

/// Buckets dated amounts into one slot per calendar day between `start` and `today`.
///
/// Slot `i` holds the spend of day `start + i + 1`, so the last slot is `today`
/// and amounts dated exactly on `start` fall before the first slot and are
/// dropped. Leading empty days are trimmed; a series with no positive day is
/// returned empty.
#[derive(Debug, Clone, Copy)]
pub struct DailySeriesBuilder {
    start: NaiveDate,
    today: NaiveDate,
}

impl DailySeriesBuilder {
    pub fn new(start: NaiveDate, today: NaiveDate) -> Self {
        Self { start, today }
    }

    /// Number of slots before trimming.
    pub fn span_days(&self) -> usize {
        usize::try_from((self.today - self.start).num_days()).unwrap_or(0)
    }

    pub fn build(&self, records: &[DatedAmount]) -> Vec<f64> {
        let mut days = vec![0.0; self.span_days()];

        for record in records {
            if record.date < self.start || !record.amount.is_finite() {
                continue;
            }
            let offset = (record.date - self.start).num_days() - 1;
            match usize::try_from(offset) {
                Ok(index) if index < days.len() => days[index] += record.amount,
                Ok(_) => warn!(date = %record.date, "expense dated after today ignored"),
                Err(_) => debug!(date = %record.date, "expense on start date precedes first slot"),
            }
        }

        match days.iter().position(|&value| value > 0.0) {
            Some(first) => days.split_off(first),
            None => Vec::new(),
        }
    }
}
