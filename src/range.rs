use chrono::{Days, NaiveDate};
use clap::ValueEnum;

use crate::models::FeedbackRecord;

/// "N months" is a fixed day count, not calendar-month arithmetic:
/// 3 months is 90 days and 6 months is 180 days.
pub const DAYS_PER_MONTH: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeSelection {
    All,
    Custom { start: NaiveDate, end: NaiveDate },
    LastDays(u32),
    LastMonths(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBounds {
    Unbounded,
    /// Inclusive on both ends. `start > end` matches nothing.
    Between { start: NaiveDate, end: NaiveDate },
}

/// Named periods offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    All,
    Custom,
    #[value(name = "last-7-days")]
    Last7Days,
    #[value(name = "last-30-days")]
    Last30Days,
    #[value(name = "last-3-months")]
    Last3Months,
    #[value(name = "last-6-months")]
    Last6Months,
}

impl Period {
    pub fn label(self) -> &'static str {
        match self {
            Period::All => "All Feedback",
            Period::Custom => "Custom",
            Period::Last7Days => "Last 7 Days",
            Period::Last30Days => "Last 30 Days",
            Period::Last3Months => "Last 3 Months",
            Period::Last6Months => "Last 6 Months",
        }
    }

    /// A custom range defaults to the last thirty days when either end is omitted.
    pub fn selection(
        self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> DateRangeSelection {
        match self {
            Period::All => DateRangeSelection::All,
            Period::Custom => DateRangeSelection::Custom {
                start: start.unwrap_or_else(|| days_before(today, 30)),
                end: end.unwrap_or(today),
            },
            Period::Last7Days => DateRangeSelection::LastDays(7),
            Period::Last30Days => DateRangeSelection::LastDays(30),
            Period::Last3Months => DateRangeSelection::LastMonths(3),
            Period::Last6Months => DateRangeSelection::LastMonths(6),
        }
    }
}

impl DateRangeSelection {
    pub fn resolve(self, today: NaiveDate) -> DateBounds {
        match self {
            DateRangeSelection::All => DateBounds::Unbounded,
            DateRangeSelection::Custom { start, end } => DateBounds::Between { start, end },
            DateRangeSelection::LastDays(days) => DateBounds::Between {
                start: days_before(today, u64::from(days)),
                end: today,
            },
            DateRangeSelection::LastMonths(months) => DateBounds::Between {
                start: days_before(today, u64::from(months) * DAYS_PER_MONTH),
                end: today,
            },
        }
    }
}

/// Clamps to the earliest representable date instead of overflowing.
fn days_before(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

impl DateBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateBounds::Unbounded => true,
            DateBounds::Between { start, end } => start <= date && date <= end,
        }
    }

    pub fn filter<'a, I>(self, records: I) -> impl Iterator<Item = &'a FeedbackRecord>
    where
        I: IntoIterator<Item = &'a FeedbackRecord>,
    {
        records
            .into_iter()
            .filter(move |record| self.contains(record.received_on))
    }
}

/// Date-filtered view over `records`, in source order.
pub fn filter_records<'a>(
    records: &'a [FeedbackRecord],
    selection: DateRangeSelection,
    today: NaiveDate,
) -> Vec<&'a FeedbackRecord> {
    selection.resolve(today).filter(records).collect()
}
