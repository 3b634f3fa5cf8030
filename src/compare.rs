use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::aggregate::count_by_sentiment;
use crate::models::{ComparisonRow, FeedbackRecord, SentimentCount, YearComparison};

/// Compares `today`'s calendar year with the one before it.
pub fn compare_years(records: &[&FeedbackRecord], today: NaiveDate) -> YearComparison {
    let current_year = today.year();
    let previous_year = current_year - 1;

    let current = count_by_sentiment(in_year(records, current_year));
    let previous = count_by_sentiment(in_year(records, previous_year));
    debug!(
        current_year,
        current_total = current.total,
        previous_total = previous.total,
        "comparing sentiment by year"
    );

    YearComparison {
        current_year,
        previous_year,
        rows: join_by_sentiment(&current, &previous),
    }
}

fn in_year<'a>(records: &'a [&'a FeedbackRecord], year: i32) -> impl Iterator<Item = &'a FeedbackRecord> {
    records
        .iter()
        .copied()
        .filter(move |record| record.received_on.year() == year)
}

/// Full outer join on the sentiment label. A label missing on one side gets 0 there.
pub fn join_by_sentiment(current: &SentimentCount, previous: &SentimentCount) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = current
        .tallies
        .iter()
        .map(|tally| ComparisonRow {
            sentiment: tally.sentiment.clone(),
            current: tally.count,
            previous: previous.get(&tally.sentiment),
        })
        .collect();

    for tally in &previous.tallies {
        if rows.iter().all(|row| row.sentiment != tally.sentiment) {
            rows.push(ComparisonRow {
                sentiment: tally.sentiment.clone(),
                current: 0,
                previous: tally.count,
            });
        }
    }

    rows
}
