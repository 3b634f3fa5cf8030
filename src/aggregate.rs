use crate::models::{FeedbackRecord, SentimentCount, SentimentTally};

/// Counts records per sentiment, most frequent first. Ties keep first-seen order.
pub fn count_by_sentiment<'a, I>(records: I) -> SentimentCount
where
    I: IntoIterator<Item = &'a FeedbackRecord>,
{
    let mut tallies: Vec<SentimentTally> = Vec::new();
    let mut total = 0usize;

    for record in records {
        total += 1;
        match tallies.iter_mut().find(|tally| tally.sentiment == record.sentiment) {
            Some(tally) => tally.count += 1,
            None => tallies.push(SentimentTally {
                sentiment: record.sentiment.clone(),
                count: 1,
            }),
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    SentimentCount { tallies, total }
}
