use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::aggregate::count_by_sentiment;
use crate::cache::DatasetCache;
use crate::compare::compare_years;
use crate::export::{select_sentiments, ExportOutcome};
use crate::loader::LoadError;
use crate::models::{FeedbackDataset, FeedbackRecord, Sentiment, SentimentCount, YearComparison};
use crate::range::{DateBounds, DateRangeSelection};
use crate::sample::{random_feedback, RandomSource};

/// Result of an upload. A failed load still yields an (empty) dataset so the
/// caller can keep rendering; `error` carries what went wrong.
#[derive(Debug)]
pub struct Upload {
    pub dataset: Arc<FeedbackDataset>,
    pub error: Option<LoadError>,
}

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub selection: DateRangeSelection,
    pub sample: Option<Sentiment>,
    pub compare_years: bool,
}

#[derive(Debug, Clone)]
pub struct SampledFeedback<'a> {
    pub sentiment: Sentiment,
    pub record: Option<&'a FeedbackRecord>,
}

#[derive(Debug, Clone)]
pub struct Summary<'a> {
    pub today: NaiveDate,
    pub bounds: DateBounds,
    pub records: Vec<&'a FeedbackRecord>,
    pub counts: SentimentCount,
    pub sample: Option<SampledFeedback<'a>>,
    pub comparison: Option<YearComparison>,
}

impl Summary<'_> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Owns everything that outlives a single request: the dataset cache, the
/// reference date and the random source.
pub struct Session {
    today: NaiveDate,
    cache: DatasetCache,
    random: Box<dyn RandomSource>,
}

impl Session {
    pub fn new(today: NaiveDate, cache: DatasetCache, random: Box<dyn RandomSource>) -> Self {
        Self { today, cache, random }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn upload(&mut self, bytes: &[u8]) -> Upload {
        match self.cache.load(bytes) {
            Ok(dataset) => {
                info!(records = dataset.len(), "feedback upload ready");
                Upload { dataset, error: None }
            }
            Err(err) => {
                error!(error = %err, "failed to load feedback upload");
                Upload {
                    dataset: Arc::new(FeedbackDataset::default()),
                    error: Some(err),
                }
            }
        }
    }

    pub fn summarize<'a>(&mut self, dataset: &'a FeedbackDataset, request: &SummaryRequest) -> Summary<'a> {
        let bounds = request.selection.resolve(self.today);
        let records: Vec<&'a FeedbackRecord> = bounds.filter(&dataset.records).collect();
        if records.is_empty() {
            warn!(?bounds, "no reviews found for the selected date range");
        }

        let counts = count_by_sentiment(records.iter().copied());
        let sample = match &request.sample {
            Some(sentiment) if !records.is_empty() => Some(SampledFeedback {
                sentiment: sentiment.clone(),
                record: random_feedback(&records, sentiment, self.random.as_mut()),
            }),
            _ => None,
        };
        let comparison = if request.compare_years && !records.is_empty() {
            Some(compare_years(&records, self.today))
        } else {
            None
        };

        Summary {
            today: self.today,
            bounds,
            records,
            counts,
            sample,
            comparison,
        }
    }

    pub fn export<'a>(
        &self,
        dataset: &'a FeedbackDataset,
        selection: DateRangeSelection,
        sentiments: &[Sentiment],
    ) -> ExportOutcome<'a> {
        let records: Vec<&'a FeedbackRecord> = selection.resolve(self.today).filter(&dataset.records).collect();
        let outcome = select_sentiments(&records, sentiments);
        if let ExportOutcome::NoData(reason) = &outcome {
            warn!(?reason, "nothing to export");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::EntropyRandom;
    use crate::template::SAMPLE_CSV;

    fn session(today: NaiveDate) -> Session {
        Session::new(today, DatasetCache::default(), Box::new(EntropyRandom::seeded(1)))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summary_of_whole_sample() {
        let mut session = session(date(2025, 6, 1));
        let upload = session.upload(SAMPLE_CSV.as_bytes());
        assert!(upload.error.is_none());

        let request = SummaryRequest {
            selection: DateRangeSelection::All,
            sample: Some(Sentiment::Negative),
            compare_years: true,
        };
        let summary = session.summarize(&upload.dataset, &request);
        assert_eq!(summary.counts.total, 6);
        assert_eq!(summary.records.len(), 6);

        let sample = summary.sample.as_ref().unwrap();
        let picked = sample.record.unwrap();
        assert!(picked.id == 3 || picked.id == 5);

        let comparison = summary.comparison.as_ref().unwrap();
        assert_eq!(comparison.rows.len(), 3);
    }

    #[test]
    fn repeated_uploads_reuse_the_parsed_dataset() {
        let mut session = session(date(2025, 6, 1));
        let first = session.upload(SAMPLE_CSV.as_bytes());
        let second = session.upload(SAMPLE_CSV.as_bytes());
        assert!(Arc::ptr_eq(&first.dataset, &second.dataset));
    }

    #[test]
    fn failed_upload_degrades_to_empty_dataset() {
        let mut session = session(date(2025, 6, 1));
        let upload = session.upload(b"id,text\n1,hello\n");
        assert!(matches!(upload.error, Some(LoadError::Schema { .. })));
        assert!(upload.dataset.is_empty());

        let request = SummaryRequest {
            selection: DateRangeSelection::All,
            sample: Some(Sentiment::Positive),
            compare_years: true,
        };
        let summary = session.summarize(&upload.dataset, &request);
        assert!(summary.is_empty());
        assert!(summary.sample.is_none());
        assert!(summary.comparison.is_none());
    }

    #[test]
    fn sample_reports_missing_sentiment() {
        let mut session = session(date(2025, 2, 1));
        let upload = session.upload(SAMPLE_CSV.as_bytes());
        let request = SummaryRequest {
            selection: DateRangeSelection::LastDays(7),
            sample: Some(Sentiment::Neutral),
            compare_years: false,
        };
        let summary = session.summarize(&upload.dataset, &request);
        assert_eq!(summary.records.len(), 1);
        let sample = summary.sample.unwrap();
        assert_eq!(sample.sentiment, Sentiment::Neutral);
        assert!(sample.record.is_none());
    }

    #[test]
    fn export_applies_date_range_then_sentiments() {
        let mut session = session(date(2025, 2, 1));
        let upload = session.upload(SAMPLE_CSV.as_bytes());
        match session.export(&upload.dataset, DateRangeSelection::LastDays(30), &Sentiment::KNOWN) {
            ExportOutcome::Rows(rows) => {
                let ids: Vec<i64> = rows.iter().map(|record| record.id).collect();
                assert_eq!(ids, vec![1, 4]);
            }
            other => panic!("expected rows, got {other:?}"),
        }
    }
}
