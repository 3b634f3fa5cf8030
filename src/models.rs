use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    /// Any label outside the three known ones, kept verbatim.
    Other(String),
}

impl Sentiment {
    pub const KNOWN: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn from_label(label: &str) -> Self {
        match label {
            "positive" => Sentiment::Positive,
            "neutral" => Sentiment::Neutral,
            "negative" => Sentiment::Negative,
            other => Sentiment::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Other(label) => label,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub id: i64,
    pub sentiment: Sentiment,
    pub text: String,
    pub received_on: NaiveDate,
    /// Values of non-required columns, aligned with `FeedbackDataset::extra_columns`.
    pub extra: Vec<String>,
}

/// A parsed upload. Never mutated after loading; filters hand out borrowed views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackDataset {
    pub extra_columns: Vec<String>,
    pub records: Vec<FeedbackRecord>,
}

impl FeedbackDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeedbackRecord> {
        self.records.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentTally {
    pub sentiment: Sentiment,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCount {
    pub tallies: Vec<SentimentTally>,
    pub total: usize,
}

impl SentimentCount {
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    pub fn get(&self, sentiment: &Sentiment) -> usize {
        self.tallies
            .iter()
            .find(|tally| &tally.sentiment == sentiment)
            .map(|tally| tally.count)
            .unwrap_or(0)
    }

    pub fn share(&self, sentiment: &Sentiment) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.get(sentiment) as f64 * 100.0 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub sentiment: Sentiment,
    pub current: usize,
    pub previous: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearComparison {
    pub current_year: i32,
    pub previous_year: i32,
    pub rows: Vec<ComparisonRow>,
}
