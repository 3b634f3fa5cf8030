use std::borrow::Cow;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{FeedbackDataset, FeedbackRecord, Sentiment};

pub const ID_COLUMN: &str = "feedback_id";
pub const SENTIMENT_COLUMN: &str = "feedback_sentiment";
pub const TEXT_COLUMN: &str = "feedback";
pub const RECEIVED_ON_COLUMN: &str = "feedback_received_on";

pub const REQUIRED_COLUMNS: [&str; 4] = [ID_COLUMN, SENTIMENT_COLUMN, TEXT_COLUMN, RECEIVED_ON_COLUMN];

/// Day-month-year with dashes, e.g. `25-01-2025`.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Error reading the file: {0}")]
    Read(#[from] csv::Error),

    #[error(
        "CSV file is missing required column(s): {}. Expected exact header names: {}. \
         Run `feedback-insights template` to get a sample file.",
        .missing.join(", "),
        REQUIRED_COLUMNS.join(", ")
    )]
    Schema { missing: Vec<String> },

    #[error("Row {row}: feedback_received_on '{value}' does not match DD-MM-YYYY")]
    DateFormat { row: usize, value: String },

    #[error("Row {row}: feedback_id '{value}' is not an integer")]
    InvalidId { row: usize, value: String },
}

/// Decodes as UTF-8 when possible and falls back to ISO-8859-1, which maps every
/// byte to the code point of the same value.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("upload is not valid UTF-8, decoding as ISO-8859-1");
            Cow::Owned(bytes.iter().map(|&b| b as char).collect())
        }
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses an uploaded CSV. Any failing row fails the whole load.
pub fn load_dataset(bytes: &[u8]) -> Result<FeedbackDataset, LoadError> {
    #[derive(serde::Deserialize)]
    struct CsvRow<'r> {
        feedback_id: &'r str,
        feedback_sentiment: &'r str,
        feedback: &'r str,
        feedback_received_on: &'r str,
    }

    let text = decode(bytes);
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !headers.iter().any(|header| header == **name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::Schema { missing });
    }

    let extra_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !REQUIRED_COLUMNS.contains(header))
        .map(|(idx, _)| idx)
        .collect();
    let extra_columns = extra_idx.iter().map(|&idx| headers[idx].to_string()).collect();

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row: CsvRow = record.deserialize(Some(&headers))?;
        let row_number = index + 1;

        let id = row.feedback_id.trim().parse::<i64>().map_err(|_| LoadError::InvalidId {
            row: row_number,
            value: row.feedback_id.to_string(),
        })?;

        let received_on =
            parse_date(row.feedback_received_on.trim()).ok_or_else(|| LoadError::DateFormat {
                row: row_number,
                value: row.feedback_received_on.to_string(),
            })?;

        records.push(FeedbackRecord {
            id,
            sentiment: Sentiment::from_label(row.feedback_sentiment),
            text: row.feedback.to_string(),
            received_on,
            extra: extra_idx
                .iter()
                .map(|&idx| record.get(idx).unwrap_or_default().to_string())
                .collect(),
        });
    }

    debug!(records = records.len(), "parsed feedback upload");
    Ok(FeedbackDataset {
        extra_columns,
        records,
    })
}
