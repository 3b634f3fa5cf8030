use std::io::Write;

use crate::loader::{format_date, REQUIRED_COLUMNS};
use crate::models::{FeedbackRecord, Sentiment};

pub const EXPORT_FILE_NAME: &str = "filtered_reviews.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    NoSentimentsSelected,
    NoMatchingRecords,
}

impl NoDataReason {
    pub fn message(self) -> &'static str {
        match self {
            NoDataReason::NoSentimentsSelected => "No sentiments selected for download.",
            NoDataReason::NoMatchingRecords => "No feedback found for the selected sentiment(s).",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExportOutcome<'a> {
    Rows(Vec<&'a FeedbackRecord>),
    NoData(NoDataReason),
}

/// Keeps records whose sentiment is selected, in their original order.
pub fn select_sentiments<'a>(records: &[&'a FeedbackRecord], selected: &[Sentiment]) -> ExportOutcome<'a> {
    if selected.is_empty() {
        return ExportOutcome::NoData(NoDataReason::NoSentimentsSelected);
    }

    let rows: Vec<&'a FeedbackRecord> = records
        .iter()
        .copied()
        .filter(|record| selected.contains(&record.sentiment))
        .collect();

    if rows.is_empty() {
        ExportOutcome::NoData(NoDataReason::NoMatchingRecords)
    } else {
        ExportOutcome::Rows(rows)
    }
}

/// Writes records with the upload's column set: required columns, then extras.
pub fn write_csv<W: Write>(
    writer: W,
    extra_columns: &[String],
    records: &[&FeedbackRecord],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let header: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .chain(extra_columns.iter().map(String::as_str))
        .collect();
    csv_writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.id.to_string(),
            record.sentiment.label().to_string(),
            record.text.clone(),
            format_date(record.received_on),
        ];
        row.extend(record.extra.iter().cloned());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(extra_columns: &[String], records: &[&FeedbackRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, extra_columns, records)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_dataset;
    use crate::template::SAMPLE_CSV;

    #[test]
    fn keeps_selected_sentiments_in_order() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let records: Vec<&FeedbackRecord> = dataset.iter().collect();
        match select_sentiments(&records, &[Sentiment::Negative, Sentiment::Positive]) {
            ExportOutcome::Rows(rows) => {
                let ids: Vec<i64> = rows.iter().map(|record| record.id).collect();
                assert_eq!(ids, vec![1, 3, 4, 5]);
            }
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn empty_selection_is_a_signal() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let records: Vec<&FeedbackRecord> = dataset.iter().collect();
        assert_eq!(
            select_sentiments(&records, &[]),
            ExportOutcome::NoData(NoDataReason::NoSentimentsSelected)
        );
    }

    #[test]
    fn no_matches_is_a_signal() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let records: Vec<&FeedbackRecord> = dataset
            .iter()
            .filter(|record| record.sentiment == Sentiment::Positive)
            .collect();
        assert_eq!(
            select_sentiments(&records, &[Sentiment::Neutral]),
            ExportOutcome::NoData(NoDataReason::NoMatchingRecords)
        );
    }

    #[test]
    fn full_export_reparses_identically() {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes()).unwrap();
        let records: Vec<&FeedbackRecord> = dataset.iter().collect();
        let bytes = to_csv_bytes(&dataset.extra_columns, &records).unwrap();
        let reparsed = load_dataset(&bytes).unwrap();
        assert_eq!(reparsed, dataset);
    }

    #[test]
    fn quotes_commas_and_quotes() {
        let csv = "feedback_id,feedback_sentiment,feedback,feedback_received_on,source\n\
                   9,negative,\"Said \"\"meh\"\", then left, sadly\",05-06-2024,web\n";
        let dataset = load_dataset(csv.as_bytes()).unwrap();
        let records: Vec<&FeedbackRecord> = dataset.iter().collect();
        let bytes = to_csv_bytes(&dataset.extra_columns, &records).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();

        assert_eq!(
            text,
            "feedback_id,feedback_sentiment,feedback,feedback_received_on,source\n\
             9,negative,\"Said \"\"meh\"\", then left, sadly\",05-06-2024,web\n"
        );
        assert_eq!(load_dataset(&bytes).unwrap(), dataset);
    }
}
