use std::fmt::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::loader::format_date;
use crate::models::{FeedbackRecord, Sentiment, SentimentCount, YearComparison};
use crate::range::DateBounds;
use crate::session::Summary;

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartStyle {
    Bar,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub chart: ChartStyle,
    pub hide_chart: bool,
    pub hide_raw: bool,
}

pub fn render(
    summary: &Summary<'_>,
    period: &str,
    notices: &[String],
    options: RenderOptions,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Markdown => Ok(build_markdown(summary, period, notices, options)),
        OutputFormat::Json => build_json(summary, period, notices, options),
    }
}

pub fn build_markdown(
    summary: &Summary<'_>,
    period: &str,
    notices: &[String],
    options: RenderOptions,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Customer Feedback Analysis");
    let _ = writeln!(output, "Period: {} ({})", period, describe_bounds(summary.bounds));
    for notice in notices {
        let _ = writeln!(output);
        let _ = writeln!(output, "> {notice}");
    }
    let _ = writeln!(output);

    if summary.is_empty() {
        let _ = writeln!(output, "No reviews found for the selected date range.");
        return output;
    }

    let total = summary.counts.total;
    let _ = writeln!(output, "Total number of feedback analyzed: {total}");

    if !options.hide_chart {
        let _ = writeln!(output);
        let _ = writeln!(output, "## No. of Feedback by Sentiment (Total: {total})");
        match options.chart {
            ChartStyle::Bar => write_bar_chart(&mut output, &summary.counts),
            ChartStyle::Pie => write_share_chart(&mut output, &summary.counts),
        }
    }

    if let Some(sample) = &summary.sample {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Random {} Feedback", sample.sentiment);
        match sample.record {
            Some(record) => {
                let _ = writeln!(
                    output,
                    "> {} (#{}, {})",
                    record.text,
                    record.id,
                    format_date(record.received_on)
                );
            }
            None => {
                let _ = writeln!(output, "No reviews available for the selected sentiment.");
            }
        }
    }

    if !options.hide_raw {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Raw Data");
        write_raw_table(&mut output, &summary.records);
    }

    if let Some(comparison) = &summary.comparison {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## Year-wise Comparison for the same period in {} vs {}",
            comparison.current_year, comparison.previous_year
        );
        write_comparison(&mut output, comparison);
    }

    output
}

fn describe_bounds(bounds: DateBounds) -> String {
    match bounds {
        DateBounds::Unbounded => "all dates".to_string(),
        DateBounds::Between { start, end } => {
            format!("{} to {}", format_date(start), format_date(end))
        }
    }
}

fn write_bar_chart(output: &mut String, counts: &SentimentCount) {
    let widest = counts.tallies.iter().map(|t| t.sentiment.label().len()).max().unwrap_or(0);
    let max = counts.tallies.iter().map(|t| t.count).max().unwrap_or(0).max(1);
    let _ = writeln!(output, "```");
    for tally in &counts.tallies {
        let width = (tally.count * BAR_WIDTH).div_ceil(max);
        let _ = writeln!(
            output,
            "{:<widest$} | {} {}",
            tally.sentiment.label(),
            "#".repeat(width),
            tally.count
        );
    }
    let _ = writeln!(output, "```");
}

fn write_share_chart(output: &mut String, counts: &SentimentCount) {
    for tally in &counts.tallies {
        let _ = writeln!(
            output,
            "- {}: {:.1}% ({})",
            tally.sentiment,
            counts.share(&tally.sentiment),
            tally.count
        );
    }
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn write_raw_table(output: &mut String, records: &[&FeedbackRecord]) {
    let _ = writeln!(output, "| feedback_id | feedback_sentiment | feedback | feedback_received_on |");
    let _ = writeln!(output, "|---|---|---|---|");
    for record in records {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            record.id,
            record.sentiment,
            escape_cell(&record.text),
            format_date(record.received_on)
        );
    }
}

fn write_comparison(output: &mut String, comparison: &YearComparison) {
    let _ = writeln!(
        output,
        "| Sentiment | {} Reviews | {} Reviews |",
        comparison.current_year, comparison.previous_year
    );
    let _ = writeln!(output, "|---|---|---|");
    for row in &comparison.rows {
        let _ = writeln!(output, "| {} | {} | {} |", row.sentiment, row.current, row.previous);
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    period: &'a str,
    start: Option<String>,
    end: Option<String>,
    notices: &'a [String],
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentiments: Option<Vec<JsonTally<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample: Option<JsonSample<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<JsonRecord<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<&'a YearComparison>,
}

#[derive(Serialize)]
struct JsonTally<'a> {
    sentiment: &'a Sentiment,
    count: usize,
    share: f64,
}

#[derive(Serialize)]
struct JsonSample<'a> {
    sentiment: &'a Sentiment,
    record: Option<JsonRecord<'a>>,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    feedback_id: i64,
    feedback_sentiment: &'a Sentiment,
    feedback: &'a str,
    feedback_received_on: String,
}

impl<'a> From<&'a FeedbackRecord> for JsonRecord<'a> {
    fn from(record: &'a FeedbackRecord) -> Self {
        Self {
            feedback_id: record.id,
            feedback_sentiment: &record.sentiment,
            feedback: &record.text,
            feedback_received_on: format_date(record.received_on),
        }
    }
}

pub fn build_json(
    summary: &Summary<'_>,
    period: &str,
    notices: &[String],
    options: RenderOptions,
) -> serde_json::Result<String> {
    let (start, end) = match summary.bounds {
        DateBounds::Unbounded => (None, None),
        DateBounds::Between { start, end } => (Some(format_date(start)), Some(format_date(end))),
    };

    let sentiments = (!options.hide_chart).then(|| {
        summary
            .counts
            .tallies
            .iter()
            .map(|tally| JsonTally {
                sentiment: &tally.sentiment,
                count: tally.count,
                share: summary.counts.share(&tally.sentiment),
            })
            .collect()
    });

    let sample = summary.sample.as_ref().map(|sample| JsonSample {
        sentiment: &sample.sentiment,
        record: sample.record.map(JsonRecord::from),
    });

    let records = (!options.hide_raw).then(|| {
        summary
            .records
            .iter()
            .map(|record| JsonRecord::from(*record))
            .collect()
    });

    serde_json::to_string_pretty(&JsonSummary {
        period,
        start,
        end,
        notices,
        total: summary.counts.total,
        sentiments,
        sample,
        records,
        comparison: summary.comparison.as_ref(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DatasetCache;
    use crate::range::DateRangeSelection;
    use crate::sample::EntropyRandom;
    use crate::session::{Session, SummaryRequest};
    use crate::template::SAMPLE_CSV;
    use chrono::NaiveDate;

    const SHOW_ALL: RenderOptions = RenderOptions {
        chart: ChartStyle::Bar,
        hide_chart: false,
        hide_raw: false,
    };

    fn session() -> Session {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        Session::new(today, DatasetCache::default(), Box::new(EntropyRandom::seeded(3)))
    }

    fn request(compare_years: bool) -> SummaryRequest {
        SummaryRequest {
            selection: DateRangeSelection::All,
            sample: Some(Sentiment::Positive),
            compare_years,
        }
    }

    #[test]
    fn markdown_has_every_section() {
        let mut session = session();
        let upload = session.upload(SAMPLE_CSV.as_bytes());
        let summary = session.summarize(&upload.dataset, &request(true));
        let report = build_markdown(&summary, "All Feedback", &[], SHOW_ALL);

        assert!(report.contains("Total number of feedback analyzed: 6"));
        assert!(report.contains("## No. of Feedback by Sentiment (Total: 6)"));
        assert!(report.contains("## Random positive Feedback"));
        assert!(report.contains("| 3 | negative | Not happy with the product, it broke after a week. | 23-01-2023 |"));
        assert!(report.contains("| Sentiment | 2025 Reviews | 2024 Reviews |"));
        assert!(report.contains("| positive | 2 | 0 |"));
        assert!(report.contains("| neutral | 0 | 1 |"));
        assert!(report.contains("| negative | 0 | 1 |"));
    }

    #[test]
    fn hidden_sections_are_omitted() {
        let mut session = session();
        let upload = session.upload(SAMPLE_CSV.as_bytes());
        let summary = session.summarize(&upload.dataset, &request(false));
        let options = RenderOptions {
            chart: ChartStyle::Pie,
            hide_chart: true,
            hide_raw: true,
        };
        let report = build_markdown(&summary, "All Feedback", &[], options);
        assert!(!report.contains("No. of Feedback by Sentiment"));
        assert!(!report.contains("## Raw Data"));
        assert!(!report.contains("Year-wise Comparison"));
    }

    #[test]
    fn pie_style_lists_shares() {
        let mut session = session();
        let upload = session.upload(SAMPLE_CSV.as_bytes());
        let summary = session.summarize(&upload.dataset, &request(false));
        let options = RenderOptions {
            chart: ChartStyle::Pie,
            ..SHOW_ALL
        };
        let report = build_markdown(&summary, "All Feedback", &[], options);
        assert!(report.contains("- positive: 33.3% (2)"));
    }

    #[test]
    fn empty_summary_shows_notice() {
        let mut session = session();
        let upload = session.upload(b"nope\n");
        let notices = vec![upload.error.as_ref().unwrap().to_string()];
        let summary = session.summarize(&upload.dataset, &request(true));
        let report = build_markdown(&summary, "All Feedback", &notices, SHOW_ALL);
        assert!(report.contains("feedback_received_on"));
        assert!(report.contains("No reviews found for the selected date range."));
    }

    #[test]
    fn json_carries_counts_and_comparison() {
        let mut session = session();
        let upload = session.upload(SAMPLE_CSV.as_bytes());
        let summary = session.summarize(&upload.dataset, &request(true));
        let json = build_json(&summary, "All Feedback", &[], SHOW_ALL).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total"], 6);
        assert_eq!(value["sentiments"][0]["sentiment"], "positive");
        assert_eq!(value["sentiments"][0]["count"], 2);
        assert_eq!(value["records"].as_array().unwrap().len(), 6);
        assert_eq!(value["comparison"]["current_year"], 2025);
        assert_eq!(value["comparison"]["rows"][1]["sentiment"], "neutral");
        assert_eq!(value["comparison"]["rows"][1]["previous"], 1);
        assert!(value["start"].is_null());
    }

    #[test]
    fn json_omits_hidden_sections() {
        let mut session = session();
        let upload = session.upload(SAMPLE_CSV.as_bytes());
        let summary = session.summarize(&upload.dataset, &request(false));
        let options = RenderOptions {
            chart: ChartStyle::Bar,
            hide_chart: true,
            hide_raw: true,
        };
        let json = build_json(&summary, "All Feedback", &[], options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total"], 6);
        assert!(value.get("sentiments").is_none());
        assert!(value.get("records").is_none());
        assert!(value.get("comparison").is_none());
        assert_eq!(value["sample"]["sentiment"], "positive");
    }
}
