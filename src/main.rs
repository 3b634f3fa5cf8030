use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use feedback_insights::cache::DatasetCache;
use feedback_insights::export::{self, ExportOutcome};
use feedback_insights::report::{self, ChartStyle, OutputFormat, RenderOptions};
use feedback_insights::sample::EntropyRandom;
use feedback_insights::{loader, template, Period, Sentiment, Session, SummaryRequest};

#[derive(Parser)]
#[command(name = "feedback-insights")]
#[command(about = "Sentiment summaries, exports and year-over-year comparison for customer feedback CSVs", long_about = None)]
struct Cli {
    /// Log progress at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct RangeArgs {
    /// Date range to analyze
    #[arg(long, value_enum, default_value_t = Period::All)]
    period: Period,
    /// Start of a custom range (DD-MM-YYYY)
    #[arg(long, value_parser = parse_cli_date)]
    start: Option<NaiveDate>,
    /// End of a custom range (DD-MM-YYYY)
    #[arg(long, value_parser = parse_cli_date)]
    end: Option<NaiveDate>,
    /// Reference date for relative ranges and the year comparison (DD-MM-YYYY)
    #[arg(long, env = "FEEDBACK_TODAY", value_parser = parse_cli_date)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample CSV showing the expected columns
    Template {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Summarize feedback by sentiment
    Summary {
        #[arg(long)]
        csv: PathBuf,
        #[command(flatten)]
        range: RangeArgs,
        /// Show one random feedback with this sentiment
        #[arg(long, value_parser = parse_sentiment, default_value = "positive")]
        sample: Sentiment,
        /// Skip the random feedback section
        #[arg(long)]
        no_sample: bool,
        /// Compare the current year with the previous one
        #[arg(long)]
        compare_years: bool,
        #[arg(long, value_enum, default_value_t = ChartStyle::Bar)]
        chart: ChartStyle,
        #[arg(long)]
        hide_chart: bool,
        #[arg(long)]
        hide_raw: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        /// Write the summary to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export feedback with the selected sentiments as CSV
    Export {
        #[arg(long)]
        csv: PathBuf,
        #[command(flatten)]
        range: RangeArgs,
        /// Sentiment to include; repeat for several. Defaults to all three, and
        /// at least one is required when given.
        #[arg(
            long = "sentiment",
            value_parser = parse_sentiment,
            default_values = ["positive", "neutral", "negative"]
        )]
        sentiments: Vec<Sentiment>,
        #[arg(long, default_value = export::EXPORT_FILE_NAME)]
        out: PathBuf,
    },
}

fn parse_cli_date(value: &str) -> Result<NaiveDate, String> {
    loader::parse_date(value).ok_or_else(|| format!("'{value}' is not a DD-MM-YYYY date"))
}

fn parse_sentiment(value: &str) -> Result<Sentiment, String> {
    match Sentiment::from_label(value) {
        Sentiment::Other(label) => Err(format!(
            "unknown sentiment '{label}', expected positive, neutral or negative"
        )),
        sentiment => Ok(sentiment),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One upload per run, so the cache only matters to callers that keep a session.
fn open_session(range: &RangeArgs) -> Session {
    let today = range.today.unwrap_or_else(|| Local::now().date_naive());
    Session::new(today, DatasetCache::default(), Box::new(EntropyRandom::new()))
}

fn read_upload(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Template { out } => match out {
            Some(path) => {
                std::fs::write(&path, template::SAMPLE_CSV)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Sample CSV written to {}.", path.display());
            }
            None => print!("{}", template::SAMPLE_CSV),
        },
        Commands::Summary {
            csv,
            range,
            sample,
            no_sample,
            compare_years,
            chart,
            hide_chart,
            hide_raw,
            format,
            out,
        } => {
            let mut session = open_session(&range);
            let upload = session.upload(&read_upload(&csv)?);
            let notices: Vec<String> = upload.error.iter().map(ToString::to_string).collect();

            let selection = range.period.selection(range.start, range.end, session.today());
            let request = SummaryRequest {
                selection,
                sample: (!no_sample).then_some(sample),
                compare_years,
            };
            let summary = session.summarize(&upload.dataset, &request);
            let options = RenderOptions {
                chart,
                hide_chart,
                hide_raw,
            };
            let rendered = report::render(&summary, range.period.label(), &notices, options, format)?;

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Summary written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Export {
            csv,
            range,
            sentiments,
            out,
        } => {
            let mut session = open_session(&range);
            let upload = session.upload(&read_upload(&csv)?);
            if let Some(err) = &upload.error {
                eprintln!("{err}");
            }

            let selection = range.period.selection(range.start, range.end, session.today());
            match session.export(&upload.dataset, selection, &sentiments) {
                ExportOutcome::Rows(rows) => {
                    let file = std::fs::File::create(&out)
                        .with_context(|| format!("failed to create {}", out.display()))?;
                    export::write_csv(file, &upload.dataset.extra_columns, &rows)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    info!(rows = rows.len(), path = %out.display(), "export written");
                    println!("Exported {} feedback rows to {}.", rows.len(), out.display());
                }
                ExportOutcome::NoData(reason) => {
                    warn!(?reason, "export skipped");
                    println!("{}", reason.message());
                }
            }
        }
    }

    Ok(())
}
