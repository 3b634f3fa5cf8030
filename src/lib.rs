pub mod aggregate;
pub mod cache;
pub mod compare;
pub mod export;
pub mod loader;
pub mod models;
pub mod range;
pub mod report;
pub mod sample;
pub mod session;
pub mod template;

pub use loader::{load_dataset, LoadError};
pub use models::{FeedbackDataset, FeedbackRecord, Sentiment, SentimentCount, YearComparison};
pub use range::{DateBounds, DateRangeSelection, Period};
pub use session::{Session, Summary, SummaryRequest, Upload};
