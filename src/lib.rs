pub mod api;
pub mod collector;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod reports;
pub mod store;
pub mod types;
pub mod utils;

pub use api::{Fetcher, YearPage};
pub use collector::{Collector, OutputOrder};
pub use config::Config;
pub use error::{ExtractError, ScrapeError, ScrapeResult};
pub use parser::{DrawIndexPolicy, ExtractOptions, extract_draws};
pub use pipeline::{RunSummary, run};
pub use reports::ReportFormat;
pub use store::CsvStore;
pub use types::{DrawKey, DrawRecord, Session};
