use thiserror::Error;

/// Failures while turning one archive page into draw records.
///
/// `row` is the 1-based position among the table's data rows (header excluded).
#[derive(Error, Debug)]
pub enum ExtractError {
    // Structural
    #[error("results table not found in page (expected table.tba)")]
    TableNotFound,

    #[error("row {row}: expected at least 4 cells, found {found}")]
    MissingCells { row: usize, found: usize },

    // Validation
    #[error("row {row}: bad date format: {value:?}")]
    BadDate { row: usize, value: String },

    #[error("row {row}: invalid draw index: {value:?}")]
    BadDrawIndex { row: usize, value: String },

    #[error("row {row}: cannot convert value: {value:?}")]
    CannotConvert { row: usize, value: String },

    #[error("row {row}: expected {expected} numbers, found {found}")]
    WrongNumberCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    // Conversion
    #[error("row {row}: timestamp conversion error for {value}")]
    TimestampConversion { row: usize, value: String },
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("fetch failed for year {year}: {source}")]
    Fetch {
        year: i32,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch failed for year {year}: HTTP {status}")]
    HttpStatus {
        year: i32,
        status: reqwest::StatusCode,
    },

    #[error("year {year}: {source}")]
    Extract {
        year: i32,
        #[source]
        source: ExtractError,
    },

    #[error("CSV store error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV store is corrupt: {0}")]
    CorruptStore(String),

    #[error("draw {draw_index} of {date} appears more than once; refusing to store it")]
    DuplicateDraw {
        date: chrono::NaiveDate,
        draw_index: i64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
