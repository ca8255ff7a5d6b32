use std::sync::LazyLock;

use chrono::NaiveDate;
use chrono_tz::Tz;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::types::{DrawRecord, NUMBERS_PER_DRAW};
use crate::utils::{self, TimestampError};

const MIN_DATA_CELLS: usize = 4;

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.tba").expect("invalid selector: results table"));
static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: row"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: cell"));

/// What to do with a draw-index cell that is not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawIndexPolicy {
    /// Reject the page.
    #[default]
    Strict,
    /// Use 0 and keep going.
    DefaultZero,
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub today: NaiveDate,
    pub timezone: Tz,
    pub date_formats: Vec<String>,
    pub draw_index_policy: DrawIndexPolicy,
}

impl ExtractOptions {
    pub fn new(today: NaiveDate, timezone: Tz) -> Self {
        Self {
            today,
            timezone,
            date_formats: utils::DEFAULT_DATE_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            draw_index_policy: DrawIndexPolicy::default(),
        }
    }
}

/// Positional view of one data row: date, draw index, main numbers, extra numbers.
struct RowCells<'a> {
    date: ElementRef<'a>,
    draw_index: ElementRef<'a>,
    main_numbers: ElementRef<'a>,
    extra_numbers: ElementRef<'a>,
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<Vec<_>>().join(" ")
}

/// Extracts every draw listed in one yearly archive page, in page order.
pub fn extract_draws(
    html: &str,
    options: &ExtractOptions,
) -> Result<Vec<DrawRecord>, ExtractError> {
    let document = Html::parse_document(html);

    let table = document
        .select(&TABLE_SEL)
        .next()
        .ok_or(ExtractError::TableNotFound)?;

    let mut records = Vec::new();

    // First row is the header.
    for (i, row) in table.select(&ROW_SEL).skip(1).enumerate() {
        let row_number = i + 1;
        let cells: Vec<ElementRef> = row.select(&CELL_SEL).collect();

        if cells.len() < 2 {
            debug!(row = row_number, "skipping row without data cells");
            continue;
        }
        if cells.len() < MIN_DATA_CELLS {
            return Err(ExtractError::MissingCells {
                row: row_number,
                found: cells.len(),
            });
        }

        let row_cells = RowCells {
            date: cells[0],
            draw_index: cells[1],
            main_numbers: cells[2],
            extra_numbers: cells[3],
        };
        records.push(extract_row(row_number, &row_cells, options)?);
    }

    Ok(records)
}

fn extract_row(
    row: usize,
    cells: &RowCells,
    options: &ExtractOptions,
) -> Result<DrawRecord, ExtractError> {
    let date_text = cell_text(cells.date);
    let date = utils::interpret_date_cell(&date_text, options.today, &options.date_formats)
        .ok_or_else(|| ExtractError::BadDate {
            row,
            value: date_text.trim().to_string(),
        })?;

    let draw_index = parse_draw_index(
        row,
        &cell_text(cells.draw_index),
        options.draw_index_policy,
    )?;
    let main_numbers = parse_numbers(row, &cell_text(cells.main_numbers))?;
    let extra_numbers = parse_numbers(row, &cell_text(cells.extra_numbers))?;

    let draw_timestamp = utils::draw_datetime(date, draw_index);
    let unix_timestamp =
        utils::to_unix_timestamp(draw_timestamp, options.timezone).map_err(|e| match e {
            TimestampError::BadFormat(value) => ExtractError::BadDate { row, value },
            TimestampError::Conversion(value) => ExtractError::TimestampConversion { row, value },
        })?;

    Ok(DrawRecord::new(
        draw_timestamp,
        draw_index,
        main_numbers,
        extra_numbers,
        unix_timestamp,
    ))
}

fn parse_draw_index(
    row: usize,
    text: &str,
    policy: DrawIndexPolicy,
) -> Result<i64, ExtractError> {
    let trimmed = text.trim();
    match trimmed.parse::<i64>() {
        Ok(index) => Ok(index),
        Err(_) => match policy {
            DrawIndexPolicy::Strict => Err(ExtractError::BadDrawIndex {
                row,
                value: trimmed.to_string(),
            }),
            DrawIndexPolicy::DefaultZero => {
                warn!(row, value = trimmed, "draw index is not a number, using 0");
                Ok(0)
            }
        },
    }
}

fn parse_numbers(row: usize, text: &str) -> Result<[u32; NUMBERS_PER_DRAW], ExtractError> {
    let numbers = text
        .split_whitespace()
        .map(|token| {
            token.parse::<u32>().map_err(|_| ExtractError::CannotConvert {
                row,
                value: token.to_string(),
            })
        })
        .collect::<Result<Vec<u32>, _>>()?;

    let found = numbers.len();
    numbers
        .try_into()
        .map_err(|_| ExtractError::WrongNumberCount {
            row,
            expected: NUMBERS_PER_DRAW,
            found,
        })
}
