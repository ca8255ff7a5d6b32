use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::StreamExt;
use tracing::info;

use crate::api::Fetcher;
use crate::collector::{Collector, OutputOrder};
use crate::config::Config;
use crate::error::ScrapeError;
use crate::parser::{ExtractOptions, extract_draws};
use crate::reports::{self, ReportFormat};
use crate::store::CsvStore;
use crate::types::DrawRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub per_year: Vec<(i32, usize)>,
    pub stored: Option<usize>,
}

/// Fetches every configured year, writes the report to `out` and
/// updates the CSV store when one is configured.
///
/// In native order with TSV output each year is written as soon as it is
/// extracted, so pages already fetched reach `out` even if a later year fails.
pub async fn run<W: Write>(
    config: &Config,
    today: NaiveDate,
    out: &mut W,
) -> Result<RunSummary> {
    let fetcher = Fetcher::new(config.base_url.clone(), config.timeout)?;
    let options = ExtractOptions {
        today,
        timezone: config.timezone,
        date_formats: config.date_formats.clone(),
        draw_index_policy: config.draw_index_policy,
    };
    let streaming = config.order == OutputOrder::Native && config.format == ReportFormat::Tsv;

    if streaming {
        reports::write_tsv_header(out)?;
    }

    let mut collector = Collector::new();
    let mut pages = std::pin::pin!(fetcher.fetch_years(&config.years, config.concurrency));

    while let Some(page) = pages.next().await {
        let page = page?;
        let year = page.year;
        let records = extract_draws(&page.html, &options)
            .map_err(|source| ScrapeError::Extract { year, source })?;
        info!(year, records = records.len(), "extracted draws");

        if streaming {
            reports::write_tsv_rows(out, &records)
                .with_context(|| format!("writing report for year {}", year))?;
        }
        collector.extend(year, records);
    }

    let per_year = collector.year_counts().to_vec();
    let records = collector.into_records(config.order);

    if !streaming {
        reports::write_report(out, &records, config.format).context("writing report")?;
    }

    let stored = match &config.csv_path {
        Some(path) => Some(store_records(path, &records)?),
        None => None,
    };

    Ok(RunSummary {
        total: records.len(),
        per_year,
        stored,
    })
}

fn store_records(path: &std::path::Path, records: &[DrawRecord]) -> Result<usize> {
    let mut store =
        CsvStore::open(path).with_context(|| format!("opening CSV store {}", path.display()))?;

    // The file is append-only, so new draws go in oldest first.
    let mut ordered = records.to_vec();
    ordered.sort_by_key(|r| (r.draw_timestamp(), r.draw_index()));

    let written = store.append_new(&ordered)?;
    Ok(written)
}
