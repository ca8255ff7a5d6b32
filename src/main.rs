use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use millionday_lib::store::DEFAULT_CSV_PATH;
use millionday_lib::{DrawIndexPolicy, OutputOrder, ReportFormat, config, pipeline, utils};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Native,
    Ascending,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Tsv,
    Json,
}

/// Downloads the MillionDay draw archive and prints it as a table.
#[derive(Debug, Parser)]
#[command(name = "millionday", version, about)]
struct Cli {
    /// Comma-separated years to fetch, in processing order
    #[arg(long)]
    years: Option<String>,

    /// Output order of the report
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Report format written to stdout
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Append new draws to this CSV file (dati_md.csv when no path is given)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_CSV_PATH)]
    csv: Option<PathBuf>,

    /// Number of yearly pages fetched at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Use 0 for draw indices that are not numbers instead of failing
    #[arg(long)]
    lenient_draw_index: bool,
}

fn apply_cli(cli: Cli, mut config: config::Config) -> Result<config::Config> {
    if let Some(years) = cli.years {
        config.years = utils::parse_years(&years).map_err(anyhow::Error::msg)?;
        if config.years.is_empty() {
            anyhow::bail!("no years given");
        }
    }
    if let Some(order) = cli.order {
        config.order = match order {
            OrderArg::Native => OutputOrder::Native,
            OrderArg::Ascending => OutputOrder::Ascending,
        };
    }
    if let Some(format) = cli.format {
        config.format = match format {
            FormatArg::Tsv => ReportFormat::Tsv,
            FormatArg::Json => ReportFormat::Json,
        };
    }
    if let Some(path) = cli.csv {
        config.csv_path = Some(path);
    }
    if let Some(n) = cli.concurrency {
        config.concurrency = n.max(1);
    }
    if cli.lenient_draw_index {
        config.draw_index_policy = DrawIndexPolicy::DefaultZero;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = apply_cli(cli, config::load()?)?;
    tracing::info!(years = ?config.years, "fetching MillionDay archive");

    let today = utils::today_in(config.timezone);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = pipeline::run(&config, today, &mut out).await.inspect_err(|e| {
        tracing::error!("run failed: {:#}", e);
    })?;
    out.flush()?;

    tracing::info!(total = summary.total, "done");
    if let Some(written) = summary.stored {
        tracing::info!(written, "new draws stored");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "millionday",
            "--years",
            "2022,2021",
            "--order",
            "ascending",
            "--format",
            "json",
            "--csv",
            "draws.csv",
            "--concurrency",
            "0",
            "--lenient-draw-index",
        ])
        .unwrap();

        let config = apply_cli(cli, config::Config::default()).unwrap();
        assert_eq!(config.years, vec![2022, 2021]);
        assert_eq!(config.order, OutputOrder::Ascending);
        assert_eq!(config.format, ReportFormat::Json);
        assert_eq!(config.csv_path, Some(PathBuf::from("draws.csv")));
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.draw_index_policy, DrawIndexPolicy::DefaultZero);
    }

    #[test]
    fn bare_csv_flag_uses_default_path() {
        let cli = Cli::try_parse_from(["millionday", "--csv"]).unwrap();
        let config = apply_cli(cli, config::Config::default()).unwrap();
        assert_eq!(config.csv_path, Some(PathBuf::from(DEFAULT_CSV_PATH)));
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::try_parse_from(["millionday"]).unwrap();
        let config = apply_cli(cli, config::Config::default()).unwrap();
        assert_eq!(config.years.len(), 7);
        assert_eq!(config.order, OutputOrder::Native);
        assert_eq!(config.format, ReportFormat::Tsv);
    }
}
