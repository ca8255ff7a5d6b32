use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;

use crate::api::DEFAULT_BASE_URL;
use crate::collector::OutputOrder;
use crate::parser::DrawIndexPolicy;
use crate::reports::ReportFormat;
use crate::utils::{self, DEFAULT_DATE_FORMATS};

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Rome;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub years: Vec<i32>,
    pub timezone: Tz,
    pub date_formats: Vec<String>,
    pub csv_path: Option<PathBuf>,
    pub concurrency: usize,
    pub timeout: Duration,
    pub order: OutputOrder,
    pub format: ReportFormat,
    pub draw_index_policy: DrawIndexPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            years: utils::default_years(),
            timezone: DEFAULT_TIMEZONE,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            csv_path: None,
            concurrency: 1,
            timeout: Duration::from_secs(30),
            order: OutputOrder::Native,
            format: ReportFormat::Tsv,
            draw_index_policy: DrawIndexPolicy::Strict,
        }
    }
}

pub fn load() -> Result<Config> {
    from_lookup(|key| env::var(key).ok())
}

/// Builds the configuration from `MILLIONDAY_*` variables provided by `lookup`.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(url) = lookup("MILLIONDAY_BASE_URL") {
        config.base_url = url;
    }

    if let Some(years) = lookup("MILLIONDAY_YEARS") {
        config.years =
            utils::parse_years(&years).map_err(|e| anyhow!("MILLIONDAY_YEARS: {}", e))?;
    }

    if let Some(tz) = lookup("MILLIONDAY_TIMEZONE") {
        config.timezone = parse_timezone(&tz)?;
    }

    if let Some(formats) = lookup("MILLIONDAY_DATE_FORMATS") {
        let formats: Vec<String> = formats
            .split(';')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if formats.is_empty() {
            return Err(anyhow!("MILLIONDAY_DATE_FORMATS: no formats given"));
        }
        config.date_formats = formats;
    }

    if let Some(path) = lookup("MILLIONDAY_CSV_PATH") {
        config.csv_path = Some(PathBuf::from(path));
    }

    if let Some(n) = lookup("MILLIONDAY_CONCURRENCY") {
        config.concurrency = parse_positive(&n).context("MILLIONDAY_CONCURRENCY")?;
    }

    if let Some(secs) = lookup("MILLIONDAY_TIMEOUT_SECS") {
        let secs = parse_positive(&secs).context("MILLIONDAY_TIMEOUT_SECS")?;
        config.timeout = Duration::from_secs(secs as u64);
    }

    if config.years.is_empty() {
        return Err(anyhow!("no years configured"));
    }

    Ok(config)
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("unknown time zone {:?}: {}", name, e))
}

fn parse_positive(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!("expected a positive integer, got {:?}", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.years, vec![2024, 2023, 2022, 2021, 2020, 2019, 2018]);
        assert_eq!(config.timezone, chrono_tz::Europe::Rome);
        assert_eq!(config.concurrency, 1);
        assert!(config.csv_path.is_none());
        assert_eq!(config.draw_index_policy, DrawIndexPolicy::Strict);
    }

    #[test]
    fn environment_overrides() {
        let config = from_lookup(lookup(&[
            ("MILLIONDAY_YEARS", "2020,2019"),
            ("MILLIONDAY_TIMEZONE", "UTC"),
            ("MILLIONDAY_DATE_FORMATS", "%d/%m/%Y; %Y%m%d"),
            ("MILLIONDAY_CSV_PATH", "out/draws.csv"),
            ("MILLIONDAY_CONCURRENCY", "3"),
            ("MILLIONDAY_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.years, vec![2020, 2019]);
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.date_formats, vec!["%d/%m/%Y", "%Y%m%d"]);
        assert_eq!(config.csv_path, Some(PathBuf::from("out/draws.csv")));
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(from_lookup(lookup(&[("MILLIONDAY_YEARS", "20x4")])).is_err());
        assert!(from_lookup(lookup(&[("MILLIONDAY_YEARS", " , ")])).is_err());
        assert!(from_lookup(lookup(&[("MILLIONDAY_TIMEZONE", "Mars/Olympus")])).is_err());
        assert!(from_lookup(lookup(&[("MILLIONDAY_CONCURRENCY", "0")])).is_err());
        assert!(from_lookup(lookup(&[("MILLIONDAY_DATE_FORMATS", ";")])).is_err());
    }
}
