use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ScrapeError, ScrapeResult};
use crate::reports::{DATE_TIME_DISPLAY, join_numbers};
use crate::types::{DrawKey, DrawRecord, NUMBERS_PER_DRAW};

pub const DEFAULT_CSV_PATH: &str = "dati_md.csv";

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    unix_timestamp: i64,
    date_time: String,
    draw_index: i64,
    main_numbers: String,
    extra_numbers: String,
}

impl From<&DrawRecord> for CsvRow {
    fn from(record: &DrawRecord) -> Self {
        Self {
            unix_timestamp: record.unix_timestamp(),
            date_time: record.draw_timestamp().format(DATE_TIME_DISPLAY).to_string(),
            draw_index: record.draw_index(),
            main_numbers: join_numbers(record.main_numbers()),
            extra_numbers: join_numbers(record.extra_numbers()),
        }
    }
}

impl CsvRow {
    fn into_record(self, line: usize) -> ScrapeResult<DrawRecord> {
        let corrupt = |what: &str| ScrapeError::CorruptStore(format!("line {}: {}", line, what));

        let draw_timestamp = NaiveDateTime::parse_from_str(&self.date_time, DATE_TIME_DISPLAY)
            .map_err(|_| corrupt(&format!("bad date/time {:?}", self.date_time)))?;
        let main_numbers =
            parse_numbers(&self.main_numbers).ok_or_else(|| corrupt("bad main numbers"))?;
        let extra_numbers =
            parse_numbers(&self.extra_numbers).ok_or_else(|| corrupt("bad extra numbers"))?;

        Ok(DrawRecord::new(
            draw_timestamp,
            self.draw_index,
            main_numbers,
            extra_numbers,
            self.unix_timestamp,
        ))
    }
}

fn parse_numbers(text: &str) -> Option<[u32; NUMBERS_PER_DRAW]> {
    let numbers: Vec<u32> = text
        .split_whitespace()
        .map(|t| t.parse().ok())
        .collect::<Option<_>>()?;
    numbers.try_into().ok()
}

/// CSV file of draws, keyed by (date, draw index).
pub struct CsvStore {
    path: PathBuf,
    known: HashSet<DrawKey>,
}

impl CsvStore {
    pub fn open(path: impl AsRef<Path>) -> ScrapeResult<Self> {
        let path = path.as_ref().to_path_buf();
        let known = if has_content(&path)? {
            load_records(&path)?.iter().map(DrawRecord::key).collect()
        } else {
            HashSet::new()
        };

        Ok(Self { path, known })
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn contains(&self, key: &DrawKey) -> bool {
        self.known.contains(key)
    }

    /// Appends the records not stored yet and returns how many were written.
    ///
    /// A batch naming the same draw twice is rejected before anything is
    /// written, since only one of the two could be kept.
    pub fn append_new(&mut self, records: &[DrawRecord]) -> ScrapeResult<usize> {
        let mut batch = HashSet::with_capacity(records.len());
        if let Some(dup) = records.iter().map(DrawRecord::key).find(|k| !batch.insert(*k)) {
            return Err(ScrapeError::DuplicateDraw {
                date: dup.date,
                draw_index: dup.draw_index,
            });
        }

        let write_header = !has_content(&self.path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        let mut written = 0;
        for record in records {
            if self.known.insert(record.key()) {
                writer.serialize(CsvRow::from(record))?;
                written += 1;
            }
        }
        writer.flush()?;

        info!(path = %self.path.display(), written, "updated CSV store");
        Ok(written)
    }
}

fn has_content(path: &Path) -> ScrapeResult<bool> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len() > 0),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn load_records(path: &Path) -> ScrapeResult<Vec<DrawRecord>> {
    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        // Line 1 is the header.
        records.push(row?.into_record(i + 2)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record(d: u32, index: i64) -> DrawRecord {
        let ts = utils::draw_datetime(NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), index);
        let unix = utils::to_unix_timestamp(ts, chrono_tz::Europe::Rome).unwrap();
        DrawRecord::new(ts, index, [1, 2, 3, 4, 5], [6, 7, 8, 9, 10], unix)
    }

    #[test]
    fn creates_file_with_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("draws.csv");

        let mut store = CsvStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.append_new(&[record(1, 2), record(1, 1)]).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("unix_timestamp,date_time,draw_index,main_numbers,extra_numbers")
        );
        assert_eq!(
            lines.next(),
            Some("1704137400,01/01/2024 20:30:00,2,1 2 3 4 5,6 7 8 9 10")
        );
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn appends_only_unseen_draws_across_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("draws.csv");

        CsvStore::open(&path)
            .unwrap()
            .append_new(&[record(1, 2), record(1, 1)])
            .unwrap();

        let mut store = CsvStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains(&record(1, 2).key()));

        let written = store
            .append_new(&[record(2, 4), record(1, 2), record(2, 3)])
            .unwrap();
        assert_eq!(written, 2);

        let stored = load_records(&path).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[2], record(2, 4));
        let headers = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .filter(|l| l.starts_with("unix_timestamp"))
            .count();
        assert_eq!(headers, 1);
    }

    #[test]
    fn repeated_draw_in_one_batch_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("draws.csv");
        let mut store = CsvStore::open(&path).unwrap();

        // Two lenient-mode rows of the same day both end up with index 0.
        let err = store
            .append_new(&[record(3, 0), record(3, 1), record(3, 0)])
            .unwrap_err();
        match err {
            ScrapeError::DuplicateDraw { date, draw_index } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
                assert_eq!(draw_index, 0);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(store.is_empty());
        assert!(!has_content(&path).unwrap());
    }

    #[test]
    fn corrupt_rows_are_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("draws.csv");
        std::fs::write(
            &path,
            "unix_timestamp,date_time,draw_index,main_numbers,extra_numbers\n\
             1704137400,01/01/2024 20:30:00,2,1 2 3,6 7 8 9 10\n",
        )
        .unwrap();

        match CsvStore::open(&path) {
            Err(ScrapeError::CorruptStore(msg)) => assert!(msg.contains("line 2")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("corrupt file accepted"),
        }
    }
}
