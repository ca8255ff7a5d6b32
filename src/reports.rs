use std::io::Write;

use crate::types::DrawRecord;

pub const TSV_HEADER: &str = "Timestamp\tDate/Time\tDrawIndex\tMainNumbers\tExtraNumbers";
pub const DATE_TIME_DISPLAY: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Tsv,
    Json,
}

pub fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_tsv_line(record: &DrawRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        record.unix_timestamp(),
        record.draw_timestamp().format(DATE_TIME_DISPLAY),
        record.draw_index(),
        join_numbers(record.main_numbers()),
        join_numbers(record.extra_numbers()),
    )
}

pub fn write_tsv_header<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", TSV_HEADER)
}

pub fn write_tsv_rows<W: Write>(out: &mut W, records: &[DrawRecord]) -> std::io::Result<()> {
    for record in records {
        writeln!(out, "{}", format_tsv_line(record))?;
    }
    out.flush()
}

pub fn write_report<W: Write>(
    out: &mut W,
    records: &[DrawRecord],
    format: ReportFormat,
) -> std::io::Result<()> {
    match format {
        ReportFormat::Tsv => {
            write_tsv_header(out)?;
            write_tsv_rows(out, records)
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)?;
            out.flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use chrono::NaiveDate;

    fn sample() -> DrawRecord {
        let ts = utils::draw_datetime(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2);
        let unix = utils::to_unix_timestamp(ts, chrono_tz::Europe::Rome).unwrap();
        DrawRecord::new(ts, 2, [3, 17, 22, 41, 55], [1, 9, 12, 30, 44], unix)
    }

    #[test]
    fn tsv_report_has_header_and_one_line_per_record() {
        let mut out = Vec::new();
        write_report(&mut out, &[sample(), sample()], ReportFormat::Tsv).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TSV_HEADER);
        assert_eq!(
            lines[1],
            "1704137400\t01/01/2024 20:30:00\t2\t3 17 22 41 55\t1 9 12 30 44"
        );
    }

    #[test]
    fn empty_report_is_just_the_header() {
        let mut out = Vec::new();
        write_report(&mut out, &[], ReportFormat::Tsv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", TSV_HEADER));
    }

    #[test]
    fn json_report() {
        let mut out = Vec::new();
        write_report(&mut out, &[sample()], ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let first = &value[0];
        assert_eq!(first["draw_index"], 2);
        assert_eq!(first["unix_timestamp"], 1_704_137_400);
        assert_eq!(first["main_numbers"], serde_json::json!([3, 17, 22, 41, 55]));
        assert_eq!(first["draw_timestamp"], "2024-01-01T20:30:00");
    }
}
