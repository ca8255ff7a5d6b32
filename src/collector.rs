use crate::types::DrawRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputOrder {
    /// Years in processing order, rows as listed on each page.
    #[default]
    Native,
    /// Oldest draw first.
    Ascending,
}

/// Accumulates draw records across the yearly pages.
#[derive(Debug, Default)]
pub struct Collector {
    records: Vec<DrawRecord>,
    year_counts: Vec<(i32, usize)>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, year: i32, records: Vec<DrawRecord>) {
        self.year_counts.push((year, records.len()));
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn year_counts(&self) -> &[(i32, usize)] {
        &self.year_counts
    }

    pub fn into_records(self, order: OutputOrder) -> Vec<DrawRecord> {
        let mut records = self.records;
        if order == OutputOrder::Ascending {
            records.sort_by_key(|r| (r.draw_timestamp(), r.draw_index()));
        }
        records
    }
}
